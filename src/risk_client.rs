//! Client for the external generative risk model.
//!
//! Builds the fixed assessment prompt, sends it to a Gemini-style
//! `generateContent` endpoint, and parses the reply into a typed
//! [`InvoiceRiskResult`]. The model's output is treated as untrusted: a reply
//! that does not match the expected schema becomes an invocation error, never
//! a panic. There is no retry, caching, or deduplication; every call is one
//! full round trip.

use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{InvoiceRiskRequest, InvoiceRiskResult};
use serde_json::{json, Value};
use std::time::Duration;

pub struct RiskModelClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl RiskModelClient {
    /// Creates a new `RiskModelClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the model API.
    /// * `api_key` - API key sent as a query parameter.
    /// * `model` - Model identifier (e.g. "gemini-2.0-flash").
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create model client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.model_api_base_url.clone(),
            config.model_api_key.clone(),
            config.model_name.clone(),
        )
    }

    /// Assesses the risk of an invoice via the external model.
    ///
    /// # Arguments
    ///
    /// * `request` - The validated invoice fields to interpolate into the prompt.
    ///
    /// # Returns
    ///
    /// * `Result<InvoiceRiskResult, AppError>` - The parsed risk result, or an
    ///   invocation error when the call or the reply shape fails.
    pub async fn assess_invoice_risk(
        &self,
        request: &InvoiceRiskRequest,
    ) -> Result<InvoiceRiskResult, AppError> {
        let prompt = build_prompt(request);

        // Build URL with proper parameter encoding; the key stays out of logs
        let url = reqwest::Url::parse_with_params(
            &format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ),
            &[("key", self.api_key.as_str())],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Requesting risk assessment from model {}", self.model);
        tracing::debug!(
            "Model API URL: {}/v1beta/models/{}:generateContent?key=[REDACTED]",
            self.base_url,
            self.model
        );

        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Model request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Model API returned {}: {}",
                status, error_text
            )));
        }

        let reply: Value = response
            .json()
            .await
            .context("Failed to decode model response body")?;

        let text = reply
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                tracing::warn!("Unexpected model response format: {:?}", reply);
                AppError::ExternalApiError(
                    "Model response missing candidate text".to_string(),
                )
            })?;

        let result: InvoiceRiskResult = serde_json::from_str(strip_code_fences(text))
            .map_err(|e| {
                AppError::ExternalApiError(format!(
                    "Model reply did not match the expected schema: {}",
                    e
                ))
            })?;

        if !(0.0..=1.0).contains(&result.risk_score) {
            return Err(AppError::ExternalApiError(format!(
                "Model returned risk score {} outside [0, 1]",
                result.risk_score
            )));
        }

        tracing::info!("Risk assessment complete: score {:.2}", result.risk_score);
        Ok(result)
    }
}

/// Builds the fixed natural-language prompt from the five input fields.
///
/// The template instructs the model to reply with a JSON object carrying
/// `riskScore` and `riskAssessment`.
fn build_prompt(request: &InvoiceRiskRequest) -> String {
    format!(
        "You are an AI assistant specialized in assessing the financial risk of invoices \
         for small and medium enterprises (SMEs).\n\n\
         Based on the provided payer history, industry trends, invoice amount, due date \
         and issue date, generate a risk score between 0 and 1 (where 0 is lowest risk \
         and 1 is highest risk) and provide a detailed risk assessment.\n\n\
         Payer History: {}\n\
         Industry Trends: {}\n\
         Invoice Amount: {}\n\
         Invoice Due Date: {}\n\
         Invoice Issue Date: {}\n\n\
         Provide the risk score and assessment in the following JSON format:\n\
         {{\n\
           \"riskScore\": 0.5,\n\
           \"riskAssessment\": \"The invoice risk is moderate due to...\"\n\
         }}",
        request.payer_history,
        request.industry_trends,
        request.invoice_amount,
        request.invoice_due_date.format("%Y-%m-%d"),
        request.invoice_issue_date.format("%Y-%m-%d"),
    )
}

/// Strips a surrounding markdown code fence from a model reply.
///
/// Models routinely wrap JSON in ```json ... ``` even when asked not to.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag on the opening fence line, then the closing fence
    let body = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}
