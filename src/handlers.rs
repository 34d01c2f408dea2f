use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::repository::InvoiceRepository;
use crate::risk_client::RiskModelClient;
use crate::validation::validate_invoice_form;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Invoice store; in-memory by default, swappable for a real backend.
    pub repository: Arc<dyn InvoiceRepository>,
    /// Client for the external risk model.
    pub risk_client: RiskModelClient,
    /// Refresh signals for the dashboard and marketplace views.
    pub refresh_tx: broadcast::Sender<ViewRefresh>,
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "invoice-risk-api",
            "version": "0.1.0"
        })),
    )
}

/// POST /api/v1/invoices
///
/// The form action: validates the raw submission, invokes the risk model, and
/// on success records the invoice and notifies the display views. Always
/// answers with a [`SubmissionOutcome`] the UI renders as-is; the three
/// terminal outcomes map to 422 (validation), 502 (invocation), and 200.
pub async fn submit_invoice(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RawInvoiceForm>,
) -> (StatusCode, Json<SubmissionOutcome>) {
    tracing::info!("POST /invoices - payer: {:?}", form.payer_name);

    let validated = match validate_invoice_form(&form) {
        Ok(validated) => validated,
        Err(fields) => {
            tracing::debug!("Form validation failed: {} field(s)", fields.len());
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(SubmissionOutcome {
                    message: "Error: Invalid form data.".to_string(),
                    fields: Some(fields),
                    data: None,
                }),
            );
        }
    };

    let request = InvoiceRiskRequest {
        payer_history: validated.payer_history.clone(),
        industry_trends: validated.industry_trends.clone(),
        invoice_amount: validated.invoice_amount,
        invoice_due_date: validated.invoice_due_date,
        invoice_issue_date: validated.invoice_issue_date,
    };

    let risk = match state.risk_client.assess_invoice_risk(&request).await {
        Ok(risk) => risk,
        Err(e) => {
            // Operators see the cause; the caller only gets the generic message
            tracing::error!("Error assessing invoice risk: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(SubmissionOutcome {
                    message: "Error: Could not assess invoice risk. Please try again."
                        .to_string(),
                    fields: None,
                    data: None,
                }),
            );
        }
    };

    let id = Uuid::new_v4();
    let invoice = Invoice {
        id,
        invoice_number: format!("INV-{}", &id.simple().to_string()[..8].to_uppercase()),
        payer_name: validated.payer_name,
        payer_email: validated.payer_email,
        amount: validated.invoice_amount,
        issue_date: validated.invoice_issue_date,
        due_date: validated.invoice_due_date,
        status: InvoiceStatus::Pending,
        risk_score: Some(risk.risk_score),
        risk_assessment: Some(risk.risk_assessment.clone()),
    };
    state.repository.add(invoice);

    tracing::info!(
        "Invoice {} created with risk score {:.2}",
        id,
        risk.risk_score
    );

    // Nudge the display views; nobody listening is fine
    let _ = state.refresh_tx.send(ViewRefresh::Dashboard);
    let _ = state.refresh_tx.send(ViewRefresh::Marketplace);

    (
        StatusCode::OK,
        Json(SubmissionOutcome {
            message: "Success! Invoice created and risk assessed.".to_string(),
            fields: None,
            data: Some(RiskAssessmentData {
                risk_score: risk.risk_score,
                risk_assessment: risk.risk_assessment,
                invoice_id: id,
            }),
        }),
    )
}

/// GET /api/v1/invoices
///
/// Dashboard listing: every invoice plus the stat-card totals.
pub async fn list_invoices(State(state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    let invoices = state.repository.list();

    let total_outstanding = invoices
        .iter()
        .filter(|i| i.status != InvoiceStatus::Paid)
        .map(|i| i.amount)
        .sum();
    let count_with = |status: InvoiceStatus| invoices.iter().filter(|i| i.status == status).count();

    let summary = DashboardSummary {
        total_outstanding,
        pending_count: count_with(InvoiceStatus::Pending),
        funded_count: count_with(InvoiceStatus::Funded),
        paid_count: count_with(InvoiceStatus::Paid),
    };

    Json(DashboardResponse { summary, invoices })
}

/// GET /api/v1/invoices/{id}
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    tracing::info!("GET /invoices/{}", id);

    state
        .repository
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Invoice with id {} not found", id)))
}

/// GET /api/v1/marketplace
///
/// Marketplace listing: pending (fundable) invoices, risk annotations included
/// when present.
pub async fn marketplace(State(state): State<Arc<AppState>>) -> Json<MarketplaceResponse> {
    let invoices = state
        .repository
        .list()
        .into_iter()
        .filter(|i| i.status == InvoiceStatus::Pending)
        .collect();

    Json(MarketplaceResponse { invoices })
}
