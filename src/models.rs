use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============ Invoice Entities ============

/// Lifecycle status of an invoice on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// Uploaded and awaiting funding; listed on the marketplace.
    Pending,
    /// Purchased by a funder.
    Funded,
    /// Settled by the payer.
    Paid,
}

/// A billable claim with payer, amount, and due date, optionally annotated
/// with risk data produced by the assessment flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Unique identifier for the invoice.
    pub id: Uuid,
    /// Human-readable invoice number (e.g. "INV-0042").
    pub invoice_number: String,
    /// Name of the party responsible for payment.
    pub payer_name: String,
    /// Contact email of the payer.
    pub payer_email: String,
    /// Total invoice amount.
    pub amount: f64,
    /// Date the invoice was issued.
    pub issue_date: NaiveDate,
    /// Date payment is due.
    pub due_date: NaiveDate,
    /// Current lifecycle status.
    pub status: InvoiceStatus,
    /// Model-produced risk score in [0, 1], when assessed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    /// Free-text rationale accompanying the risk score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<String>,
}

// ============ Risk Assessment Contract ============

/// Validated input sent to the external risk model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRiskRequest {
    /// Detailed payment history of the invoice payer.
    pub payer_history: String,
    /// Current financial trends in the payer's industry.
    pub industry_trends: String,
    /// The total amount of the invoice.
    pub invoice_amount: f64,
    /// The due date of the invoice.
    pub invoice_due_date: NaiveDate,
    /// The issue date of the invoice.
    pub invoice_issue_date: NaiveDate,
}

/// Structured reply expected from the risk model.
///
/// The model is untrusted input: both fields are required, and the score is
/// range-checked at the boundary before this ever reaches a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRiskResult {
    /// Risk score between 0 and 1, where 0 is lowest risk and 1 is highest.
    pub risk_score: f64,
    /// Detailed assessment of the invoice risk.
    pub risk_assessment: String,
}

// ============ Form Submission ============

/// Raw invoice submission as it arrives from the upload form.
///
/// Every field is an untyped string; missing fields default to empty and fall
/// out naturally in validation. Coercion to dates and numbers happens in the
/// `validation` module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInvoiceForm {
    #[serde(default)]
    pub payer_name: String,
    #[serde(default)]
    pub payer_email: String,
    #[serde(default)]
    pub invoice_amount: String,
    #[serde(default)]
    pub invoice_issue_date: String,
    #[serde(default)]
    pub invoice_due_date: String,
    #[serde(default)]
    pub payer_history: String,
    #[serde(default)]
    pub industry_trends: String,
}

/// Fully typed invoice submission after validation.
#[derive(Debug, Clone)]
pub struct ValidatedInvoiceForm {
    pub payer_name: String,
    pub payer_email: String,
    pub invoice_amount: f64,
    pub invoice_issue_date: NaiveDate,
    pub invoice_due_date: NaiveDate,
    pub payer_history: String,
    pub industry_trends: String,
}

/// Discriminated outcome of one form submission, rendered by the UI as-is.
///
/// Exactly one of three shapes is produced: validation failure (`fields`
/// populated), invocation failure (message only), or success (`data`
/// populated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// Human-readable status line.
    pub message: String,
    /// Field name -> first violated rule's message, on validation failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
    /// Risk payload, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RiskAssessmentData>,
}

/// Success payload carried back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentData {
    pub risk_score: f64,
    pub risk_assessment: String,
    /// Id of the invoice recorded for this submission.
    pub invoice_id: Uuid,
}

// ============ Display Views ============

/// Aggregate figures for the dashboard stat cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Sum of amounts for invoices not yet paid.
    pub total_outstanding: f64,
    pub pending_count: usize,
    pub funded_count: usize,
    pub paid_count: usize,
}

/// Dashboard listing: every invoice plus summary totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub summary: DashboardSummary,
    pub invoices: Vec<Invoice>,
}

/// Marketplace listing: fundable (pending) invoices only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceResponse {
    pub invoices: Vec<Invoice>,
}

/// Refresh signal broadcast to display views after a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRefresh {
    Dashboard,
    Marketplace,
}
