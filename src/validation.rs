//! Schema validation for raw invoice form submissions.
//!
//! Mirrors the upload form contract: every field arrives as a string, and the
//! validator either coerces the lot into a [`ValidatedInvoiceForm`] or reports
//! the first violated rule per field. Validation never fails the request
//! pipeline; callers inspect the result shape.

use crate::models::{RawInvoiceForm, ValidatedInvoiceForm};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;

/// Minimum length for the payer name.
const PAYER_NAME_MIN_LEN: usize = 2;
/// Minimum length for the free-text context fields (payer history, trends).
const CONTEXT_MIN_LEN: usize = 10;

/// Validate email address format.
///
/// RFC 5322 simplified: local part, `@`, dotted domain. The domain must carry
/// at least one dot so bare hostnames (`user@localhost`) are rejected, which
/// matches what the upload form promises its users.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    // RFC 5322 simplified email regex
    // Matches: local@domain.tld
    let Ok(email_regex) = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    ) else {
        return false;
    };

    email_regex.is_match(email)
}

/// Parse a form date field submitted as `YYYY-MM-DD`.
pub fn parse_form_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Coerce the amount field to a positive number.
///
/// Returns `None` for anything that is not a finite, strictly positive number.
pub fn parse_positive_amount(raw: &str) -> Option<f64> {
    let amount: f64 = raw.trim().parse().ok()?;
    if amount.is_finite() && amount > 0.0 {
        Some(amount)
    } else {
        None
    }
}

/// Validate and coerce a raw form submission.
///
/// On failure returns a map from wire field name to the first violated rule's
/// message; every failing field is reported in one pass so the form can show
/// all of them at once.
pub fn validate_invoice_form(
    raw: &RawInvoiceForm,
) -> Result<ValidatedInvoiceForm, BTreeMap<String, String>> {
    let mut errors = BTreeMap::new();

    if raw.payer_name.chars().count() < PAYER_NAME_MIN_LEN {
        errors.insert(
            "payerName".to_string(),
            format!(
                "Payer name must be at least {} characters.",
                PAYER_NAME_MIN_LEN
            ),
        );
    }

    if !is_valid_email(&raw.payer_email) {
        errors.insert(
            "payerEmail".to_string(),
            "Invalid email address.".to_string(),
        );
    }

    let amount = parse_positive_amount(&raw.invoice_amount);
    if amount.is_none() {
        errors.insert(
            "invoiceAmount".to_string(),
            "Amount must be a positive number.".to_string(),
        );
    }

    let issue_date = parse_form_date(&raw.invoice_issue_date);
    if issue_date.is_none() {
        errors.insert(
            "invoiceIssueDate".to_string(),
            "Must be a valid date (YYYY-MM-DD).".to_string(),
        );
    }

    let due_date = parse_form_date(&raw.invoice_due_date);
    if due_date.is_none() {
        errors.insert(
            "invoiceDueDate".to_string(),
            "Must be a valid date (YYYY-MM-DD).".to_string(),
        );
    }

    if raw.payer_history.chars().count() < CONTEXT_MIN_LEN {
        errors.insert(
            "payerHistory".to_string(),
            format!(
                "Payer history must be at least {} characters.",
                CONTEXT_MIN_LEN
            ),
        );
    }

    if raw.industry_trends.chars().count() < CONTEXT_MIN_LEN {
        errors.insert(
            "industryTrends".to_string(),
            format!(
                "Industry trends must be at least {} characters.",
                CONTEXT_MIN_LEN
            ),
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // A `None` above always lands in `errors`, so the fallbacks are unreachable
    Ok(ValidatedInvoiceForm {
        payer_name: raw.payer_name.clone(),
        payer_email: raw.payer_email.clone(),
        invoice_amount: amount.unwrap_or_default(),
        invoice_issue_date: issue_date.unwrap_or_default(),
        invoice_due_date: due_date.unwrap_or_default(),
        payer_history: raw.payer_history.clone(),
        industry_trends: raw.industry_trends.clone(),
    })
}
