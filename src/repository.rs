//! Invoice storage abstraction.
//!
//! Handlers depend on [`InvoiceRepository`] rather than any concrete store, so
//! a real database backend can be substituted without touching display logic.
//! The default backend keeps invoices in memory, seeded with sample data.

use crate::models::{Invoice, InvoiceStatus};
use chrono::NaiveDate;
use std::sync::RwLock;
use uuid::Uuid;

/// Read/list/append operations over the invoice store.
pub trait InvoiceRepository: Send + Sync {
    /// All invoices, oldest first.
    fn list(&self) -> Vec<Invoice>;
    /// Look up a single invoice by id.
    fn get(&self, id: Uuid) -> Option<Invoice>;
    /// Append a new invoice.
    fn add(&self, invoice: Invoice);
}

/// In-memory invoice store.
pub struct InMemoryInvoiceRepository {
    invoices: RwLock<Vec<Invoice>>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self {
            invoices: RwLock::new(Vec::new()),
        }
    }

    /// A store pre-populated with the demo invoices shown on the dashboard
    /// and marketplace before any upload happens.
    pub fn with_sample_data() -> Self {
        Self {
            invoices: RwLock::new(sample_invoices()),
        }
    }
}

impl Default for InMemoryInvoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceRepository for InMemoryInvoiceRepository {
    fn list(&self) -> Vec<Invoice> {
        self.invoices
            .read()
            .expect("invoice store lock poisoned")
            .clone()
    }

    fn get(&self, id: Uuid) -> Option<Invoice> {
        self.invoices
            .read()
            .expect("invoice store lock poisoned")
            .iter()
            .find(|i| i.id == id)
            .cloned()
    }

    fn add(&self, invoice: Invoice) {
        self.invoices
            .write()
            .expect("invoice store lock poisoned")
            .push(invoice);
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    // Literals below are all valid calendar dates
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Static demo dataset matching the seeded UI views.
fn sample_invoices() -> Vec<Invoice> {
    vec![
        Invoice {
            id: Uuid::new_v4(),
            invoice_number: "INV-001".to_string(),
            payer_name: "Innovate Inc.".to_string(),
            payer_email: "accounts@innovate.com".to_string(),
            amount: 5000.0,
            issue_date: date(2024, 5, 1),
            due_date: date(2024, 6, 1),
            status: InvoiceStatus::Paid,
            risk_score: Some(0.1),
            risk_assessment: Some(
                "Low risk. Payer has an excellent payment history.".to_string(),
            ),
        },
        Invoice {
            id: Uuid::new_v4(),
            invoice_number: "INV-002".to_string(),
            payer_name: "Apex Solutions".to_string(),
            payer_email: "finance@apexsolutions.com".to_string(),
            amount: 12500.0,
            issue_date: date(2024, 5, 15),
            due_date: date(2024, 7, 15),
            status: InvoiceStatus::Funded,
            risk_score: Some(0.35),
            risk_assessment: Some(
                "Moderate risk driven by longer payment terms in a stable industry."
                    .to_string(),
            ),
        },
        Invoice {
            id: Uuid::new_v4(),
            invoice_number: "INV-003".to_string(),
            payer_name: "Quantum Logistics".to_string(),
            payer_email: "ap@quantumlogistics.com".to_string(),
            amount: 8200.0,
            issue_date: date(2024, 6, 1),
            due_date: date(2024, 6, 30),
            status: InvoiceStatus::Pending,
            risk_score: Some(0.25),
            risk_assessment: Some(
                "Low-to-moderate risk. Reliable payer, slight seasonal exposure."
                    .to_string(),
            ),
        },
        Invoice {
            id: Uuid::new_v4(),
            invoice_number: "INV-004".to_string(),
            payer_name: "Stellar Goods".to_string(),
            payer_email: "billing@stellargoods.com".to_string(),
            amount: 3100.0,
            issue_date: date(2024, 6, 10),
            due_date: date(2024, 8, 10),
            status: InvoiceStatus::Pending,
            risk_score: Some(0.6),
            risk_assessment: Some(
                "Elevated risk. Two late payments in the last year and softening retail demand."
                    .to_string(),
            ),
        },
        Invoice {
            id: Uuid::new_v4(),
            invoice_number: "INV-005".to_string(),
            payer_name: "Momentum Media".to_string(),
            payer_email: "payables@momentummedia.com".to_string(),
            amount: 9750.0,
            issue_date: date(2024, 6, 20),
            due_date: date(2024, 7, 20),
            status: InvoiceStatus::Pending,
            risk_score: None,
            risk_assessment: None,
        },
    ]
}
