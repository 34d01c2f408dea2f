/// Integration tests with a mocked model endpoint
/// Tests the complete submission workflow without hitting the real model API
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use invoice_risk_api::config::Config;
use invoice_risk_api::handlers::{self, AppState};
use invoice_risk_api::models::{InvoiceRiskRequest, InvoiceStatus, RawInvoiceForm, ViewRefresh};
use invoice_risk_api::repository::{InMemoryInvoiceRepository, InvoiceRepository};
use invoice_risk_api::risk_client::RiskModelClient;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";

/// Helper function to create test config
fn create_test_config(model_api_base_url: String) -> Config {
    Config {
        port: 8080,
        model_api_base_url,
        model_api_key: "test_key".to_string(),
        model_name: MODEL.to_string(),
    }
}

/// Wraps reply text in the generateContent response envelope
fn model_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": text }]
            }
        }]
    })
}

fn generate_content_path() -> String {
    format!("/v1beta/models/{}:generateContent", MODEL)
}

fn sample_request() -> InvoiceRiskRequest {
    InvoiceRiskRequest {
        payer_history: "Pays consistently within 30 days.".to_string(),
        industry_trends: "Stable demand across the sector.".to_string(),
        invoice_amount: 1500.0,
        invoice_due_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        invoice_issue_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    }
}

fn valid_form() -> RawInvoiceForm {
    RawInvoiceForm {
        payer_name: "Acme Corp".to_string(),
        payer_email: "ap@acme.com".to_string(),
        invoice_amount: "1500.00".to_string(),
        invoice_issue_date: "2024-05-01".to_string(),
        invoice_due_date: "2024-06-01".to_string(),
        payer_history: "Pays consistently within 30 days.".to_string(),
        industry_trends: "Stable demand across the sector.".to_string(),
    }
}

/// Builds shared state wired to the given mock server, returning the refresh
/// receiver so tests can assert the view signals.
fn test_state(mock_uri: String) -> (Arc<AppState>, broadcast::Receiver<ViewRefresh>) {
    let config = create_test_config(mock_uri);
    let risk_client = RiskModelClient::from_config(&config).unwrap();
    let (refresh_tx, refresh_rx) = broadcast::channel(16);
    let state = Arc::new(AppState {
        config,
        repository: Arc::new(InMemoryInvoiceRepository::new()),
        risk_client,
        refresh_tx,
    });
    (state, refresh_rx)
}

// ============ Risk model client ============

#[tokio::test]
async fn test_model_reply_parses_into_risk_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .and(query_param("key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            r#"{"riskScore": 0.42, "riskAssessment": "Moderate risk due to longer payment terms."}"#,
        )))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let client = RiskModelClient::from_config(&config).unwrap();
    let result = client.assess_invoice_risk(&sample_request()).await.unwrap();

    assert_eq!(result.risk_score, 0.42);
    assert!(result.risk_assessment.contains("Moderate risk"));
}

#[tokio::test]
async fn test_fenced_model_reply_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            "```json\n{\"riskScore\": 0.9, \"riskAssessment\": \"High risk.\"}\n```",
        )))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let client = RiskModelClient::from_config(&config).unwrap();
    let result = client.assess_invoice_risk(&sample_request()).await.unwrap();

    assert_eq!(result.risk_score, 0.9);
}

#[tokio::test]
async fn test_reply_missing_risk_score_is_invocation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            r#"{"riskAssessment": "Looks fine to me."}"#,
        )))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let client = RiskModelClient::from_config(&config).unwrap();
    let result = client.assess_invoice_risk(&sample_request()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_out_of_range_score_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            r#"{"riskScore": 1.7, "riskAssessment": "Confused model."}"#,
        )))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let client = RiskModelClient::from_config(&config).unwrap();
    let result = client.assess_invoice_risk(&sample_request()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_model_api_error_propagates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let client = RiskModelClient::from_config(&config).unwrap();
    let result = client.assess_invoice_risk(&sample_request()).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_empty_candidates_is_invocation_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let client = RiskModelClient::from_config(&config).unwrap();
    let result = client.assess_invoice_risk(&sample_request()).await;

    assert!(result.is_err());
}

// ============ Form action handler ============

#[tokio::test]
async fn test_submit_success_records_invoice_and_signals_views() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            r#"{"riskScore": 0.42, "riskAssessment": "Moderate risk due to longer payment terms."}"#,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (state, mut refresh_rx) = test_state(mock_server.uri());
    let (status, Json(outcome)) =
        handlers::submit_invoice(State(state.clone()), Json(valid_form())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome.message, "Success! Invoice created and risk assessed.");
    let data = outcome.data.expect("success outcome carries data");
    assert_eq!(data.risk_score, 0.42);

    // The invoice landed in the repository as a pending, risk-annotated claim
    let invoices = state.repository.list();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].id, data.invoice_id);
    assert_eq!(invoices[0].status, InvoiceStatus::Pending);
    assert_eq!(invoices[0].risk_score, Some(0.42));
    assert_eq!(invoices[0].payer_name, "Acme Corp");

    // Both display views were nudged
    assert_eq!(refresh_rx.try_recv().unwrap(), ViewRefresh::Dashboard);
    assert_eq!(refresh_rx.try_recv().unwrap(), ViewRefresh::Marketplace);
}

#[tokio::test]
async fn test_submit_invalid_form_skips_model_call() {
    let mock_server = MockServer::start().await;

    // The model must never be invoked for an invalid submission
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply("{}")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (state, mut refresh_rx) = test_state(mock_server.uri());
    let mut form = valid_form();
    form.payer_email = "not-an-email".to_string();
    form.invoice_amount = "-5".to_string();

    let (status, Json(outcome)) = handlers::submit_invoice(State(state.clone()), Json(form)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(outcome.message, "Error: Invalid form data.");
    let fields = outcome.fields.expect("validation outcome carries fields");
    assert!(fields.contains_key("payerEmail"));
    assert!(fields.contains_key("invoiceAmount"));
    assert!(outcome.data.is_none());

    // Nothing was committed and no refresh fired
    assert!(state.repository.list().is_empty());
    assert!(refresh_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_submit_model_failure_returns_generic_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            r#"{"riskAssessment": "score went missing"}"#,
        )))
        .mount(&mock_server)
        .await;

    let (state, mut refresh_rx) = test_state(mock_server.uri());
    let (status, Json(outcome)) =
        handlers::submit_invoice(State(state.clone()), Json(valid_form())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        outcome.message,
        "Error: Could not assess invoice risk. Please try again."
    );
    assert!(outcome.fields.is_none());
    assert!(outcome.data.is_none());
    assert!(state.repository.list().is_empty());
    assert!(refresh_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_identical_submissions_invoke_model_twice() {
    let mock_server = MockServer::start().await;

    // No deduplication: same input, two independent round trips
    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            r#"{"riskScore": 0.42, "riskAssessment": "Moderate risk."}"#,
        )))
        .expect(2)
        .mount(&mock_server)
        .await;

    let (state, _refresh_rx) = test_state(mock_server.uri());
    let (first_status, Json(first)) =
        handlers::submit_invoice(State(state.clone()), Json(valid_form())).await;
    let (second_status, Json(second)) =
        handlers::submit_invoice(State(state.clone()), Json(valid_form())).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);

    let invoices = state.repository.list();
    assert_eq!(invoices.len(), 2);
    assert_ne!(
        first.data.unwrap().invoice_id,
        second.data.unwrap().invoice_id
    );
}

// ============ Display views ============

#[tokio::test]
async fn test_dashboard_summary_totals() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(mock_server.uri());
    let state = Arc::new(AppState {
        risk_client: RiskModelClient::from_config(&config).unwrap(),
        config,
        repository: Arc::new(InMemoryInvoiceRepository::with_sample_data()),
        refresh_tx: broadcast::channel(16).0,
    });

    let Json(dashboard) = handlers::list_invoices(State(state.clone())).await;

    assert_eq!(dashboard.invoices.len(), 5);
    assert_eq!(dashboard.summary.pending_count, 3);
    assert_eq!(dashboard.summary.funded_count, 1);
    assert_eq!(dashboard.summary.paid_count, 1);

    // Outstanding excludes the paid invoice
    let expected: f64 = dashboard
        .invoices
        .iter()
        .filter(|i| i.status != InvoiceStatus::Paid)
        .map(|i| i.amount)
        .sum();
    assert_eq!(dashboard.summary.total_outstanding, expected);
}

#[tokio::test]
async fn test_marketplace_lists_only_pending() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(mock_server.uri());
    let state = Arc::new(AppState {
        risk_client: RiskModelClient::from_config(&config).unwrap(),
        config,
        repository: Arc::new(InMemoryInvoiceRepository::with_sample_data()),
        refresh_tx: broadcast::channel(16).0,
    });

    let Json(marketplace) = handlers::marketplace(State(state)).await;

    assert_eq!(marketplace.invoices.len(), 3);
    assert!(marketplace
        .invoices
        .iter()
        .all(|i| i.status == InvoiceStatus::Pending));
}

#[tokio::test]
async fn test_get_invoice_by_id() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(mock_server.uri());
    let repository = Arc::new(InMemoryInvoiceRepository::with_sample_data());
    let known_id = repository.list()[0].id;
    let state = Arc::new(AppState {
        risk_client: RiskModelClient::from_config(&config).unwrap(),
        config,
        repository,
        refresh_tx: broadcast::channel(16).0,
    });

    let found = handlers::get_invoice(State(state.clone()), Path(known_id)).await;
    assert!(found.is_ok());
    assert_eq!(found.unwrap().0.id, known_id);

    let missing = handlers::get_invoice(State(state), Path(Uuid::new_v4())).await;
    assert!(missing.is_err());
}
