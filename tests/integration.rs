//! Integration tests for the bookkeeping engine HTTP API.
//!
//! This test suite drives the router end to end:
//! - Employee registration and time recording
//! - Payroll previews, runs, recalculation and payment
//! - Invoice totaling and the invoice lifecycle
//! - Expenses and financial summaries
//! - Error cases and status codes

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use bookkeeping_engine::api::{AppState, create_router};
use bookkeeping_engine::config::ConfigLoader;
use bookkeeping_engine::models::{PayPeriod, PayrollRecord};

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    Decimal::from_str(s).unwrap().normalize().to_string()
}

fn assert_decimal(value: &Value, expected: &str) {
    let actual = value
        .as_str()
        .unwrap_or_else(|| panic!("expected a decimal string, got {}", value));
    assert_eq!(
        normalize_decimal(actual),
        normalize_decimal(expected),
        "expected {}, got {}",
        expected,
        actual
    );
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn post_empty(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn put(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

fn create_hourly_employee(id: &str, rate: &str) -> Value {
    json!({
        "id": id,
        "name": "Dana Whitfield",
        "position": "Bookkeeper",
        "compensation": { "mode": "hourly", "rate": rate },
        "hire_date": "2024-03-01"
    })
}

fn create_time_entry(id: &str, employee_id: &str, date: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "employee_id": employee_id,
        "date": date,
        "start_time": start,
        "end_time": end
    })
}

/// Five 9-hour days, Monday 2026-01-05 to Friday 2026-01-09.
fn create_45_hour_week(employee_id: &str) -> Vec<Value> {
    (5..=9)
        .map(|day| {
            create_time_entry(
                &format!("te_{}_{}", employee_id, day),
                employee_id,
                &format!("2026-01-{:02}", day),
                "08:00:00",
                "17:00:00",
            )
        })
        .collect()
}

fn biweekly_period() -> Value {
    json!({ "start_date": "2026-01-05", "end_date": "2026-01-18" })
}

async fn register_with_week(router: &Router, employee_id: &str) {
    let (status, _) = post(router, "/employees", create_hourly_employee(employee_id, "20.00")).await;
    assert_eq!(status, StatusCode::CREATED);
    for entry in create_45_hour_week(employee_id) {
        let (status, body) = post(router, "/time-entries", entry).await;
        assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", body);
    }
}

fn create_invoice_body(items: Value) -> Value {
    json!({
        "invoice_number": "INV-2026-001",
        "client_name": "Harbor Dental",
        "client_email": "accounts@harbordental.example",
        "issue_date": "2026-01-10",
        "due_date": "2026-02-09",
        "items": items
    })
}

fn two_good_items() -> Value {
    json!([
        { "description": "Bookkeeping, January", "quantity": "4", "unit_price": "75.00" },
        { "description": "Payroll setup", "quantity": "1", "unit_price": "150.00" }
    ])
}

// =============================================================================
// Payroll
// =============================================================================

#[tokio::test]
async fn test_preview_45_hours_splits_overtime() {
    let router = create_router_for_test();

    let body = json!({
        "employee": create_hourly_employee("emp_001", "20.00"),
        "pay_period": biweekly_period(),
        "time_entries": create_45_hour_week("emp_001")
    });
    let (status, record) = post(&router, "/payroll/calculate", body).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", record);
    assert_decimal(&record["regular_hours"], "40");
    assert_decimal(&record["overtime_hours"], "5");
    assert_decimal(&record["regular_pay"], "800.00");
    assert_decimal(&record["overtime_pay"], "150.00");
    assert_decimal(&record["gross_pay"], "950.00");
    assert_eq!(record["status"], "pending");
    assert_eq!(record["entry_ids"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_preview_applies_configured_deductions_in_order() {
    let router = create_router_for_test();

    let body = json!({
        "employee": create_hourly_employee("emp_001", "20.00"),
        "pay_period": biweekly_period(),
        "time_entries": create_45_hour_week("emp_001")
    });
    let (_, record) = post(&router, "/payroll/calculate", body).await;

    let deductions = record["deductions"].as_array().unwrap();
    let names: Vec<&str> = deductions
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "federal_income_tax",
            "state_income_tax",
            "social_security",
            "medicare"
        ]
    );
    assert_decimal(&deductions[0]["amount"], "142.50");
    assert_decimal(&deductions[1]["amount"], "47.50");
    assert_decimal(&deductions[2]["amount"], "58.90");
    assert_decimal(&deductions[3]["amount"], "13.78");
    assert_decimal(&record["total_deductions"], "262.68");
    assert_decimal(&record["net_pay"], "687.32");
}

#[tokio::test]
async fn test_preview_is_idempotent() {
    let router = create_router_for_test();

    let body = json!({
        "employee": create_hourly_employee("emp_001", "20.00"),
        "pay_period": biweekly_period(),
        "time_entries": create_45_hour_week("emp_001")
    });
    let (_, first) = post(&router, "/payroll/calculate", body.clone()).await;
    let (_, second) = post(&router, "/payroll/calculate", body).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_preview_salaried_biweekly() {
    let router = create_router_for_test();

    let body = json!({
        "employee": {
            "id": "emp_010",
            "name": "Morgan Ellis",
            "compensation": { "mode": "salaried", "annual_salary": "52000.00" },
            "hire_date": "2023-07-01"
        },
        "pay_period": biweekly_period(),
        "time_entries": []
    });
    let (status, record) = post(&router, "/payroll/calculate", body).await;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", record);
    assert_eq!(record["compensation_mode"], "salaried");
    assert_decimal(&record["gross_pay"], "2000.00");
    assert_decimal(&record["overtime_pay"], "0");
}

#[tokio::test]
async fn test_preview_overlapping_entries_rejected() {
    let router = create_router_for_test();

    let body = json!({
        "employee": create_hourly_employee("emp_001", "20.00"),
        "pay_period": biweekly_period(),
        "time_entries": [
            create_time_entry("te_a", "emp_001", "2026-01-05", "09:00:00", "13:00:00"),
            create_time_entry("te_b", "emp_001", "2026-01-05", "12:00:00", "17:00:00")
        ]
    });
    let (status, error) = post(&router, "/payroll/calculate", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "OVERLAPPING_TIME_ENTRIES");
    assert_eq!(error["kind"], "validation_error");
}

#[tokio::test]
async fn test_run_payroll_from_ledger() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;

    let (status, record) = post(
        &router,
        "/payroll/runs",
        json!({ "employee_id": "emp_001", "pay_period": biweekly_period() }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", record);
    assert_decimal(&record["gross_pay"], "950.00");

    let id = record["id"].as_str().unwrap();
    let (status, fetched) = get(&router, &format!("/payroll/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, record);
}

#[tokio::test]
async fn test_duplicate_run_returns_409() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;

    let body = json!({ "employee_id": "emp_001", "pay_period": biweekly_period() });
    let (first, _) = post(&router, "/payroll/runs", body.clone()).await;
    let (second, error) = post(&router, "/payroll/runs", body).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(error["code"], "DUPLICATE_PAYROLL_RUN");
    assert_eq!(error["kind"], "conflict_error");
}

#[tokio::test]
async fn test_concurrent_runs_store_one_record() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;

    let body = json!({ "employee_id": "emp_001", "pay_period": biweekly_period() });
    let ((a, _), (b, _)) = tokio::join!(
        post(&router, "/payroll/runs", body.clone()),
        post(&router, "/payroll/runs", body.clone())
    );

    let mut statuses = vec![a, b];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_overlapping_period_returns_409() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;

    let (status, _) = post(
        &router,
        "/payroll/runs",
        json!({ "employee_id": "emp_001", "pay_period": biweekly_period() }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = post(
        &router,
        "/payroll/runs",
        json!({
            "employee_id": "emp_001",
            "pay_period": { "start_date": "2026-01-12", "end_date": "2026-01-25" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "OVERLAPPING_PAY_PERIOD");
}

#[tokio::test]
async fn test_inactive_employee_run_stores_nothing() {
    let router = create_router_for_test();

    let mut employee = create_hourly_employee("emp_002", "20.00");
    employee["status"] = json!("inactive");
    let (status, _) = post(&router, "/employees", employee).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = post(
        &router,
        "/payroll/runs",
        json!({ "employee_id": "emp_002", "pay_period": biweekly_period() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_EMPLOYEE");

    let period = PayPeriod::new(
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        NaiveDate::from_ymd_opt(2026, 1, 18).unwrap(),
    )
    .unwrap();
    let id = PayrollRecord::record_id_for("emp_002", &period);
    let (status, _) = get(&router, &format!("/payroll/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recalculate_picks_up_new_entries_until_paid() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;

    let (_, record) = post(
        &router,
        "/payroll/runs",
        json!({ "employee_id": "emp_001", "pay_period": biweekly_period() }),
    )
    .await;
    let id = record["id"].as_str().unwrap().to_string();

    // Four more hours in week two, all regular
    let (status, _) = post(
        &router,
        "/time-entries",
        create_time_entry("te_extra", "emp_001", "2026-01-12", "09:00:00", "13:00:00"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let body = json!({
        "employee_id": "emp_001",
        "pay_period": biweekly_period(),
        "recalculate": true
    });
    let (status, recalculated) = post(&router, "/payroll/runs", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recalculated["id"].as_str().unwrap(), id);
    assert_decimal(&recalculated["gross_pay"], "1030.00");

    let (status, paid) = post_empty(&router, &format!("/payroll/{}/pay", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");

    let (status, error) = post(&router, "/payroll/runs", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "PAYROLL_RECORD_IMMUTABLE");

    let (status, _) = post_empty(&router, &format!("/payroll/{}/pay", id)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_paid_entries_cannot_be_deleted() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;

    let (_, record) = post(
        &router,
        "/payroll/runs",
        json!({ "employee_id": "emp_001", "pay_period": biweekly_period() }),
    )
    .await;
    let request = |uri: String| {
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    };

    // Pending records do not freeze their entries
    let (status, removed) = send(&router, request("/time-entries/te_emp_001_9".to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["id"], "te_emp_001_9");

    let id = record["id"].as_str().unwrap();
    post_empty(&router, &format!("/payroll/{}/pay", id)).await;

    let (status, error) = send(&router, request("/time-entries/te_emp_001_8".to_string())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "PAYROLL_RECORD_IMMUTABLE");
}

#[tokio::test]
async fn test_batch_process_pays_every_active_employee() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;
    register_with_week(&router, "emp_002").await;
    post(&router, "/employees", create_hourly_employee("emp_003", "18.00")).await;
    let (status, _) = post(
        &router,
        "/employees",
        json!({
            "id": "emp_004",
            "name": "Omar Reyes",
            "compensation": { "mode": "salaried", "annual_salary": "52000" },
            "hire_date": "2021-09-15"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    register_with_week(&router, "emp_005").await;
    let (status, _) = put(&router, "/employees/emp_005", json!({ "status": "inactive" })).await;
    assert_eq!(status, StatusCode::OK);

    // emp_002 was already run for the period
    let (status, _) = post(
        &router,
        "/payroll/runs",
        json!({ "employee_id": "emp_002", "pay_period": biweekly_period() }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, batch) = post(
        &router,
        "/payroll/process",
        json!({ "pay_period": biweekly_period() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", batch);

    let created: Vec<&str> = batch["created"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["employee_id"].as_str().unwrap())
        .collect();
    assert_eq!(created, vec!["emp_001", "emp_004"]);
    assert_decimal(&batch["created"][0]["gross_pay"], "950.00");
    assert_decimal(&batch["created"][1]["gross_pay"], "2000.00");
    assert_eq!(batch["without_hours"], json!(["emp_003"]));
    assert_eq!(batch["failed"][0]["employee_id"], "emp_002");
    assert_eq!(batch["failed"][0]["error"]["code"], "DUPLICATE_PAYROLL_RUN");

    let (status, records) = get(&router, "/payroll").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records.as_array().unwrap().len(), 3);

    let (_, mine) = get(&router, "/payroll?employee_id=emp_001").await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["id"], batch["created"][0]["id"]);

    // A second batch stores nothing new
    let (_, again) = post(
        &router,
        "/payroll/process",
        json!({ "pay_period": biweekly_period() }),
    )
    .await;
    assert!(again["created"].as_array().unwrap().is_empty());
    assert_eq!(again["failed"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_deactivated_employee_payroll_run_rejected() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;

    let (status, employee) = put(&router, "/employees/emp_001", json!({ "status": "inactive" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(employee["status"], "inactive");

    let (status, error) = post(
        &router,
        "/payroll/runs",
        json!({ "employee_id": "emp_001", "pay_period": biweekly_period() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_EMPLOYEE");

    let (_, employees) = get(&router, "/employees?status=active").await;
    assert!(employees.as_array().unwrap().is_empty());
}

// =============================================================================
// Time entries
// =============================================================================

#[tokio::test]
async fn test_list_time_entries_by_employee() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;
    register_with_week(&router, "emp_002").await;

    let (status, all) = get(&router, "/time-entries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 10);

    let (_, mine) = get(&router, "/time-entries?employee_id=emp_001").await;
    let ids: Vec<&str> = mine
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "te_emp_001_5",
            "te_emp_001_6",
            "te_emp_001_7",
            "te_emp_001_8",
            "te_emp_001_9"
        ]
    );
}

#[tokio::test]
async fn test_overlapping_time_entry_returns_409() {
    let router = create_router_for_test();
    post(&router, "/employees", create_hourly_employee("emp_001", "20.00")).await;

    let (status, _) = post(
        &router,
        "/time-entries",
        create_time_entry("te_1", "emp_001", "2026-01-05", "09:00:00", "17:00:00"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, error) = post(
        &router,
        "/time-entries",
        create_time_entry("te_2", "emp_001", "2026-01-05", "16:00:00", "18:00:00"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "TIME_ENTRY_CONFLICT");
}

#[tokio::test]
async fn test_time_entry_for_unknown_employee_returns_404() {
    let router = create_router_for_test();

    let (status, error) = post(
        &router,
        "/time-entries",
        create_time_entry("te_1", "emp_404", "2026-01-05", "09:00:00", "17:00:00"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["kind"], "not_found_error");
}

#[tokio::test]
async fn test_time_entry_ending_before_start_rejected() {
    let router = create_router_for_test();
    post(&router, "/employees", create_hourly_employee("emp_001", "20.00")).await;

    let (status, error) = post(
        &router,
        "/time-entries",
        create_time_entry("te_1", "emp_001", "2026-01-05", "17:00:00", "09:00:00"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_TIME_ENTRY");
}

#[tokio::test]
async fn test_time_entry_with_seconds_rejected() {
    let router = create_router_for_test();
    post(&router, "/employees", create_hourly_employee("emp_001", "20.00")).await;

    let (status, error) = post(
        &router,
        "/time-entries",
        create_time_entry("te_1", "emp_001", "2026-01-05", "09:00:00", "09:00:59"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_TIME_ENTRY");

    let body = json!({
        "employee": create_hourly_employee("emp_001", "20.00"),
        "pay_period": biweekly_period(),
        "time_entries": [
            create_time_entry("te_2", "emp_001", "2026-01-05", "09:00:30", "17:00:00")
        ]
    });
    let (status, error) = post(&router, "/payroll/calculate", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_TIME_ENTRY");
}

// =============================================================================
// Employees
// =============================================================================

#[tokio::test]
async fn test_register_and_fetch_employee() {
    let router = create_router_for_test();

    let (status, created) =
        post(&router, "/employees", create_hourly_employee("emp_001", "20.00")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "active");

    let (status, fetched) = get(&router, "/employees/emp_001").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, error) =
        post(&router, "/employees", create_hourly_employee("emp_001", "22.00")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "DUPLICATE_RECORD");
}

#[tokio::test]
async fn test_zero_rate_employee_rejected() {
    let router = create_router_for_test();

    let (status, error) =
        post(&router, "/employees", create_hourly_employee("emp_001", "0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_EMPLOYEE");

    let (status, _) = get(&router, "/employees/emp_001").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Invoices
// =============================================================================

#[tokio::test]
async fn test_totals_drop_invalid_items() {
    let router = create_router_for_test();

    let (status, totals) = post(
        &router,
        "/invoices/totals",
        json!({ "items": [
            { "description": "A", "quantity": "2", "unit_price": "10.00" },
            { "description": "", "quantity": "1", "unit_price": "5.00" }
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_decimal(&totals["total_amount"], "20.00");
    assert_eq!(totals["items"].as_array().unwrap().len(), 1);
    let rejected = totals["rejected"].as_array().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["index"], 1);
    assert_eq!(rejected[0]["reason"], "description must not be empty");
}

#[tokio::test]
async fn test_totals_with_no_valid_items_returns_400() {
    let router = create_router_for_test();

    let (status, error) = post(
        &router,
        "/invoices/totals",
        json!({ "items": [
            { "description": "", "quantity": "1", "unit_price": "5.00" },
            { "description": "Hours", "quantity": "0", "unit_price": "5.00" }
        ]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "NO_VALID_LINE_ITEMS");
    assert!(error["details"].as_str().unwrap().contains("quantity"));
}

#[tokio::test]
async fn test_invoice_lifecycle() {
    let router = create_router_for_test();

    let (status, invoice) = post(&router, "/invoices", create_invoice_body(two_good_items())).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", invoice);
    assert_eq!(invoice["status"], "draft");
    assert_decimal(&invoice["total_amount"], "450.00");
    assert_decimal(&invoice["balance_due"], "450.00");
    assert!(invoice.get("rejected_items").is_none());

    let id = invoice["id"].as_str().unwrap().to_string();

    let (status, sent) = post_empty(&router, &format!("/invoices/{}/send", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["status"], "sent");

    let (status, partial) = post(
        &router,
        &format!("/invoices/{}/payments", id),
        json!({ "amount": "200.00", "payment_date": "2026-01-20", "method": "ach" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(partial["status"], "sent");
    assert_decimal(&partial["amount_paid"], "200.00");
    assert_decimal(&partial["balance_due"], "250.00");

    let (status, error) = post(
        &router,
        &format!("/invoices/{}/payments", id),
        json!({ "amount": "300.00", "payment_date": "2026-01-25" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "overpayment: {}", error);

    let (status, paid) = post(
        &router,
        &format!("/invoices/{}/payments", id),
        json!({ "amount": "250.00", "payment_date": "2026-01-25" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "paid");
    assert_decimal(&paid["balance_due"], "0");

    let (status, error) = post_empty(&router, &format!("/invoices/{}/cancel", id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_STATUS_TRANSITION");

    let (status, fetched) = get(&router, &format!("/invoices/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["payments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invoice_with_invalid_item_needs_allow_filtered() {
    let router = create_router_for_test();
    let items = json!([
        { "description": "A", "quantity": "2", "unit_price": "10.00" },
        { "description": "", "quantity": "1", "unit_price": "5.00" }
    ]);

    let (status, error) = post(&router, "/invoices", create_invoice_body(items.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_LINE_ITEM");

    let mut body = create_invoice_body(items);
    body["allow_filtered"] = json!(true);
    let (status, invoice) = post(&router, "/invoices", body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_decimal(&invoice["total_amount"], "20.00");
    assert_eq!(invoice["items"].as_array().unwrap().len(), 1);
    assert_eq!(invoice["rejected_items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invoice_number_generated_when_omitted() {
    let router = create_router_for_test();
    let mut body = create_invoice_body(two_good_items());
    body.as_object_mut().unwrap().remove("invoice_number");

    let (status, invoice) = post(&router, "/invoices", body).await;
    assert_eq!(status, StatusCode::CREATED);

    let number = invoice["invoice_number"].as_str().unwrap();
    assert!(number.starts_with("INV-20260110-"), "got {}", number);
    assert_eq!(number.len(), "INV-20260110-".len() + 8);
}

#[tokio::test]
async fn test_overdue_only_after_due_date() {
    let router = create_router_for_test();

    let (_, invoice) = post(&router, "/invoices", create_invoice_body(two_good_items())).await;
    let id = invoice["id"].as_str().unwrap().to_string();
    post_empty(&router, &format!("/invoices/{}/send", id)).await;

    let (status, unchanged) = post(
        &router,
        &format!("/invoices/{}/overdue", id),
        json!({ "as_of": "2026-02-09" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["status"], "sent");

    let (status, overdue) = post(
        &router,
        &format!("/invoices/{}/overdue", id),
        json!({ "as_of": "2026-02-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overdue["status"], "overdue");
}

#[tokio::test]
async fn test_send_requires_due_after_issue() {
    let router = create_router_for_test();
    let mut body = create_invoice_body(two_good_items());
    body["due_date"] = json!("2026-01-01");

    let (status, invoice) = post(&router, "/invoices", body).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = invoice["id"].as_str().unwrap();
    let (status, _) = post_empty(&router, &format!("/invoices/{}/send", id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_edit_and_delete_draft_invoice() {
    let router = create_router_for_test();

    let (_, invoice) = post(&router, "/invoices", create_invoice_body(two_good_items())).await;
    let uri = format!("/invoices/{}", invoice["id"].as_str().unwrap());

    let (status, edited) = put(
        &router,
        &uri,
        json!({
            "client_name": "Harbor Dental Group",
            "items": [
                { "description": "Bookkeeping, February", "quantity": "2", "unit_price": "100.00" }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", edited);
    assert_eq!(edited["client_name"], "Harbor Dental Group");
    assert_eq!(edited["invoice_number"], "INV-2026-001");
    assert_decimal(&edited["total_amount"], "200.00");
    assert_eq!(edited["items"].as_array().unwrap().len(), 1);

    let mixed = json!({
        "items": [
            { "description": "Audit prep", "quantity": "1", "unit_price": "80.00" },
            { "description": "", "quantity": "1", "unit_price": "5.00" }
        ]
    });
    let (status, error) = put(&router, &uri, mixed.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_LINE_ITEM");
    let (_, unchanged) = get(&router, &uri).await;
    assert_decimal(&unchanged["total_amount"], "200.00");

    let mut filtered = mixed;
    filtered["allow_filtered"] = json!(true);
    let (status, edited) = put(&router, &uri, filtered).await;
    assert_eq!(status, StatusCode::OK);
    assert_decimal(&edited["total_amount"], "80.00");
    assert_eq!(edited["rejected_items"].as_array().unwrap().len(), 1);

    post_empty(&router, &format!("{}/send", uri)).await;
    let (status, error) = put(&router, &uri, json!({ "notes": "Net 45" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_INVOICE");

    let (status, _) = delete(&router, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    post_empty(&router, &format!("{}/cancel", uri)).await;
    let (status, deleted) = delete(&router, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["status"], "cancelled");

    let (status, _) = get(&router, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, invoices) = get(&router, "/invoices").await;
    assert!(invoices.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_invoices_by_status() {
    let router = create_router_for_test();

    let (_, first) = post(&router, "/invoices", create_invoice_body(two_good_items())).await;
    post(&router, "/invoices", create_invoice_body(two_good_items())).await;
    post_empty(
        &router,
        &format!("/invoices/{}/send", first["id"].as_str().unwrap()),
    )
    .await;

    let (status, all) = get(&router, "/invoices").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_decimal(&all[0]["balance_due"], "450.00");

    let (_, sent) = get(&router, "/invoices?status=sent").await;
    assert_eq!(sent.as_array().unwrap().len(), 1);
    assert_eq!(sent[0]["id"], first["id"]);
}

// =============================================================================
// Expenses and reports
// =============================================================================

#[tokio::test]
async fn test_list_expenses_by_category() {
    let router = create_router_for_test();

    for (id, category, amount) in [
        ("exp_001", "rent", "500.00"),
        ("exp_002", "software", "49.00"),
        ("exp_003", "rent", "500.00"),
    ] {
        let (status, _) = post(
            &router,
            "/expenses",
            json!({
                "id": id,
                "category": category,
                "amount": amount,
                "date": "2026-01-15",
                "description": "Monthly cost"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = get(&router, "/expenses").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (status, rent) = get(&router, "/expenses?category=rent").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = rent
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["exp_001", "exp_003"]);
}

#[tokio::test]
async fn test_invalid_expense_rejected() {
    let router = create_router_for_test();

    let (status, error) = post(
        &router,
        "/expenses",
        json!({
            "category": "office",
            "amount": "-5.00",
            "date": "2026-01-10",
            "description": "Refund?"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_EXPENSE");
}

#[tokio::test]
async fn test_growth_is_zero_without_prior_activity() {
    let router = create_router_for_test();

    let (status, _) = post(
        &router,
        "/expenses",
        json!({
            "id": "exp_001",
            "category": "rent",
            "amount": "500.00",
            "date": "2026-01-15",
            "description": "January rent",
            "vendor": "Oak Street Properties"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = get(
        &router,
        "/reports/summary?start_date=2026-01-01&end_date=2026-01-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", summary);
    assert_decimal(&summary["total_expenses"], "500.00");
    assert_decimal(&summary["expense_growth"], "0");
    assert_decimal(&summary["expenses_by_category"]["rent"], "500.00");
}

#[tokio::test]
async fn test_summary_rolls_up_all_books() {
    let router = create_router_for_test();
    register_with_week(&router, "emp_001").await;
    post(
        &router,
        "/payroll/runs",
        json!({ "employee_id": "emp_001", "pay_period": biweekly_period() }),
    )
    .await;

    // One paid invoice, one still outstanding
    let (_, paid) = post(&router, "/invoices", create_invoice_body(two_good_items())).await;
    let paid_id = paid["id"].as_str().unwrap().to_string();
    post_empty(&router, &format!("/invoices/{}/send", paid_id)).await;
    post(
        &router,
        &format!("/invoices/{}/payments", paid_id),
        json!({ "amount": "450.00", "payment_date": "2026-01-20" }),
    )
    .await;

    let mut open = create_invoice_body(json!([
        { "description": "Quarterly filing", "quantity": "1", "unit_price": "300.00" }
    ]));
    open["invoice_number"] = json!("INV-2026-002");
    let (_, open) = post(&router, "/invoices", open).await;
    post_empty(&router, &format!("/invoices/{}/send", open["id"].as_str().unwrap())).await;

    post(
        &router,
        "/expenses",
        json!({
            "category": "software",
            "amount": "90.00",
            "date": "2026-01-03",
            "description": "Accounting suite"
        }),
    )
    .await;

    let (status, summary) = get(
        &router,
        "/reports/summary?start_date=2026-01-01&end_date=2026-01-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", summary);

    assert_decimal(&summary["total_revenue"], "450.00");
    assert_decimal(&summary["total_expenses"], "90.00");
    assert_decimal(&summary["net_profit"], "360.00");
    assert_decimal(&summary["profit_margin"], "80.00");
    assert_decimal(&summary["payroll_expenses"], "950.00");
    assert_decimal(&summary["outstanding_amount"], "300.00");
    assert_eq!(summary["outstanding_count"], 1);
    assert_eq!(summary["invoices_by_status"]["paid"]["count"], 1);
    assert_eq!(summary["invoices_by_status"]["sent"]["count"], 1);
    assert_decimal(
        &summary["payroll_by_employee"]["emp_001"]["gross_pay"],
        "950.00",
    );

    let monthly = summary["monthly"].as_array().unwrap();
    assert_eq!(monthly.len(), 1);
    assert_eq!(monthly[0]["month"], "2026-01");

    // Same books, same bytes
    let (_, again) = get(
        &router,
        "/reports/summary?start_date=2026-01-01&end_date=2026-01-31",
    )
    .await;
    assert_eq!(again.to_string(), summary.to_string());
}

#[tokio::test]
async fn test_inverted_report_range_returns_400() {
    let router = create_router_for_test();

    let (status, error) = get(
        &router,
        "/reports/summary?start_date=2026-02-01&end_date=2026-01-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_DATE_RANGE");
}

#[tokio::test]
async fn test_oversized_report_range_returns_400() {
    let router = create_router_for_test();

    let (status, error) = get(
        &router,
        "/reports/summary?start_date=1990-01-01&end_date=2026-01-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_DATE_RANGE");

    let (status, _) = get(
        &router,
        "/reports/summary?start_date=-200000-01-01&end_date=%2B200000-01-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pay_period_at_calendar_edges_never_crashes() {
    let router = create_router_for_test();

    let body = json!({
        "employee": create_hourly_employee("emp_001", "20.00"),
        "pay_period": { "start_date": "2000-01-01", "end_date": "2026-01-01" },
        "time_entries": []
    });
    let (status, error) = post(&router, "/payroll/calculate", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "INVALID_PAY_PERIOD");

    let latest = NaiveDate::MAX;
    let start = latest.pred_opt().unwrap().pred_opt().unwrap();
    let body = json!({
        "employee": create_hourly_employee("emp_001", "20.00"),
        "pay_period": { "start_date": start, "end_date": latest },
        "time_entries": []
    });
    let (status, record) = post(&router, "/payroll/calculate", body).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", record);
    assert_decimal(&record["gross_pay"], "0");

    let earliest = NaiveDate::MIN;
    let body = json!({
        "employee": create_hourly_employee("emp_001", "20.00"),
        "pay_period": { "start_date": earliest, "end_date": earliest },
        "time_entries": []
    });
    let (status, _) = post(&router, "/payroll/calculate", body).await;
    assert!(status == StatusCode::OK || status == StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_payroll_record_returns_404() {
    let router = create_router_for_test();

    let (status, error) = get(&router, &format!("/payroll/{}", uuid_nil())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "NOT_FOUND");
}

fn uuid_nil() -> &'static str {
    "00000000-0000-0000-0000-000000000000"
}

#[test]
fn test_decimal_helper() {
    assert_eq!(decimal("950.00"), Decimal::from(950));
}
