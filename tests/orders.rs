//! Order intake tests

mod common;

use std::collections::HashSet;
use std::sync::atomic::Ordering;

use axum::extract::{Json, State};
use common::*;
use resguardo::handlers::{create_order, CreateOrderRequest};

fn request() -> CreateOrderRequest {
    serde_json::from_value(serde_json::json!({
        "title": "Plan A",
        "quantity": 1,
        "unit_price": 9990,
        "payer_first_name": "Ana",
        "payer_last_name": "Rojas",
        "contacts": ["a@x.com", "b@x.com"],
    }))
    .expect("request fixture should deserialize")
}

#[tokio::test]
async fn test_create_order_records_pending_entry_and_submits_draft() {
    let app = test_app();

    let Json(response) = create_order(State(app.state.clone()), Json(request()))
        .await
        .expect("intake should succeed");

    assert_eq!(response.init_point, "https://pay.example/init/pref-test-1");
    assert_eq!(app.state.ledger.len(), 1);

    let drafts = app.gateway.drafts.lock();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].external_reference, response.reference);
    assert_eq!(drafts[0].title, "Plan A");
    assert_eq!(drafts[0].unit_price, 9990);
    assert_eq!(drafts[0].notification_url, "http://localhost:3000/webhook");
}

#[tokio::test]
async fn test_create_order_mints_distinct_references() {
    let app = test_app();
    let mut references = HashSet::new();

    for _ in 0..5 {
        let Json(response) = create_order(State(app.state.clone()), Json(request()))
            .await
            .expect("intake should succeed");
        references.insert(response.reference);
    }

    assert_eq!(references.len(), 5, "every intake mints a fresh reference");
    assert_eq!(app.state.ledger.len(), 5);
}

#[tokio::test]
async fn test_empty_contacts_rejected_before_any_side_effect() {
    let app = test_app();
    let mut req = request();
    req.contacts = vec!["   ".to_string(), String::new()];

    let result = create_order(State(app.state.clone()), Json(req)).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(app.state.ledger.is_empty(), "no pending entry on rejection");
    assert!(app.gateway.drafts.lock().is_empty(), "gateway never called");
}

#[tokio::test]
async fn test_zero_quantity_rejected() {
    let app = test_app();
    let mut req = request();
    req.quantity = 0;

    let result = create_order(State(app.state.clone()), Json(req)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_non_positive_price_rejected() {
    let app = test_app();
    let mut req = request();
    req.unit_price = 0;

    let result = create_order(State(app.state.clone()), Json(req)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(app.state.ledger.is_empty());
}

#[tokio::test]
async fn test_price_overflow_rejected() {
    let app = test_app();
    let mut req = request();
    req.unit_price = i64::MAX;
    req.quantity = 2;

    let result = create_order(State(app.state.clone()), Json(req)).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(app.state.ledger.is_empty(), "no pending entry on rejection");
    assert!(app.gateway.drafts.lock().is_empty(), "gateway never called");
}

#[tokio::test]
async fn test_gateway_failure_removes_pending_entry() {
    let app = test_app();
    app.gateway.fail_create.store(true, Ordering::SeqCst);

    let result = create_order(State(app.state.clone()), Json(request())).await;

    assert!(matches!(result, Err(AppError::Upstream(_))));
    assert!(
        app.state.ledger.is_empty(),
        "a pending entry without a gateway order must not survive"
    );
}

#[tokio::test]
async fn test_contacts_are_trimmed_and_blank_entries_dropped() {
    let app = test_app();
    let mut req = request();
    req.contacts = vec![
        "  a@x.com ".to_string(),
        String::new(),
        "b@x.com".to_string(),
    ];

    let Json(response) = create_order(State(app.state.clone()), Json(req))
        .await
        .expect("intake should succeed");

    let pending = app
        .state
        .ledger
        .pop(&response.reference)
        .expect("pending entry should exist");
    assert_eq!(pending.contacts, vec!["a@x.com", "b@x.com"]);
    assert_eq!(pending.price, 9990);
}
