use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine.create_user("alice", "password").await.unwrap();
    router(ServerState {
        engine: Arc::new(engine),
    })
}

fn basic(username: &str, password: &str) -> String {
    let secret = format!("{username}:{password}");
    format!(
        "Basic {}",
        base64::prelude::BASE64_STANDARD.encode(secret)
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic("alice", "password"));
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_wallet(app: &Router) -> String {
    let (status, wallet) = send(
        app,
        Method::POST,
        "/wallets",
        Some(json!({ "name": "Main", "kind": "checking" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    wallet["id"].as_str().unwrap().to_string()
}

async fn post_transaction(app: &Router, wallet_id: &str, kind: &str, amount: i64, on: &str) {
    let (status, _) = send(
        app,
        Method::POST,
        "/transactions",
        Some(json!({
            "walletId": wallet_id,
            "kind": kind,
            "amountMinor": amount,
            "occurredOn": on
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let app = app().await;

    let request = Request::builder().uri("/wallets").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/wallets")
        .header(header::AUTHORIZATION, basic("alice", "wrong"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn budget_reaches_warning_over_http() {
    let app = app().await;
    let wallet_id = create_wallet(&app).await;
    post_transaction(&app, &wallet_id, "income", 1000_00, "2026-01-02").await;
    post_transaction(&app, &wallet_id, "expense", 200_00, "2026-01-10").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/budgets",
        Some(json!({
            "name": "Monthly",
            "amountMinor": 250_00,
            "period": "month",
            "startDate": "2026-01-01",
            "alertThreshold": 80
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, budgets) = send(&app, Method::GET, "/budgets?asOf=2026-01-15", None).await;
    assert_eq!(status, StatusCode::OK);
    let budget = &budgets[0];
    assert_eq!(budget["name"], "Monthly");
    assert_eq!(budget["amountMinor"], 250_00);
    assert_eq!(budget["status"], "warning");
    assert_eq!(budget["spent"], 200_00);
    assert_eq!(budget["remaining"], 50_00);
    assert_eq!(budget["percentage"], 80);
    assert_eq!(budget["daysRemaining"], 17);
    assert_eq!(
        budget["alertMessage"],
        "Budget 'Monthly' has reached 80% (200.00 of 250.00)"
    );
    assert_eq!(budget["periodEnd"], "2026-02-01");
    assert!(budget.get("snapshot").is_none());

    let (_, notifications) = send(&app, Method::GET, "/notifications", None).await;
    let alerts: Vec<&Value> = notifications
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["kind"] == "budget_alert")
        .collect();
    assert_eq!(alerts.len(), 1);
    let id = alerts[0]["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/notifications/{id}/read"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, unread) = send(&app, Method::GET, "/notifications?unreadOnly=true", None).await;
    assert!(
        unread
            .as_array()
            .unwrap()
            .iter()
            .all(|n| n["id"].as_str() != Some(id))
    );
}

#[tokio::test]
async fn recalculate_reports_the_ledger_balance() {
    let app = app().await;
    let wallet_id = create_wallet(&app).await;
    post_transaction(&app, &wallet_id, "income", 300_00, "2026-03-01").await;
    post_transaction(&app, &wallet_id, "expense", 120_00, "2026-03-02").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/wallets/{wallet_id}/recalculate"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newBalance"], 180_00);
    assert_eq!(body["corrected"], false);

    let (_, wallet) = send(&app, Method::GET, &format!("/wallets/{wallet_id}"), None).await;
    assert_eq!(wallet["balanceMinor"], 180_00);
}

#[tokio::test]
async fn invalid_input_and_missing_rows_map_to_status_codes() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/budgets",
        Some(json!({
            "name": "Too eager",
            "amountMinor": 100_00,
            "period": "month",
            "startDate": "2026-01-01",
            "alertThreshold": 150
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/wallets/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let wallet_id = create_wallet(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/wallets",
        Some(json!({ "name": "main", "kind": "cash" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        Method::POST,
        "/transactions",
        Some(json!({
            "walletId": wallet_id,
            "kind": "expense",
            "amountMinor": 0,
            "occurredOn": "2026-03-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
