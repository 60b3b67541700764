use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use engine::Engine;
use server::{RateLimiter, ServerState, router};

async fn app_with_limit(limit: u32) -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    router(ServerState {
        engine: Arc::new(engine),
        db,
        limiter: Arc::new(RateLimiter::new(limit, Duration::from_secs(60))),
    })
}

async fn app() -> Router {
    app_with_limit(0).await
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Create a group owned by `owner` with the given extra members.
async fn group_with(app: &Router, owner: Uuid, members: &[Uuid]) -> String {
    let (status, body) = send(app, "POST", "/groups", Some(owner), Some(json!({"name": "Trip"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    for member in members {
        let (status, _) = send(
            app,
            "POST",
            &format!("/groups/{id}/members"),
            Some(owner),
            Some(json!({"user_id": member})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    id
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let app = app().await;
    let (status, _) = send(&app, "POST", "/groups", None, Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expense_and_settlement_flow() {
    let app = app().await;
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let group = group_with(&app, a, &[b, c]).await;

    let (status, expense) = send(
        &app,
        "POST",
        &format!("/groups/{group}/expenses"),
        Some(a),
        Some(json!({
            "description": "dinner",
            "total_amount": "100.00",
            "splits": [
                {"user_id": a, "amount": "33.33"},
                {"user_id": b, "amount": "33.33"},
                {"user_id": c, "amount": "33.34"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["total_amount"], "100.00");
    assert_eq!(expense["paid_by"], a.to_string());

    let (status, _) = send(
        &app,
        "POST",
        &format!("/groups/{group}/settlements"),
        Some(b),
        Some(json!({"from_user": b, "to_user": a, "amount": "20"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", &format!("/groups/{group}/balances"), Some(c), None).await;
    assert_eq!(status, StatusCode::OK);
    let amount_of = |user: Uuid| {
        body["balances"]
            .as_array()
            .unwrap()
            .iter()
            .find(|entry| entry["user_id"] == user.to_string())
            .map(|entry| entry["amount"].as_str().unwrap().to_string())
            .unwrap()
    };
    assert_eq!(amount_of(a), "86.67");
    assert_eq!(amount_of(b), "-53.33");
    assert_eq!(amount_of(c), "-33.34");

    let (status, listed) = send(
        &app,
        "GET",
        &format!("/groups/{group}/expenses?limit=10"),
        Some(b),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["expenses"][0]["splits"].as_array().unwrap().len(), 3);

    let expense_id = expense["id"].as_str().unwrap();
    let (status, fetched) = send(
        &app,
        "GET",
        &format!("/groups/{group}/expenses/{expense_id}"),
        Some(c),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["description"], "dinner");
}

#[tokio::test]
async fn validation_failures_are_unprocessable() {
    let app = app().await;
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let group = group_with(&app, a, &[b]).await;
    let uri = format!("/groups/{group}/expenses");

    for body in [
        json!({"description": "x", "total_amount": "10.00",
               "splits": [{"user_id": a, "amount": "9.99"}]}),
        json!({"description": "x", "total_amount": "10.001",
               "splits": [{"user_id": a, "amount": "10"}]}),
        json!({"description": "x", "total_amount": "10",
               "splits": [{"user_id": Uuid::new_v4(), "amount": "10"}]}),
    ] {
        let (status, error) = send(&app, "POST", &uri, Some(a), Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{error}");
        assert!(error["error"].is_string());
    }

    let (status, _) = send(
        &app,
        "POST",
        &format!("/groups/{group}/settlements"),
        Some(a),
        Some(json!({"from_user": a, "to_user": a, "amount": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "GET", &format!("{uri}?limit=0"), Some(a), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn outsiders_are_forbidden_and_unknown_groups_not_found() {
    let app = app().await;
    let owner = Uuid::new_v4();
    let group = group_with(&app, owner, &[]).await;

    let (status, _) = send(
        &app,
        "GET",
        &format!("/groups/{group}/balances"),
        Some(Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/groups/{}", Uuid::new_v4()),
        Some(owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn writes_over_the_limit_are_rejected() {
    let app = app_with_limit(2).await;
    let user = Uuid::new_v4();
    for _ in 0..2 {
        let (status, _) = send(&app, "POST", "/groups", Some(user), Some(json!({"name": "g"}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = send(&app, "POST", "/groups", Some(user), Some(json!({"name": "g"}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "POST", "/groups", Some(Uuid::new_v4()), Some(json!({"name": "g"}))).await;
    assert_eq!(status, StatusCode::CREATED);
}
