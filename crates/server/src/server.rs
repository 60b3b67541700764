use axum::{
    Json, Router,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use std::{sync::Arc, time::Instant};

use crate::{RateLimiter, balances, expenses, groups, health, settlements};
use api_types::ErrorBody;
use engine::Engine;

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub limiter: Arc<RateLimiter>,
}

/// The acting user, resolved from [`UserIdHeader`] by the `identify` layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor(pub Uuid);

/// `TypedHeader` for the caller identity.
///
/// Every request under `/groups` must carry an "x-user-id" entry holding the
/// UUID of the user, as resolved by the upstream identity provider.
#[derive(Debug)]
pub struct UserIdHeader(pub Uuid);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = Uuid::parse_str(value.trim()) else {
            return Err(AxumError::invalid());
        };

        Ok(UserIdHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        let as_string = self.0.to_string();
        match axum::http::HeaderValue::from_str(&as_string) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

async fn identify(
    user_header: Option<TypedHeader<UserIdHeader>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(UserIdHeader(user_id))) = user_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(Actor(user_id));
    Ok(next.run(request).await)
}

/// Refuse write requests over the per-user budget.
async fn rate_limit(State(state): State<ServerState>, request: Request, next: Next) -> Response {
    let is_write = !matches!(*request.method(), Method::GET | Method::HEAD);
    if is_write
        && let Some(Actor(user_id)) = request.extensions().get::<Actor>().copied()
        && !state.limiter.check(user_id)
    {
        tracing::warn!(%user_id, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody {
                error: "rate limit exceeded, please try again later".to_string(),
            }),
        )
            .into_response();
    }
    next.run(request).await
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), latency_ms, "request failed");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), latency_ms, "request");
    }
    response
}

/// Build the application router.
pub fn router(state: ServerState) -> Router {
    let ledger = Router::new()
        .route("/groups", axum::routing::post(groups::group_new))
        .route("/groups/{group_id}", get(groups::get))
        .route(
            "/groups/{group_id}/members",
            get(groups::list_members).post(groups::add_member),
        )
        .route("/groups/{group_id}/balances", get(balances::get))
        .route(
            "/groups/{group_id}/expenses",
            get(expenses::list).post(expenses::expense_new),
        )
        .route(
            "/groups/{group_id}/expenses/{expense_id}",
            get(expenses::get),
        )
        .route(
            "/groups/{group_id}/settlements",
            get(settlements::list).post(settlements::settlement_new),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .route_layer(middleware::from_fn(identify));

    Router::new()
        .route("/health", get(health::get))
        .merge(ledger)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

pub async fn run(
    engine: Engine,
    db: DatabaseConnection,
    limiter: RateLimiter,
    addr: impl tokio::net::ToSocketAddrs,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(engine, db, limiter, listener).await
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    limiter: RateLimiter,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
        limiter: Arc::new(limiter),
    };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
