//! HTTP dispatcher.
//!
//! Maps routes to [`Database`] operations. Every data route honors the
//! `no_op` query parameter, which returns the generated statement as text
//! instead of executing it.
//!
//! [`router_with_metrics`] additionally counts and times every request except
//! the health checks, and serves the counts on `/metrics`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{MatchedPath, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::builders::{self, FIELD_NAME_PARAM, FIELD_VALUE_PARAM};
use crate::client::{Database, Outcome};
use crate::error::Error;
use crate::metrics::RequestMetrics;

pub const CHECK_ALIVE_PATH: &str = "/check/alive";
pub const CHECK_READY_PATH: &str = "/check/ready";
pub const METRICS_PATH: &str = "/metrics";

const DRY_RUN_PARAM: &str = "no_op";

type Params = Query<Vec<(String, String)>>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Statement(text) => (StatusCode::OK, text).into_response(),
            Outcome::Rows(rows) => (StatusCode::OK, Json(rows)).into_response(),
            Outcome::Written(true) => StatusCode::OK.into_response(),
            Outcome::Written(false) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Build the router for all operations.
pub fn router(db: Database) -> Router {
    build_router(db, None)
}

/// Build the router with request metrics recorded into `metrics` and exposed
/// on [`METRICS_PATH`].
pub fn router_with_metrics(db: Database, metrics: Arc<RequestMetrics>) -> Router {
    build_router(db, Some(metrics))
}

fn build_router(db: Database, metrics: Option<Arc<RequestMetrics>>) -> Router {
    let mut app = Router::new()
        .route("/", get(index_handler))
        .route(
            "/tables/manage/{table}",
            post(create_table_handler).delete(drop_table_handler),
        )
        .route(
            "/tables/{table}",
            get(list_rows_handler)
                .post(insert_rows_handler)
                .delete(delete_rows_handler),
        )
        .route(CHECK_ALIVE_PATH, get(check_alive_handler))
        .route(CHECK_READY_PATH, get(check_ready_handler));

    if let Some(metrics) = metrics {
        let exported = Arc::clone(&metrics);
        // Added after the route layer, so scrapes are not counted.
        app = app
            .route_layer(middleware::from_fn_with_state(metrics, track_requests))
            .route(
                METRICS_PATH,
                get(move || {
                    let metrics = Arc::clone(&exported);
                    async move { Json(metrics.snapshot()) }
                }),
            );
    }

    app.layer(TraceLayer::new_for_http()).with_state(db)
}

/// Records method, matched route, status and latency of each request.
async fn track_requests(
    State(metrics): State<Arc<RequestMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_string(),
        None => request.uri().path().to_string(),
    };
    if path == CHECK_ALIVE_PATH || path == CHECK_READY_PATH {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let start = Instant::now();
    let response = next.run(request).await;
    metrics.record(&method, &path, response.status().as_u16(), start.elapsed());
    response
}

// ==================
// Helper Functions
// ==================

/// `?no_op`, `?no_op=1` and `?no_op=true` select dry-run.
fn is_dry_run(params: &[(String, String)]) -> bool {
    params
        .iter()
        .any(|(k, v)| k == DRY_RUN_PARAM && !matches!(v.as_str(), "false" | "0"))
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn parse_body(body: &Bytes) -> Result<Value, Error> {
    serde_json::from_slice(body).map_err(|e| Error::InvalidPayload(format!("invalid JSON: {}", e)))
}

// ==================
// Handlers
// ==================

async fn index_handler(State(db): State<Database>) -> String {
    format!(
        "httpsql {} serving a {} backend\n",
        env!("CARGO_PKG_VERSION"),
        db.provider()
    )
}

async fn create_table_handler(
    State(db): State<Database>,
    Path(table): Path<String>,
    Query(params): Params,
    body: Bytes,
) -> Result<Outcome, Error> {
    let definition = parse_body(&body)?;
    db.create_table(&table, &definition, is_dry_run(&params)).await
}

async fn drop_table_handler(
    State(db): State<Database>,
    Path(table): Path<String>,
    Query(params): Params,
) -> Result<Outcome, Error> {
    db.drop_table(&table, is_dry_run(&params)).await
}

async fn list_rows_handler(
    State(db): State<Database>,
    Path(table): Path<String>,
    Query(params): Params,
) -> Result<Outcome, Error> {
    let filters = builders::filters_from_params(&params);
    db.list_rows(&table, &filters, is_dry_run(&params)).await
}

async fn insert_rows_handler(
    State(db): State<Database>,
    Path(table): Path<String>,
    Query(params): Params,
    body: Bytes,
) -> Result<Outcome, Error> {
    let rows = builders::rows_from_json(&parse_body(&body)?)?;
    db.insert_rows(&table, &rows, is_dry_run(&params)).await
}

async fn delete_rows_handler(
    State(db): State<Database>,
    Path(table): Path<String>,
    Query(params): Params,
) -> Result<Outcome, Error> {
    db.delete_rows(
        &table,
        param(&params, FIELD_NAME_PARAM),
        param(&params, FIELD_VALUE_PARAM),
        is_dry_run(&params),
    )
    .await
}

async fn check_alive_handler() -> StatusCode {
    StatusCode::OK
}

async fn check_ready_handler(State(db): State<Database>) -> StatusCode {
    if db.check_health().await {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
