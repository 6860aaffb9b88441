//! HTTP front end.
//!
//! Serves the dashboard page and two JSON endpoints:
//!
//! * `GET  /api/options` – region list, year bounds and marks
//! * `POST /api/update`  – selections in, five chart descriptions out
//!
//! Every update recomputes synchronously from the shared, read-only record
//! set; handlers hold no other state.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::charts::Dashboard;
use crate::data::error::DataError;
use crate::data::filter::{Selection, YearRange};
use crate::service::{DashboardService, FilterOptions};

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Body of `POST /api/update`, shaped like the page's control values:
/// `regions` is `null` or a list, `years` is the `[from, to]` slider pair.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    pub years: [i32; 2],
}

impl TryFrom<UpdateRequest> for Selection {
    type Error = DataError;

    fn try_from(req: UpdateRequest) -> Result<Self, Self::Error> {
        let [start, end] = req.years;
        let years = YearRange::new(start, end)?;
        Ok(Selection::new(req.regions.unwrap_or_default(), years))
    }
}

/// Error returned to API clients as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(DataError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::warn!("Rejected update: {}", self.0);
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        ApiError(err)
    }
}

pub fn router(service: DashboardService) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/options", get(options))
        .route("/api/update", post(update))
        .with_state(service)
}

/// Bind and serve until the process is stopped.
pub async fn run(service: DashboardService, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Dashboard running on http://{}/", listener.local_addr()?);
    axum::serve(listener, router(service)).await
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn options(State(service): State<DashboardService>) -> Json<FilterOptions> {
    Json(service.options())
}

async fn update(
    State(service): State<DashboardService>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Dashboard>, ApiError> {
    let selection = Selection::try_from(req)?;
    Ok(Json(service.update(&selection)))
}
