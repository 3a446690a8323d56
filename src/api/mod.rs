use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::builder::CollageBuilder;
use crate::error::CollageError;
use crate::models::{BuildRequest, GridSize, Period};

#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<CollageBuilder>,
}

/// Raw `/collage` query, validated into a `BuildRequest`.
#[derive(Debug, Default, Deserialize)]
pub struct CollageParams {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    grid: Option<String>,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    labels: Option<String>,
}

impl TryFrom<CollageParams> for BuildRequest {
    type Error = CollageError;

    fn try_from(params: CollageParams) -> Result<Self, Self::Error> {
        let username = params
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CollageError::InvalidRequest("Username was not provided".to_string()))?;

        let grid = match params.grid.as_deref().map(str::trim) {
            None | Some("") => GridSize::default(),
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .and_then(GridSize::new)
                .ok_or_else(|| {
                    CollageError::InvalidRequest(format!(
                        "grid must be one of {:?}, got '{}'",
                        GridSize::ALLOWED,
                        raw
                    ))
                })?,
        };

        let period = match params.period.as_deref().map(str::trim) {
            None | Some("") => Period::default(),
            Some(raw) => raw.parse::<Period>().map_err(CollageError::InvalidRequest)?,
        };

        let include_labels = match params.labels.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                CollageError::InvalidRequest(format!("labels must be true or false, got '{}'", raw))
            })?,
        };

        Ok(BuildRequest {
            username,
            grid,
            period,
            include_labels,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl IntoResponse for CollageError {
    fn into_response(self) -> Response {
        let status = match &self {
            CollageError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            e if e.is_upstream() => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Collage build failed: {}", self);
        } else {
            tracing::debug!("Rejected collage request: {}", self);
        }

        (status, self.to_string()).into_response()
    }
}

pub fn create_router(builder: Arc<CollageBuilder>) -> Router {
    let state = AppState { builder };

    Router::new()
        .route("/", get(root_handler))
        .route("/collage", get(collage_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "hola" }))
}

async fn collage_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CollageParams>,
) -> Result<Response, CollageError> {
    let request = BuildRequest::try_from(params)?;
    let png = state.builder.build(&request).await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
