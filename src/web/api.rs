use crate::fetch::{FetchError, FetchRequest, LogPager, Page};
use crate::kube::selector::SourceSelector;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pager: Arc<LogPager>,
    pub default_limit: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub namespace: String,
    pub application_id: Option<String>,
    pub scope_id: Option<String>,
    pub deployment_id: Option<String>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub next_page_token: String,
    #[serde(default)]
    pub filter: String,
    pub start_time: Option<String>,
    pub instance_id: Option<String>,
}

impl LogsQuery {
    pub fn into_request(self, default_limit: usize) -> FetchRequest {
        FetchRequest {
            selector: SourceSelector {
                application_id: self.application_id,
                scope_id: self.scope_id,
                deployment_id: self.deployment_id,
            },
            namespace: self.namespace,
            limit: self.limit.unwrap_or(default_limit),
            next_page_token: self.next_page_token,
            filter_pattern: self.filter,
            start_time: self.start_time,
            instance_id: self.instance_id,
        }
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /api/logs?namespace=...&limit=...&next_page_token=...
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Page>, ApiError> {
    let request = query.into_request(state.default_limit);
    let page = state.pager.fetch_page(&request).await?;
    Ok(Json(page))
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    BadGateway(String),
    Timeout(String),
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::MissingNamespace => ApiError::BadRequest(err.to_string()),
            FetchError::Discovery(_) => ApiError::BadGateway(err.to_string()),
            FetchError::Timeout(_) => ApiError::Timeout(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Timeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
