use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use distribution_core::api::{CreateDistributionResponse, ErrorResponse, DISTRIBUTIONS_PATH};
use distribution_core::{DistributionHandler, RequestError};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    handler: Arc<DistributionHandler>,
}

impl AppState {
    pub fn new(handler: DistributionHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

/// Builds the HTTP router. `cors` adds a permissive CORS layer.
pub fn router(state: AppState, cors: bool) -> Router {
    let app = Router::new()
        .route("/healthz", get(healthz))
        .route(DISTRIBUTIONS_PATH, post(create_distribution))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_distribution(
    State(st): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<CreateDistributionResponse>, AppError> {
    let Json(body) = body?;
    let res = st.handler.create_from_json(&body)?;
    Ok(Json(res))
}

#[derive(Debug)]
pub struct AppError(RequestError);

impl From<RequestError> for AppError {
    fn from(value: RequestError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        Self(RequestError::MalformedRequest(value.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, kind = self.0.kind(), "request rejected");
        let status = match self.0 {
            RequestError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            RequestError::UnknownScope(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}
