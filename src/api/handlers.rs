//! HTTP request handlers

use super::types::{ChatRequest, ChatResponse, ErrorResponse};
use super::AppState;
use crate::runtime::TurnError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // One user turn
        .route("/chat", post(chat))
        // Cities with local guides
        .route("/cities", get(list_cities))
        .with_state(state)
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let reply = state
        .manager
        .handle_turn(&req.message, req.conversation_id)
        .await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        conversation_id: reply.conversation_id,
    }))
}

async fn list_cities(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.knowledge.city_names())
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadGateway(String),
    GatewayTimeout(String),
    Internal(String),
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        match e {
            TurnError::Upstream(_) => AppError::BadGateway(e.to_string()),
            TurnError::DecisionTimeout(_) => AppError::GatewayTimeout(e.to_string()),
            TurnError::CycleLimitExceeded { .. }
            | TurnError::Transition(_)
            | TurnError::Store(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::GatewayTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
