use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::messaging::chat::{
    contact_candidate, retry_message, room_messages, send_message, ContactRequest,
    ContactResponse, SendMessageRequest,
};
use crate::models::chat::ChatMessage;
use crate::state::AppState;

/// GET /api/v1/chat-rooms/:id/messages
pub async fn handle_list_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    Ok(Json(room_messages(&state.repos, &room_id).await?))
}

/// POST /api/v1/chat-rooms/:id/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let message = send_message(&state.repos, state.messenger.as_ref(), &room_id, req).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/v1/chat-rooms/:id/messages/:message_id/retry
pub async fn handle_retry_message(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<ChatMessage>, AppError> {
    let message =
        retry_message(&state.repos, state.messenger.as_ref(), &room_id, &message_id).await?;
    Ok(Json(message))
}

/// POST /api/v1/candidates/:id/contact
pub async fn handle_contact_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let resp =
        contact_candidate(&state.repos, state.messenger.as_ref(), &candidate_id, req).await?;
    Ok(Json(resp))
}
