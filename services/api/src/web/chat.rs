//! services/api/src/web/chat.rs
//!
//! Endpoints behind the assistant widget. Each conversation lives in memory
//! until it is closed.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use safety_portal_core::{
    conversation::{self, Conversation, ExchangeOutcome, ExchangeRejected, ExchangeState},
    domain::ChatTurn,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct TurnResponse {
    /// `user` or `assistant`.
    pub role: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct ConversationResponse {
    pub conversation_id: Uuid,
    pub turns: Vec<TurnResponse>,
    /// True while a reply is pending.
    pub sending: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub text: String,
}

impl From<&ChatTurn> for TurnResponse {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            text: turn.text.clone(),
            created_at: turn.created_at,
        }
    }
}

fn conversation_response(id: Uuid, conversation: &Conversation) -> ConversationResponse {
    ConversationResponse {
        conversation_id: id,
        turns: conversation.turns().iter().map(TurnResponse::from).collect(),
        sending: conversation.state() == ExchangeState::Sending,
    }
}

fn not_found(id: Uuid) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Conversation {} not found", id))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /chat - Open a conversation, seeded with the assistant greeting
#[utoipa::path(
    post,
    path = "/chat",
    responses(
        (status = 201, description = "Conversation created", body = ConversationResponse)
    )
)]
pub async fn create_conversation_handler(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let (id, conversation) = state.conversations.create().await;
    info!("Opened conversation {}", id);
    let response = conversation_response(id, &*conversation.lock().await);
    (StatusCode::CREATED, Json(response))
}

/// GET /chat/{id} - The full conversation so far
#[utoipa::path(
    get,
    path = "/chat/{id}",
    params(("id" = Uuid, Path, description = "Conversation ID.")),
    responses(
        (status = 200, description = "Conversation", body = ConversationResponse),
        (status = 404, description = "Unknown conversation")
    )
)]
pub async fn get_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationResponse>, (StatusCode, String)> {
    let conversation = state.conversations.get(id).await.ok_or_else(|| not_found(id))?;
    let response = conversation_response(id, &*conversation.lock().await);
    Ok(Json(response))
}

/// POST /chat/{id}/messages - Send a message and wait for the assistant's reply
#[utoipa::path(
    post,
    path = "/chat/{id}/messages",
    params(("id" = Uuid, Path, description = "Conversation ID.")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "The assistant's reply", body = TurnResponse),
        (status = 400, description = "Message is empty"),
        (status = 404, description = "Unknown conversation"),
        (status = 409, description = "A reply is still pending"),
        (status = 410, description = "Conversation was closed before the reply arrived")
    )
)]
pub async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<TurnResponse>, (StatusCode, String)> {
    let conversation = state.conversations.get(id).await.ok_or_else(|| not_found(id))?;

    let outcome = conversation::exchange(conversation, state.chat_adapter.as_ref(), &req.text)
        .await
        .map_err(|e| {
            warn!("Rejected message for conversation {}: {}", id, e);
            let status = match e {
                ExchangeRejected::EmptyInput => StatusCode::BAD_REQUEST,
                ExchangeRejected::Busy => StatusCode::CONFLICT,
            };
            (status, e.to_string())
        })?;

    match outcome {
        ExchangeOutcome::Replied(turn) => Ok(Json(TurnResponse::from(&turn))),
        ExchangeOutcome::Discarded => Err((
            StatusCode::GONE,
            format!("Conversation {} was closed", id),
        )),
    }
}

/// DELETE /chat/{id} - Close a conversation
#[utoipa::path(
    delete,
    path = "/chat/{id}",
    params(("id" = Uuid, Path, description = "Conversation ID.")),
    responses(
        (status = 204, description = "Conversation closed"),
        (status = 404, description = "Unknown conversation")
    )
)]
pub async fn close_conversation_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !state.conversations.remove(id).await {
        return Err(not_found(id));
    }
    info!("Closed conversation {}", id);
    Ok(StatusCode::NO_CONTENT)
}
