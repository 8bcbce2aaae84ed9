//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for sign-in, sign-out and the current identity.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use safety_portal_core::domain::AuthState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::web::middleware::{cleared_session_cookie, CurrentVisitor};
use crate::web::state::{AppState, VisitorSession};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub name: String,
    pub email: String,
}

/// The visitor's auth state. `name` and `email` are only set when signed in.
#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub authenticated: bool,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&AuthState> for MeResponse {
    fn from(state: &AuthState) -> Self {
        match state {
            AuthState::Anonymous => Self {
                authenticated: false,
                name: None,
                email: None,
            },
            AuthState::Authenticated(identity) => Self {
                authenticated: true,
                name: Some(identity.name.clone()),
                email: Some(identity.email.clone()),
            },
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Sign in with the administrator-issued account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_handler(
    Extension(visitor): Extension<Arc<VisitorSession>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let identity = visitor
        .auth
        .sign_in(&req.email, &req.password)
        .await
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            name: identity.name,
            email: identity.email,
        }),
    ))
}

/// POST /auth/logout - Sign out and forget the visitor session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentVisitor(visitor)): Extension<CurrentVisitor>,
) -> impl IntoResponse {
    match visitor {
        Some(visitor) => {
            // 1. Clear the identity held by the session's provider
            visitor.auth.sign_out().await;

            // 2. Drop the session itself
            if state.sessions.remove(visitor.id).await {
                info!("Visitor session {} signed out", visitor.id);
            }
        }
        None => warn!("Logout without a live visitor session"),
    }

    // 3. Clear cookie
    (
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            cleared_session_cookie(state.config.cookie_secure),
        )],
    )
}

/// GET /auth/me - The current visitor's identity, if any
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current auth state", body = MeResponse)
    )
)]
pub async fn me_handler(Extension(visitor): Extension<CurrentVisitor>) -> Json<MeResponse> {
    let state = visitor.auth_state().await;
    Json(MeResponse::from(&state))
}
