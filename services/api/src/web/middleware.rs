//! services/api/src/web/middleware.rs
//!
//! Visitor-session middleware: lookup-only for read routes, create-on-demand
//! for routes that keep per-visitor state.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Duration;
use safety_portal_core::domain::AuthState;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::web::state::{AppState, VisitorSession};

pub const SESSION_COOKIE: &str = "session";

/// The caller's live session, if the request carried one. Read-only routes see
/// this instead of a `VisitorSession` and never create a session themselves.
#[derive(Clone)]
pub struct CurrentVisitor(pub Option<Arc<VisitorSession>>);

impl CurrentVisitor {
    /// The caller's auth state; anonymous without a session.
    pub async fn auth_state(&self) -> AuthState {
        match &self.0 {
            Some(visitor) => visitor.auth.current_identity().await,
            None => AuthState::Anonymous,
        }
    }
}

/// Reads the session ID from the `Cookie` header, if there is a valid one.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .and_then(|id| Uuid::parse_str(id).ok())
}

fn cookie_attributes(secure: bool) -> &'static str {
    if secure {
        "HttpOnly; Secure; SameSite=Lax; Path=/"
    } else {
        "HttpOnly; SameSite=Lax; Path=/"
    }
}

pub fn session_cookie(session_id: Uuid, max_age: Duration, secure: bool) -> String {
    format!(
        "{}={}; {}; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        cookie_attributes(secure),
        max_age.num_seconds()
    )
}

pub fn cleared_session_cookie(secure: bool) -> String {
    format!("{}=; {}; Max-Age=0", SESSION_COOKIE, cookie_attributes(secure))
}

async fn existing_session(state: &AppState, headers: &HeaderMap) -> Option<Arc<VisitorSession>> {
    match session_id_from_headers(headers) {
        Some(id) => state.sessions.get(id).await,
        None => None,
    }
}

/// Middleware for read-only routes: attaches the caller's session, if any.
pub async fn resolve_visitor(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let visitor = existing_session(&state, req.headers()).await;
    req.extensions_mut().insert(CurrentVisitor(visitor));
    next.run(req).await
}

/// Middleware for routes that keep per-visitor state (sign-in, checkout and
/// trial requests). Attaches the caller's `VisitorSession`, creating one when
/// the cookie is missing, malformed or expired, and sends the new cookie.
pub async fn require_visitor(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    // 1. Look up an existing session from the cookie, or start a new one
    let (visitor, is_new) = match existing_session(&state, req.headers()).await {
        Some(visitor) => (visitor, false),
        None => (state.sessions.create().await, true),
    };

    // 2. Insert the session into request extensions
    req.extensions_mut().insert(visitor.clone());
    req.extensions_mut()
        .insert(CurrentVisitor(Some(visitor.clone())));

    // 3. Continue to the handler
    let mut response = next.run(req).await;

    if is_new && state.sessions.get(visitor.id).await.is_some() {
        let cookie = session_cookie(visitor.id, state.sessions.ttl(), state.config.cookie_secure);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {:?}", e),
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_is_parsed_among_other_cookies() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; session={id}; lang=en")).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn malformed_session_ids_are_ignored() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_id_from_headers(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("session=not-a-uuid"));
        assert_eq!(session_id_from_headers(&headers), None);
    }

    #[test]
    fn secure_attribute_follows_configuration() {
        let id = Uuid::new_v4();
        let secure = session_cookie(id, Duration::days(1), true);
        assert!(secure.starts_with(&format!("session={id}; HttpOnly; Secure;")));
        assert!(secure.ends_with("Max-Age=86400"));

        let plain = session_cookie(id, Duration::days(1), false);
        assert!(!plain.contains("Secure"));
        assert!(plain.contains("SameSite=Lax"));

        assert_eq!(
            cleared_session_cookie(false),
            "session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
        );
    }
}
