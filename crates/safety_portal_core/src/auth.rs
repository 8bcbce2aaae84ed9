//! crates/safety_portal_core/src/auth.rs
//!
//! The session/auth gate: a credential provider with a single fixed account,
//! and the rule deciding which views need a signed-in identity.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{AuthState, Identity, View};
use crate::ports::{AuthError, AuthProvider};

pub const DEFAULT_EMAIL: &str = "mubeen.ahsan@safetyforall.site";
pub const DEFAULT_PASSWORD: &str = "669914";

/// An `AuthProvider` that accepts exactly one email/password pair.
///
/// The email is compared case-insensitively, the password exactly.
pub struct StaticAuthProvider {
    email: String,
    password: String,
    state: RwLock<AuthState>,
}

impl StaticAuthProvider {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().to_lowercase(),
            password: password.into(),
            state: RwLock::new(AuthState::Anonymous),
        }
    }
}

impl Default for StaticAuthProvider {
    fn default() -> Self {
        Self::new(DEFAULT_EMAIL, DEFAULT_PASSWORD)
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if email.to_lowercase() != self.email || password != self.password {
            warn!("Rejected sign-in attempt.");
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity {
            name: display_name_from_email(email),
            email: email.to_string(),
        };
        *self.state.write().await = AuthState::Authenticated(identity.clone());
        info!("Signed in as {}", identity.name);
        Ok(identity)
    }

    async fn sign_out(&self) {
        *self.state.write().await = AuthState::Anonymous;
    }

    async fn current_identity(&self) -> AuthState {
        self.state.read().await.clone()
    }
}

/// Capitalizes everything before the first `.` of the email.
///
/// `mubeen.ahsan@safetyforall.site` becomes `Mubeen`.
pub fn display_name_from_email(email: &str) -> String {
    let first = email.split('.').next().unwrap_or_default();
    let mut chars = first.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether `view` can be opened in the given auth state.
///
/// The BowTie editor and the landing page are open to everyone.
pub fn can_enter(view: View, auth: &AuthState) -> bool {
    match view {
        View::Landing | View::Editor => true,
        _ => match auth {
            AuthState::Anonymous => false,
            AuthState::Authenticated(_) => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_accepts_case_varied_email() {
        let provider = StaticAuthProvider::default();
        let identity = provider
            .sign_in("Mubeen.Ahsan@SafetyForAll.Site", "669914")
            .await
            .expect("valid credentials");

        assert_eq!(identity.name, "Mubeen");
        assert_eq!(identity.email, "Mubeen.Ahsan@SafetyForAll.Site");
        assert_eq!(
            provider.current_identity().await,
            AuthState::Authenticated(identity)
        );
    }

    #[tokio::test]
    async fn sign_in_rejects_everything_else() {
        let provider = StaticAuthProvider::default();
        let attempts = [
            ("mubeen.ahsan@safetyforall.site", "669915"),
            ("mubeen.ahsan@safetyforall.site", ""),
            ("someone@safetyforall.site", "669914"),
            ("", ""),
            ("mubeen.ahsan@safetyforall.site ", "669914"),
        ];

        for (email, password) in attempts {
            assert_eq!(
                provider.sign_in(email, password).await,
                Err(AuthError::InvalidCredentials)
            );
            assert_eq!(provider.current_identity().await, AuthState::Anonymous);
        }
    }

    #[tokio::test]
    async fn failed_sign_in_keeps_existing_identity() {
        let provider = StaticAuthProvider::default();
        provider
            .sign_in(DEFAULT_EMAIL, DEFAULT_PASSWORD)
            .await
            .expect("valid credentials");
        let _ = provider.sign_in(DEFAULT_EMAIL, "wrong").await;

        assert!(provider.current_identity().await.identity().is_some());
    }

    #[tokio::test]
    async fn sign_out_is_idempotent() {
        let provider = StaticAuthProvider::default();
        provider.sign_out().await;
        provider
            .sign_in(DEFAULT_EMAIL, DEFAULT_PASSWORD)
            .await
            .expect("valid credentials");
        provider.sign_out().await;
        provider.sign_out().await;

        assert_eq!(provider.current_identity().await, AuthState::Anonymous);
    }

    #[test]
    fn error_message_is_generic() {
        let message = AuthError::InvalidCredentials.to_string();
        assert!(message.contains("contact administrator"));
        assert!(!message.to_lowercase().contains("password"));
        assert!(!message.to_lowercase().contains("email"));
    }

    #[test]
    fn editor_is_always_enterable() {
        assert!(can_enter(View::Editor, &AuthState::Anonymous));
        assert!(can_enter(View::Landing, &AuthState::Anonymous));
    }

    #[test]
    fn other_modules_need_an_identity() {
        let signed_in = AuthState::Authenticated(Identity {
            name: "Mubeen".to_string(),
            email: DEFAULT_EMAIL.to_string(),
        });

        for view in View::ALL {
            if matches!(view, View::Landing | View::Editor) {
                continue;
            }
            assert!(!can_enter(view, &AuthState::Anonymous), "{view} should be locked");
            assert!(can_enter(view, &signed_in), "{view} should be open");
        }
    }

    #[test]
    fn display_name_handles_edge_cases() {
        assert_eq!(display_name_from_email("jane@example.com"), "Jane@example");
        assert_eq!(display_name_from_email(""), "");
    }
}
