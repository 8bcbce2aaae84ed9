//! crates/safety_portal_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like credential stores
//! or language-model APIs.

use async_trait::async_trait;
use crate::domain::{AuthState, ChatTurn, Identity, Order, TrialRequest};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Sign-in failures. The message never says which field was wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials. Please contact administrator.")]
    InvalidCredentials,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Checks the credentials and, on success, replaces the current identity.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Clears the current identity. Calling it while signed out is a no-op.
    async fn sign_out(&self);

    async fn current_identity(&self) -> AuthState;
}

#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Produces the assistant's reply to `message`, given every turn that preceded it.
    async fn complete(&self, message: &str, history: &[ChatTurn]) -> PortResult<String>;
}

#[async_trait]
pub trait SubmissionService: Send + Sync {
    async fn submit_order(&self, order: &Order) -> PortResult<()>;

    async fn submit_trial(&self, request: &TrialRequest) -> PortResult<()>;
}
