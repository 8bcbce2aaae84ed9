pub mod auth;
pub mod catalog;
pub mod chat;
pub mod checkout;
pub mod middleware;
pub mod navigation;
pub mod rest;
pub mod state;

// Re-export the router and state so the binary can build the web server.
pub use middleware::{require_visitor, resolve_visitor, CurrentVisitor};
pub use rest::{router, ApiDoc};
pub use state::AppState;
