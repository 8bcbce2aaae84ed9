pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod conversation;
pub mod domain;
pub mod navigation;
pub mod ports;

pub use domain::{
    AuthState, BillingDetails, ChatRole, ChatTurn, Identity, Order, Plan, Quote,
    SubmissionStatus, SupportContact, TrialRequest, View,
};
pub use ports::{
    AuthError, AuthProvider, ChatCompletionService, PortError, PortResult, SubmissionService,
};
