//! crates/safety_portal_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

//=========================================================================================
// Identity and Auth State
//=========================================================================================

/// The signed-in user. Only exists while a session is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Whether a visitor is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Anonymous => None,
            AuthState::Authenticated(identity) => Some(identity),
        }
    }
}

//=========================================================================================
// Chat
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message in a conversation. Never mutated once appended.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, text)
    }

    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

//=========================================================================================
// Plans, Quotes and Orders
//=========================================================================================

/// A billing tier that can be selected for checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub name: String,
    pub price: Decimal,
    pub billing_period: String,
}

/// Tax and total for a plan. Values are unrounded; rounding is for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub tax: Decimal,
    pub total: Decimal,
}

impl Quote {
    pub fn display_tax(&self) -> String {
        display_amount(self.tax)
    }

    pub fn display_total(&self) -> String {
        display_amount(self.total)
    }
}

/// Formats a money amount with two decimal places, rounding halves away from zero.
pub fn display_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Billing details collected by the checkout form. `zip` is the only optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingDetails {
    pub full_name: String,
    pub email: String,
    pub whatsapp: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

/// A confirmed checkout handed to the submission backend.
#[derive(Debug, Clone)]
pub struct Order {
    pub plan: Plan,
    pub billing: BillingDetails,
    pub quote: Quote,
}

/// A free-trial request. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialRequest {
    pub name: String,
    pub email: String,
    pub company: String,
    pub role: String,
}

/// Progress of a mocked asynchronous submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed { reason: String },
}

impl SubmissionStatus {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionStatus::Succeeded)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionStatus::Pending)
    }
}

/// A department that can be contacted from the support dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportContact {
    pub department: &'static str,
    pub email: &'static str,
}

//=========================================================================================
// Navigation Views
//=========================================================================================

/// The named views the front-end router can present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Landing,
    /// The BowTie editor.
    Editor,
    EventTree,
    FaultTree,
    Lopa,
    Qra,
    Hazop,
    Fmea,
    CaseStudies,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown view: {0}")]
pub struct UnknownView(pub String);

impl View {
    pub const ALL: [View; 9] = [
        View::Landing,
        View::Editor,
        View::EventTree,
        View::FaultTree,
        View::Lopa,
        View::Qra,
        View::Hazop,
        View::Fmea,
        View::CaseStudies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Landing => "landing",
            View::Editor => "editor",
            View::EventTree => "eventtree",
            View::FaultTree => "faulttree",
            View::Lopa => "lopa",
            View::Qra => "qra",
            View::Hazop => "hazop",
            View::Fmea => "fmea",
            View::CaseStudies => "case-studies",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landing" => Ok(View::Landing),
            "editor" | "bowtie" => Ok(View::Editor),
            "eventtree" => Ok(View::EventTree),
            "faulttree" => Ok(View::FaultTree),
            "lopa" => Ok(View::Lopa),
            "qra" => Ok(View::Qra),
            "hazop" => Ok(View::Hazop),
            "fmea" => Ok(View::Fmea),
            "case-studies" => Ok(View::CaseStudies),
            _ => Err(UnknownView(s.to_string())),
        }
    }
}
