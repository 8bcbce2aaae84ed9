//! crates/safety_portal_core/src/checkout.rs
//!
//! Pricing, form validation and the mocked submission flows for checkout and
//! free-trial requests.

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::{
    AuthState, BillingDetails, Order, Plan, Quote, SubmissionStatus, TrialRequest,
};
use crate::ports::PortResult;

//=========================================================================================
// Quote
//=========================================================================================

/// Computes tax (10%) and total for `plan`. Nothing is rounded here.
pub fn quote(plan: &Plan) -> Quote {
    let tax = plan.price * Decimal::new(10, 2);
    Quote {
        tax,
        total: plan.price + tax,
    }
}

//=========================================================================================
// Form Validation
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("No plan is selected")]
    NoPlanSelected,
    #[error("A submission is already in progress")]
    AlreadyPending,
    #[error(transparent)]
    Form(#[from] FormError),
}

fn require(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        return Err(FormError::MissingField(field));
    }
    Ok(())
}

/// Every billing field except `zip` must be filled in.
pub fn validate_billing(billing: &BillingDetails) -> Result<(), FormError> {
    require("full_name", &billing.full_name)?;
    require("email", &billing.email)?;
    require("whatsapp", &billing.whatsapp)?;
    require("address", &billing.address)?;
    require("city", &billing.city)?;
    require("country", &billing.country)?;
    Ok(())
}

pub fn validate_trial(request: &TrialRequest) -> Result<(), FormError> {
    require("name", &request.name)?;
    require("email", &request.email)?;
    require("company", &request.company)?;
    require("role", &request.role)?;
    Ok(())
}

//=========================================================================================
// Checkout Flow
//=========================================================================================

/// The checkout dialog: at most one selected plan and its submission status.
#[derive(Debug, Default)]
pub struct CheckoutFlow {
    plan: Option<Plan>,
    billing: BillingDetails,
    status: SubmissionStatus,
    /// Cancelled whenever the selection changes, so stale results are dropped.
    cancellation_token: CancellationToken,
}

impl CheckoutFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn billing(&self) -> &BillingDetails {
        &self.billing
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Recomputed from the current plan on every call.
    pub fn quote(&self) -> Option<Quote> {
        self.plan.as_ref().map(quote)
    }

    /// Replaces the selection and starts a fresh form, prefilled from the identity.
    pub fn select_plan(&mut self, plan: Plan, auth: &AuthState) {
        self.reset();
        self.billing = match auth {
            AuthState::Authenticated(identity) => BillingDetails {
                full_name: identity.name.clone(),
                email: identity.email.clone(),
                ..BillingDetails::default()
            },
            AuthState::Anonymous => BillingDetails::default(),
        };
        info!("Plan selected: {}", plan.name);
        self.plan = Some(plan);
    }

    pub fn close(&mut self) {
        self.reset();
        self.plan = None;
        self.billing = BillingDetails::default();
    }

    fn reset(&mut self) {
        self.cancellation_token.cancel();
        self.cancellation_token = CancellationToken::new();
        self.status = SubmissionStatus::Idle;
    }

    /// Validates the form and moves to `Pending`.
    ///
    /// The returned token is cancelled if the plan changes before the
    /// submission finishes.
    pub fn begin_submission(
        &mut self,
        billing: BillingDetails,
    ) -> Result<(Order, CancellationToken), SubmitError> {
        let plan = self.plan.clone().ok_or(SubmitError::NoPlanSelected)?;
        if self.status.is_pending() {
            return Err(SubmitError::AlreadyPending);
        }
        validate_billing(&billing)?;

        self.billing = billing.clone();
        self.status = SubmissionStatus::Pending;
        let order = Order {
            quote: quote(&plan),
            plan,
            billing,
        };
        Ok((order, self.cancellation_token.clone()))
    }

    /// Records the outcome of a submission. Returns `false` if it was stale.
    pub fn finish_submission(&mut self, token: &CancellationToken, result: PortResult<()>) -> bool {
        if token.is_cancelled() {
            warn!("Discarding checkout result for a plan that is no longer selected.");
            return false;
        }
        self.status = match result {
            Ok(()) => SubmissionStatus::Succeeded,
            Err(e) => SubmissionStatus::Failed {
                reason: e.to_string(),
            },
        };
        true
    }
}

//=========================================================================================
// Trial Flow
//=========================================================================================

/// The free-trial dialog. Closing it forgets the last request's outcome.
#[derive(Debug, Default)]
pub struct TrialFlow {
    status: SubmissionStatus,
    cancellation_token: CancellationToken,
}

impl TrialFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    pub fn close(&mut self) {
        self.cancellation_token.cancel();
        self.cancellation_token = CancellationToken::new();
        self.status = SubmissionStatus::Idle;
    }

    pub fn begin_submission(
        &mut self,
        request: &TrialRequest,
    ) -> Result<CancellationToken, SubmitError> {
        if self.status.is_pending() {
            return Err(SubmitError::AlreadyPending);
        }
        validate_trial(request)?;
        self.status = SubmissionStatus::Pending;
        Ok(self.cancellation_token.clone())
    }

    /// Records the outcome of a request. Returns `false` if the dialog was
    /// closed in the meantime.
    pub fn finish_submission(&mut self, token: &CancellationToken, result: PortResult<()>) -> bool {
        if token.is_cancelled() {
            warn!("Discarding trial result for a closed dialog.");
            return false;
        }
        self.status = match result {
            Ok(()) => SubmissionStatus::Succeeded,
            Err(e) => SubmissionStatus::Failed {
                reason: e.to_string(),
            },
        };
        true
    }
}
