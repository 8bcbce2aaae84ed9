//! services/api/src/adapters/submissions.rs
//!
//! A stand-in for the order and trial backend. It waits for a fixed delay and
//! logs the payload; nothing is persisted or sent anywhere.

use async_trait::async_trait;
use safety_portal_core::{
    domain::{Order, TrialRequest},
    ports::{PortResult, SubmissionService},
};
use std::time::Duration;
use tracing::info;

#[derive(Clone, Debug)]
pub struct MockSubmissionAdapter {
    checkout_delay: Duration,
    trial_delay: Duration,
}

impl MockSubmissionAdapter {
    pub fn new(checkout_delay: Duration, trial_delay: Duration) -> Self {
        Self {
            checkout_delay,
            trial_delay,
        }
    }
}

#[async_trait]
impl SubmissionService for MockSubmissionAdapter {
    async fn submit_order(&self, order: &Order) -> PortResult<()> {
        tokio::time::sleep(self.checkout_delay).await;
        // Orders are invoiced manually from this log line.
        info!(
            plan = %order.plan.name,
            customer = %order.billing.full_name,
            email = %order.billing.email,
            country = %order.billing.country,
            tax = %order.quote.display_tax(),
            total = %order.quote.display_total(),
            "Order submitted"
        );
        Ok(())
    }

    async fn submit_trial(&self, request: &TrialRequest) -> PortResult<()> {
        tokio::time::sleep(self.trial_delay).await;
        info!(
            name = %request.name,
            email = %request.email,
            company = %request.company,
            "Trial requested"
        );
        Ok(())
    }
}
