//! services/api/src/web/catalog.rs
//!
//! Read-only landing page content: pricing tiers and support contacts.

use axum::response::Json;
use safety_portal_core::{
    catalog::{standard_plans, SUPPORT_CONTACTS},
    checkout::quote,
    domain::{display_amount, Plan},
};
use serde::Serialize;
use utoipa::ToSchema;

/// A pricing tier. Amounts are decimal strings with two places.
#[derive(Serialize, ToSchema)]
pub struct PlanResponse {
    pub name: String,
    pub price: String,
    pub billing_period: String,
    pub tax: String,
    pub total: String,
}

impl From<&Plan> for PlanResponse {
    fn from(plan: &Plan) -> Self {
        let quote = quote(plan);
        Self {
            name: plan.name.clone(),
            price: display_amount(plan.price),
            billing_period: plan.billing_period.clone(),
            tax: quote.display_tax(),
            total: quote.display_total(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SupportContactResponse {
    pub department: String,
    pub email: String,
}

/// GET /plans - The available pricing tiers
#[utoipa::path(
    get,
    path = "/plans",
    responses(
        (status = 200, description = "Pricing tiers", body = [PlanResponse])
    )
)]
pub async fn list_plans_handler() -> Json<Vec<PlanResponse>> {
    Json(standard_plans().iter().map(PlanResponse::from).collect())
}

/// GET /support - Who to contact for help
#[utoipa::path(
    get,
    path = "/support",
    responses(
        (status = 200, description = "Support contacts", body = [SupportContactResponse])
    )
)]
pub async fn support_handler() -> Json<Vec<SupportContactResponse>> {
    Json(
        SUPPORT_CONTACTS
            .iter()
            .map(|c| SupportContactResponse {
                department: c.department.to_string(),
                email: c.email.to_string(),
            })
            .collect(),
    )
}
