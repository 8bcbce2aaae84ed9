//! services/api/src/web/checkout.rs
//!
//! Checkout and free-trial endpoints. Submissions run in the background; the
//! front end polls the status until it leaves `pending`.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    Extension,
};
use safety_portal_core::{
    catalog::find_plan,
    checkout::{CheckoutFlow, SubmitError},
    domain::{BillingDetails, SubmissionStatus, TrialRequest},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::web::catalog::PlanResponse;
use crate::web::state::{AppState, VisitorSession};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SelectPlanRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct BillingForm {
    pub full_name: String,
    pub email: String,
    pub whatsapp: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
}

#[derive(Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct TrialForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub role: String,
}

#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionStatusResponse {
    Idle,
    Pending,
    Succeeded,
    Failed { reason: String },
}

#[derive(Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// `None` when no plan is selected; `tax` and `total` come from the plan.
    pub plan: Option<PlanResponse>,
    pub billing: BillingForm,
    pub status: SubmissionStatusResponse,
}

#[derive(Serialize, ToSchema)]
pub struct TrialResponse {
    pub status: SubmissionStatusResponse,
}

impl From<&SubmissionStatus> for SubmissionStatusResponse {
    fn from(status: &SubmissionStatus) -> Self {
        match status {
            SubmissionStatus::Idle => Self::Idle,
            SubmissionStatus::Pending => Self::Pending,
            SubmissionStatus::Succeeded => Self::Succeeded,
            SubmissionStatus::Failed { reason } => Self::Failed {
                reason: reason.clone(),
            },
        }
    }
}

impl From<&BillingDetails> for BillingForm {
    fn from(b: &BillingDetails) -> Self {
        Self {
            full_name: b.full_name.clone(),
            email: b.email.clone(),
            whatsapp: b.whatsapp.clone(),
            address: b.address.clone(),
            city: b.city.clone(),
            zip: b.zip.clone(),
            country: b.country.clone(),
        }
    }
}

impl From<BillingForm> for BillingDetails {
    fn from(f: BillingForm) -> Self {
        Self {
            full_name: f.full_name,
            email: f.email,
            whatsapp: f.whatsapp,
            address: f.address,
            city: f.city,
            zip: f.zip,
            country: f.country,
        }
    }
}

impl From<TrialForm> for TrialRequest {
    fn from(f: TrialForm) -> Self {
        Self {
            name: f.name,
            email: f.email,
            company: f.company,
            role: f.role,
        }
    }
}

fn checkout_response(flow: &CheckoutFlow) -> CheckoutResponse {
    CheckoutResponse {
        plan: flow.plan().map(PlanResponse::from),
        billing: BillingForm::from(flow.billing()),
        status: flow.status().into(),
    }
}

fn submit_error_status(e: &SubmitError) -> StatusCode {
    match e {
        SubmitError::NoPlanSelected | SubmitError::AlreadyPending => StatusCode::CONFLICT,
        SubmitError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

//=========================================================================================
// Checkout Handlers
//=========================================================================================

/// POST /checkout/plan - Select a plan, resetting any earlier checkout
#[utoipa::path(
    post,
    path = "/checkout/plan",
    request_body = SelectPlanRequest,
    responses(
        (status = 200, description = "Plan selected", body = CheckoutResponse),
        (status = 404, description = "Unknown plan")
    )
)]
pub async fn select_plan_handler(
    Extension(visitor): Extension<Arc<VisitorSession>>,
    Json(req): Json<SelectPlanRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, String)> {
    let plan = find_plan(&req.name)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown plan: {}", req.name)))?;
    let auth = visitor.auth.current_identity().await;

    let mut flow = visitor.checkout.lock().await;
    flow.select_plan(plan, &auth);
    Ok(Json(checkout_response(&flow)))
}

/// GET /checkout - The selected plan, its quote and submission status
#[utoipa::path(
    get,
    path = "/checkout",
    responses(
        (status = 200, description = "Checkout state", body = CheckoutResponse)
    )
)]
pub async fn get_checkout_handler(
    Extension(visitor): Extension<Arc<VisitorSession>>,
) -> Json<CheckoutResponse> {
    let flow = visitor.checkout.lock().await;
    Json(checkout_response(&flow))
}

/// POST /checkout/submit - Confirm the order
#[utoipa::path(
    post,
    path = "/checkout/submit",
    request_body = BillingForm,
    responses(
        (status = 202, description = "Order accepted and pending", body = CheckoutResponse),
        (status = 409, description = "No plan selected, or a submission is already pending"),
        (status = 422, description = "A required field is missing")
    )
)]
pub async fn submit_checkout_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Arc<VisitorSession>>,
    Json(form): Json<BillingForm>,
) -> Result<(StatusCode, Json<CheckoutResponse>), (StatusCode, String)> {
    let mut flow = visitor.checkout.lock().await;
    let (order, token) = flow.begin_submission(form.into()).map_err(|e| {
        warn!("Checkout submission refused: {}", e);
        (submit_error_status(&e), e.to_string())
    })?;
    let response = checkout_response(&flow);
    drop(flow);

    info!("Submitting order for {}", order.plan.name);
    let adapter = state.submission_adapter.clone();
    let visitor = visitor.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Checkout changed while the order was pending; submission abandoned.");
            }
            result = adapter.submit_order(&order) => {
                if let Err(e) = &result {
                    error!("Order submission failed: {:?}", e);
                }
                visitor.checkout.lock().await.finish_submission(&token, result);
            }
        }
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// DELETE /checkout - Close the checkout dialog
#[utoipa::path(
    delete,
    path = "/checkout",
    responses(
        (status = 204, description = "Checkout closed")
    )
)]
pub async fn close_checkout_handler(
    Extension(visitor): Extension<Arc<VisitorSession>>,
) -> StatusCode {
    visitor.checkout.lock().await.close();
    StatusCode::NO_CONTENT
}

//=========================================================================================
// Trial Handlers
//=========================================================================================

/// POST /trial - Request a free trial
#[utoipa::path(
    post,
    path = "/trial",
    request_body = TrialForm,
    responses(
        (status = 202, description = "Trial request accepted and pending", body = TrialResponse),
        (status = 409, description = "A trial request is already pending"),
        (status = 422, description = "A required field is missing")
    )
)]
pub async fn submit_trial_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Arc<VisitorSession>>,
    Json(form): Json<TrialForm>,
) -> Result<(StatusCode, Json<TrialResponse>), (StatusCode, String)> {
    let request: TrialRequest = form.into();
    let mut flow = visitor.trial.lock().await;
    let token = flow.begin_submission(&request).map_err(|e| {
        warn!("Trial request refused: {}", e);
        (submit_error_status(&e), e.to_string())
    })?;
    let response = TrialResponse {
        status: flow.status().into(),
    };
    drop(flow);

    let adapter = state.submission_adapter.clone();
    let visitor = visitor.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                info!("Trial dialog closed while the request was pending; submission abandoned.");
            }
            result = adapter.submit_trial(&request) => {
                if let Err(e) = &result {
                    error!("Trial submission failed: {:?}", e);
                }
                visitor.trial.lock().await.finish_submission(&token, result);
            }
        }
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /trial - Status of the visitor's trial request
#[utoipa::path(
    get,
    path = "/trial",
    responses(
        (status = 200, description = "Trial request status", body = TrialResponse)
    )
)]
pub async fn get_trial_handler(
    Extension(visitor): Extension<Arc<VisitorSession>>,
) -> Json<TrialResponse> {
    let flow = visitor.trial.lock().await;
    Json(TrialResponse {
        status: flow.status().into(),
    })
}

/// DELETE /trial - Close the trial dialog, forgetting the last request's outcome
#[utoipa::path(
    delete,
    path = "/trial",
    responses(
        (status = 204, description = "Trial dialog closed")
    )
)]
pub async fn close_trial_handler(Extension(visitor): Extension<Arc<VisitorSession>>) -> StatusCode {
    visitor.trial.lock().await.close();
    StatusCode::NO_CONTENT
}
