//! services/api/src/web/rest.rs
//!
//! Wires the REST handlers into a router and holds the master definition for
//! the OpenAPI specification.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::web::{
    auth::{self, login_handler, logout_handler, me_handler},
    catalog::{self, list_plans_handler, support_handler},
    chat::{
        self, close_conversation_handler, create_conversation_handler, get_conversation_handler,
        send_message_handler,
    },
    checkout::{
        self, close_checkout_handler, close_trial_handler, get_checkout_handler,
        get_trial_handler, select_plan_handler, submit_checkout_handler, submit_trial_handler,
    },
    middleware::{require_visitor, resolve_visitor},
    navigation::{self, menu_handler, navigate_handler},
    state::AppState,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        navigation::menu_handler,
        navigation::navigate_handler,
        catalog::list_plans_handler,
        catalog::support_handler,
        chat::create_conversation_handler,
        chat::get_conversation_handler,
        chat::send_message_handler,
        chat::close_conversation_handler,
        checkout::select_plan_handler,
        checkout::get_checkout_handler,
        checkout::submit_checkout_handler,
        checkout::close_checkout_handler,
        checkout::submit_trial_handler,
        checkout::get_trial_handler,
        checkout::close_trial_handler,
    ),
    components(
        schemas(
            auth::LoginRequest,
            auth::AuthResponse,
            auth::MeResponse,
            navigation::MenuResponse,
            navigation::MenuCategoryResponse,
            navigation::MenuItemResponse,
            navigation::NavigateResponse,
            navigation::NavigationAction,
            catalog::PlanResponse,
            catalog::SupportContactResponse,
            chat::ConversationResponse,
            chat::TurnResponse,
            chat::SendMessageRequest,
            checkout::SelectPlanRequest,
            checkout::BillingForm,
            checkout::TrialForm,
            checkout::CheckoutResponse,
            checkout::TrialResponse,
            checkout::SubmissionStatusResponse,
        )
    ),
    tags(
        (name = "Safety Portal API", description = "Landing page back end: module gating, pricing, checkout, trials and the assistant widget.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

/// Builds the API router.
///
/// Sign-in, checkout and trial routes keep per-visitor state and start a
/// session when the caller has none. Every other route only reads the
/// caller's session, so anonymous browsing creates nothing.
pub fn router(app_state: Arc<AppState>) -> Router {
    let stateful = Router::new()
        .route("/auth/login", post(login_handler))
        .route(
            "/checkout",
            get(get_checkout_handler).delete(close_checkout_handler),
        )
        .route("/checkout/plan", post(select_plan_handler))
        .route("/checkout/submit", post(submit_checkout_handler))
        .route(
            "/trial",
            get(get_trial_handler)
                .post(submit_trial_handler)
                .delete(close_trial_handler),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_visitor,
        ));

    let read_only = Router::new()
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
        .route("/navigation", get(menu_handler))
        .route("/navigate/{view}", get(navigate_handler))
        .route("/plans", get(list_plans_handler))
        .route("/support", get(support_handler))
        .route("/chat", post(create_conversation_handler))
        .route(
            "/chat/{id}",
            get(get_conversation_handler).delete(close_conversation_handler),
        )
        .route("/chat/{id}/messages", post(send_message_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            resolve_visitor,
        ));

    stateful.merge(read_only).with_state(app_state)
}
