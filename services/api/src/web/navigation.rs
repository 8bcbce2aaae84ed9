//! services/api/src/web/navigation.rs
//!
//! The Products menu and module gating.

use axum::{
    extract::Path,
    http::StatusCode,
    response::Json,
    Extension,
};
use safety_portal_core::{
    domain::View,
    navigation::{self, Menu, MenuItem, NavigationDecision},
};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::web::middleware::CurrentVisitor;

//=========================================================================================
// Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct MenuItemResponse {
    pub label: String,
    pub view: String,
    pub locked: bool,
}

#[derive(Serialize, ToSchema)]
pub struct MenuCategoryResponse {
    pub label: String,
    pub items: Vec<MenuItemResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct MenuResponse {
    pub categories: Vec<MenuCategoryResponse>,
    pub shortcuts: Vec<MenuItemResponse>,
}

/// What the front end should do with a navigation request.
#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NavigationAction {
    Navigate,
    SignInRequired,
}

#[derive(Serialize, ToSchema)]
pub struct NavigateResponse {
    pub view: String,
    pub action: NavigationAction,
}

impl From<&MenuItem> for MenuItemResponse {
    fn from(item: &MenuItem) -> Self {
        Self {
            label: item.label.to_string(),
            view: item.view.to_string(),
            locked: item.locked,
        }
    }
}

impl From<Menu> for MenuResponse {
    fn from(menu: Menu) -> Self {
        Self {
            categories: menu
                .categories
                .iter()
                .map(|c| MenuCategoryResponse {
                    label: c.label.to_string(),
                    items: c.items.iter().map(MenuItemResponse::from).collect(),
                })
                .collect(),
            shortcuts: menu.shortcuts.iter().map(MenuItemResponse::from).collect(),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /navigation - The Products menu with lock flags for this visitor
#[utoipa::path(
    get,
    path = "/navigation",
    responses(
        (status = 200, description = "Menu tree", body = MenuResponse)
    )
)]
pub async fn menu_handler(Extension(visitor): Extension<CurrentVisitor>) -> Json<MenuResponse> {
    let auth = visitor.auth_state().await;
    Json(navigation::menu_for(&auth).into())
}

/// GET /navigate/{view} - Whether the visitor may open a view
#[utoipa::path(
    get,
    path = "/navigate/{view}",
    params(
        ("view" = String, Path, description = "One of landing, editor, eventtree, faulttree, lopa, qra, hazop, fmea, case-studies.")
    ),
    responses(
        (status = 200, description = "Gate decision", body = NavigateResponse),
        (status = 404, description = "Unknown view")
    )
)]
pub async fn navigate_handler(
    Extension(visitor): Extension<CurrentVisitor>,
    Path(view): Path<String>,
) -> Result<Json<NavigateResponse>, (StatusCode, String)> {
    let view = view
        .parse::<View>()
        .map_err(|e| (StatusCode::NOT_FOUND, e.to_string()))?;
    let auth = visitor.auth_state().await;

    let response = match navigation::navigate(view, &auth) {
        NavigationDecision::Navigate(view) => NavigateResponse {
            view: view.to_string(),
            action: NavigationAction::Navigate,
        },
        NavigationDecision::SignInRequired(view) => {
            info!("Sign-in required before opening {}", view);
            NavigateResponse {
                view: view.to_string(),
                action: NavigationAction::SignInRequired,
            }
        }
    };
    Ok(Json(response))
}
