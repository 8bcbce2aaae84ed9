//! crates/safety_portal_core/src/navigation.rs
//!
//! The Products menu and the gate decision for a navigation request.

use crate::auth::can_enter;
use crate::domain::{AuthState, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: &'static str,
    pub view: View,
    /// True when clicking the item would open the sign-in dialog instead.
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCategory {
    pub label: &'static str,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub categories: Vec<MenuCategory>,
    /// Top-level entries shown next to the Products menu.
    pub shortcuts: Vec<MenuItem>,
}

const CATEGORIES: [(&str, &[(&str, View)]); 3] = [
    (
        "Qualitative Analysis",
        &[
            ("BowTie Analysis", View::Editor),
            ("Fault Tree Analysis", View::FaultTree),
            ("Event Tree Analysis", View::EventTree),
        ],
    ),
    (
        "Semi-Quantitative",
        &[
            ("HAZOP Study", View::Hazop),
            ("LOPA", View::Lopa),
            ("FMEA", View::Fmea),
        ],
    ),
    ("Quantitative Analysis", &[("QRA", View::Qra)]),
];

const SHORTCUTS: [(&str, View); 1] = [("Case Studies", View::CaseStudies)];

fn item(label: &'static str, view: View, auth: &AuthState) -> MenuItem {
    MenuItem {
        label,
        view,
        locked: !can_enter(view, auth),
    }
}

/// Builds the menu with lock flags for the given visitor.
pub fn menu_for(auth: &AuthState) -> Menu {
    let categories = CATEGORIES
        .iter()
        .map(|&(label, items)| MenuCategory {
            label,
            items: items
                .iter()
                .map(|&(item_label, view)| item(item_label, view, auth))
                .collect(),
        })
        .collect();
    let shortcuts = SHORTCUTS
        .iter()
        .map(|&(label, view)| item(label, view, auth))
        .collect();

    Menu {
        categories,
        shortcuts,
    }
}

/// The answer to "open this view".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDecision {
    Navigate(View),
    SignInRequired(View),
}

pub fn navigate(view: View, auth: &AuthState) -> NavigationDecision {
    if can_enter(view, auth) {
        NavigationDecision::Navigate(view)
    } else {
        NavigationDecision::SignInRequired(view)
    }
}
