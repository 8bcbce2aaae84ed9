//! crates/safety_portal_core/src/catalog.rs
//!
//! Static content of the landing page: pricing tiers and support contacts.

use rust_decimal::Decimal;

use crate::domain::{Plan, SupportContact};

pub fn standard_plans() -> Vec<Plan> {
    vec![
        Plan {
            name: "Monthly Plan".to_string(),
            price: Decimal::from(15),
            billing_period: "month".to_string(),
        },
        Plan {
            name: "Quarterly Plan".to_string(),
            price: Decimal::from(30),
            billing_period: "3 months".to_string(),
        },
        Plan {
            name: "Yearly Plan".to_string(),
            price: Decimal::from(100),
            billing_period: "year".to_string(),
        },
    ]
}

/// Looks a plan up by name, ignoring case.
pub fn find_plan(name: &str) -> Option<Plan> {
    standard_plans()
        .into_iter()
        .find(|plan| plan.name.eq_ignore_ascii_case(name.trim()))
}

pub const SUPPORT_CONTACTS: [SupportContact; 4] = [
    SupportContact {
        department: "Support",
        email: "support@sfl.com.pk",
    },
    SupportContact {
        department: "Quantitative Analysis",
        email: "Quantitative.Analysis@sfl.com.pk",
    },
    SupportContact {
        department: "Qualitative Analysis",
        email: "Qualitative.Analysis@sfl.com.pk",
    },
    SupportContact {
        department: "Semi-Quantitative Analysis",
        email: "Semi-Quantitative.Analysis@sfl.com.pk",
    },
];
