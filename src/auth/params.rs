//! Parameter rules for auth routes

use once_cell::sync::Lazy;

use crate::params::{Rule, RuleSet};

pub static SIGNUP: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new()
        .field("name", Rule::new().trim().required())
        .field("email", Rule::new().trim().required())
        .field("password", Rule::new().trim().required())
        .field(
            "role",
            Rule::new()
                .trim()
                .required()
                .one_of(["user", "provider", "admin"]),
        )
});

pub static LOGIN: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new()
        .field("email", Rule::new().trim().required())
        .field("password", Rule::new().trim().required())
});
