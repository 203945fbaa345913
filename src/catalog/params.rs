//! Parameter rules for service routes

use once_cell::sync::Lazy;

use super::models::CATEGORIES;
use crate::params::{Rule, RuleSet};

fn service_fields() -> RuleSet {
    RuleSet::new()
        .field("title", Rule::new().trim().required())
        .field("description", Rule::new().trim().required())
        .field("price", Rule::new().trim().required().numeric())
        .field("duration", Rule::new().trim().required().numeric())
        .field("category", Rule::new().trim().one_of(CATEGORIES))
}

pub static ADD_SERVICE: Lazy<RuleSet> = Lazy::new(service_fields);

pub static UPDATE_SERVICE: Lazy<RuleSet> = Lazy::new(service_fields);
