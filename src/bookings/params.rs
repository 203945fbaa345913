//! Parameter rules for booking routes

use once_cell::sync::Lazy;

use super::models::BOOKING_STATUSES;
use crate::params::{Rule, RuleSet};

pub static ADD_BOOKING: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new()
        .field("bookingDate", Rule::new().trim().required())
        .field("notes", Rule::new().trim())
});

pub static UPDATE_BOOKING_STATUS: Lazy<RuleSet> =
    Lazy::new(|| RuleSet::new().field("status", Rule::new().one_of(BOOKING_STATUSES)));
