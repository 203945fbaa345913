//! # Params Module
//!
//! Declarative request parameter validation:
//! - `Rule` / `RuleSet` declarations per route
//! - the ordered check pipeline producing a normalized record
//! - the axum route layer and `ValidatedParams` extractor

pub mod checks;
pub mod engine;
pub mod input;
pub mod middleware;
pub mod rules;

#[cfg(test)]
mod tests;

pub use engine::{validate, ParamError, ValidationOutcome};
pub use input::{FileAttachment, Fields, InputRecord};
pub use middleware::{validate_params, ValidatedParams};
pub use rules::{Rule, RuleSet};
