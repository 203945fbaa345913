use once_cell::sync::Lazy;
use regex::Regex;

use super::models::{Role, SignupRequest};
use crate::common::{ValidationResult, Validator};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const MIN_PASSWORD_LEN: usize = 6;

pub struct SignupValidator;

impl Validator<SignupRequest> for SignupValidator {
    fn validate(&self, data: &SignupRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let name = data.name.as_deref().unwrap_or_default();
        result.ensure(!name.trim().is_empty(), "name", "Please add a name");

        match data.email.as_deref() {
            Some(email) if !email.is_empty() => {
                result.ensure(EMAIL_REGEX.is_match(email), "email", "Please add a valid email")
            }
            _ => result.add_error("email", "Please add an email"),
        }

        match data.password.as_deref() {
            Some(password) if !password.is_empty() => result.ensure(
                password.chars().count() >= MIN_PASSWORD_LEN,
                "password",
                "Password must be at least 6 characters",
            ),
            _ => result.add_error("password", "Please add a password"),
        }

        if let Some(role) = data.role.as_deref() {
            result.ensure(role.parse::<Role>().is_ok(), "role", "Please provide a valid role");
        }

        result
    }
}
