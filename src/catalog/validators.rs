use super::models::{ServiceDraft, CATEGORIES};
use crate::common::{ValidationResult, Validator};

pub const MAX_TITLE_LEN: usize = 100;
pub const MIN_DURATION_MINUTES: f64 = 15.0;

pub struct ServiceValidator;

impl Validator<ServiceDraft> for ServiceValidator {
    fn validate(&self, data: &ServiceDraft) -> ValidationResult {
        let mut result = ValidationResult::new();

        match data.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => result.ensure(
                title.chars().count() <= MAX_TITLE_LEN,
                "title",
                "Title cannot exceed 100 characters",
            ),
            _ => result.add_error("title", "Please provide a title"),
        }

        if data.description.as_deref().map_or(true, |d| d.is_empty()) {
            result.add_error("description", "Please provide a description");
        }

        match data.price {
            Some(price) => result.ensure(price >= 0.0, "price", "Price cannot be negative"),
            None => result.add_error("price", "Please provide a price"),
        }

        match data.duration {
            Some(duration) => result.ensure(
                duration >= MIN_DURATION_MINUTES,
                "duration",
                "Duration must be at least 15 minutes",
            ),
            None => result.add_error("duration", "Please provide duration in minutes"),
        }

        match data.category.as_deref() {
            Some(category) if !category.is_empty() => {
                if !CATEGORIES.contains(&category) {
                    result.add_error(
                        "category",
                        &format!("`{}` is not a valid enum value for path `category`.", category),
                    );
                }
            }
            _ => result.add_error("category", "Please provide a category"),
        }

        result
    }
}
