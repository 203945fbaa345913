use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::models::BookingDraft;
use crate::common::{ValidationResult, Validator};

pub const MAX_NOTES_LEN: usize = 500;

/// RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`. Naive forms are read as UTC.
pub fn parse_booking_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub struct BookingValidator;

impl Validator<BookingDraft> for BookingValidator {
    fn validate(&self, data: &BookingDraft) -> ValidationResult {
        let mut result = ValidationResult::new();

        match data.booking_date.as_deref() {
            Some(raw) if !raw.is_empty() => result.ensure(
                parse_booking_date(raw).is_some(),
                "bookingDate",
                &format!(
                    "Cast to date failed for value \"{}\" at path \"bookingDate\"",
                    raw
                ),
            ),
            _ => result.add_error("bookingDate", "Please provide a booking date"),
        }

        if let Some(notes) = data.notes.as_deref() {
            result.ensure(
                notes.chars().count() <= MAX_NOTES_LEN,
                "notes",
                "Notes cannot exceed 500 characters",
            );
        }

        result
    }
}
