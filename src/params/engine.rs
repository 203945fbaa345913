//! Rule evaluation: an ordered pipeline of checks per field, first failure
//! rejects the whole request.

use serde_json::Value;
use thiserror::Error;

use super::checks;
use super::input::{FileAttachment, InputRecord};
use super::rules::{Rule, RuleSet};

/// A single parameter violation. `Display` is the message sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("{message}")]
    MissingRequired { field: String, message: String },
    #[error("{field} should be in valid JSON format")]
    InvalidJson { field: String },
    #[error("{field} should be a valid number.")]
    InvalidNumber { field: String },
    #[error("{field} should be an array.")]
    InvalidArray { field: String },
    #[error("{field} should be a positive number.")]
    NotPositive { field: String },
    #[error("Please enter valid phone number.")]
    InvalidPhone { field: String },
    #[error("{field} is required.")]
    MissingFile { field: String },
    #[error("{field} must be a valid file.")]
    InvalidFileType { field: String },
    #[error("{field} must be smaller than {max_mb} MB. Uploaded file is {actual_mb} MB.")]
    FileTooLarge {
        field: String,
        max_mb: String,
        actual_mb: String,
    },
    #[error("{field} must have one of the following extensions: {allowed}.")]
    InvalidFileExtension { field: String, allowed: String },
    #[error("{field} must be one of the following values: {allowed}.")]
    InvalidEnum { field: String, allowed: String },
    #[error("{field} must be a valid 24-hour time in the format HH:MM:SS")]
    InvalidTime { field: String },
    #[error("{field} must be in the format DD-MM-YYYY")]
    InvalidDate { field: String },
}

impl ParamError {
    pub fn field(&self) -> &str {
        match self {
            ParamError::MissingRequired { field, .. }
            | ParamError::InvalidJson { field }
            | ParamError::InvalidNumber { field }
            | ParamError::InvalidArray { field }
            | ParamError::NotPositive { field }
            | ParamError::InvalidPhone { field }
            | ParamError::MissingFile { field }
            | ParamError::InvalidFileType { field }
            | ParamError::FileTooLarge { field, .. }
            | ParamError::InvalidFileExtension { field, .. }
            | ParamError::InvalidEnum { field, .. }
            | ParamError::InvalidTime { field }
            | ParamError::InvalidDate { field } => field,
        }
    }
}

/// Result of validating one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Normalized copy of the input
    Accepted(InputRecord),
    Rejected(ParamError),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted(_))
    }

    pub fn into_result(self) -> Result<InputRecord, ParamError> {
        match self {
            ValidationOutcome::Accepted(record) => Ok(record),
            ValidationOutcome::Rejected(err) => Err(err),
        }
    }
}

/// Legacy per-field behaviour kept out of the generic pipeline.
struct FieldOverride {
    field: &'static str,
    required_message: &'static str,
    /// Converted number is copied into the query as soon as it is known.
    echo_number_to_query: bool,
}

const FIELD_OVERRIDES: &[FieldOverride] = &[
    FieldOverride {
        field: "class_id",
        required_message: "Please select classId",
        echo_number_to_query: true,
    },
    FieldOverride {
        field: "section_id",
        required_message: "Please select sectionId",
        echo_number_to_query: true,
    },
];

fn field_override(field: &str) -> Option<&'static FieldOverride> {
    FIELD_OVERRIDES.iter().find(|o| o.field == field)
}

/// What a step sees for the field under evaluation.
pub(crate) struct FieldCheck<'a> {
    pub field: &'a str,
    pub rule: &'a Rule,
    pub file: Option<&'a FileAttachment>,
}

/// Value being normalized plus side-channel writes.
#[derive(Debug, Default)]
pub(crate) struct FieldState {
    pub value: Option<Value>,
    pub query_echo: Option<Value>,
}

type Step = fn(&FieldCheck<'_>, &mut FieldState) -> Result<(), ParamError>;

const STEPS: [Step; 12] = [
    check_required,
    parse_json,
    trim,
    coerce_number,
    coerce_array,
    check_positive,
    check_phone,
    check_file_presence,
    check_file,
    check_enum,
    check_time,
    check_date,
];

/// Validates `input` against `rules`.
///
/// Each field resolves its value from the query when the query holds a
/// truthy value, and from the body otherwise. On success the final value is
/// written back to whichever of query and body originally held a truthy
/// value; fields without a rule are never touched.
pub fn validate(rules: &RuleSet, input: &InputRecord) -> ValidationOutcome {
    let mut output = input.clone();

    for (field, rule) in rules.iter() {
        let original_query = input.query.get(field);
        let original_body = input.body.get(field);

        let value = match original_query {
            Some(v) if checks::is_truthy(v) => Some(v.clone()),
            _ => original_body.cloned(),
        };

        let check = FieldCheck {
            field,
            rule,
            file: input.file(field),
        };
        let mut state = FieldState {
            value,
            query_echo: None,
        };

        if let Err(err) = run_steps(&check, &mut state) {
            return ValidationOutcome::Rejected(err);
        }

        if let Some(echo) = state.query_echo.take() {
            output.query.insert(field.to_string(), echo);
        }

        if let Some(value) = state.value {
            if original_query.map(checks::is_truthy).unwrap_or(false) {
                output.query.insert(field.to_string(), value.clone());
            }
            if original_body.map(checks::is_truthy).unwrap_or(false) {
                output.body.insert(field.to_string(), value);
            }
        }
    }

    ValidationOutcome::Accepted(output)
}

pub(crate) fn run_steps(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    STEPS.iter().try_for_each(|step| step(check, state))
}

fn check_required(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    if check.rule.required && checks::is_blank(state.value.as_ref()) {
        let message = match field_override(check.field) {
            Some(o) => o.required_message.to_string(),
            None => format!("{} is required", check.field),
        };
        return Err(ParamError::MissingRequired {
            field: check.field.to_string(),
            message,
        });
    }
    Ok(())
}

fn parse_json(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    if !check.rule.json {
        return Ok(());
    }
    if let Some(value) = state.value.as_ref().filter(|v| checks::is_truthy(v)) {
        let parsed = checks::parse_json(value).ok_or_else(|| ParamError::InvalidJson {
            field: check.field.to_string(),
        })?;
        state.value = Some(parsed);
    }
    Ok(())
}

fn trim(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    if check.rule.trim {
        state.value = state.value.take().map(checks::trim_value);
    }
    Ok(())
}

fn coerce_number(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    if !check.rule.numeric {
        return Ok(());
    }
    if let Some(value) = state.value.as_ref() {
        let number = checks::to_number(value).ok_or_else(|| ParamError::InvalidNumber {
            field: check.field.to_string(),
        })?;
        let converted = checks::number_value(number);
        if field_override(check.field).map_or(false, |o| o.echo_number_to_query) {
            state.query_echo = Some(converted.clone());
        }
        state.value = Some(converted);
    }
    Ok(())
}

fn coerce_array(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    if !check.rule.array {
        return Ok(());
    }
    if let Some(value) = state.value.as_ref() {
        let array = checks::to_array(value).ok_or_else(|| ParamError::InvalidArray {
            field: check.field.to_string(),
        })?;
        state.value = Some(array);
    }
    Ok(())
}

fn check_positive(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    match state.value.as_ref() {
        Some(value) if check.rule.positive && !checks::is_positive(value) => {
            Err(ParamError::NotPositive {
                field: check.field.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn check_phone(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    match state.value.as_ref() {
        Some(value) if check.rule.phone && !checks::is_valid_phone(value) => {
            Err(ParamError::InvalidPhone {
                field: check.field.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn check_file_presence(check: &FieldCheck<'_>, _state: &mut FieldState) -> Result<(), ParamError> {
    if check.rule.file_required && check.file.is_none() {
        return Err(ParamError::MissingFile {
            field: check.field.to_string(),
        });
    }
    Ok(())
}

fn check_file(check: &FieldCheck<'_>, _state: &mut FieldState) -> Result<(), ParamError> {
    let Some(file) = check.file else {
        return Ok(());
    };
    let rule = check.rule;

    if let Some(types) = &rule.allowed_file_types {
        if !checks::is_allowed_file_type(file, types) {
            return Err(ParamError::InvalidFileType {
                field: check.field.to_string(),
            });
        }
    }

    if let Some(max) = rule.max_file_size.filter(|max| *max > 0) {
        if !checks::is_within_file_size(file, max) {
            let actual = checks::megabytes(file.size);
            let actual_mb = if actual >= 1.0 {
                format!("{}", actual.round())
            } else {
                format!("{:.2}", actual)
            };
            return Err(ParamError::FileTooLarge {
                field: check.field.to_string(),
                max_mb: checks::format_number(checks::megabytes(max)),
                actual_mb,
            });
        }
    }

    if let Some(extensions) = &rule.allowed_file_extensions {
        if !checks::has_allowed_extension(file, extensions) {
            return Err(ParamError::InvalidFileExtension {
                field: check.field.to_string(),
                allowed: extensions.join(", "),
            });
        }
    }

    Ok(())
}

fn check_enum(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    let (Some(allowed), Some(value)) = (&check.rule.enum_values, state.value.as_ref()) else {
        return Ok(());
    };
    if !checks::is_valid_enum(value, allowed) {
        return Err(ParamError::InvalidEnum {
            field: check.field.to_string(),
            allowed: allowed.join(", "),
        });
    }
    Ok(())
}

fn check_time(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    match state.value.as_ref() {
        Some(value) if check.rule.time && !checks::is_valid_time(value) => {
            Err(ParamError::InvalidTime {
                field: check.field.to_string(),
            })
        }
        _ => Ok(()),
    }
}

fn check_date(check: &FieldCheck<'_>, state: &mut FieldState) -> Result<(), ParamError> {
    match state.value.as_ref() {
        Some(value) if check.rule.date && !checks::is_valid_date(value) => {
            Err(ParamError::InvalidDate {
                field: check.field.to_string(),
            })
        }
        _ => Ok(()),
    }
}
