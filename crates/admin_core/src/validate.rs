//! Submit-time validation: runs the declared schema and flattens the
//! outcome to one message per offending field.

use validator::{Validate, ValidationError};

use crate::form::{FieldErrors, FormField, UserFormValues};

/// Validates a candidate working copy against the schema. Returns the
/// field -> first-violated-message map on failure; the caller decides
/// where to record it.
pub fn check(values: &UserFormValues) -> Result<(), FieldErrors> {
    let violations = match values.validate() {
        Ok(()) => return Ok(()),
        Err(violations) => violations,
    };

    let mut errors = FieldErrors::new();
    for (key, field_violations) in violations.field_errors() {
        let Some(field) = FormField::from_schema_key(key.as_ref()) else {
            continue;
        };
        if let Some(message) = first_message(field_violations) {
            errors.insert(field, message);
        }
    }
    Err(errors)
}

// An empty required field also fails the format check; the required
// message takes precedence.
fn first_message(violations: &[ValidationError]) -> Option<String> {
    let violation = violations
        .iter()
        .find(|violation| violation.code == "length")
        .or_else(|| violations.first())?;
    Some(
        violation
            .message
            .as_ref()
            .map(|message| message.to_string())
            .unwrap_or_else(|| format!("Invalid value ({}).", violation.code)),
    )
}

#[cfg(test)]
#[path = "tests/validate_tests.rs"]
mod tests;
