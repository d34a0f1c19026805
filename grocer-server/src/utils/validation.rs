//! Input validation helpers
//!
//! Text length limits shared by the catalog and order handlers.
//! SQLite TEXT has no built-in length enforcement.
//! Request bodies with `#[derive(Validate)]` go through [`validate_payload`].

use validator::Validate;

use crate::utils::AppError;

/// Entity names: product, category
pub const MAX_NAME_LEN: usize = 200;

/// Product descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Payment method labels
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

/// Delivery addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a non-negative amount (price, stock)
pub fn validate_non_negative(value: i64, field: &str) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::validation(format!(
            "{field} must be at least 0 (got {value})"
        )));
    }
    Ok(())
}

/// Trim an optional string, mapping blank to `None`
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Run `validator` rules; the first failing field's message becomes the error message
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    let Err(errors) = payload.validate() else {
        return Ok(());
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let messages: Vec<(String, Vec<String>)> = fields
        .into_iter()
        .map(|(field, errs)| {
            let texts = errs
                .iter()
                .map(|e| match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("{field} is invalid"),
                })
                .collect();
            (field.to_string(), texts)
        })
        .collect();

    let summary = messages
        .first()
        .and_then(|(_, texts)| texts.first().cloned())
        .unwrap_or_else(|| "Invalid request payload".to_string());

    Err(messages
        .into_iter()
        .fold(AppError::validation(summary), |err, (field, texts)| {
            err.with_detail(field, texts)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 3, message = "Username is too short"))]
        username: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_validate_payload_reports_fields() {
        let ok = Signup {
            username: "malee".into(),
            email: "malee@example.com".into(),
        };
        assert!(validate_payload(&ok).is_ok());

        let bad = Signup {
            username: "ma".into(),
            email: "nope".into(),
        };
        let err = validate_payload(&bad).unwrap_err();
        // fields are sorted: email first
        assert_eq!(err.message, "email is invalid");
        let details = err.details.unwrap();
        assert_eq!(details["username"][0], "Username is too short");
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Mango", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  12 Road ".into())), Some("12 Road".into()));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_non_negative() {
        assert!(validate_non_negative(0, "stock").is_ok());
        assert!(validate_non_negative(-1, "stock").is_err());
    }
}
