//! Field validation with form-style messages.
//!
//! Each check returns the first failure as [`AppError::Validation`] so the
//! client can attach the message to the offending field.

use crate::error::{AppError, Result};

pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(
            field,
            format!("The {} field is required.", field),
        ));
    }
    Ok(value)
}

pub fn max_chars(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(AppError::validation(
            field,
            format!(
                "The {} field must not be greater than {} characters.",
                field, max
            ),
        ));
    }
    Ok(())
}

pub fn min_chars(field: &str, value: &str, min: usize) -> Result<()> {
    if value.chars().count() < min {
        return Err(AppError::validation(
            field,
            format!("The {} field must be at least {} characters.", field, min),
        ));
    }
    Ok(())
}

pub fn email(field: &str, value: &str) -> Result<()> {
    if !is_email(value) {
        return Err(AppError::validation(
            field,
            format!("The {} field must be a valid email address.", field),
        ));
    }
    Ok(())
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims() {
        assert_eq!(required("name", "  Ada ").unwrap(), "Ada");
        let err = required("name", "   ").unwrap_err();
        assert!(
            matches!(err, AppError::Validation { field, message } if field == "name" && message == "The name field is required.")
        );
    }

    #[test]
    fn email_shape() {
        assert!(email("email", "a@b.co").is_ok());
        assert!(email("email", "ab.co").is_err());
        assert!(email("email", "a@@b.co").is_err());
        assert!(email("email", "a b@c.co").is_err());
        assert!(email("email", "a@.co").is_err());
    }

    #[test]
    fn length_limits_count_chars() {
        assert!(max_chars("name", "ééé", 3).is_ok());
        assert!(max_chars("name", "éééé", 3).is_err());
        assert!(min_chars("password", "1234567", 8).is_err());
        assert!(min_chars("password", "12345678", 8).is_ok());
    }
}
