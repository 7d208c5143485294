//! Field validation for create and update payloads.
//!
//! Inputs implement [`Validatable`]; the entity operations call it before any
//! write and turn the collected [`ValidationErrors`] into a 422 response.

use serde::Serialize;
use std::fmt;

/// Longest string accepted for any text attribute
pub const MAX_TEXT_LENGTH: usize = 1000;
/// Smallest accepted value for bounded numeric attributes (rating, price)
pub const MIN_NUMERIC: f64 = -999_999_999.0;
/// Largest accepted value for bounded numeric attributes (rating, price)
pub const MAX_NUMERIC: f64 = 999_999_999.0;

/// Validation error with field name and message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the outcome of a single validator, keeping only failures
    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.add(error);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// `Ok(())` when nothing was recorded
    ///
    /// # Errors
    /// Returns `self` when at least one error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by every create and update payload.
pub trait Validatable {
    /// # Errors
    /// Returns every field that failed, not only the first one.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Helper validators shared by the entity payloads
pub mod validators {
    use super::{MAX_NUMERIC, MAX_TEXT_LENGTH, MIN_NUMERIC, ValidationError};
    use std::fmt;

    /// Validate string length (in characters) is within range
    ///
    /// # Errors
    /// Fails when the value is shorter than `min` or longer than `max`.
    pub fn validate_length(
        field: &str,
        value: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Result<(), ValidationError> {
        let len = value.chars().count();

        if let Some(min_len) = min.filter(|&min_len| len < min_len) {
            return Err(ValidationError::new(
                field,
                format!("Must be at least {min_len} characters"),
            ));
        }
        if let Some(max_len) = max.filter(|&max_len| len > max_len) {
            return Err(ValidationError::new(
                field,
                format!("Must be at most {max_len} characters"),
            ));
        }
        Ok(())
    }

    /// Validate number is within range
    ///
    /// # Errors
    /// Fails when the value is below `min` or above `max`.
    pub fn validate_range<T: PartialOrd + fmt::Display>(
        field: &str,
        value: T,
        min: Option<T>,
        max: Option<T>,
    ) -> Result<(), ValidationError> {
        if let Some(min_val) = min {
            if value < min_val {
                return Err(ValidationError::new(field, format!("Must be at least {min_val}")));
            }
        }
        if let Some(max_val) = max {
            if value > max_val {
                return Err(ValidationError::new(field, format!("Must be at most {max_val}")));
            }
        }
        Ok(())
    }

    /// Optional text attribute capped at [`MAX_TEXT_LENGTH`]
    ///
    /// # Errors
    /// Fails when a present value is too long.
    pub fn validate_text(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
        value.map_or(Ok(()), |value| {
            validate_length(field, value, None, Some(MAX_TEXT_LENGTH))
        })
    }

    /// Optional numeric attribute bounded by [`MIN_NUMERIC`] and [`MAX_NUMERIC`]
    ///
    /// # Errors
    /// Fails when a present value is out of range or not finite.
    pub fn validate_bounded(field: &str, value: Option<f64>) -> Result<(), ValidationError> {
        match value {
            None => Ok(()),
            Some(value) if !value.is_finite() => {
                Err(ValidationError::new(field, "Must be a finite number"))
            }
            Some(value) => validate_range(field, value, Some(MIN_NUMERIC), Some(MAX_NUMERIC)),
        }
    }
}
