//! Error types for the `scholarlink-models` crate.
//!
//! Validation helpers on the wire payloads return [`ModelError`].

/// Errors produced when validating model types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A required field was empty or whitespace only.
    #[error("field `{field}` must not be empty")]
    EmptyField {
        /// The wire name of the offending field.
        field: &'static str,
    },

    /// A field exceeded the maximum accepted length.
    #[error("field `{field}` exceeds {max} characters")]
    FieldTooLong {
        /// The wire name of the offending field.
        field: &'static str,
        /// The maximum accepted length in characters.
        max: usize,
    },
}

/// Maximum length accepted for any free-text identity field.
pub const MAX_FIELD_LEN: usize = 256;

/// Check that `value` is non-blank and at most [`MAX_FIELD_LEN`] characters.
pub(crate) fn check_field(field: &'static str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::EmptyField { field });
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(ModelError::FieldTooLong {
            field,
            max: MAX_FIELD_LEN,
        });
    }
    Ok(())
}
