//! Collection and field name validation
//!
//! Collection names must:
//! - Be 1-256 bytes
//! - Contain only alphanumeric, dash, underscore, dot
//! - Start with an alphanumeric character or underscore
//!
//! Field names only need to be non-empty and must not be the reserved `id`.

use thiserror::Error;

use crate::error::Error;

/// Maximum length of a collection name
pub const MAX_COLLECTION_NAME_LENGTH: usize = 256;

/// Field name the store assigns; callers may not write it
pub const ID_FIELD: &str = "id";

/// Reasons a name is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Name is empty
    #[error("collection name cannot be empty")]
    Empty,
    /// Name exceeds maximum length
    #[error("collection name too long: {length} bytes (max {max})")]
    TooLong {
        /// Actual length of the name
        length: usize,
        /// Maximum allowed length
        max: usize,
    },
    /// Name contains invalid character
    #[error("invalid character '{char}' at position {position} in collection name")]
    InvalidChar {
        /// The invalid character
        char: char,
        /// Position of the invalid character
        position: usize,
    },
    /// Name starts with invalid character
    #[error("collection name cannot start with '{char}'")]
    InvalidStart {
        /// The invalid starting character
        char: char,
    },
    /// Field name is empty
    #[error("field name cannot be empty")]
    EmptyField,
    /// Field name is reserved for the store
    #[error("field '{0}' is assigned by the store and cannot be written")]
    ReservedField(String),
}

impl From<NameError> for Error {
    fn from(e: NameError) -> Self {
        Error::InvalidArgument(e.to_string())
    }
}

/// Validate a collection name
pub fn validate_collection_name(name: &str) -> Result<(), NameError> {
    let first = name.chars().next().ok_or(NameError::Empty)?;

    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return Err(NameError::TooLong {
            length: name.len(),
            max: MAX_COLLECTION_NAME_LENGTH,
        });
    }

    if !first.is_ascii_alphanumeric() && first != '_' {
        return Err(NameError::InvalidStart { char: first });
    }

    if let Some((position, char)) = name.chars().enumerate().find(|(_, c)| !is_valid_char(*c)) {
        return Err(NameError::InvalidChar { char, position });
    }

    Ok(())
}

/// Validate a caller-supplied field name
pub fn validate_field_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::EmptyField);
    }
    if name == ID_FIELD {
        return Err(NameError::ReservedField(name.to_string()));
    }
    Ok(())
}

#[inline]
fn is_valid_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}
