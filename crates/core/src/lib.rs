//! Core types for collstore
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: Unified value enum for record fields
//! - Fields / Record: schema-less records with a store-assigned id
//! - Timestamp: microsecond wall-clock time for record metadata
//! - Name validation for collections and fields
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod name;
pub mod record;
pub mod timestamp;
pub mod value;

pub use error::{Error, Result};
pub use name::{
    validate_collection_name, validate_field_name, NameError, ID_FIELD, MAX_COLLECTION_NAME_LENGTH,
};
pub use record::{Fields, Record, RecordId};
pub use timestamp::Timestamp;
pub use value::Value;
