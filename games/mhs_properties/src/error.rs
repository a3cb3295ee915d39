//! Errors raised while building property ids or registering schemas.

use thiserror::Error;

use crate::{PropertyDataType, PropertyEnum};

/// Failure in the property layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("property param {value} does not fit in {bits} bits")]
    ParamOutOfRange { value: i64, bits: u32 },

    #[error("param index {index} is out of range for {property} ({count} params)")]
    ParamIndexOutOfRange {
        property: PropertyEnum,
        index: usize,
        count: usize,
    },

    #[error("{property} declares {count} params, at most {max} are supported")]
    TooManyParams {
        property: PropertyEnum,
        count: usize,
        max: usize,
    },

    #[error("{property} is already registered")]
    DuplicateProperty { property: PropertyEnum },

    #[error("{property} is not registered")]
    UnknownProperty { property: PropertyEnum },

    #[error("default value of {property} is {found}, expected {expected}")]
    DefaultTypeMismatch {
        property: PropertyEnum,
        expected: PropertyDataType,
        found: PropertyDataType,
    },

    #[error("attaching this collection to the parent would create a cycle")]
    ParentCycle,
}
