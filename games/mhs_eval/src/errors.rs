//! Evaluation errors.
//!
//! `EvalErrorKind` carries the structured category; factory functions such
//! as [`division_by_zero`] fill in both `kind` and `message`. The
//! interpreter tags an error with the operator and expression string of the
//! node that raised it, then converts it to an `Error` value at the entry
//! point.

use std::fmt;

use mhs_gamedata::{CurveId, PrototypeId};
use mhs_properties::PropertyDataType;

use crate::{EvalContext, EvalOp, EvalVar, EvalVarKind};

/// Result of evaluating one node.
pub type EvalResult = Result<EvalVar, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    ModuloByZero,

    // Operands
    TypeMismatch {
        operand: &'static str,
        expected: &'static str,
        got: EvalVarKind,
    },
    MissingField {
        field: &'static str,
    },

    // Context slots
    InvalidContext {
        context: EvalContext,
    },
    ReadOnlyContext {
        context: EvalContext,
    },
    NullContext {
        context: EvalContext,
    },
    GlobalsUnavailable,

    // Properties
    UnknownProperty {
        property: String,
    },
    PropertyConversion {
        property: String,
        target: PropertyDataType,
        got: EvalVarKind,
    },

    // Game data
    UnknownCurve {
        curve: CurveId,
    },
    UnknownMission {
        mission: PrototypeId,
    },
    InvalidContextObject {
        reason: String,
    },
    NoGameBound,

    // Control
    ExportError,
    NotYetSupported {
        op: EvalOp,
    },
    LoopLimitExceeded {
        limit: u32,
    },

    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Arithmetic
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ModuloByZero => write!(f, "modulo by zero"),

            // Operands
            Self::TypeMismatch {
                operand,
                expected,
                got,
            } => write!(f, "{operand}: expected {expected}, got {got}"),
            Self::MissingField { field } => write!(f, "required field {field} is not set"),

            // Context slots
            Self::InvalidContext { context } => write!(f, "invalid context {context}"),
            Self::ReadOnlyContext { context } => {
                write!(f, "context {context} is read-only")
            }
            Self::NullContext { context } => write!(f, "context {context} holds a null reference"),
            Self::GlobalsUnavailable => write!(f, "globals property collection is not set"),

            // Properties
            Self::UnknownProperty { property } => write!(f, "unknown property {property}"),
            Self::PropertyConversion {
                property,
                target,
                got,
            } => write!(f, "cannot convert {got} to {target} for property {property}"),

            // Game data
            Self::UnknownCurve { curve } => write!(f, "unknown curve {curve:?}"),
            Self::UnknownMission { mission } => write!(f, "unknown mission {mission:?}"),
            Self::InvalidContextObject { reason } => write!(f, "invalid context object: {reason}"),
            Self::NoGameBound => write!(f, "no game is bound to the context"),

            // Control
            Self::ExportError => write!(f, "export error"),
            Self::NotYetSupported { op } => write!(f, "{op} is not yet supported"),
            Self::LoopLimitExceeded { limit } => {
                write!(f, "loop exceeded {limit} iterations")
            }

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// For factory-created errors this equals `kind.to_string()`.
    pub message: String,
    /// Operator of the node that raised the error.
    pub op: Option<EvalOp>,
    /// Expression string of the node that raised the error.
    pub node: Option<String>,
}

impl EvalError {
    /// Create an error with just a message, using the `Custom` kind.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            op: None,
            node: None,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            op: None,
            node: None,
        }
    }

    #[must_use]
    pub fn with_op(mut self, op: EvalOp) -> Self {
        self.op = Some(op);
        self
    }

    #[must_use]
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            Some(op) => write!(f, "{op}: {}", self.message)?,
            None => f.write_str(&self.message)?,
        }
        if let Some(node) = &self.node {
            write!(f, " in `{node}`")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}

// Operands

/// Operand evaluated to the wrong kind of value.
#[cold]
pub fn type_mismatch(operand: &'static str, expected: &'static str, got: EvalVarKind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        operand,
        expected,
        got,
    })
}

#[cold]
pub fn missing_field(field: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingField { field })
}

// Context slots

#[cold]
pub fn invalid_context(context: EvalContext) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidContext { context })
}

#[cold]
pub fn read_only_context(context: EvalContext) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReadOnlyContext { context })
}

#[cold]
pub fn null_context(context: EvalContext) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NullContext { context })
}

#[cold]
pub fn globals_unavailable() -> EvalError {
    EvalError::from_kind(EvalErrorKind::GlobalsUnavailable)
}

// Properties

#[cold]
pub fn unknown_property(property: impl fmt::Debug) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownProperty {
        property: format!("{property:?}"),
    })
}

#[cold]
pub fn property_conversion(
    property: impl Into<String>,
    target: PropertyDataType,
    got: EvalVarKind,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::PropertyConversion {
        property: property.into(),
        target,
        got,
    })
}

// Game data

#[cold]
pub fn unknown_curve(curve: CurveId) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownCurve { curve })
}

#[cold]
pub fn unknown_mission(mission: PrototypeId) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownMission { mission })
}

/// Context value resolved, but to the wrong sort of entity.
#[cold]
pub fn invalid_context_object(reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidContextObject {
        reason: reason.into(),
    })
}

#[cold]
pub fn no_game_bound() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoGameBound)
}

// Control

#[cold]
pub fn export_error() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ExportError)
}

#[cold]
pub fn not_yet_supported(op: EvalOp) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotYetSupported { op })
}

#[cold]
pub fn loop_limit_exceeded(limit: u32) -> EvalError {
    EvalError::from_kind(EvalErrorKind::LoopLimitExceeded { limit })
}

#[cfg(test)]
mod tests;
