//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use super::Interpreter;
use crate::config::{EvalConfig, UnsupportedOpPolicy};
use crate::GameData;

/// Builder for [`Interpreter`].
///
/// ```
/// use mhs_eval::{GameData, InterpreterBuilder, UnsupportedOpPolicy};
///
/// let data = GameData::new();
/// let interpreter = InterpreterBuilder::new(&data)
///     .unsupported_policy(UnsupportedOpPolicy::Error)
///     .max_loop_iterations(10_000)
///     .build();
/// assert_eq!(interpreter.config().max_loop_iterations, Some(10_000));
/// ```
pub struct InterpreterBuilder<'a> {
    data: &'a GameData,
    config: EvalConfig,
}

impl<'a> InterpreterBuilder<'a> {
    /// Create a new builder with the default configuration.
    pub fn new(data: &'a GameData) -> Self {
        Self {
            data,
            config: EvalConfig::default(),
        }
    }

    /// Replace the whole configuration, e.g. with [`EvalConfig::from_env`].
    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn unsupported_policy(mut self, policy: UnsupportedOpPolicy) -> Self {
        self.config.unsupported_policy = policy;
        self
    }

    /// Cap `For` and `ForEach*` iterations.
    #[must_use]
    pub fn max_loop_iterations(mut self, limit: u32) -> Self {
        self.config.max_loop_iterations = Some(limit);
        self
    }

    pub fn build(self) -> Interpreter<'a> {
        Interpreter {
            data: self.data,
            config: self.config,
        }
    }
}
