//! Interpreter configuration.
//!
//! Defaults reproduce live-server behavior: unsupported operators fail the
//! rule with an `Error` value and loops are bounded only by their own
//! conditions. Hosts can tighten either policy in code or through the
//! environment.

use std::str::FromStr;

/// What to do when a rule reaches an operator that is not supported yet.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum UnsupportedOpPolicy {
    /// Log at error level and fail the rule with `NotYetSupported`.
    #[default]
    Error,
    /// Abort the evaluation. For development builds that want the gap loud.
    Panic,
}

impl UnsupportedOpPolicy {
    #[inline]
    pub fn panics(self) -> bool {
        matches!(self, Self::Panic)
    }
}

impl FromStr for UnsupportedOpPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "panic" => Ok(Self::Panic),
            other => Err(format!("expected `error` or `panic`, got `{other}`")),
        }
    }
}

/// Tunable interpreter policies.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalConfig {
    pub unsupported_policy: UnsupportedOpPolicy,
    /// Iteration cap for `For` and `ForEach*` loops. `None` means uncapped.
    pub max_loop_iterations: Option<u32>,
}

impl EvalConfig {
    /// Environment variable selecting [`UnsupportedOpPolicy`].
    pub const UNSUPPORTED_ENV: &'static str = "MHS_EVAL_UNSUPPORTED";
    /// Environment variable setting `max_loop_iterations`.
    pub const MAX_LOOP_ITERATIONS_ENV: &'static str = "MHS_EVAL_MAX_LOOP_ITERATIONS";

    /// Defaults overlaid with `MHS_EVAL_UNSUPPORTED` and
    /// `MHS_EVAL_MAX_LOOP_ITERATIONS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Unparsable values are
    /// logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::UNSUPPORTED_ENV) {
            match raw.parse() {
                Ok(policy) => config.unsupported_policy = policy,
                Err(reason) => tracing::warn!(
                    var = Self::UNSUPPORTED_ENV,
                    %reason,
                    "ignoring invalid eval setting"
                ),
            }
        }

        if let Some(raw) = lookup(Self::MAX_LOOP_ITERATIONS_ENV) {
            match raw.trim().parse::<u32>() {
                Ok(limit) => config.max_loop_iterations = Some(limit),
                Err(err) => tracing::warn!(
                    var = Self::MAX_LOOP_ITERATIONS_ENV,
                    value = %raw,
                    error = %err,
                    "ignoring invalid eval setting"
                ),
            }
        }

        config
    }
}
