//! Reserved operators with no implementation yet.

use super::Interpreter;
use crate::errors::not_yet_supported;
use crate::{EvalPrototype, EvalResult};

impl Interpreter<'_> {
    /// Fail on a reserved operator according to the configured policy.
    ///
    /// # Panics
    ///
    /// Panics under [`UnsupportedOpPolicy::Panic`](crate::UnsupportedOpPolicy::Panic).
    #[cold]
    pub(super) fn not_yet_supported(&self, node: &EvalPrototype) -> EvalResult {
        let op = node.op();
        let expr = node.to_string();
        if self.config.unsupported_policy.panics() {
            panic!("{op} is not yet supported: {expr}");
        }
        tracing::error!(%op, node = %expr, "operator is not yet supported");
        Err(not_yet_supported(op).with_op(op).with_node(expr))
    }
}
