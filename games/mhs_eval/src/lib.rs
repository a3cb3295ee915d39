//! MHS Eval - interpreter for data-driven game rules.
//!
//! Gameplay systems (hotspot effects, mission conditions, spawn logic,
//! combat formulas) carry small authored expression trees instead of code.
//! This crate evaluates those trees against typed property collections and
//! live entity state.
//!
//! # Architecture
//!
//! - [`EvalPrototype`]: the immutable expression tree, one variant per operator
//! - [`EvalVar`]: the tagged runtime value, with the `try_get_*` coercions
//! - [`EvalContextData`]: the per-call activation record of context slots
//!   and scratch stack collections
//! - [`Interpreter`]: dispatch plus one handler per operator family
//! - [`GameData`] and [`Game`]: static data and live entity lookups, both
//!   owned by the host
//!
//! ```
//! use mhs_eval::ast::build::{add, float, int};
//! use mhs_eval::{EvalContextData, EvalVar, GameData, Interpreter};
//!
//! let data = GameData::new();
//! let interpreter = Interpreter::new(&data);
//! let mut ctx = EvalContextData::new();
//!
//! let rule = add(int(2), float(0.5));
//! assert_eq!(interpreter.run(Some(&rule), &mut ctx), EvalVar::Float(2.5));
//! ```

pub mod ast;
mod condition;
mod config;
mod context;
pub mod errors;
mod game;
mod interpreter;
mod reference_game;
mod stack;
mod value;

use std::sync::Once;

pub use ast::{
    BinaryArgs, EvalNode, EvalOp, EvalParams, EvalPrototype, ForEachConditionLoop, ForEachProtoRefLoop,
    ForLoop,
};
pub use condition::{Condition, ConditionCollection};
pub use config::{EvalConfig, UnsupportedOpPolicy};
pub use context::{Access, ContextVar, EvalContext, EvalContextData};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use game::{EntityKind, Game, GameData};
pub use interpreter::{Interpreter, InterpreterBuilder};
pub use reference_game::ReferenceGame;
pub use stack::ensure_sufficient_stack;
pub use value::{EvalVar, EvalVarKind};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=mhs_eval=debug` or
/// `RUST_LOG=mhs_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // A host may already have installed a global subscriber.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
