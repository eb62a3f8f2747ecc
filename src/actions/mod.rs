//! Typed actions and their execution
//!
//! An action sequence runs strictly in input order against one session's
//! page. Each action carries its own timeout and fails in isolation: the
//! outcome is recorded and the sequence continues.

pub mod types;
pub mod wait;
pub mod executor;

pub use executor::ActionExecutor;
pub use types::{Action, ActionKind, ActionOutcome, ActionRequest};
pub use wait::{ConditionResolver, WaitSpec};
