//! Page inspection
//!
//! Structured metadata extraction plus optional performance timings.

pub mod inspector;

pub use inspector::{PageInspector, PageSnapshot};
