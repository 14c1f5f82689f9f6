//! Diagnostic helpers: value-lifecycle tracing and readable type names.
//!
//! Nothing in the notification core depends on this module.

mod traced;
mod typename;

pub use traced::{traced_observer, Traced};
pub use typename::{short_type_name, short_type_name_of_val};
