//! Subject flavors and the engine underneath them.
//!
//! Two flavors share one notification engine:
//! - [`Subject`] owns durable copies of its observers;
//! - [`SharedSubject`] holds weak references to externally owned
//!   [`SharedObserver`] handles and sweeps expired registrations after each
//!   notify pass.
//!
//! [`channel_observer`] bridges notifications into a bounded channel for
//! consumption outside the subject's execution context.

mod channel;
mod core;
mod owned;
mod shared;

pub use self::channel::{channel_observer, NotificationStream, StreamError};
pub use self::owned::Subject;
pub use self::shared::{SharedObserver, SharedSubject};
