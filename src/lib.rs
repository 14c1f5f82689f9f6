//! # Herald
//!
//! Synchronous subject/observer notifications with scoped registrations and
//! weak observers.
//!
//! ## Core Concepts
//!
//! - **Subject**: broadcasts payloads to an ordered collection of observers,
//!   synchronously and in registration order
//! - **ObserverKey**: stable identity token issued at attach time; the
//!   comparison key for precise detachment
//! - **AttachGuard**: ties one registration to a lexical scope, detaching on
//!   every exit path
//! - **SharedSubject**: holds weak references to externally owned observer
//!   handles and lazily sweeps expired registrations
//!
//! ## Example
//!
//! ```
//! use herald::Subject;
//!
//! let subject = Subject::new();
//! let key = subject.attach_fn(|value: &u32| println!("first: {value}"));
//! subject.attach_fn(|value: &u32| println!("second: {value}"));
//!
//! subject.notify(5u32)?; // first: 5, then second: 5
//! subject.detach(key);
//! subject.notify(6u32)?; // second: 6 only
//! # Ok::<(), herald::SubjectError>(())
//! ```
//!
//! Subjects are single-threaded: concurrent use of one subject must be
//! serialized by the caller. `notify` runs each observer to completion
//! before the next; an observer failure propagates to the `notify` caller
//! and aborts the rest of the pass.

pub mod error;
pub mod guard;
pub mod subject;
pub mod trace;
pub mod types;

// Re-exports
pub use error::{BoxError, Result, SubjectError};
pub use guard::{AttachGuard, Observe};
pub use subject::{
    channel_observer, NotificationStream, SharedObserver, SharedSubject, StreamError, Subject,
};
pub use trace::{short_type_name, short_type_name_of_val, traced_observer, Traced};
pub use types::{BoxObserver, ObserverKey};
