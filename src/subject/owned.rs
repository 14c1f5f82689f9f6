//! Owning subject: registrations hold durable copies of their callables.

use super::core::{self, Core, ObserverSlot, Registration};
use crate::error::Result;
use crate::types::{BoxObserver, ObserverKey};
use std::cell::RefCell;
use std::fmt;
use tracing::trace;

impl<A> ObserverSlot<A> for BoxObserver<A> {
    fn invoke(&mut self, payload: &A) -> Result<bool> {
        (self)(payload)?;
        Ok(true)
    }

    fn is_alive(&self) -> bool {
        true
    }
}

/// Broadcasts payloads to an ordered collection of owned observers.
///
/// Observers are invoked synchronously, in registration order, each to
/// completion before the next. The subject is single-threaded; callers that
/// need concurrency must serialize access externally.
///
/// # Example
///
/// ```
/// use herald::Subject;
///
/// let subject = Subject::new();
/// let key = subject.attach_fn(|value: &u32| println!("got {value}"));
/// subject.notify(5u32)?;
/// subject.detach(key);
/// # Ok::<(), herald::SubjectError>(())
/// ```
pub struct Subject<A> {
    core: RefCell<Core<BoxObserver<A>>>,
}

impl<A: 'static> Subject<A> {
    /// Create an empty subject.
    pub fn new() -> Self {
        Subject {
            core: RefCell::new(Core::new()),
        }
    }

    /// Append an observer under a freshly issued key.
    ///
    /// No uniqueness check: attaching an equivalent callable again creates
    /// an independent registration.
    pub fn attach<F>(&self, observer: F) -> ObserverKey
    where
        F: FnMut(&A) -> Result<()> + 'static,
    {
        self.attach_boxed(Box::new(observer))
    }

    pub(crate) fn attach_boxed(&self, observer: BoxObserver<A>) -> ObserverKey {
        let key = self.core.borrow_mut().attach(observer);
        trace!(key = key.0, "observer attached");
        key
    }

    /// Append an infallible observer under a freshly issued key.
    pub fn attach_fn<F>(&self, mut observer: F) -> ObserverKey
    where
        F: FnMut(&A) + 'static,
    {
        self.attach(move |payload| {
            observer(payload);
            Ok(())
        })
    }

    /// Append another observer under an existing key, extending the group
    /// that a single `detach(key)` releases.
    pub fn attach_as<F>(&self, key: ObserverKey, observer: F)
    where
        F: FnMut(&A) -> Result<()> + 'static,
    {
        self.core.borrow_mut().attach_as(key, Box::new(observer));
        trace!(key = key.0, "observer attached to existing group");
    }

    /// Remove every registration carrying `key`. Silent no-op when none
    /// does. Called from inside a notify pass, the matching registrations
    /// are not invoked for the remainder of the pass.
    pub fn detach(&self, key: ObserverKey) {
        self.core
            .borrow_mut()
            .detach_where(move |registration: &Registration<BoxObserver<A>>| {
                registration.key == key
            });
        trace!(key = key.0, "observer detached");
    }

    /// Invoke every registered observer, in registration order, with the
    /// payload. The conversion into `A` happens once per call, not once per
    /// observer.
    ///
    /// An observer failure propagates to the caller and aborts the rest of
    /// the pass. A re-entrant `notify` on the same subject fails with
    /// [`SubjectError::ReentrantNotify`](crate::SubjectError::ReentrantNotify).
    pub fn notify(&self, payload: impl Into<A>) -> Result<()> {
        let payload = payload.into();
        core::run_pass(&self.core, &payload)
    }

    /// Number of registrations. Stable while a notify pass is running;
    /// detaches made during the pass are reflected once it completes.
    pub fn observer_count(&self) -> usize {
        self.core.borrow().len()
    }

    /// True when no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.observer_count() == 0
    }
}

impl<A: 'static> Default for Subject<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Subject<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("observers", &self.core.borrow().len())
            .finish()
    }
}
