//! Weak subject: registrations reference externally owned callables.
//!
//! A [`SharedObserver`] is the owning handle the caller must keep alive; the
//! subject stores only a non-owning reference to its target. A registration
//! expires the instant the last handle clone is dropped. Expired
//! registrations are skipped on `notify` and removed by the post-pass sweep,
//! so they linger (occupying a slot) until the next `notify` call.

use super::core::{self, Core, ObserverSlot, Registration};
use crate::error::{Result, SubjectError};
use crate::types::ObserverKey;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::trace;

type ObserverCell<A> = RefCell<dyn FnMut(&A) -> Result<()> + 'static>;

/// Owning handle to an externally owned observer callable.
///
/// Cloning the handle shares the same target; the registration stays live
/// while any clone exists.
pub struct SharedObserver<A> {
    target: Rc<ObserverCell<A>>,
}

impl<A: 'static> SharedObserver<A> {
    /// Wrap a callable in externally owned storage.
    pub fn new<F>(observer: F) -> Self
    where
        F: FnMut(&A) -> Result<()> + 'static,
    {
        SharedObserver {
            target: Rc::new(RefCell::new(observer)),
        }
    }

    /// Wrap an infallible callable.
    pub fn from_fn<F>(mut observer: F) -> Self
    where
        F: FnMut(&A) + 'static,
    {
        Self::new(move |payload| {
            observer(payload);
            Ok(())
        })
    }

    fn downgrade(&self) -> WeakSlot<A> {
        WeakSlot {
            target: Rc::downgrade(&self.target),
        }
    }
}

impl<A> Clone for SharedObserver<A> {
    fn clone(&self) -> Self {
        SharedObserver {
            target: self.target.clone(),
        }
    }
}

impl<A> fmt::Debug for SharedObserver<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedObserver")
            .field("handles", &Rc::strong_count(&self.target))
            .finish()
    }
}

/// Non-owning slot stored by the subject.
pub(crate) struct WeakSlot<A> {
    target: Weak<ObserverCell<A>>,
}

impl<A> WeakSlot<A> {
    fn targets(&self, probe: &WeakSlot<A>) -> bool {
        // An expired slot never matches a live handle: the weak reference
        // keeps the dead allocation address reserved, so it cannot collide
        // with a live one.
        self.target.ptr_eq(&probe.target)
    }
}

impl<A> ObserverSlot<A> for WeakSlot<A> {
    fn invoke(&mut self, payload: &A) -> Result<bool> {
        let Some(target) = self.target.upgrade() else {
            return Ok(false);
        };
        let mut observer = target
            .try_borrow_mut()
            .map_err(|_| SubjectError::ObserverBusy)?;
        (&mut *observer)(payload)?;
        Ok(true)
    }

    fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }
}

/// Broadcasts payloads to observers it does not own.
///
/// Same contract as [`Subject`](crate::Subject), except registrations hold
/// weak references: dropping the last [`SharedObserver`] handle expires the
/// registration without notifying the subject. Expired registrations are
/// skipped during `notify` and swept out after the pass completes, whether
/// they expired before or during it.
///
/// # Example
///
/// ```
/// use herald::{SharedObserver, SharedSubject};
///
/// let subject = SharedSubject::new();
/// let handle = SharedObserver::from_fn(|value: &u32| println!("got {value}"));
/// subject.attach(&handle);
///
/// subject.notify(1u32)?; // invoked
/// drop(handle);
/// subject.notify(2u32)?; // skipped, then swept
/// assert_eq!(subject.registration_count(), 0);
/// # Ok::<(), herald::SubjectError>(())
/// ```
pub struct SharedSubject<A> {
    core: RefCell<Core<WeakSlot<A>>>,
}

impl<A: 'static> SharedSubject<A> {
    /// Create an empty subject.
    pub fn new() -> Self {
        SharedSubject {
            core: RefCell::new(Core::new()),
        }
    }

    /// Convenience for [`SharedObserver::new`].
    pub fn create_observer<F>(&self, observer: F) -> SharedObserver<A>
    where
        F: FnMut(&A) -> Result<()> + 'static,
    {
        SharedObserver::new(observer)
    }

    /// Register a non-owning reference to the handle's target under a
    /// freshly issued key. The caller keeps the handle alive.
    pub fn attach(&self, observer: &SharedObserver<A>) -> ObserverKey {
        let key = self.core.borrow_mut().attach(observer.downgrade());
        trace!(key = key.0, "weak observer attached");
        key
    }

    /// Register another reference under an existing key.
    pub fn attach_as(&self, key: ObserverKey, observer: &SharedObserver<A>) {
        self.core.borrow_mut().attach_as(key, observer.downgrade());
        trace!(key = key.0, "weak observer attached to existing group");
    }

    /// Remove every registration carrying `key`. Silent no-op when none
    /// does.
    pub fn detach(&self, key: ObserverKey) {
        self.core
            .borrow_mut()
            .detach_where(move |registration: &Registration<WeakSlot<A>>| {
                registration.key == key
            });
        trace!(key = key.0, "weak observer detached");
    }

    /// Remove every registration whose reference resolves to the handle's
    /// target. Registrations that already expired resolve to nothing and
    /// never match, so detaching them this way is inherently a no-op.
    pub fn detach_observer(&self, observer: &SharedObserver<A>) {
        let probe = observer.downgrade();
        self.core
            .borrow_mut()
            .detach_where(move |registration: &Registration<WeakSlot<A>>| {
                registration.slot.targets(&probe)
            });
        trace!("weak observer detached by target");
    }

    /// Invoke every live registration, in registration order, with the
    /// payload; expired registrations are skipped. After the pass, every
    /// registration that is now expired is removed.
    pub fn notify(&self, payload: impl Into<A>) -> Result<()> {
        let payload = payload.into();
        core::run_pass(&self.core, &payload)
    }

    /// Number of registrations, including expired ones not yet swept.
    /// Stable while a notify pass is running.
    pub fn registration_count(&self) -> usize {
        self.core.borrow().len()
    }

    /// Number of registrations whose target is still alive. While a notify
    /// pass is running this covers only registrations made during the pass;
    /// use [`registration_count`](Self::registration_count) for a mid-pass
    /// total.
    pub fn live_count(&self) -> usize {
        self.core
            .borrow()
            .count_where(|registration| registration.slot.is_alive())
    }
}

impl<A: 'static> Default for SharedSubject<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for SharedSubject<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSubject")
            .field("registrations", &self.core.borrow().len())
            .finish()
    }
}
