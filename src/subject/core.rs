//! Generic notification engine shared by both subject flavors.
//!
//! The engine is parameterized over an [`ObserverSlot`]: the capability that
//! stores one registered observer and knows how to invoke it and whether it
//! is still able to receive notifications. The owning flavor uses boxed
//! closures (always alive); the weak flavor uses non-owning references that
//! expire when the external owner drops its handle.
//!
//! A notify pass checks the registration list out of the cell before
//! invoking anything (snapshot-then-iterate), so observers are free to call
//! back into `attach`/`detach` on the same subject:
//!
//! - attach during a pass takes effect after the pass, behind the snapshot;
//! - detach during a pass is recorded as pending, suppresses the remaining
//!   invocations of the matching registrations, and is applied on merge;
//! - notify during a pass on the same subject fails with
//!   [`SubjectError::ReentrantNotify`].
//!
//! The merge-back runs through a drop guard, so a failing observer never
//! loses the registration list.

use crate::error::{Result, SubjectError};
use crate::types::ObserverKey;
use std::cell::RefCell;
use tracing::debug;

/// Storage and dispatch capability for one registered observer.
pub trait ObserverSlot<A> {
    /// Invoke the observer with the payload.
    ///
    /// Returns `Ok(false)` when the slot has expired and was skipped.
    fn invoke(&mut self, payload: &A) -> Result<bool>;

    /// True while the slot can still deliver notifications.
    fn is_alive(&self) -> bool;
}

/// One registration: an identity key plus its slot.
pub(crate) struct Registration<S> {
    pub(crate) key: ObserverKey,
    pub(crate) slot: S,
}

type DetachPredicate<S> = Box<dyn Fn(&Registration<S>) -> bool>;

/// Detaches recorded while a notify pass holds the registration list, plus
/// the size of the checked-out snapshot so counts stay meaningful mid-pass.
struct PassState<S> {
    pending_detach: Vec<DetachPredicate<S>>,
    checked_out: usize,
}

impl<S> PassState<S> {
    fn new(checked_out: usize) -> Self {
        PassState {
            pending_detach: Vec::new(),
            checked_out,
        }
    }

    fn detaches(&self, registration: &Registration<S>) -> bool {
        self.pending_detach.iter().any(|pred| pred(registration))
    }
}

/// Ordered registration list plus active-pass bookkeeping.
pub(crate) struct Core<S> {
    observers: Vec<Registration<S>>,
    next_key: u64,
    pass: Option<PassState<S>>,
}

impl<S> Core<S> {
    pub(crate) fn new() -> Self {
        Core {
            observers: Vec::new(),
            next_key: 1,
            pass: None,
        }
    }

    /// Append a registration under a freshly issued key.
    pub(crate) fn attach(&mut self, slot: S) -> ObserverKey {
        let key = ObserverKey(self.next_key);
        self.next_key += 1;
        self.observers.push(Registration { key, slot });
        key
    }

    /// Append a registration under an existing key (shared-key group).
    /// No uniqueness check: duplicates create independent registrations.
    pub(crate) fn attach_as(&mut self, key: ObserverKey, slot: S) {
        self.observers.push(Registration { key, slot });
    }

    /// Remove every registration matching the predicate. Silent no-op when
    /// nothing matches. While a pass is running the predicate is recorded as
    /// pending and also applied to registrations made during the pass.
    pub(crate) fn detach_where(&mut self, pred: impl Fn(&Registration<S>) -> bool + 'static) {
        self.observers.retain(|registration| !pred(registration));
        if let Some(pass) = self.pass.as_mut() {
            pass.pending_detach.push(Box::new(pred));
        } else {
            self.observers.shrink_to_fit();
        }
    }

    /// Number of registrations, including the snapshot checked out by an
    /// active notify pass. Detaches made during the pass are reflected once
    /// the pass merges.
    pub(crate) fn len(&self) -> usize {
        let checked_out = self.pass.as_ref().map_or(0, |pass| pass.checked_out);
        self.observers.len() + checked_out
    }

    /// Number of registrations matching the predicate.
    pub(crate) fn count_where(&self, pred: impl Fn(&Registration<S>) -> bool) -> usize {
        self.observers
            .iter()
            .filter(|registration| pred(registration))
            .count()
    }
}

/// Run one notify pass over a cell-wrapped core.
pub(crate) fn run_pass<A, S: ObserverSlot<A>>(cell: &RefCell<Core<S>>, payload: &A) -> Result<()> {
    let snapshot = {
        let mut core = cell.borrow_mut();
        if core.pass.is_some() {
            return Err(SubjectError::ReentrantNotify);
        }
        let snapshot = std::mem::take(&mut core.observers);
        core.pass = Some(PassState::new(snapshot.len()));
        snapshot
    };

    let mut pass = PassGuard {
        cell,
        snapshot,
        _payload: std::marker::PhantomData,
    };
    pass.run(payload)
}

/// Holds the checked-out registration list for the duration of a pass and
/// merges it back on drop, on both the success and the unwind path.
struct PassGuard<'c, A, S: ObserverSlot<A>> {
    cell: &'c RefCell<Core<S>>,
    snapshot: Vec<Registration<S>>,
    _payload: std::marker::PhantomData<fn(&A)>,
}

impl<A, S: ObserverSlot<A>> PassGuard<'_, A, S> {
    fn run(&mut self, payload: &A) -> Result<()> {
        for index in 0..self.snapshot.len() {
            let detached = {
                let core = self.cell.borrow();
                match core.pass.as_ref() {
                    Some(pass) => pass.detaches(&self.snapshot[index]),
                    None => false,
                }
            };
            if detached {
                continue;
            }
            self.snapshot[index].slot.invoke(payload)?;
        }
        Ok(())
    }
}

impl<A, S: ObserverSlot<A>> Drop for PassGuard<'_, A, S> {
    fn drop(&mut self) {
        let mut core = self.cell.borrow_mut();
        let pass = core.pass.take();
        let attached_during_pass = std::mem::take(&mut core.observers);

        let mut observers = std::mem::take(&mut self.snapshot);
        if let Some(pass) = pass {
            observers.retain(|registration| !pass.detaches(registration));
        }
        observers.extend(attached_during_pass);

        // Post-pass sweep: drop registrations whose slot can no longer
        // deliver. Only the weak flavor ever has dead slots here.
        let before = observers.len();
        observers.retain(|registration| registration.slot.is_alive());
        let swept = before - observers.len();
        if swept > 0 {
            debug!(swept, remaining = observers.len(), "swept expired observers");
        }

        core.observers = observers;
    }
}
