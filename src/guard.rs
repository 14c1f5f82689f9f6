//! Scope-bound registrations: attach on construction, detach on drop.

use crate::error::Result;
use crate::subject::{SharedObserver, SharedSubject, Subject};
use crate::types::{BoxObserver, ObserverKey};
use std::fmt;
use std::marker::PhantomData;

/// The attach/detach seam shared by both subject flavors.
///
/// Guards and adapters are written against this trait so they work over
/// either flavor; `Observer` is whatever representation the flavor's
/// attach/detach pair expects.
pub trait Observe<A> {
    /// Observer representation accepted by this flavor.
    type Observer;

    /// Register the observer, returning its identity key.
    fn attach(&self, observer: Self::Observer) -> ObserverKey;

    /// Remove every registration carrying `key`. No-op when none does.
    fn detach(&self, key: ObserverKey);
}

impl<A: 'static> Observe<A> for Subject<A> {
    type Observer = BoxObserver<A>;

    fn attach(&self, observer: Self::Observer) -> ObserverKey {
        self.attach_boxed(observer)
    }

    fn detach(&self, key: ObserverKey) {
        Subject::detach(self, key);
    }
}

impl<A: 'static> Observe<A> for SharedSubject<A> {
    type Observer = SharedObserver<A>;

    fn attach(&self, observer: Self::Observer) -> ObserverKey {
        SharedSubject::attach(self, &observer)
    }

    fn detach(&self, key: ObserverKey) {
        SharedSubject::detach(self, key);
    }
}

/// Ties one registration to a lexical scope.
///
/// Construction attaches the observer; drop detaches it, on every exit path
/// (normal return, early return, unwind). Detach absorbs the case where the
/// registration was already removed by other means, so a guard never fails.
///
/// The guard borrows its subject, which rules out use after the subject is
/// gone at compile time. It is movable but not copyable: exactly one owner
/// detaches.
///
/// # Example
///
/// ```
/// use herald::Subject;
///
/// let subject = Subject::new();
/// {
///     let _guard = subject.scoped_fn(|value: &u32| println!("got {value}"));
///     subject.notify(1u32)?; // invoked
/// }
/// subject.notify(2u32)?; // no observers left
/// assert!(subject.is_empty());
/// # Ok::<(), herald::SubjectError>(())
/// ```
pub struct AttachGuard<'s, A, S: Observe<A>> {
    subject: &'s S,
    key: ObserverKey,
    marker: PhantomData<fn(&A)>,
}

impl<'s, A, S: Observe<A>> AttachGuard<'s, A, S> {
    /// Attach `observer` to `subject` for the guard's lifetime.
    pub fn new(subject: &'s S, observer: S::Observer) -> Self {
        let key = subject.attach(observer);
        AttachGuard {
            subject,
            key,
            marker: PhantomData,
        }
    }

    /// Key of the guarded registration.
    pub fn key(&self) -> ObserverKey {
        self.key
    }
}

impl<A, S: Observe<A>> Drop for AttachGuard<'_, A, S> {
    fn drop(&mut self) {
        self.subject.detach(self.key);
    }
}

impl<A, S: Observe<A>> fmt::Debug for AttachGuard<'_, A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachGuard").field("key", &self.key).finish()
    }
}

impl<A: 'static> Subject<A> {
    /// Attach for the returned guard's lifetime.
    pub fn scoped<F>(&self, observer: F) -> AttachGuard<'_, A, Self>
    where
        F: FnMut(&A) -> Result<()> + 'static,
    {
        AttachGuard::new(self, Box::new(observer))
    }

    /// Attach an infallible observer for the returned guard's lifetime.
    pub fn scoped_fn<F>(&self, mut observer: F) -> AttachGuard<'_, A, Self>
    where
        F: FnMut(&A) + 'static,
    {
        self.scoped(move |payload| {
            observer(payload);
            Ok(())
        })
    }
}

impl<A: 'static> SharedSubject<A> {
    /// Attach a weak reference to the handle's target for the returned
    /// guard's lifetime. The caller still keeps the handle alive.
    pub fn scoped(&self, observer: &SharedObserver<A>) -> AttachGuard<'_, A, Self> {
        AttachGuard::new(self, observer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn seen_log() -> Rc<RefCell<Vec<u32>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_guard_detaches_on_normal_exit() {
        let subject = Subject::new();
        let seen = seen_log();
        {
            let seen = seen.clone();
            let _guard = subject.scoped_fn(move |value: &u32| seen.borrow_mut().push(*value));
            subject.notify(1u32).unwrap();
        }
        subject.notify(2u32).unwrap();
        assert_eq!(*seen.borrow(), vec![1]);
        assert!(subject.is_empty());
    }

    #[test]
    fn test_guard_detaches_on_early_return() {
        fn early(subject: &Subject<u32>, seen: Rc<RefCell<Vec<u32>>>) -> u32 {
            let _guard = subject.scoped_fn(move |value: &u32| seen.borrow_mut().push(*value));
            if subject.observer_count() == 1 {
                return 0;
            }
            subject.notify(1u32).unwrap();
            1
        }

        let subject = Subject::new();
        let seen = seen_log();
        assert_eq!(early(&subject, seen.clone()), 0);
        assert!(subject.is_empty());
    }

    #[test]
    fn test_guard_detaches_on_unwind() {
        let subject = Subject::new();
        let seen = seen_log();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let seen = seen.clone();
            let _guard = subject.scoped_fn(move |value: &u32| seen.borrow_mut().push(*value));
            panic!("observer scope unwinds");
        }));
        assert!(result.is_err());
        assert!(subject.is_empty());
    }

    #[test]
    fn test_guard_absorbs_external_detach() {
        let subject = Subject::new();
        let guard = subject.scoped_fn(|_: &u32| {});
        subject.detach(guard.key());
        assert!(subject.is_empty());
        drop(guard); // second detach is a no-op
        assert!(subject.is_empty());
    }

    #[test]
    fn test_guard_over_shared_subject() {
        let subject = SharedSubject::new();
        let seen = seen_log();
        let handle = {
            let seen = seen.clone();
            SharedObserver::from_fn(move |value: &u32| seen.borrow_mut().push(*value))
        };
        {
            let _guard = subject.scoped(&handle);
            subject.notify(1u32).unwrap();
        }
        subject.notify(2u32).unwrap();
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(subject.registration_count(), 0);
    }

    #[test]
    fn test_guard_is_movable() {
        let subject = Subject::new();
        let guard = subject.scoped_fn(|_: &u32| {});
        let moved = guard;
        assert_eq!(subject.observer_count(), 1);
        drop(moved);
        assert!(subject.is_empty());
    }
}
