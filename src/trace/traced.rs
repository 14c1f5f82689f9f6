//! Value-lifecycle tracing.
//!
//! [`Traced`] wraps a value and emits a `tracing` debug event on
//! construction, clone, and drop, labeled with the value's short type name.
//! Useful for watching how a value moves through attach/notify plumbing
//! without touching the code that handles it.

use super::typename::short_type_name;
use crate::error::Result;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::debug;

/// A value whose construction, clones, and drop are logged.
pub struct Traced<T: fmt::Debug> {
    value: T,
    label: String,
}

impl<T: fmt::Debug> Traced<T> {
    /// Wrap `value`, labeled with its short type name.
    pub fn new(value: T) -> Self {
        Self::labeled(value, short_type_name::<T>())
    }

    /// Wrap `value` under an explicit label.
    pub fn labeled(value: T, label: impl Into<String>) -> Self {
        let label = label.into();
        debug!(label = %label, value = ?value, "constructed");
        Traced { value, label }
    }

    /// The label events are tagged with.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T: fmt::Debug + Clone> Clone for Traced<T> {
    fn clone(&self) -> Self {
        debug!(label = %self.label, value = ?self.value, "cloned");
        Traced {
            value: self.value.clone(),
            label: self.label.clone(),
        }
    }
}

impl<T: fmt::Debug> Drop for Traced<T> {
    fn drop(&mut self) {
        debug!(label = %self.label, value = ?self.value, "dropped");
    }
}

impl<T: fmt::Debug> Deref for Traced<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> DerefMut for Traced<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Traced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("label", &self.label)
            .field("value", &self.value)
            .finish()
    }
}

/// Decorate an observer callable, emitting a debug event with the payload on
/// every invocation before delegating.
pub fn traced_observer<A, F>(
    label: impl Into<String>,
    mut observer: F,
) -> impl FnMut(&A) -> Result<()> + 'static
where
    A: fmt::Debug + 'static,
    F: FnMut(&A) -> Result<()> + 'static,
{
    let label = label.into();
    move |payload: &A| {
        debug!(label = %label, payload = ?payload, "observer invoked");
        observer(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Subject;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};

    // Collects formatted log output so a test can assert on emitted events.
    #[derive(Clone, Default)]
    struct CaptureWriter {
        buffer: Arc<Mutex<Vec<u8>>>,
    }

    impl CaptureWriter {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buffer.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_construction_clone_and_drop_events_are_emitted() {
        let capture = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(capture.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let value = Traced::labeled(7u32, "lifecycle");
            let copy = value.clone();
            drop(copy);
            drop(value);
        });

        let output = capture.contents();
        assert_eq!(output.matches("constructed").count(), 1);
        assert_eq!(output.matches("cloned").count(), 1);
        assert_eq!(output.matches("dropped").count(), 2);
        assert!(output.contains("label=lifecycle"));
    }

    #[test]
    fn test_traced_derefs_to_inner() {
        init_logging();
        let mut counter = Traced::new(0u32);
        *counter += 5;
        assert_eq!(*counter, 5);
        assert_eq!(counter.label(), "u32");
    }

    #[test]
    fn test_clone_shares_label() {
        init_logging();
        let original = Traced::labeled(vec![1u8, 2], "bytes");
        let copy = original.clone();
        assert_eq!(copy.label(), "bytes");
        assert_eq!(*copy, vec![1, 2]);
    }

    #[test]
    fn test_traced_observer_delegates() {
        init_logging();
        let subject = Subject::new();
        let seen: Rc<RefCell<Vec<u32>>> = Default::default();
        let inner_seen = seen.clone();
        subject.attach(traced_observer("recorder", move |value: &u32| {
            inner_seen.borrow_mut().push(*value);
            Ok(())
        }));

        subject.notify(4u32).unwrap();
        assert_eq!(*seen.borrow(), vec![4]);
    }
}
