//! Channel-backed observers for bridging notifications out of the subject's
//! execution context.
//!
//! The subject stays scheduler-agnostic: the observer returned here is an
//! ordinary synchronous callable that clones each payload into a bounded
//! channel. Whatever drains the [`NotificationStream`] (a host event loop,
//! another thread, a test) is outside the core's contract.

use crate::error::{Result, SubjectError};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::time::Duration;
use thiserror::Error;

/// Failure delivering a payload into a notification channel.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The bounded buffer is full (slow consumer).
    #[error("notification buffer full")]
    Full,

    /// The stream side was dropped.
    #[error("notification stream disconnected")]
    Disconnected,
}

/// Receiving side of a channel observer.
pub struct NotificationStream<A> {
    receiver: Receiver<A>,
}

impl<A> NotificationStream<A> {
    /// Receive the next payload (blocking).
    pub fn recv(&self) -> std::result::Result<A, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a payload (non-blocking).
    pub fn try_recv(&self) -> std::result::Result<A, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<A, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Number of payloads waiting in the buffer.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// True when no payload is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

struct ChannelObserver<A> {
    sender: Sender<A>,
}

impl<A: Clone> ChannelObserver<A> {
    fn deliver(&self, payload: &A) -> Result<()> {
        self.sender.try_send(payload.clone()).map_err(|err| {
            let reason = match err {
                crossbeam_channel::TrySendError::Full(_) => StreamError::Full,
                crossbeam_channel::TrySendError::Disconnected(_) => StreamError::Disconnected,
            };
            SubjectError::observer(reason)
        })
    }
}

/// An observer that forwards each payload into a bounded channel, paired
/// with the stream that drains it.
///
/// A full buffer surfaces as an observer failure at the `notify` call site;
/// the caller decides whether to detach the slow consumer.
///
/// # Example
///
/// ```
/// use herald::{channel_observer, Subject};
///
/// let subject = Subject::new();
/// let (observer, stream) = channel_observer::<u32>(16);
/// subject.attach(observer);
///
/// subject.notify(7u32)?;
/// assert_eq!(stream.try_recv(), Ok(7));
/// # Ok::<(), herald::SubjectError>(())
/// ```
pub fn channel_observer<A>(
    bound: usize,
) -> (
    impl FnMut(&A) -> Result<()> + 'static,
    NotificationStream<A>,
)
where
    A: Clone + 'static,
{
    let (sender, receiver) = bounded(bound);
    let observer = ChannelObserver { sender };
    (
        move |payload: &A| observer.deliver(payload),
        NotificationStream { receiver },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Subject;

    #[test]
    fn test_payloads_delivered_in_order() {
        let subject = Subject::new();
        let (observer, stream) = channel_observer::<u32>(8);
        subject.attach(observer);

        for value in [3u32, 1, 4] {
            subject.notify(value).unwrap();
        }
        assert_eq!(stream.try_recv(), Ok(3));
        assert_eq!(stream.try_recv(), Ok(1));
        assert_eq!(stream.try_recv(), Ok(4));
        assert!(stream.is_empty());
    }

    #[test]
    fn test_full_buffer_surfaces_at_notify() {
        let subject = Subject::new();
        let (observer, stream) = channel_observer::<u32>(1);
        subject.attach(observer);

        subject.notify(1u32).unwrap();
        let err = subject.notify(2u32).unwrap_err();
        assert!(matches!(err, SubjectError::Observer(_)));
        assert_eq!(err.to_string(), "observer failed during notify: notification buffer full");
        assert_eq!(stream.len(), 1);
    }

    #[test]
    fn test_dropped_stream_surfaces_as_disconnected() {
        let subject = Subject::new();
        let (observer, stream) = channel_observer::<u32>(4);
        subject.attach(observer);
        drop(stream);

        let err = subject.notify(1u32).unwrap_err();
        assert_eq!(
            err.to_string(),
            "observer failed during notify: notification stream disconnected"
        );
    }

    #[test]
    fn test_stream_drains_from_another_thread() {
        let subject = Subject::new();
        let (observer, stream) = channel_observer::<u32>(32);
        subject.attach(observer);

        let drain = std::thread::spawn(move || {
            let mut total = 0;
            while let Ok(value) = stream.recv_timeout(Duration::from_secs(1)) {
                total += value;
                if total >= 10 {
                    break;
                }
            }
            total
        });

        for value in 1u32..=4 {
            subject.notify(value).unwrap();
        }
        assert_eq!(drain.join().unwrap(), 10);
    }
}
