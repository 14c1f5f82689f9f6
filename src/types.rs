//! Core types shared by the subject flavors.

use crate::error::Result;
use std::fmt;

/// Identity token for a group of registrations.
///
/// Keys are issued by a subject at attach time and are the comparison key
/// for `detach`: detaching a key removes every registration that carries it.
/// Re-attaching under an existing key (`attach_as`) adds another registration
/// to the same group, so one detach can release several registrations at
/// once. Keys from different subjects are unrelated; mixing them up is a
/// caller error the library does not detect.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverKey(pub u64);

impl fmt::Debug for ObserverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverKey({})", self.0)
    }
}

impl fmt::Display for ObserverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owning storage form of an observer callable.
pub type BoxObserver<A> = Box<dyn FnMut(&A) -> Result<()> + 'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let key = ObserverKey(7);
        assert_eq!(key.to_string(), "7");
        assert_eq!(format!("{:?}", key), "ObserverKey(7)");
    }
}
