//! Implementation of [`LockerId`].

use std::fmt;
use uuid::Uuid;

/// A random identifier that displays in canonical form.
///
/// The rendered value never contains `|`, separators or line breaks, so it can
/// be written into a record or used as a file-name prefix without further
/// checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LockerId(Uuid);

impl Default for LockerId {
    fn default() -> Self {
        Self::new()
    }
}

impl LockerId {
    /// Generates a new identifier from the operating system's random source.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LockerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_displays_canonical_form() {
        let canonical = LockerId::new().to_string();

        assert_eq!(canonical.len(), 32);
        assert!(canonical
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_new_ids_do_not_repeat() {
        let ids: HashSet<String> = (0..1_000).map(|_| LockerId::new().to_string()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn test_display_is_stable() {
        let id = LockerId::new();
        assert_eq!(id.to_string(), id.to_string());
        assert_eq!(id.to_string(), format!("{id}"));
    }
}
