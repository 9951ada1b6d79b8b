use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::keys::generate_secret;

/// Whole days a secret stays in use before `maybe_rotate` replaces it.
pub const ROTATION_INTERVAL_DAYS: i64 = 2;

#[derive(Clone, Copy)]
struct Generation {
    secret: [u8; 32],
    generated_at: DateTime<Utc>,
}

/// Process-wide signing secret.
///
/// Starts uninitialized; the first `maybe_rotate` call generates it. The lock
/// is only held to check-and-regenerate or to copy the secret out.
#[derive(Default)]
pub struct RotatingSecret {
    state: Mutex<Option<Generation>>,
}

impl RotatingSecret {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a new secret if there is none yet or the current one is at
    /// least `ROTATION_INTERVAL_DAYS` whole days old. Returns true if it did.
    pub fn maybe_rotate(&self, now: DateTime<Utc>) -> bool {
        let mut state = self.lock();

        let due = match *state {
            None => true,
            Some(current) => (now - current.generated_at).num_days() >= ROTATION_INTERVAL_DAYS,
        };

        if due {
            *state = Some(Generation {
                secret: generate_secret(),
                generated_at: now,
            });
        }

        due
    }

    pub fn current_secret(&self) -> Option<[u8; 32]> {
        self.lock().map(|g| g.secret)
    }

    pub fn generated_at(&self) -> Option<DateTime<Utc>> {
        self.lock().map(|g| g.generated_at)
    }

    // A panic while holding the lock cannot leave a half-written secret,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Option<Generation>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 12, 12, 0, 0).unwrap()
    }

    #[test]
    fn first_call_initializes() {
        let secret = RotatingSecret::new();
        assert!(secret.current_secret().is_none());

        assert!(secret.maybe_rotate(start()));
        assert!(secret.current_secret().is_some());
        assert_eq!(secret.generated_at(), Some(start()));
    }

    #[test]
    fn no_rotation_within_interval() {
        let secret = RotatingSecret::new();
        secret.maybe_rotate(start());
        let first = secret.current_secret();

        assert!(!secret.maybe_rotate(start() + Duration::seconds(1)));
        assert!(!secret.maybe_rotate(start() + Duration::hours(47) + Duration::minutes(59)));
        assert_eq!(secret.current_secret(), first);
        assert_eq!(secret.generated_at(), Some(start()));
    }

    #[test]
    fn rotates_after_interval() {
        let secret = RotatingSecret::new();
        secret.maybe_rotate(start());
        let first = secret.current_secret();

        let later = start() + Duration::days(ROTATION_INTERVAL_DAYS);
        assert!(secret.maybe_rotate(later));
        assert_ne!(secret.current_secret(), first);
        assert_eq!(secret.generated_at(), Some(later));
    }
}
