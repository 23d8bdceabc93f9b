//! Wall-clock timestamps
//!
//! Callers pass `now` explicitly into every time-dependent operation; nothing in
//! the workspace reads the system clock on its own. That keeps the grace window
//! arithmetic deterministic under test.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Construct from milliseconds since the epoch.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Construct from seconds since the epoch.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Milliseconds since the epoch.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Current system time. Only outer layers should call this.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(u64::try_from(ms).unwrap_or(u64::MAX))
    }

    /// Time elapsed since `earlier`, zero if `earlier` lies in the future.
    pub fn saturating_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// This timestamp shifted forward by `delta`.
    pub fn saturating_add(&self, delta: Duration) -> Timestamp {
        let ms = u64::try_from(delta.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(ms))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_saturates_on_skew() {
        let later = Timestamp::from_secs(10);
        let earlier = Timestamp::from_secs(4);
        assert_eq!(later.saturating_since(earlier), Duration::from_secs(6));
        assert_eq!(earlier.saturating_since(later), Duration::ZERO);
    }

    #[test]
    fn add_then_since_is_identity() {
        let t = Timestamp::from_millis(1_234);
        let delta = Duration::from_secs(72 * 3600);
        assert_eq!(t.saturating_add(delta).saturating_since(t), delta);
    }
}
