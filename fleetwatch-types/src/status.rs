//! Status - the leaf value of the status tree.

use crate::Level;

/// The latest reading for a single tag of a host's alarm.
///
/// `last_time` is the age of the reading in whole seconds. It is never kept
/// up to date inside the tree; queries compute it against the current clock
/// and attach it to the copy they hand out.
///
/// # Example
///
/// ```rust
/// use fleetwatch_types::{Level, Status};
///
/// let status = Status::new(Level::CRITICAL, 1_700_000_000_000);
/// let aged = status.with_age_at(1_700_000_042_500);
///
/// assert_eq!(aged.last_time, Some(42));
/// assert_eq!(status.last_time, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Status {
    /// Severity of the reading.
    pub level: Level,

    /// Unix timestamp in milliseconds when this reading was created.
    #[cfg_attr(feature = "serde", serde(default))]
    pub create_time_ms: u64,

    /// Age of the reading in seconds, filled in at query time.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub last_time: Option<u64>,
}

impl Status {
    /// Create a status with an explicit creation time.
    pub fn new(level: impl Into<Level>, create_time_ms: u64) -> Self {
        Self {
            level: level.into(),
            create_time_ms,
            last_time: None,
        }
    }

    /// Create a status stamped with the current time.
    #[cfg(feature = "std")]
    pub fn now(level: impl Into<Level>) -> Self {
        Self::new(level, current_timestamp_ms())
    }

    /// Whether the reading carries the healthy level.
    pub fn is_healthy(&self) -> bool {
        self.level.is_ok()
    }

    /// Age in whole seconds relative to `now_ms`.
    ///
    /// Readings stamped in the future have age zero.
    pub fn age_secs_at(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.create_time_ms) / 1000
    }

    /// A copy of this status with `last_time` computed against `now_ms`.
    pub fn with_age_at(&self, now_ms: u64) -> Self {
        Self {
            last_time: Some(self.age_secs_at(now_ms)),
            ..self.clone()
        }
    }

    /// A copy of this status with `last_time` computed against the wall clock.
    #[cfg(feature = "std")]
    pub fn with_age(&self) -> Self {
        self.with_age_at(current_timestamp_ms())
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
