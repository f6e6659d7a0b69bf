//! Status severity levels.

use alloc::string::String;
use core::fmt;

/// The severity level reported for a single tag.
///
/// Levels are opaque strings. Exactly one value, [`Level::OK`], means healthy;
/// every other value (including severities this crate has never heard of) is
/// treated as unhealthy. The empty level marks a leaf that has not been
/// evaluated yet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Level(String);

impl Level {
    /// The healthy sentinel.
    pub const OK: &'static str = "OK";
    /// Conventional warning severity.
    pub const WARNING: &'static str = "WARNING";
    /// Conventional critical severity.
    pub const CRITICAL: &'static str = "CRITICAL";

    /// Create a level from any string.
    pub fn new(level: impl Into<String>) -> Self {
        Self(level.into())
    }

    /// The healthy level.
    pub fn ok() -> Self {
        Self::new(Self::OK)
    }

    /// The level as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the healthy sentinel.
    pub fn is_ok(&self) -> bool {
        is_healthy(&self.0)
    }

    /// Whether the leaf has not been evaluated yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whether a raw level string is the healthy sentinel.
pub fn is_healthy(level: &str) -> bool {
    level == Level::OK
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Level {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Level {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Level {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Level {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
