//! Record timestamps.
//!
//! Timestamps are signed milliseconds since the Unix epoch.  Negative values
//! are legal (pre-1970 data) and ordering is plain integer ordering.

use std::fmt;

/// Milliseconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    #[inline]
    pub fn from_millis(ms: i64) -> Self {
        Timestamp(ms)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// The timestamp `ms` milliseconds after `self`, or `None` on overflow.
    #[inline]
    pub fn offset(self, ms: i64) -> Option<Timestamp> {
        self.0.checked_add(ms).map(Timestamp)
    }
}

impl From<i64> for Timestamp {
    #[inline]
    fn from(ms: i64) -> Self {
        Timestamp(ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
