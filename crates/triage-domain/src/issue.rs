//! Issue identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracker-assigned issue number
///
/// Numbers are allocated in filing order, so the natural ordering of
/// `IssueId` is also the chronological one: the smaller id is the earlier
/// issue and wins as the canonical original of a duplicate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(u64);

impl IssueId {
    /// Create an id from a raw issue number
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw issue number
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Whether this id can refer to a real issue (trackers start at 1)
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl From<u64> for IssueId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_filing_order() {
        assert!(IssueId::new(12) < IssueId::new(40));
    }

    #[test]
    fn test_display() {
        assert_eq!(IssueId::new(7).to_string(), "#7");
    }

    #[test]
    fn test_zero_is_invalid() {
        assert!(!IssueId::new(0).is_valid());
        assert!(IssueId::new(1).is_valid());
    }
}
