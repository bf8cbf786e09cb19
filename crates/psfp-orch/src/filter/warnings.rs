//! Filter operational warnings.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask of configurational warnings of a stream filter instance.
///
/// Rendering is deterministic: flags print as a comma-separated list in
/// declaration order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FilterWarnings(u32);

impl FilterWarnings {
    /// No warnings.
    pub const NONE: FilterWarnings = FilterWarnings(0x000);
    /// Neither a stream nor a stream collection is specified.
    pub const NO_STREAM_OR_COLLECTION: FilterWarnings = FilterWarnings(0x001);
    /// The specified stream does not exist.
    pub const STREAM_NOT_FOUND: FilterWarnings = FilterWarnings(0x002);
    /// The specified stream collection does not exist.
    pub const COLLECTION_NOT_FOUND: FilterWarnings = FilterWarnings(0x004);
    /// Unable to attach to the specified stream.
    pub const STREAM_ATTACH_FAIL: FilterWarnings = FilterWarnings(0x008);
    /// Unable to attach to the specified stream collection.
    pub const COLLECTION_ATTACH_FAIL: FilterWarnings = FilterWarnings(0x010);
    /// The stream itself has operational warnings.
    pub const STREAM_HAS_WARNINGS: FilterWarnings = FilterWarnings(0x020);
    /// The stream collection itself has operational warnings.
    pub const COLLECTION_HAS_WARNINGS: FilterWarnings = FilterWarnings(0x040);
    /// The specified flow meter does not exist.
    pub const FLOW_METER_NOT_FOUND: FilterWarnings = FilterWarnings(0x080);
    /// The specified stream gate does not exist.
    pub const GATE_NOT_FOUND: FilterWarnings = FilterWarnings(0x100);
    /// The specified stream gate is not enabled.
    pub const GATE_NOT_ENABLED: FilterWarnings = FilterWarnings(0x200);

    const LABELS: [(FilterWarnings, &'static str); 10] = [
        (
            Self::NO_STREAM_OR_COLLECTION,
            "neither a stream nor a stream collection is specified",
        ),
        (Self::STREAM_NOT_FOUND, "the specified stream does not exist"),
        (
            Self::COLLECTION_NOT_FOUND,
            "the specified stream collection does not exist",
        ),
        (
            Self::STREAM_ATTACH_FAIL,
            "unable to attach to the specified stream",
        ),
        (
            Self::COLLECTION_ATTACH_FAIL,
            "unable to attach to the specified stream collection",
        ),
        (
            Self::STREAM_HAS_WARNINGS,
            "the specified stream has operational warnings",
        ),
        (
            Self::COLLECTION_HAS_WARNINGS,
            "the specified stream collection has operational warnings",
        ),
        (
            Self::FLOW_METER_NOT_FOUND,
            "the specified flow meter does not exist",
        ),
        (Self::GATE_NOT_FOUND, "the specified stream gate does not exist"),
        (
            Self::GATE_NOT_ENABLED,
            "the specified stream gate is not enabled",
        ),
    ];

    /// Returns true if no warning is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag in `other` is set.
    pub fn contains(&self, other: FilterWarnings) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets the given flags.
    pub fn insert(&mut self, other: FilterWarnings) {
        self.0 |= other.0;
    }

    /// Clears the given flags.
    pub fn remove(&mut self, other: FilterWarnings) {
        self.0 &= !other.0;
    }

    /// Returns the raw bitmask.
    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl BitOr for FilterWarnings {
    type Output = FilterWarnings;

    fn bitor(self, rhs: FilterWarnings) -> FilterWarnings {
        FilterWarnings(self.0 | rhs.0)
    }
}

impl BitOrAssign for FilterWarnings {
    fn bitor_assign(&mut self, rhs: FilterWarnings) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for FilterWarnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        let mut first = true;
        for (flag, label) in Self::LABELS {
            if self.contains(flag) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{}", label)?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_remove_contains() {
        let mut w = FilterWarnings::NONE;
        assert!(w.is_empty());

        w.insert(FilterWarnings::GATE_NOT_FOUND);
        w.insert(FilterWarnings::STREAM_NOT_FOUND);
        assert!(w.contains(FilterWarnings::GATE_NOT_FOUND));
        assert!(!w.contains(FilterWarnings::GATE_NOT_ENABLED));

        w.remove(FilterWarnings::GATE_NOT_FOUND);
        assert!(!w.contains(FilterWarnings::GATE_NOT_FOUND));
        assert!(w.contains(FilterWarnings::STREAM_NOT_FOUND));
    }

    #[test]
    fn test_bitor() {
        let w = FilterWarnings::STREAM_NOT_FOUND | FilterWarnings::GATE_NOT_ENABLED;
        assert_eq!(w.bits(), 0x202);
    }

    #[test]
    fn test_display_is_deterministic() {
        assert_eq!(FilterWarnings::NONE.to_string(), "none");

        let w = FilterWarnings::GATE_NOT_ENABLED | FilterWarnings::STREAM_NOT_FOUND;
        assert_eq!(
            w.to_string(),
            "the specified stream does not exist, the specified stream gate is not enabled"
        );
    }
}
