//! Block identity.

use std::fmt;

/// Unique identity of an installed block:
/// `(table, sequence, time range, originating spec)`.
///
/// Two blocks with equal `(table, spec)` "share a spec"; that pair is the
/// unit of replacement for the Swap loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockSignature {
    /// Owning table name.
    pub table: String,
    /// Sequence number within the originating spec, monotonic per run.
    pub seq: u64,
    /// Smallest row time stored in the block (epoch seconds).
    pub time_min: i64,
    /// Largest row time stored in the block (epoch seconds).
    pub time_max: i64,
    /// Identity of the spec that produced the block.
    pub spec: String,
}

impl BlockSignature {
    pub fn new(
        table: impl Into<String>,
        seq: u64,
        time_min: i64,
        time_max: i64,
        spec: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            seq,
            time_min,
            time_max,
            spec: spec.into(),
        }
    }

    /// True when both blocks belong to the same table and spec.
    pub fn same_spec(&self, other: &BlockSignature) -> bool {
        self.table == other.table && self.spec == other.spec
    }

    /// True when the block's time range intersects `[start, end]`.
    pub fn overlaps(&self, start: i64, end: i64) -> bool {
        self.time_min <= end && self.time_max >= start
    }
}

impl fmt::Display for BlockSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}[{},{}]@{}",
            self.table, self.seq, self.time_min, self.time_max, self.spec
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_spec_ignores_sequence_and_range() {
        let a = BlockSignature::new("t", 0, 10, 20, "t@x@1");
        let b = BlockSignature::new("t", 7, 90, 95, "t@x@1");
        let c = BlockSignature::new("t", 0, 10, 20, "t@y@1");
        assert!(a.same_spec(&b));
        assert!(!a.same_spec(&c));
    }

    #[test]
    fn overlap_is_inclusive() {
        let sig = BlockSignature::new("t", 0, 10, 20, "s");
        assert!(sig.overlaps(20, 30));
        assert!(sig.overlaps(0, 10));
        assert!(!sig.overlaps(21, 30));
    }
}
