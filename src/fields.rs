use rustc_hash::FxHashSet;
use std::ops::Deref;

/// Zero-based column positions selected for digit normalization.
///
/// Resolved once from the header before the pipeline starts and shared
/// read-only by every worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetIndexes {
    positions: Vec<usize>,
    lookup: FxHashSet<usize>,
}

impl TargetIndexes {
    pub fn new(positions: Vec<usize>) -> Self {
        let lookup = positions.iter().copied().collect();
        Self { positions, lookup }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.lookup.contains(&index)
    }
}

impl Deref for TargetIndexes {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.positions
    }
}

/// Maps requested column names to header positions.
///
/// Positions come back in header order. Names missing from the header
/// contribute nothing, and a header name repeated across several columns
/// yields one index per column.
pub fn resolve_indexes<S: AsRef<str>>(header: &[String], requested: &[S]) -> TargetIndexes {
    let wanted: FxHashSet<&str> = requested.iter().map(|s| s.as_ref()).collect();
    let positions = header
        .iter()
        .enumerate()
        .filter(|(_, name)| wanted.contains(name.as_str()))
        .map(|(i, _)| i)
        .collect();
    TargetIndexes::new(positions)
}

/// Requested names that match no header column, deduplicated, in request order.
pub fn unmatched_columns<'a, S: AsRef<str>>(header: &[String], requested: &'a [S]) -> Vec<&'a str> {
    let present: FxHashSet<&str> = header.iter().map(String::as_str).collect();
    let mut seen = FxHashSet::default();
    requested
        .iter()
        .map(|s| s.as_ref())
        .filter(|name| !present.contains(name) && seen.insert(*name))
        .collect()
}
