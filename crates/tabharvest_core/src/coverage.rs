use std::collections::BTreeSet;

use crate::{group_into_ranges, PageIndex, PageRange};

/// What the scanner learned about one chunk file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkObservation {
    pub label: PageRange,
    pub data_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    pub total_pages: PageIndex,
    pub covered_count: usize,
    pub missing_count: usize,
    pub missing_ranges: Vec<PageRange>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.missing_ranges.is_empty()
    }
}

/// Computes `[1, total_pages]` minus every page labeled by a non-empty chunk.
///
/// Labels are trusted: a chunk with at least one data row covers its whole
/// labeled range, and overlapping labels simply union.
pub fn reconcile<'a, I>(observations: I, total_pages: PageIndex) -> CoverageReport
where
    I: IntoIterator<Item = &'a ChunkObservation>,
{
    let mut covered: BTreeSet<PageIndex> = BTreeSet::new();
    for obs in observations {
        if obs.data_rows == 0 {
            continue;
        }
        let start = obs.label.start().max(1);
        let end = obs.label.end().min(total_pages);
        if start <= end {
            covered.extend(start..=end);
        }
    }

    let missing: Vec<PageIndex> = (1..=total_pages)
        .filter(|page| !covered.contains(page))
        .collect();

    CoverageReport {
        total_pages,
        covered_count: covered.len(),
        missing_count: missing.len(),
        missing_ranges: group_into_ranges(missing),
    }
}
