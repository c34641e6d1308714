use std::fmt;

use thiserror::Error;

/// 1-based index of a page in the remote page space.
pub type PageIndex = u32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("page indices start at 1, got {0}")]
    ZeroPage(PageIndex),
    #[error("range start {start} is after end {end}")]
    Inverted { start: PageIndex, end: PageIndex },
}

/// Closed interval `[start, end]` of page indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageRange {
    start: PageIndex,
    end: PageIndex,
}

impl PageRange {
    pub fn new(start: PageIndex, end: PageIndex) -> Result<Self, RangeError> {
        if start == 0 {
            return Err(RangeError::ZeroPage(start));
        }
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds a range without validating; used for labels read back from disk,
    /// which are advisory and may be malformed.
    pub(crate) fn unchecked(start: PageIndex, end: PageIndex) -> Self {
        Self { start, end }
    }

    pub fn single(page: PageIndex) -> Result<Self, RangeError> {
        Self::new(page, page)
    }

    pub fn start(&self) -> PageIndex {
        self.start
    }

    pub fn end(&self) -> PageIndex {
        self.end
    }

    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            (self.end - self.start) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, page: PageIndex) -> bool {
        (self.start..=self.end).contains(&page)
    }

    pub fn pages(&self) -> impl Iterator<Item = PageIndex> {
        self.start..=self.end
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }
}

/// Renders `start-end`, or just `start` for a one-page range.
impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Groups ascending, deduplicated page indices into maximal contiguous ranges.
pub fn group_into_ranges<I>(pages: I) -> Vec<PageRange>
where
    I: IntoIterator<Item = PageIndex>,
{
    let mut ranges: Vec<PageRange> = Vec::new();
    for page in pages {
        match ranges.last_mut() {
            Some(last) if last.end.checked_add(1) == Some(page) => last.end = page,
            Some(last) if last.end >= page => {}
            _ => ranges.push(PageRange::unchecked(page, page)),
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_and_inverted_ranges() {
        assert_eq!(PageRange::new(0, 3), Err(RangeError::ZeroPage(0)));
        assert_eq!(
            PageRange::new(5, 4),
            Err(RangeError::Inverted { start: 5, end: 4 })
        );
        assert_eq!(PageRange::new(2, 2).unwrap().len(), 1);
    }

    #[test]
    fn groups_contiguous_runs() {
        let ranges = group_into_ranges([1, 2, 3, 7, 9, 10]);
        let rendered: Vec<String> = ranges.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1-3", "7", "9-10"]);
    }

    #[test]
    fn grouping_empty_input_yields_nothing() {
        assert!(group_into_ranges(Vec::new()).is_empty());
    }
}
