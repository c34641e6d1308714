use std::collections::BTreeSet;

use crate::{PageIndex, PageRange, Record};

/// Aggregate counters exposed once a run has drained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunTotals {
    pub processed_pages: usize,
    pub total_rows: usize,
    pub empty_pages: usize,
    pub failed_pages: Vec<PageIndex>,
    pub chunks_flushed: usize,
}

/// Accounting for one fetch run, mutated only by [`crate::update`].
///
/// Chunk labels are nominal: a flush after the n-th successful page is
/// labeled by counting successes from the first page of the run, not by the
/// pages whose rows actually sit in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    range: PageRange,
    chunk_size: usize,
    chunk_span: PageIndex,
    progress_every: usize,
    processed: usize,
    chunk_start: PageIndex,
    chunk_buffer: Vec<Record>,
    rows: Vec<Record>,
    failed: Vec<PageIndex>,
    empty_pages: usize,
    completed: BTreeSet<PageIndex>,
    chunks_flushed: usize,
    drained: bool,
}

impl RunState {
    /// `chunk_size` and `progress_every` are clamped to at least 1.
    pub fn new(range: PageRange, chunk_size: usize, progress_every: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            range,
            chunk_size,
            chunk_span: PageIndex::try_from(chunk_size).unwrap_or(PageIndex::MAX),
            progress_every: progress_every.max(1),
            processed: 0,
            chunk_start: range.start(),
            chunk_buffer: Vec::new(),
            rows: Vec::new(),
            failed: Vec::new(),
            empty_pages: 0,
            completed: BTreeSet::new(),
            chunks_flushed: 0,
            drained: false,
        }
    }

    pub fn range(&self) -> PageRange {
        self.range
    }

    pub fn total_pages(&self) -> usize {
        self.range.len()
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Every row extracted so far, in completion order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// Failed pages in the order their failures were observed.
    pub fn failed_pages(&self) -> &[PageIndex] {
        &self.failed
    }

    pub fn buffered_rows(&self) -> usize {
        self.chunk_buffer.len()
    }

    pub fn completed_pages(&self) -> &BTreeSet<PageIndex> {
        &self.completed
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    pub fn totals(&self) -> RunTotals {
        RunTotals {
            processed_pages: self.processed,
            total_rows: self.rows.len(),
            empty_pages: self.empty_pages,
            failed_pages: self.failed.clone(),
            chunks_flushed: self.chunks_flushed,
        }
    }

    /// Marks `page` as completed. Returns `false` for pages outside the run or
    /// pages already seen, which are then ignored.
    pub(crate) fn mark_completed(&mut self, page: PageIndex) -> bool {
        if self.drained || !self.range.contains(page) {
            return false;
        }
        self.completed.insert(page)
    }

    pub(crate) fn record_failure(&mut self, page: PageIndex) {
        self.failed.push(page);
    }

    pub(crate) fn record_empty_page(&mut self) {
        self.empty_pages += 1;
    }

    /// Appends a successful page's rows and returns the new processed count.
    pub(crate) fn record_rows(&mut self, rows: Vec<Record>) -> usize {
        self.rows.extend(rows.iter().cloned());
        self.chunk_buffer.extend(rows);
        self.processed += 1;
        self.processed
    }

    pub(crate) fn is_chunk_boundary(&self) -> bool {
        self.processed > 0 && self.processed % self.chunk_size == 0
    }

    pub(crate) fn is_progress_boundary(&self) -> bool {
        self.processed > 0 && self.processed % self.progress_every == 0
    }

    /// Takes the buffer as a full chunk and advances the nominal chunk start.
    pub(crate) fn take_full_chunk(&mut self) -> (PageRange, Vec<Record>) {
        let end = self
            .chunk_start
            .saturating_add(self.chunk_span - 1)
            .min(self.range.end());
        let label = PageRange::unchecked(self.chunk_start, end);
        self.chunk_start = self.chunk_start.saturating_add(self.chunk_span);
        self.chunks_flushed += 1;
        (label, std::mem::take(&mut self.chunk_buffer))
    }

    /// Takes whatever remains as the final chunk, labeled up to the run's last page.
    pub(crate) fn take_final_chunk(&mut self) -> Option<(PageRange, Vec<Record>)> {
        self.drained = true;
        if self.chunk_buffer.is_empty() {
            return None;
        }
        let start = self.chunk_start.min(self.range.end());
        let label = PageRange::unchecked(start, self.range.end());
        self.chunks_flushed += 1;
        Some((label, std::mem::take(&mut self.chunk_buffer)))
    }
}
