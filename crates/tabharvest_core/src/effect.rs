use crate::{PageRange, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist `rows` as a new chunk labeled with the nominal `label` range.
    FlushChunk { label: PageRange, rows: Vec<Record> },
    ReportProgress { processed: usize, total: usize },
}
