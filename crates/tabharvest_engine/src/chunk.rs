use std::collections::HashSet;
use std::path::PathBuf;

use engine_logging::engine_info;
use tabharvest_core::{chunk_filename, PageRange, Record, HEADER};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("chunk {0} was already written in this run")]
    DuplicateLabel(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Destination for flushed chunk buffers.
pub trait ChunkSink: Send {
    /// Persists `rows` under `label`. Returns `Ok(None)` without touching
    /// the disk when `rows` is empty.
    fn write_chunk(&mut self, label: PageRange, rows: &[Record])
        -> Result<Option<PathBuf>, ChunkError>;
}

/// Writes `chunk_{start}-{end}.csv` files: one header line, then one CSV
/// line per record.
#[derive(Debug)]
pub struct ChunkWriter {
    writer: AtomicFileWriter,
    written: HashSet<PageRange>,
}

impl ChunkWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            written: HashSet::new(),
        }
    }

    pub fn written_labels(&self) -> usize {
        self.written.len()
    }
}

impl ChunkSink for ChunkWriter {
    fn write_chunk(
        &mut self,
        label: PageRange,
        rows: &[Record],
    ) -> Result<Option<PathBuf>, ChunkError> {
        if rows.is_empty() {
            return Ok(None);
        }
        let filename = chunk_filename(label);
        if self.written.contains(&label) {
            return Err(ChunkError::DuplicateLabel(filename));
        }

        let mut csv = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(Vec::new());
        csv.write_record(HEADER)?;
        for record in rows {
            csv.write_record(record.fields())?;
        }
        let content = csv
            .into_inner()
            .map_err(|err| ChunkError::Persist(PersistError::Io(err.into_error())))?;

        let path = self.writer.write(&filename, &content)?;
        self.written.insert(label);
        engine_info!("Saved {} rows to {:?}", rows.len(), path);
        Ok(Some(path))
    }
}
