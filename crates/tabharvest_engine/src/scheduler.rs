use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use engine_logging::{engine_error, engine_info};
use futures_util::FutureExt;
use tabharvest_core::{update, Effect, Msg, PageIndex, PageRange, Record, RunState};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::chunk::ChunkSink;
use crate::fetch::PageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Number of fetches allowed in flight at once.
    pub workers: usize,
    /// Successful pages per chunk file.
    pub chunk_size: usize,
    pub progress_every: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            workers: 10,
            chunk_size: 10,
            progress_every: 10,
        }
    }
}

/// Terminal report of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub range: PageRange,
    pub elapsed: Duration,
    pub processed_pages: usize,
    pub total_rows: usize,
    pub empty_pages: usize,
    /// Failed pages in the order the failures completed.
    pub failed_pages: Vec<PageIndex>,
    pub chunk_files: Vec<PathBuf>,
    pub rows: Vec<Record>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "Scraping Complete! Pages {}", self.range)?;
        writeln!(f, "Time: {:.2} seconds", self.elapsed.as_secs_f64())?;
        writeln!(f, "Total pages processed: {}", self.processed_pages)?;
        writeln!(f, "Total rows extracted: {}", self.total_rows)?;
        writeln!(f, "Pages with an empty table: {}", self.empty_pages)?;
        writeln!(f, "Chunk files written: {}", self.chunk_files.len())?;
        writeln!(f, "Failed pages: {}", self.failed_pages.len())?;
        if !self.failed_pages.is_empty() {
            let mut sorted = self.failed_pages.clone();
            sorted.sort_unstable();
            writeln!(f, "Failed: {sorted:?}")?;
        }
        write!(f, "{rule}")
    }
}

/// Runs one fetch task per page on a bounded pool and folds the results,
/// in completion order, into a [`RunState`].
///
/// Only the task driving [`Scheduler::run`] touches the run state and the
/// chunk sink; fetch tasks share nothing but the page source.
pub struct Scheduler {
    source: Arc<dyn PageSource>,
    sink: Box<dyn ChunkSink>,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(
        source: Arc<dyn PageSource>,
        sink: Box<dyn ChunkSink>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
        }
    }

    pub fn settings(&self) -> SchedulerSettings {
        self.settings
    }

    /// Drains every page in `range`. Never aborts early: failures are
    /// recorded and the run continues.
    pub async fn run(&mut self, range: PageRange) -> RunReport {
        let started = Instant::now();
        let workers = self.settings.workers.max(1);
        engine_info!(
            "Starting HTML scrape for pages {}-{} with {} workers",
            range.start(),
            range.end(),
            workers
        );

        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        for page in range.pages() {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail.
                let _permit = permits.acquire_owned().await.ok();
                let outcome = AssertUnwindSafe(source.fetch(page)).catch_unwind().await;
                (page, outcome)
            });
        }

        let mut state = RunState::new(range, self.settings.chunk_size, self.settings.progress_every);
        let mut chunk_files = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let msg = match joined {
                Ok((page, Ok(result))) => Msg::PageCompleted { page, result },
                Ok((page, Err(panic))) => {
                    let reason = panic_message(panic.as_ref());
                    engine_error!("Page {} generated an exception: {}", page, reason);
                    Msg::TaskFailed { page, reason }
                }
                Err(err) => {
                    // Accounted for below, once every task has drained.
                    engine_error!("Fetch task could not be joined: {}", err);
                    continue;
                }
            };
            state = self.dispatch(state, msg, &mut chunk_files);
        }

        let orphaned: Vec<PageIndex> = range
            .pages()
            .filter(|page| !state.completed_pages().contains(page))
            .collect();
        for page in orphaned {
            let msg = Msg::TaskFailed {
                page,
                reason: "task did not report a result".to_string(),
            };
            state = self.dispatch(state, msg, &mut chunk_files);
        }
        state = self.dispatch(state, Msg::AllTasksDrained, &mut chunk_files);

        let totals = state.totals();
        RunReport {
            range,
            elapsed: started.elapsed(),
            processed_pages: totals.processed_pages,
            total_rows: totals.total_rows,
            empty_pages: totals.empty_pages,
            failed_pages: totals.failed_pages,
            chunk_files,
            rows: state.into_rows(),
        }
    }

    fn dispatch(&mut self, state: RunState, msg: Msg, chunk_files: &mut Vec<PathBuf>) -> RunState {
        let (state, effects) = update(state, msg);
        for effect in effects {
            self.apply(effect, chunk_files);
        }
        state
    }

    fn apply(&mut self, effect: Effect, chunk_files: &mut Vec<PathBuf>) {
        match effect {
            Effect::FlushChunk { label, rows } => match self.sink.write_chunk(label, &rows) {
                Ok(Some(path)) => chunk_files.push(path),
                Ok(None) => {}
                Err(err) => engine_error!("Failed to write chunk {}: {}", label, err),
            },
            Effect::ReportProgress { processed, total } => {
                engine_info!("Progress: {}/{} pages scraped", processed, total);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
