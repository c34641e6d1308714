use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::engine_info;
use tabharvest_core::PageRange;
use thiserror::Error;

use crate::chunk::ChunkWriter;
use crate::fetch::PageFetcher;
use crate::persist::{ensure_output_dir, PersistError};
use crate::retry::RetryPolicy;
use crate::scheduler::{RunReport, Scheduler, SchedulerSettings};
use crate::session::load_session;
use crate::transport::{FetchSettings, ReqwestTransport};
use crate::TransportError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("output directory error: {0}")]
    OutputDir(#[from] PersistError),
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),
}

/// Everything a fetch run needs besides the page range.
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub fetch: FetchSettings,
    pub retry: RetryPolicy,
    pub scheduler: SchedulerSettings,
    pub output_dir: PathBuf,
    pub cookie_file: PathBuf,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            retry: RetryPolicy::default(),
            scheduler: SchedulerSettings::default(),
            output_dir: PathBuf::from("ybio_html_data"),
            cookie_file: PathBuf::from("cookies.json"),
        }
    }
}

/// Wires session, transport, fetcher, chunk writer and scheduler together.
pub struct HarvestEngine {
    scheduler: Scheduler,
}

impl HarvestEngine {
    pub fn new(settings: &HarvestSettings) -> Result<Self, EngineError> {
        ensure_output_dir(&settings.output_dir)?;

        let base_url = settings.fetch.parsed_base_url()?;
        let jar = load_session(&settings.cookie_file, &base_url);
        let transport = ReqwestTransport::new(&settings.fetch, jar)?;

        let fetcher = PageFetcher::new(base_url, Arc::new(transport))
            .with_retry(settings.retry)
            .with_login_markers(settings.fetch.login_markers.clone());
        let writer = ChunkWriter::new(settings.output_dir.clone());

        engine_info!("Output directory: {:?}", settings.output_dir);
        Ok(Self {
            scheduler: Scheduler::new(Arc::new(fetcher), Box::new(writer), settings.scheduler),
        })
    }

    pub async fn run(&mut self, range: PageRange) -> RunReport {
        self.scheduler.run(range).await
    }
}
