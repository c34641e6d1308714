//! Harvester engine: page fetching, scheduling and on-disk chunk handling.
mod chunk;
mod coverage;
mod decode;
mod engine;
mod extract;
mod fetch;
mod merge;
mod persist;
mod retry;
mod scheduler;
mod session;
mod transport;
mod types;

pub use chunk::{ChunkError, ChunkSink, ChunkWriter};
pub use coverage::{analyze_coverage, scan_chunk_dir, ChunkScan, CoverageAnalysis, CoverageError};
pub use decode::{decode_body, DecodeError, DecodedPage};
pub use engine::{EngineError, HarvestEngine, HarvestSettings};
pub use extract::{extract_page, is_login_redirect, Extraction, TableExtractor, ViewsTableExtractor};
pub use fetch::{page_url, PageFetcher, PageSource};
pub use merge::{
    collect_merge_inputs, dedupe_file, default_dedupe_path, merge_files, DedupeSummary,
    MergeError, MergeSummary,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use scheduler::{RunReport, Scheduler, SchedulerSettings};
pub use session::{load_cookie_jar, load_session, SessionError};
pub use transport::{
    default_login_markers, FetchSettings, PageTransport, ReqwestTransport, DEFAULT_BASE_URL,
    DEFAULT_LOGIN_MARKERS,
};
pub use types::{HttpResponse, TransportError};

pub use tabharvest_core::{FetchResult, PageIndex, PageRange, Record};
