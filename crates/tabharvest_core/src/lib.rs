//! Harvester core: pure run accounting, page ranges and coverage reconciliation.
mod coverage;
mod effect;
mod label;
mod msg;
mod range;
mod record;
mod state;
mod update;

pub use coverage::{reconcile, ChunkObservation, CoverageReport};
pub use effect::Effect;
pub use label::{chunk_filename, merge_sort_key, parse_chunk_filename};
pub use msg::{FetchResult, Msg};
pub use range::{group_into_ranges, PageIndex, PageRange, RangeError};
pub use record::{Record, FIELD_COUNT, HEADER};
pub use state::{RunState, RunTotals};
pub use update::update;
