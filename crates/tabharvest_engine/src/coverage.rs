use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use tabharvest_core::{parse_chunk_filename, reconcile, ChunkObservation, CoverageReport, PageIndex};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("directory {0:?} not found")]
    MissingDirectory(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Result of reading every chunk file in a directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChunkScan {
    /// Files named `chunk_*.csv`, whether or not their label parsed.
    pub files_found: usize,
    pub observations: Vec<ChunkObservation>,
    pub unreadable: Vec<PathBuf>,
    /// `chunk_*.csv` files whose name is not a usable page label.
    pub unlabeled: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageAnalysis {
    pub data_dir: PathBuf,
    pub files_found: usize,
    pub report: CoverageReport,
}

impl CoverageAnalysis {
    /// One re-fetch invocation per missing range.
    pub fn retry_commands(&self, workers: usize) -> Vec<String> {
        self.report
            .missing_ranges
            .iter()
            .map(|range| {
                format!(
                    "tabharvest fetch --from-page {} --to-page {} --workers {} --output-dir {}",
                    range.start(),
                    range.end(),
                    workers,
                    self.data_dir.display()
                )
            })
            .collect()
    }

    pub fn log_summary(&self) {
        engine_info!("Total pages expected: {}", self.report.total_pages);
        engine_info!("Pages covered: {}", self.report.covered_count);
        engine_info!("Missing pages: {}", self.report.missing_count);
        if self.report.is_complete() {
            return;
        }
        engine_info!("Missing Page Ranges:");
        for range in &self.report.missing_ranges {
            engine_info!("  {}", range);
        }
        engine_info!("To retry missing pages, run:");
        for command in self.retry_commands(5) {
            engine_info!("{}", command);
        }
    }
}

/// Reads every `chunk_<start>-<end>.csv` in `dir` and counts its data lines.
///
/// Files whose label does not parse and unreadable files are logged, listed
/// and skipped. Observations are ordered by file name.
pub fn scan_chunk_dir(dir: &Path) -> Result<ChunkScan, CoverageError> {
    if !dir.is_dir() {
        return Err(CoverageError::MissingDirectory(dir.to_path_buf()));
    }

    let mut entries: Vec<(String, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .filter(|(name, _)| name.starts_with("chunk_") && name.ends_with(".csv"))
        .collect();
    entries.sort();

    let mut scan = ChunkScan {
        files_found: entries.len(),
        ..ChunkScan::default()
    };
    for (name, path) in entries {
        let Some(label) = parse_chunk_filename(&name) else {
            engine_warn!("Skipping {}: name is not a valid page label", name);
            scan.unlabeled.push(path);
            continue;
        };
        match count_lines(&path) {
            Ok(lines) => scan.observations.push(ChunkObservation {
                label,
                data_rows: lines.saturating_sub(1),
            }),
            Err(err) => {
                engine_warn!("Error reading {}: {}", name, err);
                scan.unreadable.push(path);
            }
        }
    }
    Ok(scan)
}

/// Scans `dir` and reconciles its chunks against `[1, total_pages]`.
pub fn analyze_coverage(dir: &Path, total_pages: PageIndex) -> Result<CoverageAnalysis, CoverageError> {
    engine_info!("Analyzing coverage in {:?}...", dir);
    let scan = scan_chunk_dir(dir)?;
    engine_info!("Found {} chunk files.", scan.files_found);

    Ok(CoverageAnalysis {
        data_dir: dir.to_path_buf(),
        files_found: scan.files_found,
        report: reconcile(&scan.observations, total_pages),
    })
}

fn count_lines(path: &Path) -> io::Result<usize> {
    let reader = BufReader::new(File::open(path)?);
    let mut count = 0;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}
