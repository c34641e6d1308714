use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use tabharvest_core::merge_sort_key;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

/// Names containing any of these are previous outputs, never merge inputs.
const EXCLUDED_MARKERS: [&str; 3] = ["merged", "complete", "deduped"];

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no CSV files found in any directory")]
    NoInputs,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub files_merged: usize,
    pub files_empty: usize,
    pub total_rows: usize,
    pub output_path: PathBuf,
    pub output_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeSummary {
    pub original_rows: usize,
    pub unique_rows: usize,
    pub duplicates_removed: usize,
    pub output_path: PathBuf,
}

/// Lists mergeable `*.csv` files across `dirs`, ordered by the start page in
/// their names (unlabeled files first, ties broken by file name).
pub fn collect_merge_inputs(dirs: &[PathBuf]) -> Result<Vec<PathBuf>, MergeError> {
    let mut files: Vec<(u64, String, PathBuf)> = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            engine_warn!("Directory {:?} not found, skipping", dir);
            continue;
        }
        let mut found = 0;
        for entry in fs::read_dir(dir)?.filter_map(|e| e.ok()) {
            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(".csv") || EXCLUDED_MARKERS.iter().any(|m| name.contains(m)) {
                continue;
            }
            files.push((merge_sort_key(&name), name, entry.path()));
            found += 1;
        }
        engine_info!("Found {} files in {:?}", found, dir);
    }

    if files.is_empty() {
        return Err(MergeError::NoInputs);
    }
    files.sort();
    Ok(files.into_iter().map(|(_, _, path)| path).collect())
}

/// Concatenates `files` in the given order into `output`: the first
/// non-empty file's header once, then every file's data lines.
pub fn merge_files(files: &[PathBuf], output: &Path) -> Result<MergeSummary, MergeError> {
    if files.is_empty() {
        return Err(MergeError::NoInputs);
    }
    engine_info!("Merging {} CSV file(s)...", files.len());

    let (dir, filename) = split_output(output);
    let writer = AtomicFileWriter::new(dir);

    let mut total_rows = 0;
    let mut files_empty = 0;
    let output_path = writer.write_with(&filename, |out| {
        let mut header_written = false;
        for (index, path) in files.iter().enumerate() {
            let content = fs::read_to_string(path)?;
            let mut lines = content.split_inclusive('\n');
            let Some(header) = lines.next() else {
                engine_info!("[{}/{}] {:?} (empty)", index + 1, files.len(), path);
                files_empty += 1;
                continue;
            };
            let ending = if header.ends_with("\r\n") { "\r\n" } else { "\n" };
            if !header_written {
                write_line(out, header, ending)?;
                header_written = true;
            }
            let mut rows = 0;
            for line in lines {
                write_line(out, line, ending)?;
                rows += 1;
            }
            total_rows += rows;
            engine_info!("[{}/{}] {:?} ({} rows)", index + 1, files.len(), path, rows);
        }
        Ok(())
    })?;

    let output_bytes = fs::metadata(&output_path)?.len();
    engine_info!(
        "Merge complete: {} rows, {:.2} MB written to {:?}",
        total_rows,
        output_bytes as f64 / (1024.0 * 1024.0),
        output_path
    );

    Ok(MergeSummary {
        files_merged: files.len() - files_empty,
        files_empty,
        total_rows,
        output_path,
        output_bytes,
    })
}

/// `<dir>/<stem>_deduped.csv` next to `input`.
pub fn default_dedupe_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_deduped.csv"))
}

/// Keeps the header and the first occurrence of every exact data line.
pub fn dedupe_file(input: &Path, output: &Path) -> Result<DedupeSummary, MergeError> {
    engine_info!("Deduplicating {:?}...", input);
    let mut reader = BufReader::new(File::open(input)?);
    let (dir, filename) = split_output(output);
    let writer = AtomicFileWriter::new(dir);

    let mut original_rows = 0;
    let mut duplicates_removed = 0;
    let output_path = writer.write_with(&filename, |out| {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        out.write_all(line.as_bytes())?;

        let mut seen: HashSet<String> = HashSet::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            original_rows += 1;
            if seen.contains(&line) {
                duplicates_removed += 1;
                continue;
            }
            out.write_all(line.as_bytes())?;
            seen.insert(line.clone());
        }
        Ok(())
    })?;

    let unique_rows = original_rows - duplicates_removed;
    engine_info!("Original rows: {}", original_rows);
    engine_info!("Unique rows: {}", unique_rows);
    engine_info!("Duplicates removed: {}", duplicates_removed);
    engine_info!("Output file: {:?}", output_path);

    Ok(DedupeSummary {
        original_rows,
        unique_rows,
        duplicates_removed,
        output_path,
    })
}

/// Writes `line`, terminating it with `ending` if the source file ended
/// without a newline.
fn write_line(out: &mut dyn Write, line: &str, ending: &str) -> io::Result<()> {
    out.write_all(line.as_bytes())?;
    if !line.ends_with('\n') {
        out.write_all(ending.as_bytes())?;
    }
    Ok(())
}

fn split_output(output: &Path) -> (PathBuf, String) {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let filename = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "organizations_merged.csv".to_string());
    (dir, filename)
}
