use anyhow::Context;
use chrono::Utc;
use engine_logging::{engine_info, engine_warn};
use tabharvest_core::PageRange;
use tabharvest_engine::{
    analyze_coverage, collect_merge_inputs, dedupe_file, default_dedupe_path, merge_files,
    HarvestEngine, HarvestSettings, RunReport,
};

use crate::cli::{CoverageArgs, FetchArgs, MergeArgs};
use crate::config::HarvestConfig;

pub fn fetch(args: FetchArgs, config: &HarvestConfig) -> anyhow::Result<RunReport> {
    let range = PageRange::new(args.from_page, args.to_page).context("invalid page range")?;

    let mut settings = HarvestSettings {
        output_dir: args.output_dir,
        cookie_file: args.cookies,
        ..HarvestSettings::default()
    };
    config.apply(&mut settings);
    if let Some(workers) = args.workers {
        settings.scheduler.workers = workers;
    }

    engine_info!("Run started at {}", Utc::now().to_rfc3339());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let report = runtime.block_on(async {
        let mut engine = HarvestEngine::new(&settings)?;
        anyhow::Ok(engine.run(range).await)
    })?;

    for line in report.to_string().lines() {
        engine_info!("{}", line);
    }
    Ok(report)
}

/// Process status for a finished fetch: 2 when any page failed.
pub fn fetch_status(report: &RunReport) -> u8 {
    if report.failed_pages.is_empty() {
        0
    } else {
        2
    }
}

pub fn coverage(args: CoverageArgs) -> anyhow::Result<()> {
    let analysis = analyze_coverage(&args.data_dir, args.total_pages)?;
    analysis.log_summary();
    Ok(())
}

pub fn merge(args: MergeArgs) -> anyhow::Result<()> {
    let files = collect_merge_inputs(&args.data_dirs)?;
    let output_dir = args
        .data_dirs
        .first()
        .context("at least one data directory is required")?;
    let output = output_dir.join(&args.output);
    let summary = merge_files(&files, &output)?;
    engine_info!("Output file: {:?}", summary.output_path);
    engine_info!("Total rows: {}", summary.total_rows);

    if args.dedupe {
        if summary.output_path.exists() {
            let deduped = default_dedupe_path(&summary.output_path);
            dedupe_file(&summary.output_path, &deduped)?;
        } else {
            engine_warn!("Merged file {:?} missing, skipping dedupe", summary.output_path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    const HEADER: &str = "Name,Acronym,Founded,City,Country,Type I,Type II,UID\r\n";

    fn report(failed_pages: Vec<u32>) -> RunReport {
        RunReport {
            range: PageRange::new(1, 3).unwrap(),
            elapsed: Duration::from_secs(1),
            processed_pages: 3 - failed_pages.len(),
            total_rows: 0,
            empty_pages: 0,
            failed_pages,
            chunk_files: Vec::new(),
            rows: Vec::new(),
        }
    }

    #[test]
    fn fetch_status_is_two_only_when_pages_failed() {
        assert_eq!(fetch_status(&report(Vec::new())), 0);
        assert_eq!(fetch_status(&report(vec![2])), 2);
    }

    #[test]
    fn merge_with_dedupe_writes_both_files_into_the_first_directory() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(
            first.path().join("chunk_1-10.csv"),
            format!("{HEADER}a,A,1,X,Y,T1,T2,1\r\nb,B,2,X,Y,T1,T2,2\r\n"),
        )
        .unwrap();
        fs::write(
            second.path().join("chunk_11-20.csv"),
            format!("{HEADER}b,B,2,X,Y,T1,T2,2\r\nc,C,3,X,Y,T1,T2,3\r\n"),
        )
        .unwrap();

        merge(MergeArgs {
            data_dirs: vec![first.path().to_path_buf(), second.path().to_path_buf()],
            output: "organizations_merged.csv".to_string(),
            dedupe: true,
        })
        .unwrap();

        let merged = first.path().join("organizations_merged.csv");
        let deduped: PathBuf = first.path().join("organizations_merged_deduped.csv");
        assert!(!second.path().join("organizations_merged.csv").exists());
        assert_eq!(
            fs::read_to_string(&merged).unwrap(),
            format!(
                "{HEADER}a,A,1,X,Y,T1,T2,1\r\nb,B,2,X,Y,T1,T2,2\r\nb,B,2,X,Y,T1,T2,2\r\nc,C,3,X,Y,T1,T2,3\r\n"
            )
        );
        assert_eq!(
            fs::read_to_string(&deduped).unwrap(),
            format!("{HEADER}a,A,1,X,Y,T1,T2,1\r\nb,B,2,X,Y,T1,T2,2\r\nc,C,3,X,Y,T1,T2,3\r\n")
        );
    }

    #[test]
    fn merge_without_inputs_is_an_error() {
        let empty = TempDir::new().unwrap();
        let result = merge(MergeArgs {
            data_dirs: vec![empty.path().to_path_buf()],
            output: "organizations_merged.csv".to_string(),
            dedupe: false,
        });
        assert!(result.is_err());
    }
}
