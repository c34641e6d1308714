use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tabharvest_engine::{
    collect_merge_inputs, dedupe_file, default_dedupe_path, merge_files, MergeError,
};
use tempfile::TempDir;

const HEADER: &str = "Name,Acronym,Founded,City,Country,Type I,Type II,UID\n";

fn write_csv(dir: &Path, name: &str, prefix: &str, rows: usize) -> PathBuf {
    let mut content = HEADER.to_string();
    for i in 0..rows {
        content.push_str(&format!("{prefix} {i},,,,,,,{prefix}{i}\n"));
    }
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn merge_orders_by_page_range_and_writes_one_header() {
    let temp = TempDir::new().unwrap();
    // Written out of order so directory listing order cannot help.
    write_csv(temp.path(), "chunk_11-20.csv", "late", 7);
    write_csv(temp.path(), "chunk_1-10.csv", "early", 5);
    write_csv(temp.path(), "organizations_merged.csv", "old", 3);
    fs::write(temp.path().join("readme.txt"), "ignore me").unwrap();

    let files = collect_merge_inputs(&[temp.path().to_path_buf()]).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["chunk_1-10.csv", "chunk_11-20.csv"]);

    let output = temp.path().join("organizations_merged.csv");
    let summary = merge_files(&files, &output).unwrap();

    assert_eq!(summary.total_rows, 12);
    assert_eq!(summary.files_merged, 2);
    let merged = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = merged.lines().collect();
    assert_eq!(lines.len(), 13);
    assert_eq!(lines[0], HEADER.trim_end());
    assert!(lines[1..6].iter().all(|l| l.starts_with("early")));
    assert!(lines[6..].iter().all(|l| l.starts_with("late")));
    assert_eq!(summary.output_bytes, merged.len() as u64);
}

#[test]
fn unlabeled_files_sort_first_and_empty_files_are_skipped() {
    let temp = TempDir::new().unwrap();
    write_csv(temp.path(), "chunk_21-30.csv", "c", 1);
    write_csv(temp.path(), "manual.csv", "m", 1);
    fs::write(temp.path().join("chunk_1-10.csv"), "").unwrap();

    let files = collect_merge_inputs(&[temp.path().to_path_buf()]).unwrap();
    let output = temp.path().join("out").join("all.csv");
    let summary = merge_files(&files, &output).unwrap();

    assert_eq!(summary.files_empty, 1);
    assert_eq!(summary.total_rows, 2);
    let merged = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = merged.lines().collect();
    assert_eq!(lines, vec![HEADER.trim_end(), "m 0,,,,,,,m0", "c 0,,,,,,,c0"]);
}

#[test]
fn files_across_several_directories_are_merged_together() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_csv(second.path(), "chunk_1-10.csv", "a", 2);
    write_csv(first.path(), "chunk_11-20.csv", "b", 2);

    let files =
        collect_merge_inputs(&[first.path().to_path_buf(), second.path().to_path_buf()]).unwrap();

    assert_eq!(files[0], second.path().join("chunk_1-10.csv"));
    assert_eq!(files[1], first.path().join("chunk_11-20.csv"));
}

#[test]
fn no_inputs_is_an_error() {
    let temp = TempDir::new().unwrap();
    let err = collect_merge_inputs(&[temp.path().to_path_buf()]).unwrap_err();
    assert!(matches!(err, MergeError::NoInputs));
}

#[test]
fn dedupe_keeps_first_occurrence_and_counts_duplicates() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("organizations_merged.csv");
    let content = format!(
        "{HEADER}a,1\nb,2\nrepeat,3\nc,4\nrepeat,3\nd,5\nrepeat,3\n"
    );
    fs::write(&input, content).unwrap();

    let output = default_dedupe_path(&input);
    assert_eq!(output, temp.path().join("organizations_merged_deduped.csv"));
    let summary = dedupe_file(&input, &output).unwrap();

    assert_eq!(summary.original_rows, 7);
    assert_eq!(summary.unique_rows, 5);
    assert_eq!(summary.duplicates_removed, 2);
    let deduped = fs::read_to_string(&output).unwrap();
    assert_eq!(
        deduped,
        format!("{HEADER}a,1\nb,2\nrepeat,3\nc,4\nd,5\n")
    );
}

#[test]
fn dedupe_compares_whole_lines_exactly() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("merged.csv");
    fs::write(&input, format!("{HEADER}{HEADER}x,1\nx,1 \nX,1\n")).unwrap();

    let summary = dedupe_file(&input, &temp.path().join("merged_deduped.csv")).unwrap();

    // A repeated header line is data once past the first line.
    assert_eq!(summary.original_rows, 4);
    assert_eq!(summary.duplicates_removed, 0);
}

#[test]
fn unterminated_crlf_file_keeps_crlf_endings_through_dedupe() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("chunk_1-10.csv");
    let second = temp.path().join("chunk_11-20.csv");
    fs::write(&first, "H\r\nrow\r\nlast").unwrap();
    fs::write(&second, "H\r\nlast\r\n").unwrap();

    let output = temp.path().join("organizations_merged.csv");
    merge_files(&[first, second], &output).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap(), "H\r\nrow\r\nlast\r\nlast\r\n");

    let summary = dedupe_file(&output, &default_dedupe_path(&output)).unwrap();
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(
        fs::read_to_string(&summary.output_path).unwrap(),
        "H\r\nrow\r\nlast\r\n"
    );
}
