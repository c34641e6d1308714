use std::fs;
use std::io::Write;

use tabharvest_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("raw_chunks");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("chunk_1-10.csv", b"hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "chunk_1-10.csv");
    assert_eq!(fs::read_to_string(&first).unwrap(), "hello");

    let second = writer.write("chunk_1-10.csv", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "world");
}

#[test]
fn streamed_write_failure_leaves_no_target() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let result = writer.write_with("merged.csv", |out| {
        out.write_all(b"partial")?;
        Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
    });

    assert!(result.is_err());
    assert!(!temp.path().join("merged.csv").exists());
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("chunk_1-10.csv", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("chunk_1-10.csv").exists());
}
