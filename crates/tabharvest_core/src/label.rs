use std::sync::LazyLock;

use regex::Regex;

use crate::range::{PageIndex, PageRange};

static CHUNK_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^chunk_(\d+)-(\d+)\.csv$").expect("valid chunk regex"));

static MERGE_KEY_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"organizations_(\d+)-(\d+)").expect("valid organizations regex"),
        Regex::new(r"chunk_(\d+)-(\d+)").expect("valid chunk regex"),
    ]
});

/// File name of the chunk holding rows for the nominal `range`.
pub fn chunk_filename(range: PageRange) -> String {
    format!("chunk_{}-{}.csv", range.start(), range.end())
}

/// Parses `chunk_<start>-<end>.csv` back into its labeled range.
///
/// Labels are trusted as written: an inverted label parses, and simply covers
/// no pages.
pub fn parse_chunk_filename(name: &str) -> Option<PageRange> {
    let caps = CHUNK_FILENAME.captures(name)?;
    let start = caps[1].parse::<PageIndex>().ok()?;
    let end = caps[2].parse::<PageIndex>().ok()?;
    Some(PageRange::unchecked(start, end))
}

/// Ordering key for merge inputs: the start page of an `organizations_S-E` or
/// `chunk_S-E` name, otherwise 0.
pub fn merge_sort_key(name: &str) -> u64 {
    MERGE_KEY_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(name))
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_round_trips_through_parser() {
        let range = PageRange::new(11, 20).unwrap();
        let name = chunk_filename(range);
        assert_eq!(name, "chunk_11-20.csv");
        assert_eq!(parse_chunk_filename(&name), Some(range));
    }

    #[test]
    fn unmatched_names_are_rejected() {
        assert_eq!(parse_chunk_filename("chunk_1-10.csv.bak"), None);
        assert_eq!(parse_chunk_filename("organizations_1-10.csv"), None);
        assert_eq!(parse_chunk_filename("chunk_a-b.csv"), None);
    }

    #[test]
    fn merge_key_prefers_organizations_then_chunk() {
        assert_eq!(merge_sort_key("organizations_300-400.csv"), 300);
        assert_eq!(merge_sort_key("chunk_21-30.csv"), 21);
        assert_eq!(merge_sort_key("notes.csv"), 0);
    }
}
