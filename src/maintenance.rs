//! File maintenance helpers.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Rewrite `path` keeping only the first occurrence of each line.
///
/// Lines are compared with their terminator, so a final line without a
/// trailing newline is distinct from the same text followed by one. Returns
/// the number of lines dropped.
pub fn remove_duplicate_lines(path: impl AsRef<Path>) -> std::io::Result<usize> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    let mut seen = HashSet::new();
    let mut kept = String::with_capacity(content.len());
    let mut dropped = 0;
    for line in content.split_inclusive('\n') {
        if seen.insert(line) {
            kept.push_str(line);
        } else {
            dropped += 1;
        }
    }

    fs::write(path, kept)?;
    log::info!("Removed {} duplicate line(s) from {}", dropped, path.display());
    Ok(dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_occurrence_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "requests\nopenai\nrequests\nnltk\nopenai\n").unwrap();

        assert_eq!(remove_duplicate_lines(&path).unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "requests\nopenai\nnltk\n");
    }

    #[test]
    fn test_unterminated_last_line_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.txt");
        fs::write(&path, "a\nb\na").unwrap();

        assert_eq!(remove_duplicate_lines(&path).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\na");
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_duplicate_lines(dir.path().join("absent.txt")).is_err());
    }
}
