//! Filtered repository traversal
//!
//! `RepositoryWalker` is a lazy, single-pass iterator over the files worth
//! summarizing: ignore rules, the size limit, and text/binary classification
//! are applied in that order, cheapest first. Directories are never yielded.
//! Anything that fails file-locally is logged and skipped; the walk itself
//! carries on.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use chardet::charset2encoding;
use encoding_rs::Encoding;
use log::warn;

use crate::ignore::IgnoreMatcher;

/// Bytes sampled from the head of a file for text/binary classification.
const SAMPLE_SIZE: usize = 1024;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Lazy traversal of every eligible file under a root.
///
/// Re-iterating requires a fresh walker; the sequence is not restartable.
pub struct RepositoryWalker<'a> {
    root: PathBuf,
    matcher: &'a IgnoreMatcher,
    max_size_mb: Option<f64>,
    pending: Vec<PathBuf>,
}

impl<'a> RepositoryWalker<'a> {
    /// `max_size_mb: None` disables the size check entirely (forced mode),
    /// it does not merely raise the limit.
    pub fn new(root: &Path, matcher: &'a IgnoreMatcher, max_size_mb: Option<f64>) -> Self {
        Self {
            root: root.to_path_buf(),
            matcher,
            max_size_mb,
            pending: vec![root.to_path_buf()],
        }
    }

    fn accepts(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if self.matcher.is_ignored(relative) {
            return false;
        }
        if let Some(max_size_mb) = self.max_size_mb {
            match fs::metadata(path) {
                Ok(metadata) => {
                    if metadata.len() as f64 / BYTES_PER_MB > max_size_mb {
                        return false;
                    }
                }
                Err(err) => {
                    warn!("skipping {}: {}", path.display(), err);
                    return false;
                }
            }
        }
        is_text_file(path)
    }
}

impl Iterator for RepositoryWalker<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        while let Some(path) = self.pending.pop() {
            if path.is_symlink() {
                continue;
            }

            if path.is_dir() {
                if path != self.root {
                    let relative = path.strip_prefix(&self.root).unwrap_or(&path);
                    if self.matcher.should_ignore_dir(relative) {
                        continue;
                    }
                }
                let entries = match fs::read_dir(&path) {
                    Ok(entries) => entries,
                    Err(err) => {
                        warn!("skipping unreadable directory {}: {}", path.display(), err);
                        continue;
                    }
                };
                let mut children: Vec<PathBuf> =
                    entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()).collect();
                children.sort();
                // Reversed so popping yields lexical order.
                self.pending.extend(children.into_iter().rev());
                continue;
            }

            if path.is_file() && self.accepts(&path) {
                return Some(path);
            }
        }
        None
    }
}

/// Classify a file as text by sampling its head.
///
/// Empty files are text. A NUL byte in the sample, an undetectable encoding,
/// a decode failure, or any I/O error all classify as binary.
pub fn is_text_file(path: &Path) -> bool {
    let sample = match read_sample(path) {
        Ok(sample) => sample,
        Err(err) => {
            warn!("failed to sample {}: {}", path.display(), err);
            return false;
        }
    };
    if sample.is_empty() {
        return true;
    }
    if sample.contains(&0) {
        return false;
    }

    let (charset, _confidence, _language) = chardet::detect(&sample);
    if charset.is_empty() {
        return false;
    }
    let Some(encoding) = Encoding::for_label(charset2encoding(&charset).as_bytes()) else {
        return false;
    };
    let (_decoded, _actual, had_errors) = encoding.decode(&sample);
    !had_errors
}

fn read_sample(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = fs::File::open(path)?;
    let mut buffer = [0u8; SAMPLE_SIZE];
    let mut filled = 0;
    while filled < buffer.len() {
        let read = file.read(&mut buffer[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(buffer[..filled].to_vec())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::ignore::IgnoreMatcher;

    fn walk_names(root: &Path, matcher: &IgnoreMatcher, max_size_mb: Option<f64>) -> Vec<String> {
        RepositoryWalker::new(root, matcher, max_size_mb)
            .map(|path| {
                path.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn test_yields_only_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("README.md"), "# readme").unwrap();

        let matcher = IgnoreMatcher::empty();
        let names = walk_names(dir.path(), &matcher, None);
        assert_eq!(names, ["README.md", "src/main.rs"]);
    }

    #[test]
    fn test_walk_is_deterministic() {
        let dir = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "c.txt"] {
            fs::write(dir.path().join(name), "text").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/d.txt"), "text").unwrap();

        let matcher = IgnoreMatcher::empty();
        let first = walk_names(dir.path(), &matcher, None);
        let second = walk_names(dir.path(), &matcher, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ignored_directory_pruned() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/out.txt"), "artifact").unwrap();
        fs::write(dir.path().join("keep.txt"), "source").unwrap();

        let matcher = IgnoreMatcher::new(["build/"]);
        let names = walk_names(dir.path(), &matcher, None);
        assert_eq!(names, ["keep.txt"]);
    }

    #[test]
    fn test_size_limit_excludes_large_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.txt"), "x".repeat(2048)).unwrap();
        fs::write(dir.path().join("small.txt"), "x").unwrap();

        let matcher = IgnoreMatcher::empty();
        // 1 KB limit expressed in MB.
        let names = walk_names(dir.path(), &matcher, Some(1.0 / 1024.0));
        assert_eq!(names, ["small.txt"]);
    }

    #[test]
    fn test_no_size_limit_includes_large_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.txt"), "x".repeat(2048)).unwrap();

        let matcher = IgnoreMatcher::empty();
        let names = walk_names(dir.path(), &matcher, None);
        assert_eq!(names, ["big.txt"]);
    }

    #[test]
    fn test_zero_bytes_classified_binary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("zeros.bin");
        fs::write(&path, vec![0u8; 4096]).unwrap();

        assert!(!is_text_file(&path));

        // Excluded even with the size check disabled.
        let matcher = IgnoreMatcher::empty();
        assert!(walk_names(dir.path(), &matcher, None).is_empty());
    }

    #[test]
    fn test_empty_file_classified_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        fs::write(&path, "").unwrap();

        assert!(is_text_file(&path));
    }

    #[test]
    fn test_utf8_classified_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, "hello 世界\n").unwrap();

        assert!(is_text_file(&path));
    }

    #[test]
    fn test_missing_file_classified_binary() {
        assert!(!is_text_file(&PathBuf::from("/nonexistent/sample.txt")));
    }

    #[test]
    fn test_binary_excluded_without_size_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("image.dat"), vec![0u8; 64]).unwrap();
        fs::write(dir.path().join("notes.txt"), "plain text").unwrap();

        let matcher = IgnoreMatcher::empty();
        let names = walk_names(dir.path(), &matcher, None);
        assert_eq!(names, ["notes.txt"]);
    }
}
