//! Repository analysis
//!
//! One `analyze` call resolves the analysis root, selects eligible files via
//! [`RepositoryWalker`], and packages the result as a [`RepositoryInfo`] for
//! downstream consumers. File contents stay unloaded until a collaborator
//! asks for them with [`load_contents`].

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use log::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::ignore::{DEFAULT_IGNORE_PATTERNS, IgnoreMatcher};
use crate::tree;
use crate::walk::{BYTES_PER_MB, RepositoryWalker};

/// One selected file.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub size_mb: f64,
    pub is_python: bool,
    /// Loaded lazily by [`load_contents`]; `None` until then.
    pub content: Option<String>,
}

/// The result of one analysis pass.
#[derive(Debug)]
pub struct RepositoryInfo {
    pub root: PathBuf,
    /// Sorted by relative path, case-sensitive lexical order.
    pub files: Vec<FileRecord>,
    pub ignore_patterns: Vec<String>,
    pub total_size_mb: f64,
    pub python_file_count: usize,
    pub total_file_count: usize,
}

impl RepositoryInfo {
    /// Render the selection as an indented tree.
    pub fn tree_representation(&self) -> String {
        tree::render_tree(&tree::build_tree(&self.root, &self.files))
    }
}

/// Find the work directory of the repository containing `start`, if any.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let repo = Repository::discover(start).ok()?;
    repo.workdir().map(Path::to_path_buf)
}

/// Analyze a repository and gather information about its structure.
///
/// The root is the enclosing repository's work dir when one exists, else
/// `path` itself. `force_cat` disables both gitignore filtering and the size
/// limit. Per-file failures are logged and skipped; only an unusable root
/// fails the whole call.
pub fn analyze(path: &Path, config: &Config, force_cat: bool) -> Result<RepositoryInfo> {
    let root = find_repo_root(path).unwrap_or_else(|| path.to_path_buf());

    if !root.is_dir() {
        return Err(Error::analysis(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    fs::read_dir(&root)
        .map_err(|err| Error::analysis(format!("cannot read {}: {}", root.display(), err)))?;

    let matcher = if config.gitignore.respect && !force_cat {
        IgnoreMatcher::from_root(&root, DEFAULT_IGNORE_PATTERNS)
    } else {
        IgnoreMatcher::empty()
    };

    let max_size_mb = if force_cat {
        None
    } else {
        Some(config.output.size_limits.file_max_mb)
    };

    info!("analyzing repository at {}", root.display());

    let mut files = Vec::new();
    let mut total_size_mb = 0.0;
    let mut python_file_count = 0;

    for path in RepositoryWalker::new(&root, &matcher, max_size_mb) {
        let size_mb = match fs::metadata(&path) {
            Ok(metadata) => metadata.len() as f64 / BYTES_PER_MB,
            Err(err) => {
                warn!("error processing {}: {}", path.display(), err);
                continue;
            }
        };
        let relative_path = match path.strip_prefix(&root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => path.clone(),
        };
        let is_python = path.extension().is_some_and(|ext| ext == "py");

        total_size_mb += size_mb;
        if is_python {
            python_file_count += 1;
        }
        files.push(FileRecord {
            path,
            relative_path,
            size_mb,
            is_python,
            content: None,
        });
    }

    files.sort_by(|a, b| a.relative_path.as_os_str().cmp(b.relative_path.as_os_str()));

    let total_file_count = files.len();
    Ok(RepositoryInfo {
        ignore_patterns: matcher.patterns().map(str::to_owned).collect(),
        root,
        files,
        total_size_mb,
        python_file_count,
        total_file_count,
    })
}

/// Fill in `content` for every record, in place. Unreadable files are logged
/// and left as `None`; the pass never fails.
pub fn load_contents(info: &mut RepositoryInfo) {
    for record in &mut info.files {
        match fs::read_to_string(&record.path) {
            Ok(text) => record.content = Some(text),
            Err(err) => {
                warn!("error reading {}: {}", record.path.display(), err);
                record.content = None;
            }
        }
    }
}
