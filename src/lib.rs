//! Mash - squash repositories into digestible summaries
//!
//! This crate selects which files in a source tree are worth summarizing and
//! builds a structural view of that selection: layered configuration,
//! gitignore-style exclusion, size and text/binary filtering, and a sorted
//! tree rendering.

pub mod config;
pub mod error;
pub mod ignore;
pub mod repo;
pub mod tree;
pub mod walk;

pub use config::{CONFIG_FILE_NAME, Config, load_config};
pub use error::{Error, Result};
pub use ignore::{DEFAULT_IGNORE_PATTERNS, IgnoreMatcher};
pub use repo::{FileRecord, RepositoryInfo, analyze, find_repo_root, load_contents};
pub use tree::{TreeNode, build_tree, render_tree};
pub use walk::RepositoryWalker;
