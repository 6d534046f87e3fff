//! Gitignore-style pattern matching
//!
//! Patterns come from a fixed built-in list or from the repository's own
//! `.gitignore`. When a `.gitignore` exists its lines replace the built-in
//! list entirely; the two are never unioned. Negated patterns (`!pattern`)
//! are accepted on input but never re-admit a path; whitelisting is a known
//! limitation, not supported.

use std::fs;
use std::path::Path;

use glob::Pattern;
use log::{debug, warn};

/// Built-in exclusions used when a repository has no `.gitignore`.
///
/// Passed explicitly into [`IgnoreMatcher::from_root`] so tests can swap in
/// their own lists.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "__pycache__/",
    "*.py[cod]",
    "*$py.class",
    "*.so",
    ".Python",
    "build/",
    "develop-eggs/",
    "dist/",
    "downloads/",
    "eggs/",
    ".eggs/",
    "lib/",
    "lib64/",
    "parts/",
    "sdist/",
    "var/",
    "wheels/",
    "*.egg-info/",
    ".installed.cfg",
    "*.egg",
    "MANIFEST",
    ".env",
    ".venv",
    "env/",
    "venv/",
    "ENV/",
    ".pytest_cache/",
];

/// Directory names pruned during traversal regardless of the pattern list.
/// Purely a descent shortcut for content that never belongs in a summary.
const ALWAYS_IGNORED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    ".pytest_cache",
    "venv",
    ".venv",
    "env",
];

#[derive(Debug)]
struct IgnoreRule {
    raw: String,
    pattern: Pattern,
    dir_only: bool,
}

impl IgnoreRule {
    fn matches(&self, candidate: &str) -> bool {
        if self.dir_only {
            self.matches_dir(candidate)
        } else {
            self.pattern.matches(candidate)
        }
    }

    /// Directory patterns match at any ancestor level: each prefix-joined
    /// subpath and each individual segment is tested, so `build/` catches
    /// both `build/y.txt` and `a/build/x.txt`.
    fn matches_dir(&self, candidate: &str) -> bool {
        let mut offset = 0;
        for segment in candidate.split('/') {
            let subpath = &candidate[..offset + segment.len()];
            if self.pattern.matches(segment) || self.pattern.matches(subpath) {
                return true;
            }
            offset += segment.len() + 1;
        }
        false
    }
}

/// Ordered ignore rules evaluated against root-relative paths.
#[derive(Debug, Default)]
pub struct IgnoreMatcher {
    rules: Vec<IgnoreRule>,
}

impl IgnoreMatcher {
    /// Build a matcher from raw pattern lines. Comments, blank lines and
    /// negations are dropped; a leading `/` is stripped; a trailing `/`
    /// anchors the pattern to directories.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = lines
            .into_iter()
            .filter_map(|line| compile_rule(line.as_ref()))
            .collect();
        Self { rules }
    }

    /// A matcher that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a matcher for a repository root. A readable `.gitignore` at the
    /// root replaces `defaults` wholesale; otherwise `defaults` apply.
    pub fn from_root(root: &Path, defaults: &[&str]) -> Self {
        let gitignore = root.join(".gitignore");
        if gitignore.is_file() {
            match fs::read_to_string(&gitignore) {
                Ok(text) => return Self::new(text.lines()),
                Err(err) => {
                    warn!("failed to read {}: {}", gitignore.display(), err);
                }
            }
        }
        Self::new(defaults.iter().copied())
    }

    /// The normalized pattern strings, in evaluation order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.raw.as_str())
    }

    /// Authoritative check: does any rule match this root-relative path?
    /// First match in list order wins.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        let candidate = to_slash(relative);
        self.rules.iter().any(|rule| rule.matches(&candidate))
    }

    /// Cheap pre-descent check for a directory. Prunes the hard-coded name
    /// set without consulting the rules, then falls back to [`is_ignored`].
    ///
    /// [`is_ignored`]: IgnoreMatcher::is_ignored
    pub fn should_ignore_dir(&self, relative: &Path) -> bool {
        if let Some(name) = relative.file_name() {
            let name = name.to_string_lossy();
            if ALWAYS_IGNORED_DIRS.contains(&name.as_ref()) {
                return true;
            }
        }
        self.is_ignored(relative)
    }
}

fn compile_rule(line: &str) -> Option<IgnoreRule> {
    let mut text = line.trim();
    if text.is_empty() || text.starts_with('#') {
        return None;
    }
    if let Some(negated) = text.strip_prefix('!') {
        // Recognized but inert: negation never re-admits a path.
        debug!("dropping unsupported negated pattern: !{}", negated);
        return None;
    }
    text = text.strip_prefix('/').unwrap_or(text);

    let dir_only = text.ends_with('/');
    let stripped = text.trim_end_matches('/');
    if stripped.is_empty() {
        return None;
    }

    match Pattern::new(stripped) {
        Ok(pattern) => Some(IgnoreRule {
            raw: text.to_string(),
            pattern,
            dir_only,
        }),
        Err(err) => {
            warn!("skipping malformed ignore pattern {:?}: {}", text, err);
            None
        }
    }
}

fn to_slash(path: &Path) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        path.to_string_lossy().into_owned()
    } else {
        path.to_string_lossy()
            .replace(std::path::MAIN_SEPARATOR, "/")
    }
}
