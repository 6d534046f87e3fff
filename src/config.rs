//! Layered configuration loading
//!
//! Analysis behavior is controlled by an optional `mash.yaml` at the
//! repository root. User values overlay the built-in defaults one leaf at a
//! time, so a file that sets only `thresholds.cat_threshold` leaves every
//! other section untouched. The merged result is validated before anything
//! else runs; consumers never see a partial configuration.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Name of the optional per-repository configuration file.
pub const CONFIG_FILE_NAME: &str = "mash.yaml";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub output: OutputSection,
    pub thresholds: ThresholdSection,
    pub gitignore: GitignoreSection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSection {
    pub max_tokens: u64,
    pub size_limits: SizeLimits,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeLimits {
    pub file_max_mb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSection {
    pub cat_threshold: u64,
    pub fold_threshold: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GitignoreSection {
    pub respect: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputSection {
                max_tokens: 5000,
                size_limits: SizeLimits { file_max_mb: 1.0 },
            },
            thresholds: ThresholdSection {
                cat_threshold: 5000,
                fold_threshold: 15000,
            },
            gitignore: GitignoreSection { respect: true },
        }
    }
}

/// User-supplied overrides. Every field is optional; unrecognized keys are
/// dropped during deserialization rather than rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigOverlay {
    output: OutputOverlay,
    thresholds: ThresholdOverlay,
    gitignore: GitignoreOverlay,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutputOverlay {
    max_tokens: Option<u64>,
    size_limits: SizeLimitsOverlay,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SizeLimitsOverlay {
    file_max_mb: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThresholdOverlay {
    cat_threshold: Option<u64>,
    fold_threshold: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GitignoreOverlay {
    respect: Option<bool>,
}

impl Config {
    fn apply(&mut self, overlay: ConfigOverlay) {
        self.output.apply(overlay.output);
        self.thresholds.apply(overlay.thresholds);
        self.gitignore.apply(overlay.gitignore);
    }

    fn validate(&self) -> Result<()> {
        if self.output.max_tokens == 0 {
            return Err(Error::configuration(
                "output.max_tokens must be a positive integer",
            ));
        }
        if !(self.output.size_limits.file_max_mb > 0.0) {
            return Err(Error::configuration(
                "output.size_limits.file_max_mb must be a positive number",
            ));
        }
        if self.thresholds.cat_threshold == 0 {
            return Err(Error::configuration(
                "thresholds.cat_threshold must be a positive integer",
            ));
        }
        if self.thresholds.fold_threshold == 0 {
            return Err(Error::configuration(
                "thresholds.fold_threshold must be a positive integer",
            ));
        }
        if self.thresholds.cat_threshold >= self.thresholds.fold_threshold {
            return Err(Error::configuration(
                "thresholds.cat_threshold must be less than thresholds.fold_threshold",
            ));
        }
        Ok(())
    }
}

impl OutputSection {
    fn apply(&mut self, overlay: OutputOverlay) {
        if let Some(max_tokens) = overlay.max_tokens {
            self.max_tokens = max_tokens;
        }
        if let Some(file_max_mb) = overlay.size_limits.file_max_mb {
            self.size_limits.file_max_mb = file_max_mb;
        }
    }
}

impl ThresholdSection {
    fn apply(&mut self, overlay: ThresholdOverlay) {
        if let Some(cat_threshold) = overlay.cat_threshold {
            self.cat_threshold = cat_threshold;
        }
        if let Some(fold_threshold) = overlay.fold_threshold {
            self.fold_threshold = fold_threshold;
        }
    }
}

impl GitignoreSection {
    fn apply(&mut self, overlay: GitignoreOverlay) {
        if let Some(respect) = overlay.respect {
            self.respect = respect;
        }
    }
}

/// Load configuration from `repo_root/mash.yaml`, or the defaults when no
/// file is present. The result is always validated, defaults included.
pub fn load_config(repo_root: &Path) -> Result<Config> {
    let mut config = Config::default();

    let path = repo_root.join(CONFIG_FILE_NAME);
    if path.is_file() {
        let text = fs::read_to_string(&path).map_err(|err| {
            Error::configuration(format!("failed to read {}: {}", path.display(), err))
        })?;
        // An empty or all-comment file means no overrides.
        if !text.trim().is_empty() {
            let overlay: Option<ConfigOverlay> = serde_yaml::from_str(&text).map_err(|err| {
                Error::configuration(format!("invalid YAML in {}: {}", path.display(), err))
            })?;
            if let Some(overlay) = overlay {
                config.apply(overlay);
            }
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &TempDir, content: &str) {
        fs::write(dir.path().join(CONFIG_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_defaults_when_no_file() {
        let dir = TempDir::new().unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override_leaves_other_sections() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "thresholds:\n  cat_threshold: 1000\n");

        let config = load_config(dir.path()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.thresholds.cat_threshold, 1000);
        assert_eq!(
            config.thresholds.fold_threshold,
            defaults.thresholds.fold_threshold
        );
        assert_eq!(config.output, defaults.output);
        assert_eq!(config.gitignore, defaults.gitignore);
    }

    #[test]
    fn test_leaf_values_override_independently() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "output:\n  size_limits:\n    file_max_mb: 2.5\ngitignore:\n  respect: false\n",
        );

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.output.size_limits.file_max_mb, 2.5);
        assert_eq!(config.output.max_tokens, Config::default().output.max_tokens);
        assert!(!config.gitignore.respect);
    }

    #[test]
    fn test_equal_thresholds_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "thresholds:\n  cat_threshold: 5000\n  fold_threshold: 5000\n",
        );

        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "output:\n  max_tokens: 0\n");

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_negative_file_max_mb_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "output:\n  size_limits:\n    file_max_mb: -1.0\n");

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "output: [unclosed\n");

        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_non_mapping_document_rejected() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "- just\n- a\n- list\n");

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_empty_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "");

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_keys_dropped() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            "output:\n  max_tokens: 700\n  shiny: true\nplugins:\n  - nope\n",
        );

        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.output.max_tokens, 700);
    }
}
