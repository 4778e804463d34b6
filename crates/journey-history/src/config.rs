//! Configuration types for loading and classifying journey history.
//!
//! [`CorpusConfig`] replaces the implicit "scan `data/` for `*journeys*.csv`"
//! defaults with an explicit value passed to [`crate::load_corpus`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default folder scanned for journey history exports.
pub const DEFAULT_FOLDER: &str = "data";

/// Default file-name filter for journey history exports.
pub const DEFAULT_PATTERN: &str = "journeys";

/// Where to find journey history exports and how to merge them.
///
/// # Example
///
/// ```rust,ignore
/// use journey_history::config::CorpusConfig;
///
/// let config = CorpusConfig::builder()
///     .folder("exports/2023")
///     .deduplicate(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Folder scanned (non-recursively) for exports.
    /// Default: "data"
    pub folder: PathBuf,

    /// Substring a file name must contain, before its `.csv` suffix.
    /// Default: "journeys"
    pub pattern: String,

    /// Whether rows that agree on every column their files share are
    /// collapsed to the first occurrence.
    /// Overlapping exports usually repeat the same journeys.
    /// Default: true
    pub deduplicate: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_FOLDER),
            pattern: DEFAULT_PATTERN.to_string(),
            deduplicate: true,
        }
    }
}

impl CorpusConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CorpusConfigBuilder {
        CorpusConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.folder.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyFolder);
        }

        if self.pattern.is_empty() {
            return Err(ConfigValidationError::EmptyPattern);
        }

        if self.pattern.contains(['/', '\\']) {
            return Err(ConfigValidationError::PatternContainsSeparator(
                self.pattern.clone(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Folder must not be empty")]
    EmptyFolder,

    #[error("File pattern must not be empty")]
    EmptyPattern,

    #[error("File pattern '{0}' must not contain a path separator")]
    PatternContainsSeparator(String),
}

impl From<ConfigValidationError> for crate::error::JourneyError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::JourneyError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`CorpusConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CorpusConfigBuilder {
    folder: Option<PathBuf>,
    pattern: Option<String>,
    deduplicate: Option<bool>,
}

impl CorpusConfigBuilder {
    /// Set the folder to scan.
    pub fn folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.folder = Some(path.into());
        self
    }

    /// Set the file-name substring to match.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Enable or disable collapsing of duplicate rows.
    pub fn deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = Some(deduplicate);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CorpusConfig` or an error if validation fails.
    pub fn build(self) -> Result<CorpusConfig, ConfigValidationError> {
        let config = CorpusConfig {
            folder: self
                .folder
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FOLDER)),
            pattern: self.pattern.unwrap_or_else(|| DEFAULT_PATTERN.to_string()),
            deduplicate: self.deduplicate.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Options for turning the raw corpus into rail journeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Reject descriptions containing `" to "` more than once instead of
    /// splitting at the first occurrence.
    /// Default: true
    pub strict_split: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { strict_split: true }
    }
}

/// Switches for [`crate::query_journeys`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Skip logging the distinct matched station names.
    pub quiet: bool,
    /// Render a duration histogram of the matched journeys.
    pub plot: bool,
}

impl QueryOptions {
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn plot(mut self, plot: bool) -> Self {
        self.plot = plot;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CorpusConfig::default();
        assert_eq!(config.folder, PathBuf::from("data"));
        assert_eq!(config.pattern, "journeys");
        assert!(config.deduplicate);
    }

    #[test]
    fn test_builder_defaults() {
        let config = CorpusConfig::builder().build().unwrap();
        assert_eq!(config, CorpusConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CorpusConfig::builder()
            .folder("exports")
            .pattern("history")
            .deduplicate(false)
            .build()
            .unwrap();

        assert_eq!(config.folder, PathBuf::from("exports"));
        assert_eq!(config.pattern, "history");
        assert!(!config.deduplicate);
    }

    #[test]
    fn test_validation_empty_pattern() {
        let result = CorpusConfig::builder().pattern("").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyPattern
        ));
    }

    #[test]
    fn test_validation_pattern_with_separator() {
        let result = CorpusConfig::builder().pattern("2020/journeys").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::PatternContainsSeparator(_)
        ));
    }

    #[test]
    fn test_validation_error_converts_to_invalid_config() {
        let err: crate::error::JourneyError = ConfigValidationError::EmptyFolder.into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "folder": "exports",
            "pattern": "journeys",
            "deduplicate": false
        }"#;

        let config: CorpusConfig = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(config.folder.to_str().unwrap(), "exports");
        assert!(!config.deduplicate);
    }

    #[test]
    fn test_query_options_setters() {
        let options = QueryOptions::default().quiet(true).plot(true);
        assert!(options.quiet);
        assert!(options.plot);
        assert!(ClassifierConfig::default().strict_split);
    }
}
