//! Shared configuration loader for the panedit toolchain.
//!
//! `defaults/panedit.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into
//! [`PaneditConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use panedit_core::{FormatOptions, Wrap, WriterOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/panedit.default.toml");

/// Top-level configuration consumed by panedit applications.
#[derive(Debug, Clone, Deserialize)]
pub struct PaneditConfig {
    pub conversion: ConversionConfig,
    pub writer: WriterConfig,
    pub editor: EditorConfig,
}

/// How text is handed to and read back from pandoc.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionConfig {
    pub format: String,
    pub suppress_identifiers: bool,
    /// Explicit pandoc binary; empty to search the `PATH`.
    pub pandoc: String,
}

impl ConversionConfig {
    pub fn pandoc_path(&self) -> Option<PathBuf> {
        (!self.pandoc.is_empty()).then(|| PathBuf::from(&self.pandoc))
    }
}

impl From<&ConversionConfig> for FormatOptions {
    fn from(config: &ConversionConfig) -> Self {
        FormatOptions {
            format: config.format.clone(),
            suppress_identifiers: config.suppress_identifiers,
        }
    }
}

impl From<ConversionConfig> for FormatOptions {
    fn from(config: ConversionConfig) -> Self {
        FormatOptions::from(&config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriterConfig {
    pub atx_headings: bool,
    pub wrap_column: usize,
}

impl From<&WriterConfig> for WriterOptions {
    fn from(config: &WriterConfig) -> Self {
        WriterOptions {
            atx_headings: config.atx_headings,
            wrap: match config.wrap_column {
                0 => Wrap::None,
                columns => Wrap::Column(columns),
            },
        }
    }
}

impl From<WriterConfig> for WriterOptions {
    fn from(config: WriterConfig) -> Self {
        WriterOptions::from(&config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    pub history_limit: usize,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<PaneditConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<PaneditConfig, ConfigError> {
    Loader::new().build()
}
