//! Shared configuration loader for the doxa toolchain.
//!
//! `defaults/doxa.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DoxaConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use doxa_babel::format::options;
use doxa_babel::formats::fo::{self, FoOptions};
use doxa_babel::formats::html::{self, HtmlOptions};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/doxa.default.toml");

/// Top-level configuration consumed by doxa applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DoxaConfig {
    pub parse: ParseConfig,
    pub convert: ConvertConfig,
}

/// Settings shared by every source parser.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    pub verbose_warnings: bool,
    pub macros: bool,
}

impl ParseConfig {
    /// The parser option map these settings stand for.
    pub fn to_options(&self) -> HashMap<String, String> {
        HashMap::from([
            (options::VERBOSE.to_string(), self.verbose_warnings.to_string()),
            (options::MACROS.to_string(), self.macros.to_string()),
        ])
    }
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub html: HtmlConfig,
    pub fo: FoConfig,
    pub pdf: PdfConfig,
}

impl ConvertConfig {
    /// Serialize options for `format`, as understood by the format's
    /// `serialize_with_options`. Unknown formats get an empty map.
    pub fn options_for(&self, format: &str) -> HashMap<String, String> {
        match format {
            "html" => self.html.to_options(),
            "fo" => self.fo.to_options(),
            "pdf" => {
                let mut opts = self.fo.to_options();
                if !self.pdf.processor.is_empty() {
                    opts.insert(
                        fo::PROCESSOR.to_string(),
                        self.pdf.processor.clone(),
                    );
                }
                opts
            }
            _ => HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlConfig {
    pub full_document: bool,
    pub generate_anchors: bool,
    pub unique_anchors: bool,
}

impl HtmlConfig {
    pub fn to_options(&self) -> HashMap<String, String> {
        HashMap::from([
            (html::FULL_DOCUMENT.to_string(), self.full_document.to_string()),
            (
                options::GENERATE_ANCHORS.to_string(),
                self.generate_anchors.to_string(),
            ),
            (
                options::UNIQUE_ANCHORS.to_string(),
                self.unique_anchors.to_string(),
            ),
        ])
    }
}

impl From<&HtmlConfig> for HtmlOptions {
    fn from(config: &HtmlConfig) -> Self {
        HtmlOptions {
            full_document: config.full_document,
            ..HtmlOptions::default()
        }
    }
}

/// Page geometry and fonts of the XSL-FO renderer.
#[derive(Debug, Clone, Deserialize)]
pub struct FoConfig {
    pub page_size: String,
    pub margin: String,
    pub font_family: String,
    pub font_size: String,
}

impl FoConfig {
    pub fn to_options(&self) -> HashMap<String, String> {
        HashMap::from([
            (fo::PAGE_SIZE.to_string(), self.page_size.clone()),
            (fo::MARGIN.to_string(), self.margin.clone()),
            (fo::FONT_FAMILY.to_string(), self.font_family.clone()),
            (fo::FONT_SIZE.to_string(), self.font_size.clone()),
        ])
    }
}

impl From<&FoConfig> for FoOptions {
    fn from(config: &FoConfig) -> Self {
        FoOptions {
            page_size: config.page_size.clone(),
            margin: config.margin.clone(),
            font_family: config.font_family.clone(),
            font_size: config.font_size.clone(),
            ..FoOptions::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PdfConfig {
    pub processor: String,
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
    pub fn build(self) -> Result<DoxaConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DoxaConfig, ConfigError> {
    Loader::new().build()
}
