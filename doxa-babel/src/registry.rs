//! Format registry for format discovery and selection
//!
//! This module provides a centralized registry for all available formats.
//! Formats can be registered and retrieved by name, and any parsing format can be
//! converted into any serializing format through the event stream.

use crate::error::FormatError;
use crate::format::{Format, SerializedDocument};
use crate::sink::Event;
use std::collections::HashMap;

/// Registry of document formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let html = registry.convert("* Title", "apt", "html", &HashMap::new(), &HashMap::new())?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Detect format from filename based on file extension
    ///
    /// Returns the format name if a matching extension is found, or None otherwise.
    /// When several formats claim an extension, the one that can parse wins, then the
    /// alphabetically first.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?;

        let mut candidates: Vec<&dyn Format> = self
            .formats
            .values()
            .map(|f| f.as_ref())
            .filter(|f| f.file_extensions().contains(&extension))
            .collect();
        candidates.sort_by(|a, b| {
            b.supports_parsing()
                .cmp(&a.supports_parsing())
                .then_with(|| a.name().cmp(b.name()))
        });
        candidates.first().map(|f| f.name().to_string())
    }

    /// Parse source text using the specified format
    pub fn parse(&self, source: &str, format: &str) -> Result<Vec<Event>, FormatError> {
        self.parse_with_options(source, format, &HashMap::new())
    }

    /// Parse source text using the specified format and options
    pub fn parse_with_options(
        &self,
        source: &str,
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<Vec<Event>, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support parsing"
            )));
        }
        fmt.parse_with_options(source, options)
    }

    /// Serialize an event stream using the specified format
    pub fn serialize(&self, events: &[Event], format: &str) -> Result<String, FormatError> {
        let empty = HashMap::new();
        match self.serialize_with_options(events, format, &empty)? {
            SerializedDocument::Text(text) => Ok(text),
            SerializedDocument::Binary(_) => Err(FormatError::SerializationError(format!(
                "Format '{format}' produced binary output when text was expected"
            ))),
        }
    }

    /// Serialize an event stream using the specified format and options
    pub fn serialize_with_options(
        &self,
        events: &[Event],
        format: &str,
        options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' does not support serialization"
            )));
        }
        fmt.serialize_with_options(events, options)
    }

    /// Parse `source` as `from` and render it as `to`.
    pub fn convert(
        &self,
        source: &str,
        from: &str,
        to: &str,
        parse_options: &HashMap<String, String>,
        serialize_options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        // Fail on an unknown target before doing any parsing work.
        self.get(to)?;
        let events = self.parse_with_options(source, from, parse_options)?;
        log::debug!("{from} -> {to}: {} events", events.len());
        self.serialize_with_options(&events, to, serialize_options)
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::apt::AptFormat::default());
        registry.register(crate::formats::xdoc::XdocFormat::default());
        registry.register(crate::formats::fml::FmlFormat);
        registry.register(crate::formats::html::HtmlFormat::default());
        registry.register(crate::formats::fo::FoFormat::default());
        #[cfg(feature = "native-export")]
        registry.register(crate::formats::fo::pdf::FoPdfFormat::default());
        registry.register(crate::formats::tag::TagFormat);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
