//! Format trait definition
//!
//! A format is one end of the conversion pipeline: parsing formats turn source text into
//! the event stream, serializing formats render an event stream. The event vector is the
//! hand-off between the two, which keeps every parser usable with every renderer.

use crate::error::FormatError;
use crate::sink::{wrap_sink, Event, Sink};
use std::collections::HashMap;

/// Serialized output produced by a [`Format`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedDocument {
    /// UTF-8 text output (e.g., HTML, XSL-FO, APT)
    Text(String),
    /// Binary output (e.g., PDF)
    Binary(Vec<u8>),
}

impl SerializedDocument {
    /// Consume the serialized output and return the underlying bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SerializedDocument::Text(text) => text.into_bytes(),
            SerializedDocument::Binary(bytes) => bytes,
        }
    }
}

/// Option keys understood by the parsing formats.
pub mod options {
    /// Source file name, used in error locations.
    pub const FILE: &str = "file";
    /// Directory macros resolve relative paths against.
    pub const BASE_DIR: &str = "base-dir";
    /// `"true"` logs auto-corrections immediately.
    pub const VERBOSE: &str = "verbose";
    /// `"false"` skips macro invocations.
    pub const MACROS: &str = "macros";
    /// `"true"` inserts an anchor into every section title (renderers).
    pub const GENERATE_ANCHORS: &str = "generate-anchors";
    /// `"true"` fails rendering on a repeated anchor name (renderers).
    pub const UNIQUE_ANCHORS: &str = "unique-anchors";

    use crate::sink::wrappers::{AnchorsForIndexEntries, UniqueAnchors};
    use crate::sink::SinkWrapperFactory;
    use std::collections::HashMap;

    /// The wrapper factories a render with `options` goes through.
    pub fn wrappers(options: &HashMap<String, String>) -> Vec<Box<dyn SinkWrapperFactory>> {
        let mut factories: Vec<Box<dyn SinkWrapperFactory>> = Vec::new();
        if flag(options, GENERATE_ANCHORS, false) {
            factories.push(Box::new(AnchorsForIndexEntries));
        }
        if flag(options, UNIQUE_ANCHORS, false) {
            factories.push(Box::new(UniqueAnchors));
        }
        factories
    }

    /// Reads a boolean option, `default` when absent or unparseable.
    pub fn flag(options: &HashMap<String, String>, key: &str, default: bool) -> bool {
        match options.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "true" || v == "yes" || v == "1" || v.is_empty() => true,
            Some(v) if v == "false" || v == "no" || v == "0" => false,
            _ => default,
        }
    }
}

/// Trait for document formats
///
/// Formats can support parsing, serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, events: &[Event]) -> Result<String, FormatError> {
///         Ok(events.iter().map(Event::name).collect::<Vec<_>>().join("\n"))
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "apt", "html", "fo")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot.
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (source → events)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (events → output)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into an event stream
    fn parse(&self, source: &str) -> Result<Vec<Event>, FormatError> {
        self.parse_with_options(source, &HashMap::new())
    }

    /// Parse source text, optionally using extra parameters (see [`options`]).
    ///
    /// Default implementation returns NotSupported error.
    fn parse_with_options(
        &self,
        _source: &str,
        _options: &HashMap<String, String>,
    ) -> Result<Vec<Event>, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize an event stream into text
    ///
    /// Default implementation returns NotSupported error.
    fn serialize(&self, _events: &[Event]) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Serialize an event stream, optionally using extra parameters.
    ///
    /// Formats that only emit textual output can rely on the default implementation,
    /// which delegates to [`Format::serialize`]. Binary formats should override this
    /// method to return [`SerializedDocument::Binary`].
    fn serialize_with_options(
        &self,
        events: &[Event],
        _options: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        self.serialize(events).map(SerializedDocument::Text)
    }
}

/// Replays `events` into `sink` through the wrappers selected by `options`, then closes
/// the chain.
pub fn render(
    events: &[Event],
    sink: &mut dyn Sink,
    options: &HashMap<String, String>,
) -> Result<(), FormatError> {
    let mut chain = wrap_sink(Box::new(sink), &options::wrappers(options));
    for event in events {
        chain.emit(event.clone())?;
    }
    chain.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Tag, TagKind};

    struct NamesFormat;

    impl Format for NamesFormat {
        fn name(&self) -> &str {
            "names"
        }

        fn supports_serialization(&self) -> bool {
            true
        }

        fn serialize(&self, events: &[Event]) -> Result<String, FormatError> {
            Ok(events.iter().map(Event::name).collect::<Vec<_>>().join(" "))
        }
    }

    #[test]
    fn test_default_parse_is_not_supported() {
        let result = NamesFormat.parse("x");
        assert!(matches!(result, Err(FormatError::NotSupported(_))));
    }

    #[test]
    fn test_serialize_with_options_delegates() {
        let events = vec![Event::start(Tag::Bold), Event::end(TagKind::Bold)];
        let out = NamesFormat
            .serialize_with_options(&events, &HashMap::new())
            .unwrap();
        assert_eq!(out.into_bytes(), b"bold bold_".to_vec());
    }

    #[test]
    fn test_flag_option() {
        let mut opts = HashMap::new();
        opts.insert("verbose".to_string(), "".to_string());
        opts.insert("macros".to_string(), "false".to_string());
        assert!(options::flag(&opts, options::VERBOSE, false));
        assert!(!options::flag(&opts, options::MACROS, true));
        assert!(options::flag(&opts, "missing", true));
    }

    #[test]
    fn test_render_applies_selected_wrappers() {
        let mut events: Vec<Event> = Vec::new();
        for _ in 0..2 {
            events.push(Event::start(Tag::Anchor("a".into())));
            events.push(Event::end(TagKind::Anchor));
        }

        let mut out: Vec<Event> = Vec::new();
        render(&events, &mut out, &HashMap::new()).unwrap();
        assert_eq!(out.len(), 4);

        let mut opts = HashMap::new();
        opts.insert(options::UNIQUE_ANCHORS.to_string(), "true".to_string());
        let mut out: Vec<Event> = Vec::new();
        let err = render(&events, &mut out, &opts).unwrap_err();
        assert!(err.to_string().contains("used more than once"));
    }
}
