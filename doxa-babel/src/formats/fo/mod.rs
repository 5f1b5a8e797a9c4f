//! XSL-FO output.
//!
//! [`FoSink`] renders the event stream as a single page sequence with a running header
//! (document title) and footer (page number). Turning the FO into PDF is left to an
//! external processor; see [`pdf`] when the `native-export` feature is enabled.

#[cfg(feature = "native-export")]
pub mod pdf;
mod sink;

pub use sink::FoSink;

use crate::error::FormatError;
use crate::format::{options, render, Format, SerializedDocument};
use crate::sink::Event;
use std::collections::HashMap;

/// Serialize option keys.
pub const PAGE_SIZE: &str = "page-size";
pub const MARGIN: &str = "margin";
pub const FONT_FAMILY: &str = "font-family";
pub const FONT_SIZE: &str = "font-size";
/// FO processor binary used by the PDF export.
pub const PROCESSOR: &str = "processor";

/// Page layout for [`FoSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoOptions {
    /// A named size (`A4`, `A5`, `Letter`, `Legal`) or `<width> x <height>`.
    pub page_size: String,
    pub margin: String,
    pub font_family: String,
    pub font_size: String,
    pub verbose: bool,
}

impl Default for FoOptions {
    fn default() -> Self {
        Self {
            page_size: "A4".to_string(),
            margin: "2cm".to_string(),
            font_family: "Helvetica".to_string(),
            font_size: "10pt".to_string(),
            verbose: false,
        }
    }
}

impl FoOptions {
    /// Options from a serialize map; missing keys fall back to `base`.
    pub fn from_map(base: &FoOptions, opts: &HashMap<String, String>) -> Self {
        let pick = |key: &str, fallback: &String| {
            opts.get(key).cloned().unwrap_or_else(|| fallback.clone())
        };
        Self {
            page_size: pick(PAGE_SIZE, &base.page_size),
            margin: pick(MARGIN, &base.margin),
            font_family: pick(FONT_FAMILY, &base.font_family),
            font_size: pick(FONT_SIZE, &base.font_size),
            verbose: options::flag(opts, options::VERBOSE, base.verbose),
        }
    }

    /// Page width and height. Unknown sizes fall back to A4.
    pub fn page_dimensions(&self) -> (String, String) {
        let size = self.page_size.trim();
        let named = match size.to_ascii_lowercase().as_str() {
            "a4" => Some(("21cm", "29.7cm")),
            "a5" => Some(("14.8cm", "21cm")),
            "a3" => Some(("29.7cm", "42cm")),
            "letter" => Some(("8.5in", "11in")),
            "legal" => Some(("8.5in", "14in")),
            _ => None,
        };
        if let Some((width, height)) = named {
            return (width.to_string(), height.to_string());
        }
        if let Some((width, height)) = size.split_once('x') {
            let (width, height) = (width.trim(), height.trim());
            if !width.is_empty() && !height.is_empty() {
                return (width.to_string(), height.to_string());
            }
        }
        log::warn!("Unknown page size '{size}', using A4");
        ("21cm".to_string(), "29.7cm".to_string())
    }
}

/// Format implementation for XSL-FO
#[derive(Default)]
pub struct FoFormat {
    options: FoOptions,
}

impl FoFormat {
    pub fn new(options: FoOptions) -> Self {
        Self { options }
    }

    pub(crate) fn render(
        &self,
        events: &[Event],
        opts: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut sink = FoSink::new(Vec::new(), FoOptions::from_map(&self.options, opts));
        render(events, &mut sink, opts)?;
        String::from_utf8(sink.into_inner())
            .map_err(|err| FormatError::SerializationError(err.to_string()))
    }
}

impl Format for FoFormat {
    fn name(&self) -> &str {
        "fo"
    }

    fn description(&self) -> &str {
        "XSL-FO page description"
    }

    fn file_extensions(&self) -> &[&str] {
        &["fo"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, events: &[Event]) -> Result<String, FormatError> {
        self.render(events, &HashMap::new())
    }

    fn serialize_with_options(
        &self,
        events: &[Event],
        opts: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        self.render(events, opts).map(SerializedDocument::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_dimensions() {
        let mut options = FoOptions::default();
        assert_eq!(options.page_dimensions(), ("21cm".into(), "29.7cm".into()));
        options.page_size = "letter".into();
        assert_eq!(options.page_dimensions(), ("8.5in".into(), "11in".into()));
        options.page_size = "10cm x 12cm".into();
        assert_eq!(options.page_dimensions(), ("10cm".into(), "12cm".into()));
        options.page_size = "huge".into();
        assert_eq!(options.page_dimensions(), ("21cm".into(), "29.7cm".into()));
    }

    #[test]
    fn test_options_override_defaults() {
        let mut opts = HashMap::new();
        opts.insert(MARGIN.to_string(), "1in".to_string());
        let options = FoOptions::from_map(&FoOptions::default(), &opts);
        assert_eq!(options.margin, "1in");
        assert_eq!(options.font_family, "Helvetica");

        let fo = FoFormat::default().serialize_with_options(&[], &opts).unwrap();
        let text = String::from_utf8(fo.into_bytes()).unwrap();
        assert!(text.contains("margin-left=\"1in\""));
    }
}
