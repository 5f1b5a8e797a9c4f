//! HTML format implementation
//!
//! Renders the event stream as XHTML5. Parsing HTML back is handled by the `xdoc` and
//! `fml` formats, which read well-formed XML only.
//!
//! # Element Mapping Table
//!
//! | Event                        | HTML Equivalent                                   | Notes                                   |
//! |------------------------------|---------------------------------------------------|-----------------------------------------|
//! | head / title / author / date | `<head>`, `<title>`, `<meta name="author">`       | Only written in full-document mode      |
//! | section N / sectionTitle N   | `<section>` + `<hN>`                              | Levels above 6 render as `<h6>`         |
//! | paragraph                    | `<p>`                                             | Closed early before block content       |
//! | list / numberedList          | `<ul>` / `<ol style="list-style-type: ...">`      | Numbering maps to CSS list styles       |
//! | definitionList               | `<dl>` `<dt>` `<dd>`                              |                                         |
//! | table                        | `<table class="bodyTable">`                       | Caption moved ahead of the rows         |
//! | tableRow                     | `<tr class="a">` / `<tr class="b">`               | Alternating, restarted per table        |
//! | verbatim                     | `<div class="verbatim"><pre>`                     | `boxed` and `source` add a class        |
//! | figure / figureGraphics      | `<figure>` `<img>` `<figcaption>`                 |                                         |
//! | anchor / link                | `<a id>` / `<a href>`                             | External links get `externalLink`       |
//! | inline + semantics           | `<em>`, `<strong>`, `<code>`, `<sup>`, ...        | One element per role, closed in reverse |
//! | unknown                      | the named element                                 | Only for a fixed list of element names  |
//!
//! # CSS
//!
//! Full documents embed `css/baseline.css` plus an optional custom stylesheet in a
//! `<style>` element, so the output stays a single self-contained file.

mod sink;

pub use sink::HtmlSink;

use crate::error::FormatError;
use crate::format::{options, render, Format};
use crate::sink::Event;
use std::collections::HashMap;

pub(crate) const BASELINE_CSS: &str = include_str!("../../../css/baseline.css");

/// Serialize option: `"false"` renders the body content only.
pub const FULL_DOCUMENT: &str = "full-document";
/// Serialize option: extra CSS appended to the embedded stylesheet.
pub const CUSTOM_CSS: &str = "custom-css";

/// Rendering switches for [`HtmlSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Wrap the content in `<html>`, `<head>` and `<body>`.
    pub full_document: bool,
    pub embed_css: bool,
    pub custom_css: Option<String>,
    pub verbose: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            full_document: true,
            embed_css: true,
            custom_css: None,
            verbose: false,
        }
    }
}

impl HtmlOptions {
    /// Body markup only, no document prologue.
    pub fn fragment() -> Self {
        Self {
            full_document: false,
            ..Self::default()
        }
    }

    pub fn from_map(opts: &HashMap<String, String>) -> Self {
        Self {
            full_document: options::flag(opts, FULL_DOCUMENT, true),
            embed_css: true,
            custom_css: opts.get(CUSTOM_CSS).cloned(),
            verbose: options::flag(opts, options::VERBOSE, false),
        }
    }
}

/// Format implementation for HTML
#[derive(Default)]
pub struct HtmlFormat {
    options: HtmlOptions,
}

impl HtmlFormat {
    pub fn new(options: HtmlOptions) -> Self {
        Self { options }
    }

    fn render(
        &self,
        events: &[Event],
        options: HtmlOptions,
        opts: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        let mut sink = HtmlSink::new(Vec::new(), options);
        render(events, &mut sink, opts)?;
        String::from_utf8(sink.into_inner())
            .map_err(|err| FormatError::SerializationError(err.to_string()))
    }
}

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "XHTML5 with embedded CSS"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm", "xhtml"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, events: &[Event]) -> Result<String, FormatError> {
        self.render(events, self.options.clone(), &HashMap::new())
    }

    fn serialize_with_options(
        &self,
        events: &[Event],
        opts: &HashMap<String, String>,
    ) -> Result<crate::format::SerializedDocument, FormatError> {
        let mut options = HtmlOptions::from_map(opts);
        if options.custom_css.is_none() {
            options.custom_css = self.options.custom_css.clone();
        }
        self.render(events, options, opts)
            .map(crate::format::SerializedDocument::Text)
    }
}
