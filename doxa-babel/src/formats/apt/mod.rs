//! APT, the "almost plain text" wiki dialect.
//!
//! Parsing runs in two phases. [`blocks`] splits the source into lines and classifies
//! runs of lines into blocks by their first characters and indentation; [`parser`]
//! walks the blocks, keeping open sections and lists on an [`outline::Outline`] stack,
//! and hands block text to the [`inline`] scanner. [`sink`] goes the other way and
//! writes an event stream back out as APT.
//!
//! ```text
//!  -----
//!  Title
//!  -----
//!  Author
//!
//! Section title
//!
//!  Paragraph with <italic>, <<bold>> and <<<monospaced>>> text, an {anchor}
//!  and a {{link}}.
//!
//! * Subsection
//!
//!  * list item
//!
//!  [[1]] numbered item
//!
//!  [term] definition
//! ```

pub mod blocks;
pub mod inline;
pub mod outline;
pub mod parser;
pub mod sink;
pub mod table;

pub use parser::AptParser;
pub use sink::AptSink;

use crate::error::FormatError;
use crate::format::{render, Format, SerializedDocument};
use crate::macros::MacroRegistry;
use crate::parser::{Parser, ParserOptions};
use crate::sink::Event;
use std::collections::HashMap;
use std::sync::Arc;

/// Format implementation for APT
pub struct AptFormat {
    macros: Arc<MacroRegistry>,
}

impl AptFormat {
    pub fn with_macros(macros: MacroRegistry) -> Self {
        Self {
            macros: Arc::new(macros),
        }
    }

    pub fn parser_options(&self, opts: &HashMap<String, String>) -> ParserOptions {
        ParserOptions::from_map(opts, Arc::clone(&self.macros))
    }
}

impl Default for AptFormat {
    fn default() -> Self {
        Self::with_macros(MacroRegistry::with_defaults())
    }
}

impl Format for AptFormat {
    fn name(&self) -> &str {
        "apt"
    }

    fn description(&self) -> &str {
        "Almost Plain Text wiki markup"
    }

    fn file_extensions(&self) -> &[&str] {
        &["apt"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse_with_options(
        &self,
        source: &str,
        opts: &HashMap<String, String>,
    ) -> Result<Vec<Event>, FormatError> {
        let mut events: Vec<Event> = Vec::new();
        AptParser::new(self.parser_options(opts)).parse(source, &mut events)?;
        Ok(events)
    }

    fn serialize(&self, events: &[Event]) -> Result<String, FormatError> {
        self.serialize_with_options(events, &HashMap::new())
            .map(|doc| String::from_utf8_lossy(&doc.into_bytes()).into_owned())
    }

    fn serialize_with_options(
        &self,
        events: &[Event],
        opts: &HashMap<String, String>,
    ) -> Result<SerializedDocument, FormatError> {
        let mut sink = AptSink::new(Vec::new());
        render(events, &mut sink, opts)?;
        String::from_utf8(sink.into_inner())
            .map(SerializedDocument::Text)
            .map_err(|err| FormatError::SerializationError(err.to_string()))
    }
}
