//! FML, the FAQ markup dialect.
//!
//! ```xml
//! <faqs title="Frequently Asked Questions" toplink="true">
//!   <part id="general">
//!     <title>General</title>
//!     <faq id="what">
//!       <question>What is it?</question>
//!       <answer><p>XHTML content...</p></answer>
//!     </faq>
//!   </part>
//! </faqs>
//! ```
//!
//! The document becomes one section: a linked index of all questions grouped by part,
//! then one subsection per part listing each question (anchored) with its answer.

mod parser;

pub use parser::{FmlParser, TOP_ANCHOR};

use crate::error::FormatError;
use crate::format::Format;
use crate::macros::MacroRegistry;
use crate::parser::{Parser, ParserOptions};
use crate::sink::Event;
use std::collections::HashMap;
use std::sync::Arc;

/// Format implementation for FML
#[derive(Default)]
pub struct FmlFormat;

impl Format for FmlFormat {
    fn name(&self) -> &str {
        "fml"
    }

    fn description(&self) -> &str {
        "FAQ markup"
    }

    fn file_extensions(&self) -> &[&str] {
        &["fml"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse_with_options(
        &self,
        source: &str,
        opts: &HashMap<String, String>,
    ) -> Result<Vec<Event>, FormatError> {
        let options = ParserOptions::from_map(opts, Arc::new(MacroRegistry::new()));
        let mut events: Vec<Event> = Vec::new();
        FmlParser::new(options).parse(source, &mut events)?;
        Ok(events)
    }
}
