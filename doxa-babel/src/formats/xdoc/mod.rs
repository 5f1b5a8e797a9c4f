//! XDoc, the XML documentation dialect.
//!
//! ```xml
//! <document>
//!   <properties>
//!     <title>Guide</title>
//!     <author email="ada@example.org">Ada</author>
//!   </properties>
//!   <body>
//!     <section name="Install">
//!       <p>XHTML content...</p>
//!       <subsection name="From source">
//!         <source>make install</source>
//!       </subsection>
//!       <macro name="toc"><param name="fromDepth" value="1"/></macro>
//!     </section>
//!   </body>
//! </document>
//! ```
//!
//! `section` and `subsection` both open a section one level below the enclosing one.
//! Everything else in the body goes through the shared XHTML mapping in
//! [`crate::common::xhtml`].

mod parser;

pub use parser::XdocParser;

use crate::error::FormatError;
use crate::format::Format;
use crate::macros::MacroRegistry;
use crate::parser::{Parser, ParserOptions};
use crate::sink::Event;
use std::collections::HashMap;
use std::sync::Arc;

/// Format implementation for XDoc
pub struct XdocFormat {
    macros: Arc<MacroRegistry>,
}

impl XdocFormat {
    pub fn with_macros(macros: MacroRegistry) -> Self {
        Self {
            macros: Arc::new(macros),
        }
    }
}

impl Default for XdocFormat {
    fn default() -> Self {
        Self::with_macros(MacroRegistry::with_defaults())
    }
}

impl Format for XdocFormat {
    fn name(&self) -> &str {
        "xdoc"
    }

    fn description(&self) -> &str {
        "XDoc XML documents"
    }

    fn file_extensions(&self) -> &[&str] {
        &["xdoc", "xml"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse_with_options(
        &self,
        source: &str,
        opts: &HashMap<String, String>,
    ) -> Result<Vec<Event>, FormatError> {
        let options = ParserOptions::from_map(opts, Arc::clone(&self.macros));
        let mut events: Vec<Event> = Vec::new();
        XdocParser::new(options).parse(source, &mut events)?;
        Ok(events)
    }
}
