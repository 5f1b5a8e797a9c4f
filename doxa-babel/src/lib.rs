//! Event-sink based document markup conversion
//!
//!     Source documents are parsed into a flat stream of structural events (begin/end
//!     pairs for sections, lists, tables and inline spans, plus text leaves). Renderers
//!     consume the stream. Because parsers and renderers only ever meet at the
//!     [`sink::Sink`] trait, every input format converts to every output format.
//!
//! Architecture
//!
//!     .
//!     ├── sink                    # Event vocabulary, Sink trait, attribute bags
//!     │   ├── pipeline.rs         # Ordered composition of wrapper sinks
//!     │   └── wrappers            # Buffering, capture, fan-out, indexing, unique anchors
//!     ├── parser.rs               # Parser trait and shared parser options
//!     ├── macros                  # Macro registry and the echo / snippet / toc macros
//!     ├── formats
//!     │   ├── apt                 # Plain-text dialect: parser and renderer
//!     │   ├── xdoc, fml           # XML dialects (parsers)
//!     │   ├── html, fo            # Renderers (fo::pdf shells out to an FO processor)
//!     │   └── tag                 # Tag tree of the event stream, for inspection
//!     ├── common                  # Escaping, ids, links, XHTML event mapping
//!     ├── format.rs               # Format trait definition
//!     └── registry.rs             # FormatRegistry for discovery, selection and convert
//!
//!     This is a pure lib: it powers doxa-cli but makes no assumption about a shell. Warnings
//!     go through the `log` facade and nothing is printed directly.
//!
//! Event Contract
//!
//!     Every begin event is closed by its matching end event, innermost first. Parsers are
//!     responsible for closing what they open, including on recoverable errors. Renderers
//!     may assume balance but must not panic when it is violated.
//!
//!     Parsers flush the sink at the end of a document but do not close it: closing is left
//!     to the owner of the sink, so that several documents can go to one output.
//!
//! Testing
//!
//!     tests
//!     └── <area>
//!         ├── <testname>.rs
//!         └── fixtures
//!
//!     Note that rust does not by default discover tests in subdirectories, so these are
//!     included from tests/lib.rs.

pub mod common;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod formats;
pub mod index;
pub mod location;
pub mod macros;
pub mod parser;
pub mod registry;
pub mod sink;

pub use diagnostics::Diagnostics;
pub use error::{FormatError, ParseError, SinkError};
pub use format::{Format, SerializedDocument};
pub use index::IndexEntry;
pub use location::Location;
pub use macros::{Macro, MacroError, MacroRegistry, MacroRequest};
pub use parser::{Parser, ParserOptions};
pub use registry::FormatRegistry;
pub use sink::{Attributes, Event, Sink, SinkExt, Tag, TagKind};
