//! The parser side of the event pipeline.

use crate::error::ParseError;
use crate::format::options;
use crate::macros::MacroRegistry;
use crate::sink::Sink;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Reads one source document and pushes its structure into a sink.
///
/// Parsers are stateful: a single instance may be reused for several documents, but
/// never for two at once.
pub trait Parser {
    fn parse(&mut self, source: &str, sink: &mut dyn Sink) -> Result<(), ParseError>;
}

/// Builds parsers on demand, e.g. for macros that re-read the document.
pub type ParserFactory<'a> = dyn Fn() -> Box<dyn Parser> + 'a;

/// Settings shared by every source parser.
#[derive(Clone)]
pub struct ParserOptions {
    /// Reported in error locations.
    pub file_name: Option<String>,
    /// Directory macros resolve relative paths against.
    pub base_dir: Option<PathBuf>,
    /// Log auto-corrections as they happen instead of once at the end.
    pub verbose: bool,
    pub macros_enabled: bool,
    pub macros: Arc<MacroRegistry>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            base_dir: None,
            verbose: false,
            macros_enabled: true,
            macros: Arc::new(MacroRegistry::with_defaults()),
        }
    }
}

impl ParserOptions {
    /// Reads the [`options`] keys from a format option map.
    pub fn from_map(opts: &HashMap<String, String>, macros: Arc<MacroRegistry>) -> Self {
        Self {
            file_name: opts.get(options::FILE).cloned(),
            base_dir: opts.get(options::BASE_DIR).map(PathBuf::from),
            verbose: options::flag(opts, options::VERBOSE, false),
            macros_enabled: options::flag(opts, options::MACROS, true),
            macros,
        }
    }

    /// The same settings with macro execution switched off, for nested parses.
    pub fn without_macros(&self) -> Self {
        Self {
            macros_enabled: false,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_from_map() {
        let mut opts = HashMap::new();
        opts.insert(options::FILE.to_string(), "doc.apt".to_string());
        opts.insert(options::MACROS.to_string(), "no".to_string());
        let parsed = ParserOptions::from_map(&opts, Arc::new(MacroRegistry::new()));
        assert_eq!(parsed.file_name.as_deref(), Some("doc.apt"));
        assert!(parsed.base_dir.is_none());
        assert!(!parsed.macros_enabled);
        assert!(parsed.without_macros().file_name.is_some());
    }
}
