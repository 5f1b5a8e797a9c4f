//! Macros: named callables that emit events in place of a macro invocation.
//!
//! A parser that meets `%{name|key=value}` (or an XML `<macro>` element) builds a
//! [`MacroRequest`] and hands it to the [`MacroRegistry`]. Requests carry the full
//! document source and a parser factory so that macros like `toc` can re-read the
//! document they are embedded in.

mod echo;
mod snippet;
mod toc;

pub use echo::EchoMacro;
pub use snippet::SnippetMacro;
pub use toc::TocMacro;

use crate::error::{ParseError, SinkError};
use crate::parser::{Parser, ParserFactory};
use crate::sink::Sink;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MacroError {
    #[error("Macro '{0}' not found")]
    NotFound(String),
    #[error("Macro '{macro_name}' requires parameter '{parameter}'")]
    MissingParameter {
        macro_name: String,
        parameter: String,
    },
    #[error("Invalid value '{value}' for macro parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("Macro execution failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("Nested parse failed: {0}")]
    Parse(Box<ParseError>),
}

impl From<ParseError> for MacroError {
    fn from(err: ParseError) -> Self {
        MacroError::Parse(Box::new(err))
    }
}

/// Everything a macro gets to see about its invocation.
pub struct MacroRequest<'a> {
    pub name: &'a str,
    pub parameters: IndexMap<String, String>,
    /// The complete source of the document containing the invocation.
    pub source: &'a str,
    pub base_dir: Option<&'a Path>,
    parsers: &'a ParserFactory<'a>,
}

impl<'a> MacroRequest<'a> {
    pub fn new(
        name: &'a str,
        parameters: IndexMap<String, String>,
        source: &'a str,
        base_dir: Option<&'a Path>,
        parsers: &'a ParserFactory<'a>,
    ) -> Self {
        Self {
            name,
            parameters,
            source,
            base_dir,
            parsers,
        }
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn required(&self, key: &str) -> Result<&str, MacroError> {
        self.parameter(key)
            .ok_or_else(|| MacroError::MissingParameter {
                macro_name: self.name.to_string(),
                parameter: key.to_string(),
            })
    }

    /// An integer parameter, `default` when absent.
    pub fn int_parameter(&self, key: &str, default: usize) -> Result<usize, MacroError> {
        match self.parameter(key) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| MacroError::InvalidParameter {
                    parameter: key.to_string(),
                    value: value.to_string(),
                    reason: "expected a non-negative integer".to_string(),
                }),
        }
    }

    /// A fresh parser of the invoking document's format, with macros disabled.
    pub fn fresh_parser(&self) -> Box<dyn Parser> {
        (self.parsers)()
    }
}

pub trait Macro: Send + Sync {
    fn execute(&self, request: &MacroRequest<'_>, sink: &mut dyn Sink) -> Result<(), MacroError>;
}

/// Macros available to parsers, by name.
pub struct MacroRegistry {
    macros: HashMap<String, Box<dyn Macro>>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        MacroRegistry {
            macros: HashMap::new(),
        }
    }

    /// A registry holding the built-in `echo`, `snippet` and `toc` macros.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("echo", EchoMacro);
        registry.register("snippet", SnippetMacro);
        registry.register("toc", TocMacro);
        registry
    }

    /// Registers `mac` under `name`, replacing any previous macro of that name.
    pub fn register<M: Macro + 'static>(&mut self, name: &str, mac: M) {
        self.macros.insert(name.to_string(), Box::new(mac));
    }

    pub fn has(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn list_macros(&self) -> Vec<String> {
        let mut names: Vec<_> = self.macros.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn execute(&self, request: &MacroRequest<'_>, sink: &mut dyn Sink) -> Result<(), MacroError> {
        let mac = self
            .macros
            .get(request.name)
            .ok_or_else(|| MacroError::NotFound(request.name.to_string()))?;
        mac.execute(request, sink)
    }
}

impl Default for MacroRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
