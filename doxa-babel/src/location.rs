//! Source locations attached to parse errors and diagnostics.

use std::fmt;

/// A position in a source document.
///
/// Every component is optional: parsers do not always know the column (or even the
/// file name) of the construct they are reporting on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: Option<String>,
    /// 1-based line number
    pub line: Option<usize>,
    /// 1-based column number
    pub column: Option<usize>,
}

impl Location {
    pub fn new(file: Option<&str>, line: Option<usize>, column: Option<usize>) -> Self {
        Self {
            file: file.map(str::to_string),
            line,
            column,
        }
    }

    /// A location that only knows the file and the line.
    pub fn at_line(file: Option<&str>, line: usize) -> Self {
        Self::new(file, Some(line), None)
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = Some(column);
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.file.is_none() && self.line.is_none() && self.column.is_none()
    }

    /// Renders the `"path, line N, column N: "` prefix used in messages.
    ///
    /// Unknown components are left out; an entirely unknown location renders as the
    /// empty string.
    pub fn prefix(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(file) = &self.file {
            parts.push(file.clone());
        }
        if let Some(line) = self.line {
            parts.push(format!("line {line}"));
        }
        if let Some(column) = self.column {
            parts.push(format!("column {column}"));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("{}: ", parts.join(", "))
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}
