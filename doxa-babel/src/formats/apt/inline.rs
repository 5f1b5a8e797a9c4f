//! Inline markup inside block text: escapes, `<italic>`, `<<bold>>`,
//! `<<<monospaced>>>`, `{anchor}`, `{{link}}` and `{{{target}text}}`.

use crate::common::ids::{encode_id, is_valid_id};
use crate::common::links::normalize_link;
use crate::diagnostics::Diagnostics;
use crate::error::{ParseError, SinkError};
use crate::location::Location;
use crate::sink::{Attributes, Event, Sink, SinkExt, Tag, TagKind};

/// Diagnostic key for anchor names rewritten into valid identifiers.
pub const INVALID_ANCHOR: &str = "invalid-anchor";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escaped {
    Char(char),
    NonBreakingSpace,
    LineBreak,
}

/// Decodes the escape whose backslash is at `chars[at]`. Returns the decoded value and
/// the number of characters consumed, backslash included.
fn decode_escape(chars: &[char], at: usize) -> (Escaped, usize) {
    let Some(&next) = chars.get(at + 1) else {
        return (Escaped::Char('\\'), 1);
    };
    match next {
        ' ' => (Escaped::NonBreakingSpace, 2),
        '\n' => (Escaped::LineBreak, 2),
        'x' => match numeric(chars, at + 2, 16, 2, 2) {
            Some((c, digits)) => (Escaped::Char(c), 2 + digits),
            None => (Escaped::Char('x'), 2),
        },
        'u' => match numeric(chars, at + 2, 16, 4, 4) {
            Some((c, digits)) => (Escaped::Char(c), 2 + digits),
            None => (Escaped::Char('u'), 2),
        },
        '0'..='7' => match numeric(chars, at + 1, 8, 1, 3) {
            Some((c, digits)) => (Escaped::Char(c), 1 + digits),
            None => (Escaped::Char(next), 2),
        },
        c => (Escaped::Char(c), 2),
    }
}

/// Reads between `min` and `max` digits of `radix` at `from`. Returns the character and
/// the number of digits read.
fn numeric(chars: &[char], from: usize, radix: u32, min: usize, max: usize) -> Option<(char, usize)> {
    let digits: String = chars
        .iter()
        .skip(from)
        .take(max)
        .take_while(|c| c.is_digit(radix))
        .collect();
    if digits.len() < min {
        return None;
    }
    let value = u32::from_str_radix(&digits, radix).ok()?;
    Some((char::from_u32(value)?, digits.len()))
}

/// Resolves escapes in a run of text that cannot carry markup (anchor names, link
/// targets).
fn unescape(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' {
            let (escaped, consumed) = decode_escape(chars, i);
            match escaped {
                Escaped::Char(c) => out.push(c),
                Escaped::NonBreakingSpace => out.push('\u{a0}'),
                Escaped::LineBreak => out.push(' '),
            }
            i += consumed;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

/// Index of the next unescaped `}` (or `}}` when `double`) at or after `from`.
fn find_close(chars: &[char], from: usize, double: bool) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '}' if !double || chars.get(i + 1) == Some(&'}') => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn flush_text(buffer: &mut String, sink: &mut dyn Sink) -> Result<(), SinkError> {
    if !buffer.is_empty() {
        sink.emit(Event::text(std::mem::take(buffer)))?;
    }
    Ok(())
}

fn run_length(chars: &[char], from: usize, c: char) -> usize {
    chars[from..].iter().take_while(|x| **x == c).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Span {
    Italic,
    Bold,
    Monospaced,
    Link,
}

impl Span {
    fn describe(self) -> &'static str {
        match self {
            Span::Italic => "italic",
            Span::Bold => "bold",
            Span::Monospaced => "monospaced",
            Span::Link => "link",
        }
    }

    fn end(self) -> TagKind {
        match self {
            Span::Italic => TagKind::Italic,
            Span::Bold => TagKind::Bold,
            Span::Monospaced => TagKind::Monospaced,
            Span::Link => TagKind::Link,
        }
    }
}

/// Scans the text of one block and emits its inline events.
///
/// Spans only close in stack order: a closing delimiter that does not match the
/// innermost open span is literal text. Spans still open at the end of the text, and
/// unterminated anchors or links, are fatal.
pub struct InlineScanner<'a> {
    diagnostics: &'a mut Diagnostics,
    file: Option<&'a str>,
    line: usize,
}

impl<'a> InlineScanner<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics, file: Option<&'a str>, line: usize) -> Self {
        Self {
            diagnostics,
            file,
            line,
        }
    }

    /// Location of `chars[at]`, counting lines from the block's first line.
    fn location(&self, chars: &[char], at: usize) -> Location {
        let before = &chars[..at.min(chars.len())];
        let newlines = before.iter().filter(|c| **c == '\n').count();
        let line_start = before
            .iter()
            .rposition(|c| *c == '\n')
            .map(|p| p + 1)
            .unwrap_or(0);
        Location::at_line(self.file, self.line + newlines).with_column(at - line_start + 1)
    }

    pub fn scan(&mut self, text: &str, sink: &mut dyn Sink) -> Result<(), ParseError> {
        let chars: Vec<char> = text.chars().collect();
        let mut buffer = String::new();
        let mut open: Vec<(Span, usize)> = Vec::new();
        let mut i = 0;

        let is_open = |open: &[(Span, usize)], span: Span| open.iter().any(|(s, _)| *s == span);

        while i < chars.len() {
            match chars[i] {
                '\\' => {
                    let (escaped, consumed) = decode_escape(&chars, i);
                    i += consumed;
                    match escaped {
                        Escaped::Char(c) => buffer.push(c),
                        Escaped::NonBreakingSpace => {
                            flush_text(&mut buffer, sink)?;
                            sink.emit(Event::NonBreakingSpace)?;
                        }
                        Escaped::LineBreak => {
                            flush_text(&mut buffer, sink)?;
                            sink.emit(Event::LineBreak(Attributes::new()))?;
                            while matches!(chars.get(i), Some(' ') | Some('\t')) {
                                i += 1;
                            }
                        }
                    }
                }
                '<' => {
                    let run = run_length(&chars, i, '<');
                    let (span, tag, width) = if run >= 3 && !is_open(&open, Span::Monospaced) {
                        (Span::Monospaced, Tag::Monospaced, 3)
                    } else if run >= 2 && !is_open(&open, Span::Bold) {
                        (Span::Bold, Tag::Bold, 2)
                    } else if !is_open(&open, Span::Italic) {
                        (Span::Italic, Tag::Italic, 1)
                    } else {
                        buffer.push('<');
                        i += 1;
                        continue;
                    };
                    flush_text(&mut buffer, sink)?;
                    sink.start(tag)?;
                    open.push((span, i));
                    i += width;
                }
                '>' => {
                    let run = run_length(&chars, i, '>');
                    let width = match open.last() {
                        Some((Span::Monospaced, _)) if run >= 3 => 3,
                        Some((Span::Bold, _)) if run >= 2 => 2,
                        Some((Span::Italic, _)) => 1,
                        _ => 0,
                    };
                    if width == 0 {
                        buffer.push('>');
                        i += 1;
                        continue;
                    }
                    flush_text(&mut buffer, sink)?;
                    if let Some((span, _)) = open.pop() {
                        sink.end(span.end())?;
                    }
                    i += width;
                }
                '{' => {
                    flush_text(&mut buffer, sink)?;
                    i = self.scan_brace(&chars, i, &mut open, sink)?;
                }
                '}' if matches!(open.last(), Some((Span::Link, _)))
                    && chars.get(i + 1) == Some(&'}') =>
                {
                    flush_text(&mut buffer, sink)?;
                    open.pop();
                    sink.end(TagKind::Link)?;
                    i += 2;
                }
                c => {
                    buffer.push(c);
                    i += 1;
                }
            }
        }
        flush_text(&mut buffer, sink)?;

        if let Some((span, at)) = open.last() {
            return Err(ParseError::syntax(
                format!("Unterminated {}", span.describe()),
                self.location(&chars, *at),
            ));
        }
        Ok(())
    }

    /// Handles an anchor or link starting at `chars[at] == '{'`. Returns the index
    /// after the construct.
    fn scan_brace(
        &mut self,
        chars: &[char],
        at: usize,
        open: &mut Vec<(Span, usize)>,
        sink: &mut dyn Sink,
    ) -> Result<usize, ParseError> {
        let braces = run_length(chars, at, '{');

        if braces >= 3 {
            // {{{target}text}}: the text is scanned as ordinary inline content.
            let close = find_close(chars, at + 3, false)
                .ok_or_else(|| ParseError::syntax("Unterminated link", self.location(chars, at)))?;
            let target = unescape(&chars[at + 3..close]);
            let target = self.link_target(&target, chars, at)?;
            sink.start(Tag::Link(target))?;
            open.push((Span::Link, at));
            return Ok(close + 1);
        }

        if braces == 2 {
            let close = find_close(chars, at + 2, true)
                .ok_or_else(|| ParseError::syntax("Unterminated link", self.location(chars, at)))?;
            let text = unescape(&chars[at + 2..close]);
            let target = self.link_target(&text, chars, at)?;
            sink.start(Tag::Link(target))?;
            sink.text(&text)?;
            sink.end(TagKind::Link)?;
            return Ok(close + 2);
        }

        let close = find_close(chars, at + 1, false)
            .ok_or_else(|| ParseError::syntax("Unterminated anchor", self.location(chars, at)))?;
        let text = unescape(&chars[at + 1..close]);
        let name = text.trim();
        let id = if is_valid_id(name) {
            name.to_string()
        } else {
            let encoded = encode_id(name).ok_or_else(|| {
                ParseError::syntax("Anchor without a name", self.location(chars, at))
            })?;
            self.diagnostics.warn(
                INVALID_ANCHOR,
                format!("Modified invalid anchor name '{name}' to '{encoded}'"),
            );
            encoded
        };
        sink.start(Tag::Anchor(id))?;
        sink.text(&text)?;
        sink.end(TagKind::Anchor)?;
        Ok(close + 1)
    }

    fn link_target(&mut self, target: &str, chars: &[char], at: usize) -> Result<String, ParseError> {
        if target.trim().is_empty() {
            return Err(ParseError::syntax(
                "Link without a target",
                self.location(chars, at),
            ));
        }
        Ok(normalize_link(target, self.diagnostics))
    }
}
