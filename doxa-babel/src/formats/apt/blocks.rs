//! Line reading and block classification.
//!
//! The source is split into tab-expanded lines first. The [`BlockReader`] then looks at
//! the first non-blank character of a line (plus a little lookahead and the line's
//! indentation) to decide what kind of block starts there, and consumes the lines that
//! belong to it.

use crate::error::ParseError;
use crate::location::Location;
use crate::sink::Numbering;

const TAB_WIDTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// 1-based line number in the source.
    pub number: usize,
}

impl Line {
    pub fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }

    /// Only spaces: a form feed on its own is a page break, not a blank line.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(|c| c == ' ' || c == '\r')
    }

    /// The line without its indentation.
    pub fn content(&self) -> &str {
        self.text.trim_start_matches(' ')
    }
}

/// Splits `source` into lines, expanding tabs to the next multiple of eight columns.
pub fn read_lines(source: &str) -> Vec<Line> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| Line {
            text: expand_tabs(line),
            number: index + 1,
        })
        .collect()
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + TAB_WIDTH);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let spaces = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat(' ').take(spaces));
            column += spaces;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Title,
    /// Sections 1 to 5
    Section(u8),
    Paragraph,
    Verbatim { boxed: bool },
    Figure,
    Table,
    ListItem,
    NumberedListItem(Numbering),
    DefinitionListItem,
    HorizontalRule,
    PageBreak,
    ListBreak,
    Macro,
    Comment,
}

impl BlockKind {
    pub fn describe(&self) -> &'static str {
        match self {
            BlockKind::Title => "TITLE",
            BlockKind::Section(_) => "SECTION",
            BlockKind::Paragraph => "PARAGRAPH",
            BlockKind::Verbatim { .. } => "VERBATIM",
            BlockKind::Figure => "FIGURE",
            BlockKind::Table => "TABLE",
            BlockKind::ListItem => "LIST_ITEM",
            BlockKind::NumberedListItem(_) => "NUMBERED_LIST_ITEM",
            BlockKind::DefinitionListItem => "DEFINITION_LIST_ITEM",
            BlockKind::HorizontalRule => "HORIZONTAL_RULE",
            BlockKind::PageBreak => "PG_BREAK",
            BlockKind::ListBreak => "LIST_BREAK",
            BlockKind::Macro => "MACRO",
            BlockKind::Comment => "COMMENT",
        }
    }
}

/// A classified run of source lines.
///
/// `text` depends on the kind: the title or item text with its marker removed for
/// paragraph-like blocks, the raw content lines for verbatim blocks, and the raw lines
/// including separators for tables and title blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub indent: usize,
    pub text: String,
    pub line: usize,
}

pub struct BlockReader<'a> {
    lines: &'a [Line],
    pos: usize,
    file: Option<&'a str>,
    blocks_read: usize,
}

impl<'a> BlockReader<'a> {
    pub fn new(lines: &'a [Line], file: Option<&'a str>) -> Self {
        Self {
            lines,
            pos: 0,
            file,
            blocks_read: 0,
        }
    }

    fn location(&self, line: usize) -> Location {
        Location::at_line(self.file, line)
    }

    fn skip_blank(&mut self) {
        while self.pos < self.lines.len() && self.lines[self.pos].is_blank() {
            self.pos += 1;
        }
    }

    /// Reads the next block, `None` at the end of the source.
    pub fn next_block(&mut self) -> Result<Option<Block>, ParseError> {
        self.skip_blank();
        let lines = self.lines;
        let Some(line) = lines.get(self.pos) else {
            return Ok(None);
        };
        let first_block = self.blocks_read == 0;
        self.blocks_read += 1;

        let indent = line.indent();
        let number = line.number;
        let content = line.content();
        let block = |kind, text: String| Block {
            kind,
            indent,
            text,
            line: number,
        };

        if content.starts_with('\u{c}') {
            self.pos += 1;
            return Ok(Some(block(BlockKind::PageBreak, String::new())));
        }
        if let Some(rest) = content.strip_prefix("~~") {
            self.pos += 1;
            return Ok(Some(block(BlockKind::Comment, rest.trim().to_string())));
        }
        if content.starts_with("%{") {
            let text = self.paragraph_text(2);
            return Ok(Some(block(BlockKind::Macro, text)));
        }
        if content.starts_with("===") {
            self.pos += 1;
            return Ok(Some(block(BlockKind::HorizontalRule, String::new())));
        }
        if content.starts_with("---") {
            if first_block {
                let text = self.raw_lines_until_blank();
                return Ok(Some(block(BlockKind::Title, text)));
            }
            let text = self.verbatim_text("---", number)?;
            return Ok(Some(block(BlockKind::Verbatim { boxed: false }, text)));
        }
        if content.starts_with("+--") {
            let text = self.verbatim_text("+--", number)?;
            return Ok(Some(block(BlockKind::Verbatim { boxed: true }, text)));
        }
        if content.starts_with("*--") {
            let text = self.raw_lines_until_blank();
            return Ok(Some(block(BlockKind::Table, text)));
        }
        if content.starts_with('*') {
            if indent == 0 {
                let stars = content.chars().take_while(|c| *c == '*').count().min(4);
                let text = self.paragraph_text(stars);
                return Ok(Some(block(BlockKind::Section(stars as u8 + 1), text)));
            }
            let text = self.paragraph_text(1);
            return Ok(Some(block(BlockKind::ListItem, text)));
        }
        if content.starts_with("[]") {
            self.pos += 1;
            return Ok(Some(block(BlockKind::ListBreak, String::new())));
        }
        if content.starts_with("[[") {
            if let Some(numbering) = numbering_marker(content) {
                let text = self.paragraph_text(5);
                return Ok(Some(block(BlockKind::NumberedListItem(numbering), text)));
            }
        }
        if content.starts_with('[') {
            let text = self.paragraph_text(0);
            let kind = if indent == 0 {
                BlockKind::Figure
            } else {
                BlockKind::DefinitionListItem
            };
            return Ok(Some(block(kind, text)));
        }

        let text = self.paragraph_text(0);
        if indent == 0 {
            Ok(Some(block(BlockKind::Section(1), text)))
        } else {
            Ok(Some(block(BlockKind::Paragraph, text)))
        }
    }

    /// Text of a paragraph-like block whose marker is `skip` characters long. Each line
    /// is trimmed; lines are joined with `\n`.
    fn paragraph_text(&mut self, skip: usize) -> String {
        let first = &self.lines[self.pos];
        let mut text = first.content().chars().skip(skip).collect::<String>();
        text = text.trim().to_string();
        self.pos += 1;

        while let Some(line) = self.lines.get(self.pos) {
            if line.is_blank() || starts_new_block(line) {
                break;
            }
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(line.text.trim());
            self.pos += 1;
        }
        text
    }

    fn raw_lines_until_blank(&mut self) -> String {
        let mut lines = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            if line.is_blank() {
                break;
            }
            lines.push(line.text.as_str());
            self.pos += 1;
        }
        lines.join("\n")
    }

    /// Content lines up to the closing `marker` line, which is consumed.
    fn verbatim_text(&mut self, marker: &str, opened_at: usize) -> Result<String, ParseError> {
        self.pos += 1;
        let mut lines = Vec::new();
        while let Some(line) = self.lines.get(self.pos) {
            self.pos += 1;
            if line.content().starts_with(marker) {
                return Ok(lines.join("\n"));
            }
            lines.push(line.text.as_str());
        }
        Err(ParseError::syntax(
            format!("Missing closing '{marker}' of verbatim block"),
            self.location(opened_at),
        ))
    }
}

/// Whether `line` starts a block that ends the paragraph-like block before it.
fn starts_new_block(line: &Line) -> bool {
    let content = line.content();
    let indent = line.indent();
    (indent > 0 && content.starts_with('*') && !content.starts_with("*--"))
        || content.starts_with("[]")
        || (content.starts_with("[[") && numbering_marker(content).is_some())
        || (indent > 0 && content.starts_with('['))
        || content.starts_with("~~")
}

/// Numbering of a `[[x]]` item marker: `1` decimal, `a`/`A` alphabetic, `i`/`I` roman.
/// Any other single character still marks a numbered item, counted in decimal.
fn numbering_marker(content: &str) -> Option<Numbering> {
    let mut chars = content.strip_prefix("[[")?.chars();
    let style = chars.next()?;
    if !chars.as_str().starts_with("]]") {
        return None;
    }
    Some(match style {
        'a' => Numbering::LowerAlpha,
        'A' => Numbering::UpperAlpha,
        'i' => Numbering::LowerRoman,
        'I' => Numbering::UpperRoman,
        _ => Numbering::Decimal,
    })
}
