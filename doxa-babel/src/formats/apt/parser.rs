//! The block traversal: turns classified blocks into sink events.

use super::blocks::{read_lines, Block, BlockKind, BlockReader};
use super::inline::InlineScanner;
use super::outline::{ListKind, Outline};
use super::table::parse_table;
use crate::diagnostics::Diagnostics;
use crate::error::ParseError;
use crate::location::Location;
use crate::macros::MacroRequest;
use crate::parser::{Parser, ParserOptions};
use crate::sink::attributes::BOXED;
use crate::sink::{Attributes, Event, Sink, SinkExt, Tag, TagKind};
use indexmap::IndexMap;

/// Stand-ins for `\=` and `\|` while macro parameters are split.
const ESCAPED_EQUALS: char = '\u{F8FE}';
const ESCAPED_BAR: char = '\u{F8FF}';

pub struct AptParser {
    options: ParserOptions,
    diagnostics: Diagnostics,
}

impl AptParser {
    pub fn new(options: ParserOptions) -> Self {
        let diagnostics = Diagnostics::new(options.verbose);
        Self {
            options,
            diagnostics,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    fn location(&self, line: usize) -> Location {
        Location::at_line(self.options.file_name.as_deref(), line)
    }

    fn scan(&mut self, text: &str, line: usize, sink: &mut dyn Sink) -> Result<(), ParseError> {
        InlineScanner::new(
            &mut self.diagnostics,
            self.options.file_name.as_deref(),
            line,
        )
        .scan(text, sink)
    }

    fn traverse_title(&mut self, block: &Block, sink: &mut dyn Sink) -> Result<(), ParseError> {
        let mut groups: Vec<Vec<&str>> = Vec::new();
        let mut current: Option<Vec<&str>> = None;
        for line in block.text.lines() {
            if line.trim_start().starts_with("---") {
                groups.extend(current.take());
                current = Some(Vec::new());
            } else {
                current.get_or_insert_with(Vec::new).push(line.trim());
            }
        }
        groups.extend(current.filter(|group| !group.is_empty()));

        let mut groups = groups.into_iter();
        if let Some(title) = groups.next().filter(|g| !g.is_empty()) {
            sink.start(Tag::Title)?;
            self.scan(&title.join("\n"), block.line, sink)?;
            sink.end(TagKind::Title)?;
        }
        for author in groups.next().unwrap_or_default() {
            sink.start(Tag::Author)?;
            self.scan(author, block.line, sink)?;
            sink.end(TagKind::Author)?;
        }
        if let Some(date) = groups.next().filter(|g| !g.is_empty()) {
            sink.start(Tag::Date)?;
            self.scan(&date.join("\n"), block.line, sink)?;
            sink.end(TagKind::Date)?;
        }
        Ok(())
    }

    fn traverse(
        &mut self,
        block: Block,
        outline: &mut Outline,
        source: &str,
        sink: &mut dyn Sink,
    ) -> Result<(), ParseError> {
        sink.locate(&self.location(block.line));
        match block.kind {
            BlockKind::Title => {
                return Err(ParseError::UnexpectedBlock {
                    expected: "SECTION".to_string(),
                    found: block.kind.describe().to_string(),
                    location: self.location(block.line),
                })
            }
            BlockKind::Section(level) => {
                outline.open_section(level, sink)?;
                sink.start(Tag::SectionTitle(level))?;
                self.scan(&block.text, block.line, sink)?;
                sink.end(TagKind::SectionTitle(level))?;
            }
            BlockKind::Paragraph => {
                outline.enter_block(block.indent, sink)?;
                sink.start(Tag::Paragraph)?;
                self.scan(&block.text, block.line, sink)?;
                sink.end(TagKind::Paragraph)?;
            }
            BlockKind::Verbatim { boxed } => {
                outline.enter_block(block.indent, sink)?;
                let attributes = if boxed {
                    BOXED.to_attributes()
                } else {
                    Attributes::new()
                };
                sink.start_with(Tag::Verbatim, attributes)?;
                if !block.text.is_empty() {
                    sink.text(&block.text)?;
                }
                sink.end(TagKind::Verbatim)?;
            }
            BlockKind::Figure => {
                outline.enter_block(block.indent, sink)?;
                let (src, caption) = split_bracket(&block.text).ok_or_else(|| {
                    ParseError::syntax("Missing ']' in figure", self.location(block.line))
                })?;
                sink.start(Tag::Figure)?;
                sink.emit(Event::FigureGraphics {
                    src: src.trim().to_string(),
                    attributes: Attributes::new(),
                })?;
                if !caption.trim().is_empty() {
                    sink.start(Tag::FigureCaption)?;
                    self.scan(caption.trim(), block.line, sink)?;
                    sink.end(TagKind::FigureCaption)?;
                }
                sink.end(TagKind::Figure)?;
            }
            BlockKind::Table => {
                outline.enter_block(block.indent, sink)?;
                self.traverse_table(&block, sink)?;
            }
            BlockKind::ListItem => {
                outline.enter_list_item(ListKind::Bullet, block.indent, sink)?;
                self.scan(&block.text, block.line, sink)?;
            }
            BlockKind::NumberedListItem(numbering) => {
                outline.enter_list_item(ListKind::Numbered(numbering), block.indent, sink)?;
                self.scan(&block.text, block.line, sink)?;
            }
            BlockKind::DefinitionListItem => {
                let (term, definition) = split_bracket(&block.text).ok_or_else(|| {
                    ParseError::syntax(
                        "Missing ']' in definition list item",
                        self.location(block.line),
                    )
                })?;
                outline.enter_list_item(ListKind::Definition, block.indent, sink)?;
                sink.start(Tag::DefinedTerm)?;
                self.scan(term.trim(), block.line, sink)?;
                sink.end(TagKind::DefinedTerm)?;
                sink.start(Tag::Definition)?;
                self.scan(definition.trim(), block.line, sink)?;
            }
            BlockKind::HorizontalRule => {
                outline.enter_block(block.indent, sink)?;
                sink.emit(Event::HorizontalRule(Attributes::new()))?;
            }
            BlockKind::PageBreak => {
                outline.enter_block(block.indent, sink)?;
                sink.emit(Event::PageBreak)?;
            }
            BlockKind::ListBreak => {
                if !outline.list_break(block.indent, sink)? {
                    return Err(ParseError::UnexpectedBlock {
                        expected: BlockKind::ListItem.describe().to_string(),
                        found: block.kind.describe().to_string(),
                        location: self.location(block.line),
                    });
                }
            }
            BlockKind::Macro => {
                if self.options.macros_enabled {
                    outline.enter_block(block.indent, sink)?;
                    self.execute_macro(&block, source, sink)?;
                }
            }
            BlockKind::Comment => sink.emit(Event::Comment(block.text))?,
        }
        Ok(())
    }

    fn traverse_table(&mut self, block: &Block, sink: &mut dyn Sink) -> Result<(), ParseError> {
        let table = parse_table(&block.text);
        if table.rows.is_empty() {
            return Err(ParseError::syntax(
                "Table without rows",
                self.location(block.line),
            ));
        }

        sink.start(Tag::Table)?;
        sink.start(Tag::TableRows {
            justification: table.justification,
            grid: table.grid,
        })?;
        for row in &table.rows {
            let line = block.line + row.line_offset;
            sink.start(Tag::TableRow)?;
            for cell in &row.cells {
                let (tag, end) = if cell.header {
                    (Tag::TableHeaderCell, TagKind::TableHeaderCell)
                } else {
                    (Tag::TableCell, TagKind::TableCell)
                };
                sink.start(tag)?;
                self.scan(&cell.text, line, sink)?;
                sink.end(end)?;
            }
            sink.end(TagKind::TableRow)?;
        }
        sink.end(TagKind::TableRows)?;
        if let Some(caption) = &table.caption {
            sink.start(Tag::TableCaption)?;
            self.scan(caption, block.line, sink)?;
            sink.end(TagKind::TableCaption)?;
        }
        sink.end(TagKind::Table)?;
        Ok(())
    }

    fn execute_macro(
        &mut self,
        block: &Block,
        source: &str,
        sink: &mut dyn Sink,
    ) -> Result<(), ParseError> {
        let location = self.location(block.line);
        let (name, parameters) = parse_macro(&block.text)
            .map_err(|message| ParseError::syntax(message, location.clone()))?;

        let nested = self.options.without_macros();
        let factory = move || -> Box<dyn Parser> { Box::new(AptParser::new(nested.clone())) };
        let request = MacroRequest::new(
            &name,
            parameters,
            source,
            self.options.base_dir.as_deref(),
            &factory,
        );
        self.options
            .macros
            .execute(&request, sink)
            .map_err(|source| ParseError::Macro { source, location })
    }
}

impl Default for AptParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl Parser for AptParser {
    fn parse(&mut self, source: &str, sink: &mut dyn Sink) -> Result<(), ParseError> {
        self.diagnostics.reset();
        self.diagnostics.set_verbose(self.options.verbose);

        let lines = read_lines(source);
        let file = self.options.file_name.clone();
        let mut reader = BlockReader::new(&lines, file.as_deref());
        let mut outline = Outline::new();

        let mut next = reader.next_block()?;
        sink.start(Tag::Head)?;
        if let Some(block) = next.as_ref().filter(|block| block.kind == BlockKind::Title) {
            sink.locate(&self.location(block.line));
            self.traverse_title(block, sink)?;
            next = reader.next_block()?;
        }
        sink.end(TagKind::Head)?;

        sink.start(Tag::Body)?;
        while let Some(block) = next {
            self.traverse(block, &mut outline, source, sink)?;
            next = reader.next_block()?;
        }
        outline.close_all(sink)?;
        sink.end(TagKind::Body)?;
        sink.flush()?;

        self.diagnostics.flush();
        Ok(())
    }
}

/// Splits `[head] rest`, honouring escaped brackets inside `head`.
fn split_bracket(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_prefix('[')?;
    let mut escaped = false;
    for (index, c) in inner.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ']' => return Some((&inner[..index], &inner[index + 1..])),
            _ => {}
        }
    }
    None
}

/// Parses `name|key=value|...}` (the text after `%{`).
fn parse_macro(text: &str) -> Result<(String, IndexMap<String, String>), String> {
    let body = text
        .trim_end()
        .strip_suffix('}')
        .ok_or_else(|| "Missing '}' in macro".to_string())?;
    let protected = body
        .replace("\\=", &ESCAPED_EQUALS.to_string())
        .replace("\\|", &ESCAPED_BAR.to_string());
    let restore = |s: &str| {
        s.replace(ESCAPED_EQUALS, "=")
            .replace(ESCAPED_BAR, "|")
    };

    let mut parts = protected.split('|');
    let name = parts.next().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err("Macro without a name".to_string());
    }

    let mut parameters = IndexMap::new();
    for part in parts {
        if part.trim().is_empty() {
            continue;
        }
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| format!("Invalid macro parameter '{}'", restore(part.trim())))?;
        parameters.insert(restore(key.trim()), restore(value));
    }
    Ok((restore(name), parameters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use std::sync::{Mutex, Once};

    static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    fn capture_warnings() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&CaptureLogger).unwrap();
            log::set_max_level(log::LevelFilter::Warn);
        });
    }

    /// Warnings containing `needle` logged so far. Other tests log concurrently.
    fn warnings_about(needle: &str) -> usize {
        WARNINGS
            .lock()
            .unwrap()
            .iter()
            .filter(|message| message.contains(needle))
            .count()
    }

    /// Notes how many matching warnings were already logged when the sink is flushed.
    struct FlushWatch {
        needle: &'static str,
        logged_at_flush: Option<usize>,
    }

    impl Sink for FlushWatch {
        fn emit(&mut self, _event: Event) -> Result<(), SinkError> {
            Ok(())
        }

        fn flush(&mut self) -> Result<(), SinkError> {
            self.logged_at_flush = Some(warnings_about(self.needle));
            Ok(())
        }
    }

    #[test]
    fn repeated_warnings_are_logged_once_after_parsing() {
        capture_warnings();
        let source = " Text {{#Twice Linked}} and again {{#Twice Linked}}.\n";
        let needle = "'#Twice Linked'";
        let mut sink = FlushWatch {
            needle,
            logged_at_flush: None,
        };

        AptParser::default().parse(source, &mut sink).unwrap();

        assert_eq!(sink.logged_at_flush, Some(0));
        assert_eq!(warnings_about(needle), 1);
    }

    #[test]
    fn verbose_warnings_are_logged_as_they_happen() {
        capture_warnings();
        let source = " Text {{#Loud Link}} and again {{#Loud Link}}.\n";
        let needle = "'#Loud Link'";
        let mut sink = FlushWatch {
            needle,
            logged_at_flush: None,
        };
        let options = ParserOptions {
            verbose: true,
            ..ParserOptions::default()
        };

        AptParser::new(options).parse(source, &mut sink).unwrap();

        assert_eq!(sink.logged_at_flush, Some(2));
        assert_eq!(warnings_about(needle), 2);
    }

    #[test]
    fn macro_parameters() {
        let (name, params) = parse_macro("snippet|file=a\\=b.txt|sep=x\\|y}").unwrap();
        assert_eq!(name, "snippet");
        assert_eq!(params.get("file").map(String::as_str), Some("a=b.txt"));
        assert_eq!(params.get("sep").map(String::as_str), Some("x|y"));

        assert!(parse_macro("toc|section=1").is_err());
        assert!(parse_macro("toc|oops}").is_err());
        assert!(parse_macro("|a=b}").is_err());
    }

    #[test]
    fn bracket_splitting() {
        assert_eq!(split_bracket("[term] text"), Some(("term", " text")));
        assert_eq!(split_bracket("[a\\]b] c"), Some(("a\\]b", " c")));
        assert_eq!(split_bracket("[open"), None);
    }
}
