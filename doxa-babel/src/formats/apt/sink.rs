//! Writes an event stream back out as APT text.

use crate::error::SinkError;
use crate::sink::attributes::{decoration, keys};
use crate::sink::{Event, Justification, Numbering, Sink, Tag, TagKind};
use std::io::Write;

/// Characters that carry meaning somewhere in APT text.
const SPECIAL: &[char] = &['\\', '~', '=', '-', '+', '*', '[', ']', '<', '>', '{', '}'];

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{a0}' => out.push_str("\\ "),
            c if SPECIAL.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

fn numbering_marker(numbering: Numbering) -> &'static str {
    match numbering {
        Numbering::Decimal => "[[1]]",
        Numbering::LowerAlpha => "[[a]]",
        Numbering::UpperAlpha => "[[A]]",
        Numbering::LowerRoman => "[[i]]",
        Numbering::UpperRoman => "[[I]]",
    }
}

fn separator(justification: &[Justification]) -> String {
    let mut line = String::from("*");
    for column in justification {
        line.push_str("------");
        line.push(match column {
            Justification::Left => '+',
            Justification::Center => '*',
            Justification::Right => ':',
        });
    }
    line
}

#[derive(Debug)]
enum Capture {
    Title,
    Author,
    Date,
    Link(String),
    Cell { header: bool },
}

#[derive(Debug, Default)]
struct TableState {
    separator: String,
    grid: bool,
    row: Vec<(String, bool)>,
}

/// Renders events as APT.
///
/// Lists are closed with an explicit `[]` break, so nested lists survive a re-parse
/// regardless of the indentation that follows them.
pub struct AptSink<W: Write> {
    out: W,
    captures: Vec<(Capture, String)>,
    title: String,
    authors: Vec<String>,
    date: String,
    in_head: bool,
    in_verbatim: bool,
    verbatim_marker: &'static str,
    /// Marker and indentation of every open list.
    lists: Vec<(Option<Numbering>, bool)>,
    table: Option<TableState>,
    closed: bool,
}

impl<W: Write> AptSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            captures: Vec::new(),
            title: String::new(),
            authors: Vec::new(),
            date: String::new(),
            in_head: false,
            in_verbatim: false,
            verbatim_marker: "---",
            lists: Vec::new(),
            table: None,
            closed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn indent(&self) -> String {
        if self.lists.is_empty() {
            " ".to_string()
        } else {
            " ".repeat(1 + 2 * self.lists.len())
        }
    }

    fn item_indent(&self) -> String {
        " ".repeat(1 + 2 * self.lists.len().saturating_sub(1))
    }

    fn write(&mut self, text: &str) -> Result<(), SinkError> {
        match self.captures.last_mut() {
            Some((_, buffer)) => buffer.push_str(text),
            None => self.out.write_all(text.as_bytes())?,
        }
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), SinkError> {
        if self.in_verbatim {
            return self.write(text);
        }
        let mut escaped = escape(text);
        if matches!(self.captures.last(), Some((Capture::Cell { .. }, _))) {
            escaped = escaped.replace('|', "\\|").replace('\n', " ");
        } else if escaped.contains('\n') {
            escaped = escaped.replace('\n', &format!("\n{}", self.indent()));
        }
        self.write(&escaped)
    }

    fn end_capture(&mut self) -> Result<(), SinkError> {
        let Some((capture, text)) = self.captures.pop() else {
            return Ok(());
        };
        match capture {
            Capture::Title => self.title = text,
            Capture::Author => self.authors.push(text),
            Capture::Date => self.date = text,
            Capture::Link(target) => {
                let plain = target.strip_prefix('#').unwrap_or(&target);
                if text == target || text == plain {
                    self.write(&format!("{{{{{text}}}}}"))?;
                } else {
                    self.write(&format!("{{{{{{{}}}{text}}}}}", escape(&target)))?;
                }
            }
            Capture::Cell { header } => {
                if let Some(table) = self.table.as_mut() {
                    table.row.push((text, header));
                }
            }
        }
        Ok(())
    }

    fn write_head(&mut self) -> Result<(), SinkError> {
        if self.title.is_empty() && self.authors.is_empty() && self.date.is_empty() {
            return Ok(());
        }
        let mut head = format!(" -----\n {}\n -----\n", self.title);
        for author in &self.authors {
            head.push_str(&format!(" {author}\n"));
        }
        head.push_str(&format!(" -----\n {}\n -----\n\n", self.date));
        self.write(&head)
    }

    fn end_row(&mut self) -> Result<(), SinkError> {
        let Some(table) = self.table.as_mut() else {
            return Ok(());
        };
        let mut line = String::new();
        for (index, (text, header)) in table.row.drain(..).enumerate() {
            let boundary = if header { "||" } else { "|" };
            if index > 0 || table.grid {
                line.push_str(boundary);
            }
            line.push(' ');
            line.push_str(&text);
            line.push(' ');
        }
        if table.grid {
            line.push('|');
        }
        let separator = table.separator.clone();
        self.write(&format!("{}\n{separator}\n", line.trim_end()))
    }

    fn start(&mut self, tag: Tag, attributes: &crate::sink::Attributes) -> Result<(), SinkError> {
        match tag {
            Tag::Head => self.in_head = true,
            Tag::Title => self.captures.push((Capture::Title, String::new())),
            Tag::Author => self.captures.push((Capture::Author, String::new())),
            Tag::Date => self.captures.push((Capture::Date, String::new())),
            Tag::SectionTitle(level) => {
                let marker = "*".repeat(usize::from(level.clamp(1, 5)) - 1);
                if marker.is_empty() {
                    self.write("\n")?;
                } else {
                    self.write(&format!("\n{marker} "))?;
                }
            }
            Tag::Paragraph => {
                let indent = self.indent();
                self.write(&format!("\n{indent}"))?;
            }
            Tag::List => {
                self.lists.push((None, false));
                self.write("\n")?;
            }
            Tag::NumberedList(numbering) => {
                self.lists.push((Some(numbering), false));
                self.write("\n")?;
            }
            Tag::DefinitionList => {
                self.lists.push((None, true));
                self.write("\n")?;
            }
            Tag::ListItem => {
                let indent = self.item_indent();
                self.write(&format!("\n{indent}* "))?;
            }
            Tag::NumberedListItem => {
                let indent = self.item_indent();
                let marker = self
                    .lists
                    .last()
                    .and_then(|(numbering, _)| *numbering)
                    .map(numbering_marker)
                    .unwrap_or("[[1]]");
                self.write(&format!("\n{indent}{marker} "))?;
            }
            Tag::DefinitionListItem => {
                let indent = self.item_indent();
                self.write(&format!("\n{indent}"))?;
            }
            Tag::DefinedTerm => self.write("[")?,
            Tag::Definition => self.write(" ")?,
            Tag::Verbatim => {
                let boxed = attributes.get(keys::DECORATION) == Some(decoration::BOXED);
                self.verbatim_marker = if boxed { "+--" } else { "---" };
                self.in_verbatim = true;
                let marker = format!("\n{}----\n", self.verbatim_marker);
                self.write(&marker)?;
            }
            Tag::Figure => self.write("\n")?,
            Tag::FigureCaption => self.write(" ")?,
            Tag::Table => self.write("\n")?,
            Tag::TableRows { justification, grid } => {
                let separator = separator(&justification);
                self.write(&format!("{separator}\n"))?;
                self.table = Some(TableState {
                    separator,
                    grid,
                    row: Vec::new(),
                });
            }
            Tag::TableCell => self
                .captures
                .push((Capture::Cell { header: false }, String::new())),
            Tag::TableHeaderCell => self
                .captures
                .push((Capture::Cell { header: true }, String::new())),
            Tag::Anchor(_) => self.write("{")?,
            Tag::Link(target) => self.captures.push((Capture::Link(target), String::new())),
            Tag::Italic => self.write("<")?,
            Tag::Bold => self.write("<<")?,
            Tag::Monospaced => self.write("<<<")?,
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, kind: TagKind) -> Result<(), SinkError> {
        match kind {
            TagKind::Head => {
                self.in_head = false;
                self.write_head()?;
            }
            TagKind::Title
            | TagKind::Author
            | TagKind::Date
            | TagKind::Link
            | TagKind::TableCell
            | TagKind::TableHeaderCell => self.end_capture()?,
            TagKind::SectionTitle(_) | TagKind::Paragraph | TagKind::Figure => {
                self.write("\n")?
            }
            TagKind::List | TagKind::NumberedList | TagKind::DefinitionList => {
                let indent = self.item_indent();
                self.lists.pop();
                self.write(&format!("\n{indent}[]\n"))?;
            }
            TagKind::DefinedTerm => self.write("]")?,
            TagKind::Verbatim => {
                self.in_verbatim = false;
                let marker = format!("\n{}----\n", self.verbatim_marker);
                self.write(&marker)?;
            }
            TagKind::TableRow => self.end_row()?,
            TagKind::TableRows => {}
            TagKind::TableCaption => self.write("\n")?,
            TagKind::Table => {
                self.table = None;
            }
            TagKind::Anchor => self.write("}")?,
            TagKind::Italic => self.write(">")?,
            TagKind::Bold => self.write(">>")?,
            TagKind::Monospaced => self.write(">>>")?,
            _ => {}
        }
        Ok(())
    }
}

impl<W: Write> Sink for AptSink<W> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        match event {
            Event::Start(tag, attributes) => self.start(tag, &attributes),
            Event::End(kind) => self.end(kind),
            Event::Text(text, _) => {
                if self.in_head && self.captures.is_empty() {
                    return Ok(());
                }
                self.write_text(&text)
            }
            Event::RawText(text) => self.write(&text),
            Event::Comment(text) => self.write(&format!("\n~~{text}\n")),
            Event::LineBreak(_) => {
                let indent = self.indent();
                self.write(&format!("\\\n{indent}"))
            }
            Event::LineBreakOpportunity => Ok(()),
            Event::NonBreakingSpace => self.write("\\ "),
            Event::FigureGraphics { src, .. } => self.write(&format!("[{}]", escape(&src))),
            Event::HorizontalRule(_) => self.write("\n=======\n"),
            Event::PageBreak => self.write("\n\u{c}\n"),
            Event::Unknown { name, .. } => {
                log::debug!("apt: ignoring unknown event '{name}'");
                Ok(())
            }
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Err(err) = self.out.flush() {
            log::error!("apt: failed to flush output: {err}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{replay, Attributes, SinkExt};

    fn render(events: &[Event]) -> String {
        let mut sink = AptSink::new(Vec::new());
        replay(events, &mut sink).unwrap();
        sink.close().unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape("a <b> {c} 1-2"), "a \\<b\\> \\{c\\} 1\\-2");
    }

    #[test]
    fn head_and_sections() {
        let mut events: Vec<Event> = Vec::new();
        events.start(Tag::Head).unwrap();
        events.wrap_text(Tag::Title, "Guide").unwrap();
        events.wrap_text(Tag::Author, "Ada").unwrap();
        events.end(TagKind::Head).unwrap();
        events.start(Tag::Section(2)).unwrap();
        events.wrap_text(Tag::SectionTitle(2), "Install").unwrap();
        events.end(TagKind::Section(2)).unwrap();

        let out = render(&events);
        assert!(out.starts_with(" -----\n Guide\n -----\n Ada\n -----\n"));
        assert!(out.contains("\n* Install\n"));
    }

    #[test]
    fn links_pick_the_short_form_when_possible() {
        let mut events: Vec<Event> = Vec::new();
        events.wrap_text(Tag::Link("#Intro".into()), "Intro").unwrap();
        events.text(" and ").unwrap();
        events
            .wrap_text(Tag::Link("https://example.org".into()), "site")
            .unwrap();
        assert_eq!(
            render(&events),
            "{{Intro}} and {{{https://example.org}site}}"
        );
    }

    #[test]
    fn tables_write_justification_and_header_cells() {
        let mut events: Vec<Event> = Vec::new();
        events.start(Tag::Table).unwrap();
        events
            .start(Tag::TableRows {
                justification: vec![Justification::Left, Justification::Right],
                grid: true,
            })
            .unwrap();
        events.start(Tag::TableRow).unwrap();
        events.wrap_text(Tag::TableHeaderCell, "k").unwrap();
        events.wrap_text(Tag::TableCell, "a|b").unwrap();
        events.end(TagKind::TableRow).unwrap();
        events.end(TagKind::TableRows).unwrap();
        events.end(TagKind::Table).unwrap();

        assert_eq!(
            render(&events),
            "\n*------+------:\n|| k | a\\|b |\n*------+------:\n"
        );
    }

    #[test]
    fn boxed_verbatim_is_not_escaped() {
        let mut events: Vec<Event> = Vec::new();
        events
            .start_with(
                Tag::Verbatim,
                Attributes::new().with(keys::DECORATION, decoration::BOXED),
            )
            .unwrap();
        events.text("a <b>").unwrap();
        events.end(TagKind::Verbatim).unwrap();
        assert_eq!(render(&events), "\n+------\na <b>\n+------\n");
    }
}
