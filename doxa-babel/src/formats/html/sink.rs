//! Streaming XHTML renderer.
//!
//! The sink writes markup as events arrive, with three exceptions that need state:
//! - head events are collected and written as one `<head>` element when the head ends
//! - tables are rendered into a buffer, because their caption arrives after the rows
//!   but belongs right after the opening `<table>` tag
//! - inline spans remember which elements they opened so the end event can close them

use super::HtmlOptions;
use crate::common::escape::{escape_attribute, escape_comment, escape_text};
use crate::common::ids::{encode_id, is_valid_id};
use crate::common::links::is_external_link;
use crate::diagnostics::Diagnostics;
use crate::error::SinkError;
use crate::sink::attributes::{decoration, keys, semantics};
use crate::sink::{Attributes, Event, Justification, Sink, Tag, TagKind};
use std::io::Write;

/// Diagnostic key for anchor names rewritten into valid identifiers.
const INVALID_ANCHOR: &str = "invalid-anchor";

/// Attribute keys passed through to HTML elements.
const HTML_ATTRIBUTES: &[&str] = &[
    keys::ID,
    keys::CLASS,
    keys::STYLE,
    keys::LANG,
    keys::TITLE,
    keys::WIDTH,
    keys::BORDER,
    keys::ALIGN,
    keys::NAME,
    "alt",
    "height",
    "dir",
];

/// Elements an `Unknown` event may produce.
const KNOWN_ELEMENTS: &[&str] = &[
    "abbr", "aside", "b", "bdi", "bdo", "br", "button", "canvas", "cite", "code", "del",
    "details", "dfn", "div", "em", "embed", "hr", "i", "iframe", "img", "input", "ins",
    "kbd", "label", "mark", "meter", "noscript", "object", "output", "picture", "progress",
    "q", "ruby", "s", "samp", "small", "source", "span", "strong", "sub", "summary", "sup",
    "template", "u", "var", "video", "wbr",
];

fn table_open_tag(attributes: &Attributes, grid: bool) -> String {
    let mut table_attributes = attributes.clone();
    let class = match table_attributes.get(keys::CLASS) {
        Some(class) => format!("bodyTable {class}"),
        None => "bodyTable".to_string(),
    };
    let class = if grid { format!("{class} grid") } else { class };
    table_attributes.set(keys::CLASS, class);
    table_attributes.set(keys::BORDER, if grid { "1" } else { "0" });
    format!("<table{}>\n", html_attributes(&table_attributes))
}

fn html_attributes(attributes: &Attributes) -> String {
    let mut out = String::new();
    for (key, value) in attributes.resolved_string_entries() {
        if HTML_ATTRIBUTES.contains(&key) {
            out.push_str(&format!(" {key}=\"{}\"", escape_attribute(value)));
        }
    }
    out
}

/// Elements for the semantic roles and decorations in `attributes`, outermost first.
fn semantic_elements(attributes: &Attributes) -> Vec<&'static str> {
    let mut elements = Vec::new();
    if let Some(roles) = attributes.get(keys::SEMANTICS) {
        for role in roles.split_whitespace() {
            let element = match role {
                semantics::EMPHASIS => "em",
                semantics::STRONG => "strong",
                semantics::BOLD => "b",
                semantics::ITALIC => "i",
                semantics::MONOSPACED | semantics::CODE => "code",
                semantics::CITATION => "cite",
                semantics::QUOTE => "q",
                semantics::SUBSCRIPT => "sub",
                semantics::SUPERSCRIPT => "sup",
                semantics::SMALL => "small",
                semantics::LINE_THROUGH => "s",
                semantics::DELETE => "del",
                semantics::INSERT => "ins",
                semantics::ABBREVIATION => "abbr",
                semantics::DEFINITION => "dfn",
                semantics::KEYBOARD => "kbd",
                semantics::SAMPLE => "samp",
                semantics::VARIABLE => "var",
                semantics::HIGHLIGHT => "mark",
                semantics::ANNOTATION => "u",
                _ => continue,
            };
            if !elements.contains(&element) {
                elements.push(element);
            }
        }
    }
    match attributes.get(keys::DECORATION) {
        Some(decoration::UNDERLINE) => elements.push("u"),
        Some(decoration::LINE_THROUGH) => elements.push("s"),
        _ => {}
    }
    elements
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadField {
    Title,
    Author,
    Date,
}

#[derive(Debug, Default)]
struct TableBuffer {
    attributes: Attributes,
    content: String,
    caption: String,
    in_caption: bool,
    opened: bool,
    justification: Vec<Justification>,
    row: usize,
    cell: usize,
}

pub struct HtmlSink<W: Write> {
    out: W,
    options: HtmlOptions,
    diagnostics: Diagnostics,
    in_head: bool,
    head_field: Option<(HeadField, String)>,
    title: String,
    authors: Vec<String>,
    date: Option<String>,
    head_written: bool,
    body_open: bool,
    in_paragraph: bool,
    in_verbatim: bool,
    tables: Vec<TableBuffer>,
    inline: Vec<Vec<&'static str>>,
    closed: bool,
}

impl<W: Write> HtmlSink<W> {
    pub fn new(out: W, options: HtmlOptions) -> Self {
        let diagnostics = Diagnostics::new(options.verbose);
        Self {
            out,
            options,
            diagnostics,
            in_head: false,
            head_field: None,
            title: String::new(),
            authors: Vec::new(),
            date: None,
            head_written: false,
            body_open: false,
            in_paragraph: false,
            in_verbatim: false,
            tables: Vec::new(),
            inline: Vec::new(),
            closed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn write(&mut self, markup: &str) -> Result<(), SinkError> {
        match self.tables.last_mut() {
            Some(table) if table.in_caption => table.caption.push_str(markup),
            Some(table) => table.content.push_str(markup),
            None => self.out.write_all(markup.as_bytes())?,
        }
        Ok(())
    }

    /// Writes the document prologue once, in full-document mode.
    fn ensure_head(&mut self) -> Result<(), SinkError> {
        if self.head_written || !self.options.full_document {
            return Ok(());
        }
        self.head_written = true;

        let mut head = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\" />\n");
        head.push_str(&format!("<title>{}</title>\n", escape_text(self.title.trim())));
        for author in &self.authors {
            head.push_str(&format!(
                "<meta name=\"author\" content=\"{}\" />\n",
                escape_attribute(author.trim())
            ));
        }
        if let Some(date) = &self.date {
            head.push_str(&format!(
                "<meta name=\"date\" content=\"{}\" />\n",
                escape_attribute(date.trim())
            ));
        }
        if self.options.embed_css {
            head.push_str("<style>\n");
            head.push_str(super::BASELINE_CSS);
            if let Some(css) = &self.options.custom_css {
                head.push_str(css);
                head.push('\n');
            }
            head.push_str("</style>\n");
        }
        head.push_str("</head>\n");
        self.write(&head)
    }

    fn open_body(&mut self) -> Result<(), SinkError> {
        self.ensure_head()?;
        if self.options.full_document && !self.body_open {
            self.body_open = true;
            self.write("<body>\n")?;
        }
        Ok(())
    }

    fn close_body(&mut self) -> Result<(), SinkError> {
        if self.body_open {
            self.body_open = false;
            self.write("</body>\n</html>\n")?;
        }
        Ok(())
    }

    /// Block content may not sit inside a paragraph.
    fn close_paragraph(&mut self) -> Result<(), SinkError> {
        if self.in_paragraph {
            self.in_paragraph = false;
            self.write("</p>\n")?;
        }
        Ok(())
    }

    fn anchor_id(&mut self, name: &str) -> String {
        if is_valid_id(name) {
            return name.to_string();
        }
        match encode_id(name) {
            Some(id) => {
                self.diagnostics.warn(
                    INVALID_ANCHOR,
                    format!("Modified invalid anchor name '{name}' to '{id}'"),
                );
                id
            }
            None => name.to_string(),
        }
    }

    fn write_text(&mut self, text: &str, attributes: &Attributes) -> Result<(), SinkError> {
        if self.in_head {
            if let Some((_, buffer)) = self.head_field.as_mut() {
                buffer.push_str(text);
            }
            return Ok(());
        }
        let mut escaped = escape_text(text);
        if !self.in_verbatim {
            escaped = escaped.replace('\u{a0}', "&#160;");
        }
        let elements = semantic_elements(attributes);
        for element in &elements {
            self.write(&format!("<{element}>"))?;
        }
        self.write(&escaped)?;
        for element in elements.iter().rev() {
            self.write(&format!("</{element}>"))?;
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag, attributes: Attributes) -> Result<(), SinkError> {
        let attrs = html_attributes(&attributes);
        match tag {
            Tag::Head => {
                self.in_head = true;
            }
            Tag::Title => self.head_field = Some((HeadField::Title, String::new())),
            Tag::Author => self.head_field = Some((HeadField::Author, String::new())),
            Tag::Date => self.head_field = Some((HeadField::Date, String::new())),
            Tag::Body => self.open_body()?,
            Tag::Article => self.write(&format!("<article{attrs}>"))?,
            Tag::Navigation => self.write(&format!("<nav{attrs}>"))?,
            Tag::Sidebar => self.write(&format!("<aside{attrs}>"))?,
            Tag::Section(_) => {
                self.close_paragraph()?;
                self.write(&format!("<section{attrs}>\n"))?;
            }
            Tag::SectionTitle(level) => {
                self.write(&format!("<h{}{attrs}>", level.clamp(1, 6)))?;
            }
            Tag::Header => self.write(&format!("<header{attrs}>"))?,
            Tag::Content => self.write(&format!("<main{attrs}>"))?,
            Tag::Footer => self.write(&format!("<footer{attrs}>"))?,
            Tag::List => {
                self.close_paragraph()?;
                self.write(&format!("<ul{attrs}>\n"))?;
            }
            Tag::ListItem | Tag::NumberedListItem => self.write(&format!("<li{attrs}>"))?,
            Tag::NumberedList(numbering) => {
                self.close_paragraph()?;
                self.write(&format!(
                    "<ol style=\"list-style-type: {}\"{attrs}>\n",
                    numbering.css_name()
                ))?;
            }
            Tag::DefinitionList => {
                self.close_paragraph()?;
                self.write(&format!("<dl{attrs}>\n"))?;
            }
            Tag::DefinitionListItem => {}
            Tag::DefinedTerm => self.write(&format!("<dt{attrs}>"))?,
            Tag::Definition => self.write(&format!("<dd{attrs}>"))?,
            Tag::Figure => self.write(&format!("<figure{attrs}>"))?,
            Tag::FigureCaption => self.write(&format!("<figcaption{attrs}>"))?,
            Tag::Table => {
                self.close_paragraph()?;
                self.tables.push(TableBuffer {
                    attributes,
                    ..TableBuffer::default()
                });
            }
            Tag::TableRows {
                justification,
                grid,
            } => {
                let Some(table) = self.tables.last_mut() else {
                    return Err(SinkError::InvalidEvent(
                        "tableRows outside of a table".to_string(),
                    ));
                };
                table.justification = justification;
                table.row = 0;
                let markup = if table.opened {
                    String::new()
                } else {
                    table.opened = true;
                    table_open_tag(&table.attributes, grid)
                };
                self.write(&markup)?;
            }
            Tag::TableRow => {
                let class = match self.tables.last_mut() {
                    Some(table) => {
                        table.row += 1;
                        table.cell = 0;
                        if table.row % 2 == 1 { "a" } else { "b" }
                    }
                    None => "a",
                };
                self.write(&format!("<tr class=\"{class}\"{attrs}>"))?;
            }
            Tag::TableCell | Tag::TableHeaderCell => {
                let element = if matches!(tag, Tag::TableHeaderCell) { "th" } else { "td" };
                let style = self
                    .tables
                    .last_mut()
                    .map(|table| {
                        let column = table.cell;
                        table.cell += 1;
                        table.justification.get(column).copied()
                    })
                    .flatten()
                    .filter(|_| !attributes.is_defined(keys::STYLE))
                    .map(|j| format!(" style=\"text-align: {};\"", j.css_name()))
                    .unwrap_or_default();
                self.write(&format!("<{element}{style}{attrs}>"))?;
            }
            Tag::TableCaption => {
                if let Some(table) = self.tables.last_mut() {
                    table.in_caption = true;
                }
                self.write(&format!("<caption{attrs}>"))?;
            }
            Tag::Paragraph => {
                self.close_paragraph()?;
                self.in_paragraph = true;
                self.write(&format!("<p{attrs}>"))?;
            }
            Tag::Data(value) => self.write(&format!(
                "<data value=\"{}\"{attrs}>",
                escape_attribute(&value)
            ))?,
            Tag::Time(datetime) => self.write(&format!(
                "<time datetime=\"{}\"{attrs}>",
                escape_attribute(&datetime)
            ))?,
            Tag::Address => self.write(&format!("<address{attrs}>"))?,
            Tag::Blockquote => {
                self.close_paragraph()?;
                self.write(&format!("<blockquote{attrs}>"))?;
            }
            Tag::Division => {
                self.close_paragraph()?;
                self.write(&format!("<div{attrs}>"))?;
            }
            Tag::Verbatim => {
                self.close_paragraph()?;
                self.in_verbatim = true;
                let class = match attributes.get(keys::DECORATION) {
                    Some(decoration::BOXED) => "verbatim boxed",
                    Some(decoration::SOURCE) => "verbatim source",
                    _ => "verbatim",
                };
                self.write(&format!("<div class=\"{class}\"><pre>"))?;
            }
            Tag::Anchor(name) => {
                let id = self.anchor_id(&name);
                self.write(&format!("<a id=\"{}\">", escape_attribute(&id)))?;
            }
            Tag::Link(href) => {
                let class = if is_external_link(&href) {
                    " class=\"externalLink\""
                } else {
                    ""
                };
                self.write(&format!(
                    "<a href=\"{}\"{class}{attrs}>",
                    escape_attribute(&href)
                ))?;
            }
            Tag::Inline => {
                let mut elements = semantic_elements(&attributes);
                if elements.is_empty() && !attrs.is_empty() {
                    elements.push("span");
                }
                for (index, element) in elements.iter().enumerate() {
                    let extra = if index == 0 { attrs.as_str() } else { "" };
                    self.write(&format!("<{element}{extra}>"))?;
                }
                self.inline.push(elements);
            }
            Tag::Italic => self.write("<i>")?,
            Tag::Bold => self.write("<b>")?,
            Tag::Monospaced => self.write("<code>")?,
        }
        Ok(())
    }

    fn end(&mut self, kind: TagKind) -> Result<(), SinkError> {
        match kind {
            TagKind::Head => {
                self.in_head = false;
                self.ensure_head()?;
            }
            TagKind::Title | TagKind::Author | TagKind::Date => {
                if let Some((field, text)) = self.head_field.take() {
                    match field {
                        HeadField::Title => self.title = text,
                        HeadField::Author => self.authors.push(text),
                        HeadField::Date => self.date = Some(text),
                    }
                }
            }
            TagKind::Body => {
                self.close_paragraph()?;
                self.close_body()?;
            }
            TagKind::Article => self.write("</article>")?,
            TagKind::Navigation => self.write("</nav>")?,
            TagKind::Sidebar => self.write("</aside>")?,
            TagKind::Section(_) => {
                self.close_paragraph()?;
                self.write("</section>\n")?;
            }
            TagKind::SectionTitle(level) => {
                self.write(&format!("</h{}>\n", level.clamp(1, 6)))?
            }
            TagKind::Header => self.write("</header>")?,
            TagKind::Content => self.write("</main>")?,
            TagKind::Footer => self.write("</footer>")?,
            TagKind::List => {
                self.close_paragraph()?;
                self.write("</ul>\n")?;
            }
            TagKind::NumberedList => {
                self.close_paragraph()?;
                self.write("</ol>\n")?;
            }
            TagKind::ListItem | TagKind::NumberedListItem => {
                self.close_paragraph()?;
                self.write("</li>\n")?;
            }
            TagKind::DefinitionList => {
                self.close_paragraph()?;
                self.write("</dl>\n")?;
            }
            TagKind::DefinitionListItem => {}
            TagKind::DefinedTerm => self.write("</dt>\n")?,
            TagKind::Definition => {
                self.close_paragraph()?;
                self.write("</dd>\n")?;
            }
            TagKind::Figure => self.write("</figure>\n")?,
            TagKind::FigureCaption => self.write("</figcaption>")?,
            TagKind::TableRows => {}
            TagKind::TableRow => self.write("</tr>\n")?,
            TagKind::TableCell => self.write("</td>")?,
            TagKind::TableHeaderCell => self.write("</th>")?,
            TagKind::TableCaption => {
                self.write("</caption>")?;
                if let Some(table) = self.tables.last_mut() {
                    table.in_caption = false;
                }
            }
            TagKind::Table => self.end_table()?,
            TagKind::Paragraph => {
                if self.in_paragraph {
                    self.in_paragraph = false;
                    self.write("</p>\n")?;
                }
            }
            TagKind::Data => self.write("</data>")?,
            TagKind::Time => self.write("</time>")?,
            TagKind::Address => self.write("</address>")?,
            TagKind::Blockquote => self.write("</blockquote>\n")?,
            TagKind::Division => self.write("</div>\n")?,
            TagKind::Verbatim => {
                self.in_verbatim = false;
                self.write("</pre></div>\n")?;
            }
            TagKind::Anchor | TagKind::Link => self.write("</a>")?,
            TagKind::Inline => {
                let elements = self.inline.pop().unwrap_or_default();
                for element in elements.iter().rev() {
                    self.write(&format!("</{element}>"))?;
                }
            }
            TagKind::Italic => self.write("</i>")?,
            TagKind::Bold => self.write("</b>")?,
            TagKind::Monospaced => self.write("</code>")?,
        }
        Ok(())
    }

    /// Splices the caption in after the opening `<table>` tag and hands the table to
    /// the enclosing output. A table that never saw `tableRows` still gets its opening tag.
    fn end_table(&mut self) -> Result<(), SinkError> {
        let Some(table) = self.tables.pop() else {
            return Err(SinkError::Unbalanced("table_ without table".to_string()));
        };
        let mut markup = table.content;
        if !table.opened {
            markup.insert_str(0, &table_open_tag(&table.attributes, false));
        }
        if !table.caption.is_empty() {
            match markup.find('>') {
                Some(index) => markup.insert_str(index + 1, &table.caption),
                None => markup.insert_str(0, &table.caption),
            }
        }
        markup.push_str("</table>\n");
        self.write(&markup)
    }

    fn unknown(&mut self, name: &str, params: &[String], attributes: &Attributes) -> Result<(), SinkError> {
        let kind = params.first().map(String::as_str);
        if !KNOWN_ELEMENTS.contains(&name) || kind.is_none() {
            log::debug!("html: ignoring unknown event '{name}'");
            return Ok(());
        }
        let attrs = html_attributes(attributes);
        match kind {
            Some("start") => self.write(&format!("<{name}{attrs}>")),
            Some("end") => self.write(&format!("</{name}>")),
            Some("simple") => self.write(&format!("<{name}{attrs} />")),
            _ => {
                log::debug!("html: ignoring unknown event '{name}' with type {kind:?}");
                Ok(())
            }
        }
    }
}

impl<W: Write> Sink for HtmlSink<W> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        match event {
            Event::Start(tag, attributes) => self.start(tag, attributes),
            Event::End(kind) => self.end(kind),
            Event::Text(text, attributes) => self.write_text(&text, &attributes),
            Event::RawText(text) => self.write(&text),
            Event::Comment(text) => self.write(&format!("<!--{}-->", escape_comment(&text))),
            Event::LineBreak(attributes) => {
                self.write(&format!("<br{} />", html_attributes(&attributes)))
            }
            Event::LineBreakOpportunity => self.write("<wbr />"),
            Event::NonBreakingSpace => self.write("&#160;"),
            Event::FigureGraphics { src, attributes } => {
                let alt = if attributes.is_defined("alt") {
                    String::new()
                } else {
                    " alt=\"\"".to_string()
                };
                self.write(&format!(
                    "<img src=\"{}\"{alt}{} />",
                    escape_attribute(&src),
                    html_attributes(&attributes)
                ))
            }
            Event::HorizontalRule(attributes) => {
                self.close_paragraph()?;
                self.write(&format!("<hr{} />\n", html_attributes(&attributes)))
            }
            Event::PageBreak => self.write("<!-- PB -->"),
            Event::Unknown {
                name,
                params,
                attributes,
            } => self.unknown(&name, &params, &attributes),
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if let Err(err) = self.out.flush() {
            log::error!("html: failed to flush output: {err}");
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let finished = self.close_paragraph().and_then(|_| self.close_body());
        if let Err(err) = finished {
            log::error!("html: failed to finish document: {err}");
        }
        if let Err(err) = self.out.flush() {
            log::error!("html: failed to flush output: {err}");
        }
        self.diagnostics.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::attributes::{BOLD, CENTER};
    use crate::sink::{replay, SinkExt};

    fn render_with(events: &[Event], options: HtmlOptions) -> String {
        let mut sink = HtmlSink::new(Vec::new(), options);
        replay(events, &mut sink).unwrap();
        sink.close().unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    fn render(events: &[Event]) -> String {
        render_with(events, HtmlOptions::fragment())
    }

    #[test]
    fn caption_is_spliced_after_table_tag() {
        let mut events: Vec<Event> = Vec::new();
        events.start(Tag::Table).unwrap();
        events
            .start(Tag::TableRows {
                justification: vec![Justification::Center],
                grid: false,
            })
            .unwrap();
        events.start(Tag::TableRow).unwrap();
        events.wrap_text(Tag::TableCell, "a").unwrap();
        events.end(TagKind::TableRow).unwrap();
        events.end(TagKind::TableRows).unwrap();
        events.wrap_text(Tag::TableCaption, "Caption text").unwrap();
        events.end(TagKind::Table).unwrap();

        let html = render(&events);
        let caption = html.find("<caption>Caption text</caption>").unwrap();
        let table = html.find("<table").unwrap();
        let row = html.find("<tr").unwrap();
        assert!(table < caption && caption < row);
        assert_eq!(&html[html.find('>').unwrap() + 1..caption], "");
        assert!(html.contains("<td style=\"text-align: center;\">a</td>"));
    }

    #[test]
    fn rows_alternate_and_reset_per_table() {
        let mut events: Vec<Event> = Vec::new();
        for _ in 0..2 {
            events.start(Tag::Table).unwrap();
            events
                .start(Tag::TableRows {
                    justification: vec![],
                    grid: true,
                })
                .unwrap();
            for _ in 0..3 {
                events.start(Tag::TableRow).unwrap();
                events.end(TagKind::TableRow).unwrap();
            }
            events.end(TagKind::TableRows).unwrap();
            events.end(TagKind::Table).unwrap();
        }
        let html = render(&events);
        let classes: Vec<_> = html
            .match_indices("<tr class=\"")
            .map(|(i, _)| &html[i + 11..i + 12])
            .collect();
        assert_eq!(classes, vec!["a", "b", "a", "a", "b", "a"]);
        assert!(html.contains("class=\"bodyTable grid\" border=\"1\""));
    }

    #[test]
    fn table_without_rows_is_still_well_formed() {
        let mut events: Vec<Event> = Vec::new();
        events.start(Tag::Table).unwrap();
        events.wrap_text(Tag::TableCaption, "Empty").unwrap();
        events.end(TagKind::Table).unwrap();

        assert_eq!(
            render(&events),
            "<table class=\"bodyTable\" border=\"0\"><caption>Empty</caption>\n</table>\n"
        );
    }

    #[test]
    fn inherited_attributes_are_rendered() {
        let mut events: Vec<Event> = Vec::new();
        events
            .start_with(Tag::Paragraph, CENTER.as_parent().with(keys::ID, "p1"))
            .unwrap();
        events.text("centered").unwrap();
        events.end(TagKind::Paragraph).unwrap();

        assert_eq!(render(&events), "<p id=\"p1\" align=\"center\">centered</p>\n");
    }

    #[test]
    fn paragraph_closes_before_block_content() {
        let mut events: Vec<Event> = Vec::new();
        events.start(Tag::Paragraph).unwrap();
        events.text("intro").unwrap();
        events.start(Tag::List).unwrap();
        events.wrap_text(Tag::ListItem, "x").unwrap();
        events.end(TagKind::List).unwrap();
        events.end(TagKind::Paragraph).unwrap();
        assert_eq!(render(&events), "<p>intro</p>\n<ul>\n<li>x</li>\n</ul>\n");
    }

    #[test]
    fn inline_semantics_open_and_close_in_order() {
        let attributes = Attributes::new().with(keys::SEMANTICS, "strong emphasis");
        let mut events: Vec<Event> = Vec::new();
        events.start_with(Tag::Inline, attributes).unwrap();
        events.text("x").unwrap();
        events.end(TagKind::Inline).unwrap();
        events
            .emit(Event::Text("y".into(), BOLD.to_attributes()))
            .unwrap();
        assert_eq!(render(&events), "<strong><em>x</em></strong><b>y</b>");
    }

    #[test]
    fn links_and_anchors() {
        let mut events: Vec<Event> = Vec::new();
        events.wrap_text(Tag::Anchor("top".into()), "").unwrap();
        events
            .wrap_text(Tag::Link("https://example.org".into()), "ext")
            .unwrap();
        events.wrap_text(Tag::Link("#top".into()), "up").unwrap();
        assert_eq!(
            render(&events),
            "<a id=\"top\"></a><a href=\"https://example.org\" class=\"externalLink\">ext</a><a href=\"#top\">up</a>"
        );
    }

    #[test]
    fn full_document_has_head_from_events() {
        let mut events: Vec<Event> = Vec::new();
        events.start(Tag::Head).unwrap();
        events.wrap_text(Tag::Title, "My <Doc>").unwrap();
        events.wrap_text(Tag::Author, "Ada").unwrap();
        events.end(TagKind::Head).unwrap();
        events.start(Tag::Body).unwrap();
        events.start(Tag::Section(1)).unwrap();
        events.wrap_text(Tag::SectionTitle(1), "One").unwrap();
        events.end(TagKind::Section(1)).unwrap();
        events.end(TagKind::Body).unwrap();

        let html = render_with(&events, HtmlOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>\n<html>\n<head>"));
        assert!(html.contains("<title>My &lt;Doc&gt;</title>"));
        assert!(html.contains("<meta name=\"author\" content=\"Ada\" />"));
        assert!(html.contains("<section>\n<h1>One</h1>\n</section>"));
        assert!(html.trim_end().ends_with("</body>\n</html>"));
    }

    #[test]
    fn unknown_events() {
        let mut events: Vec<Event> = vec![
            Event::Unknown {
                name: "mark".into(),
                params: vec!["start".into()],
                attributes: Attributes::new(),
            },
            Event::text("hi"),
            Event::Unknown {
                name: "mark".into(),
                params: vec!["end".into()],
                attributes: Attributes::new(),
            },
        ];
        events.push(Event::Unknown {
            name: "blink".into(),
            params: vec!["start".into()],
            attributes: Attributes::new(),
        });
        assert_eq!(render(&events), "<mark>hi</mark>");
    }

    #[test]
    fn invalid_anchor_names_are_encoded_once() {
        let mut sink = HtmlSink::new(Vec::new(), HtmlOptions::fragment());
        for _ in 0..2 {
            sink.wrap_text(Tag::Anchor("a b".into()), "").unwrap();
        }
        assert_eq!(sink.diagnostics().messages(INVALID_ANCHOR).len(), 1);
        sink.close().unwrap();
        assert!(sink.diagnostics().is_empty());
        let html = String::from_utf8(sink.into_inner()).unwrap();
        assert!(html.starts_with("<a id=\"a_b\"></a>"));
    }
}
