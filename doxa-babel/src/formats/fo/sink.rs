//! XSL-FO renderer.
//!
//! Output is written as events arrive. The page sequence is opened lazily once the
//! head has been seen, because its running header carries the document title.

use super::FoOptions;
use crate::common::escape::{escape_attribute, escape_comment, escape_text};
use crate::common::ids::{encode_id, is_valid_id};
use crate::common::links::is_internal_link;
use crate::diagnostics::Diagnostics;
use crate::error::SinkError;
use crate::sink::attributes::{decoration, keys, semantics};
use crate::sink::{Attributes, Event, Justification, Numbering, Sink, Tag, TagKind};
use std::io::Write;

const FO_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Format";
const INVALID_ANCHOR: &str = "invalid-anchor";

const BULLET: &str = "\u{2022}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadField {
    Title,
    Author,
    Date,
}

#[derive(Debug, Clone, Copy)]
enum ListFrame {
    Bullet,
    Numbered(Numbering, usize),
}

#[derive(Debug, Default)]
struct TableFrame {
    justification: Vec<Justification>,
    grid: bool,
    cell: usize,
}

/// FO properties for the semantic roles and decoration in `attributes`.
fn inline_properties(attributes: &Attributes) -> String {
    let mut weight = None;
    let mut style = None;
    let mut family = None;
    let mut shift = None;
    let mut decorations: Vec<&str> = Vec::new();

    if let Some(roles) = attributes.get(keys::SEMANTICS) {
        for role in roles.split_whitespace() {
            match role {
                semantics::BOLD | semantics::STRONG => weight = Some("bold"),
                semantics::ITALIC | semantics::EMPHASIS | semantics::CITATION => {
                    style = Some("italic")
                }
                semantics::MONOSPACED
                | semantics::CODE
                | semantics::KEYBOARD
                | semantics::SAMPLE => family = Some("monospace"),
                semantics::SUPERSCRIPT => shift = Some("super"),
                semantics::SUBSCRIPT => shift = Some("sub"),
                semantics::LINE_THROUGH | semantics::DELETE => decorations.push("line-through"),
                semantics::INSERT | semantics::ANNOTATION => decorations.push("underline"),
                _ => {}
            }
        }
    }
    match attributes.get(keys::DECORATION) {
        Some(decoration::UNDERLINE) => decorations.push("underline"),
        Some(decoration::OVERLINE) => decorations.push("overline"),
        Some(decoration::LINE_THROUGH) => decorations.push("line-through"),
        _ => {}
    }

    let mut out = String::new();
    if let Some(weight) = weight {
        out.push_str(&format!(" font-weight=\"{weight}\""));
    }
    if let Some(style) = style {
        out.push_str(&format!(" font-style=\"{style}\""));
    }
    if let Some(family) = family {
        out.push_str(&format!(" font-family=\"{family}\""));
    }
    if let Some(shift) = shift {
        out.push_str(&format!(" baseline-shift=\"{shift}\" font-size=\"smaller\""));
    }
    if !decorations.is_empty() {
        decorations.dedup();
        out.push_str(&format!(" text-decoration=\"{}\"", decorations.join(" ")));
    }
    out
}

fn title_size(level: u8) -> &'static str {
    match level {
        0 | 1 => "16pt",
        2 => "14pt",
        3 => "12pt",
        _ => "11pt",
    }
}

pub struct FoSink<W: Write> {
    out: W,
    options: FoOptions,
    diagnostics: Diagnostics,
    root_written: bool,
    flow_open: bool,
    flow_has_content: bool,
    in_head: bool,
    head_field: Option<(HeadField, String)>,
    title: String,
    authors: Vec<String>,
    date: Option<String>,
    lists: Vec<ListFrame>,
    tables: Vec<TableFrame>,
    closed: bool,
}

impl<W: Write> FoSink<W> {
    pub fn new(out: W, options: FoOptions) -> Self {
        let diagnostics = Diagnostics::new(options.verbose);
        Self {
            out,
            options,
            diagnostics,
            root_written: false,
            flow_open: false,
            flow_has_content: false,
            in_head: false,
            head_field: None,
            title: String::new(),
            authors: Vec::new(),
            date: None,
            lists: Vec::new(),
            tables: Vec::new(),
            closed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, markup: &str) -> Result<(), SinkError> {
        if self.flow_open {
            self.flow_has_content = true;
        }
        self.out.write_all(markup.as_bytes())?;
        Ok(())
    }

    fn write_root(&mut self) -> Result<(), SinkError> {
        if self.root_written {
            return Ok(());
        }
        self.root_written = true;
        let (width, height) = self.options.page_dimensions();
        let margin = escape_attribute(&self.options.margin);
        let root = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <fo:root xmlns:fo=\"{FO_NAMESPACE}\" font-family=\"{}\" font-size=\"{}\">\n\
             <fo:layout-master-set>\n\
             <fo:simple-page-master master-name=\"body\" page-width=\"{}\" page-height=\"{}\" \
             margin-top=\"{margin}\" margin-bottom=\"{margin}\" margin-left=\"{margin}\" margin-right=\"{margin}\">\n\
             <fo:region-body margin-top=\"1.5cm\" margin-bottom=\"1.5cm\"/>\n\
             <fo:region-before extent=\"1cm\"/>\n\
             <fo:region-after extent=\"1cm\"/>\n\
             </fo:simple-page-master>\n\
             </fo:layout-master-set>\n",
            escape_attribute(&self.options.font_family),
            escape_attribute(&self.options.font_size),
            escape_attribute(&width),
            escape_attribute(&height),
        );
        self.write(&root)
    }

    /// Opens the page sequence, running header and footer, and the body flow.
    fn open_flow(&mut self) -> Result<(), SinkError> {
        if self.flow_open {
            return Ok(());
        }
        self.write_root()?;
        let title = escape_text(self.title.trim());
        let sequence = format!(
            "<fo:page-sequence master-reference=\"body\">\n\
             <fo:static-content flow-name=\"xsl-region-before\">\n\
             <fo:block text-align=\"end\" font-size=\"8pt\">{title}</fo:block>\n\
             </fo:static-content>\n\
             <fo:static-content flow-name=\"xsl-region-after\">\n\
             <fo:block text-align=\"center\" font-size=\"8pt\"><fo:page-number/></fo:block>\n\
             </fo:static-content>\n\
             <fo:flow flow-name=\"xsl-region-body\">\n"
        );
        self.write(&sequence)?;
        self.flow_open = true;

        if !title.is_empty() {
            self.write(&format!(
                "<fo:block font-size=\"20pt\" font-weight=\"bold\" text-align=\"center\" space-after=\"12pt\">{title}</fo:block>\n"
            ))?;
        }
        let authors = self.authors.clone();
        for author in authors {
            self.write(&format!(
                "<fo:block text-align=\"center\">{}</fo:block>\n",
                escape_text(author.trim())
            ))?;
        }
        if let Some(date) = self.date.clone() {
            self.write(&format!(
                "<fo:block text-align=\"center\" space-after=\"12pt\">{}</fo:block>\n",
                escape_text(date.trim())
            ))?;
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

    fn open_list_item(&mut self) -> Result<(), SinkError> {
        let label = match self.lists.last_mut() {
            Some(ListFrame::Numbered(numbering, counter)) => {
                *counter += 1;
                format!("{}.", numbering.format(*counter))
            }
            _ => BULLET.to_string(),
        };
        self.write(&format!(
            "<fo:list-item space-after=\"3pt\">\n\
             <fo:list-item-label end-indent=\"label-end()\"><fo:block>{}</fo:block></fo:list-item-label>\n\
             <fo:list-item-body start-indent=\"body-start()\"><fo:block>",
            escape_text(&label)
        ))
    }

    fn text(&mut self, text: &str, attributes: &Attributes) -> Result<(), SinkError> {
        if self.in_head {
            if let Some((_, buffer)) = self.head_field.as_mut() {
                buffer.push_str(text);
            }
            return Ok(());
        }
        let escaped = escape_text(text).replace('\u{a0}', "&#160;");
        let properties = inline_properties(attributes);
        if properties.is_empty() {
            self.write(&escaped)
        } else {
            self.write(&format!("<fo:inline{properties}>{escaped}</fo:inline>"))
        }
    }

    fn start(&mut self, tag: Tag, attributes: Attributes) -> Result<(), SinkError> {
        match tag {
            Tag::Head => {
                self.in_head = true;
                self.write_root()?;
            }
            Tag::Title => self.head_field = Some((HeadField::Title, String::new())),
            Tag::Author => self.head_field = Some((HeadField::Author, String::new())),
            Tag::Date => self.head_field = Some((HeadField::Date, String::new())),
            Tag::Body => self.open_flow()?,
            Tag::Section(_) => {
                self.open_flow()?;
                match attributes.get(keys::ID) {
                    Some(id) => {
                        let id = self.anchor_id(id);
                        self.write(&format!("<fo:block id=\"{}\">\n", escape_attribute(&id)))?
                    }
                    None => self.write("<fo:block>\n")?,
                }
            }
            Tag::SectionTitle(level) => self.write(&format!(
                "<fo:block font-size=\"{}\" font-weight=\"bold\" space-before=\"12pt\" space-after=\"6pt\" keep-with-next=\"always\">",
                title_size(level)
            ))?,
            Tag::Article
            | Tag::Navigation
            | Tag::Sidebar
            | Tag::Header
            | Tag::Content
            | Tag::Footer
            | Tag::Address
            | Tag::Division => {
                self.open_flow()?;
                self.write("<fo:block>")?;
            }
            Tag::Blockquote => self.write("<fo:block start-indent=\"1.5em\" end-indent=\"1.5em\" space-after=\"6pt\">")?,
            Tag::List => {
                self.lists.push(ListFrame::Bullet);
                self.write("<fo:list-block provisional-distance-between-starts=\"1.5em\" space-after=\"6pt\">\n")?;
            }
            Tag::NumberedList(numbering) => {
                self.lists.push(ListFrame::Numbered(numbering, 0));
                self.write("<fo:list-block provisional-distance-between-starts=\"2.5em\" space-after=\"6pt\">\n")?;
            }
            Tag::ListItem | Tag::NumberedListItem => self.open_list_item()?,
            Tag::DefinitionList => self.write("<fo:block space-after=\"6pt\">\n")?,
            Tag::DefinitionListItem => {}
            Tag::DefinedTerm => self.write("<fo:block font-weight=\"bold\" keep-with-next=\"always\">")?,
            Tag::Definition => self.write("<fo:block start-indent=\"1.5em\" space-after=\"3pt\">")?,
            Tag::Figure => self.write("<fo:block text-align=\"center\" space-after=\"6pt\">")?,
            Tag::FigureCaption => {
                self.write("<fo:block font-style=\"italic\" text-align=\"center\">")?
            }
            Tag::Table => {
                self.tables.push(TableFrame::default());
                self.write("<fo:block space-after=\"6pt\">\n")?;
            }
            Tag::TableRows {
                justification,
                grid,
            } => {
                let mut columns = String::new();
                for _ in &justification {
                    columns.push_str("<fo:table-column column-width=\"proportional-column-width(1)\"/>\n");
                }
                if let Some(table) = self.tables.last_mut() {
                    table.justification = justification;
                    table.grid = grid;
                }
                let border = if grid { " border-collapse=\"collapse\" border=\"0.5pt solid black\"" } else { "" };
                self.write(&format!(
                    "<fo:table table-layout=\"fixed\" width=\"100%\"{border}>\n{columns}<fo:table-body>\n"
                ))?;
            }
            Tag::TableRow => {
                if let Some(table) = self.tables.last_mut() {
                    table.cell = 0;
                }
                self.write("<fo:table-row>")?;
            }
            Tag::TableCell | Tag::TableHeaderCell => {
                let (align, grid) = match self.tables.last_mut() {
                    Some(table) => {
                        let column = table.cell;
                        table.cell += 1;
                        (
                            table.justification.get(column).copied().unwrap_or(Justification::Left),
                            table.grid,
                        )
                    }
                    None => (Justification::Left, false),
                };
                let border = if grid { " border=\"0.5pt solid black\"" } else { "" };
                let weight = if matches!(tag, Tag::TableHeaderCell) {
                    " font-weight=\"bold\""
                } else {
                    ""
                };
                self.write(&format!(
                    "<fo:table-cell padding=\"2pt\"{border}><fo:block text-align=\"{}\"{weight}>",
                    align.css_name()
                ))?;
            }
            Tag::TableCaption => {
                self.write("<fo:block font-style=\"italic\" text-align=\"center\" space-before=\"3pt\">")?
            }
            Tag::Paragraph => self.write("<fo:block space-after=\"6pt\">")?,
            Tag::Data(_) | Tag::Time(_) => self.write("<fo:inline>")?,
            Tag::Verbatim => {
                let boxed = matches!(attributes.get(keys::DECORATION), Some(decoration::BOXED));
                let border = if boxed { " border=\"0.5pt solid black\"" } else { "" };
                self.write(&format!(
                    "<fo:block font-family=\"monospace\" font-size=\"9pt\" white-space-collapse=\"false\" \
                     white-space-treatment=\"preserve\" linefeed-treatment=\"preserve\" wrap-option=\"no-wrap\" \
                     background-color=\"#eeeeee\" padding=\"4pt\" space-after=\"6pt\"{border}>"
                ))?;
            }
            Tag::Anchor(name) => {
                let id = self.anchor_id(&name);
                self.write(&format!("<fo:inline id=\"{}\">", escape_attribute(&id)))?;
            }
            Tag::Link(href) => {
                let destination = if is_internal_link(&href) {
                    format!("internal-destination=\"{}\"", escape_attribute(&href[1..]))
                } else {
                    format!("external-destination=\"url('{}')\"", escape_attribute(&href))
                };
                self.write(&format!(
                    "<fo:basic-link {destination} color=\"blue\" text-decoration=\"underline\">"
                ))?;
            }
            Tag::Inline => {
                let properties = inline_properties(&attributes);
                self.write(&format!("<fo:inline{properties}>"))?;
            }
            Tag::Italic => self.write("<fo:inline font-style=\"italic\">")?,
            Tag::Bold => self.write("<fo:inline font-weight=\"bold\">")?,
            Tag::Monospaced => self.write("<fo:inline font-family=\"monospace\">")?,
        }
        Ok(())
    }

    fn end(&mut self, kind: TagKind) -> Result<(), SinkError> {
        match kind {
            TagKind::Head => self.in_head = false,
            TagKind::Title | TagKind::Author | TagKind::Date => {
                if let Some((field, text)) = self.head_field.take() {
                    match field {
                        HeadField::Title => self.title = text,
                        HeadField::Author => self.authors.push(text),
                        HeadField::Date => self.date = Some(text),
                    }
                }
            }
            TagKind::Body => {}
            TagKind::Section(_) => self.write("</fo:block>\n")?,
            TagKind::SectionTitle(_) => self.write("</fo:block>\n")?,
            TagKind::Article
            | TagKind::Navigation
            | TagKind::Sidebar
            | TagKind::Header
            | TagKind::Content
            | TagKind::Footer
            | TagKind::Address
            | TagKind::Division
            | TagKind::Blockquote => self.write("</fo:block>\n")?,
            TagKind::List | TagKind::NumberedList => {
                self.lists.pop();
                self.write("</fo:list-block>\n")?;
            }
            TagKind::ListItem | TagKind::NumberedListItem => {
                self.write("</fo:block></fo:list-item-body>\n</fo:list-item>\n")?
            }
            TagKind::DefinitionList => self.write("</fo:block>\n")?,
            TagKind::DefinitionListItem => {}
            TagKind::DefinedTerm | TagKind::Definition => self.write("</fo:block>\n")?,
            TagKind::Figure | TagKind::FigureCaption => self.write("</fo:block>\n")?,
            TagKind::Table => {
                self.tables.pop();
                self.write("</fo:block>\n")?;
            }
            TagKind::TableRows => self.write("</fo:table-body>\n</fo:table>\n")?,
            TagKind::TableRow => self.write("</fo:table-row>\n")?,
            TagKind::TableCell | TagKind::TableHeaderCell => {
                self.write("</fo:block></fo:table-cell>")?
            }
            TagKind::TableCaption => self.write("</fo:block>\n")?,
            TagKind::Paragraph => self.write("</fo:block>\n")?,
            TagKind::Verbatim => self.write("</fo:block>\n")?,
            TagKind::Link => self.write("</fo:basic-link>")?,
            TagKind::Anchor
            | TagKind::Data
            | TagKind::Time
            | TagKind::Inline
            | TagKind::Italic
            | TagKind::Bold
            | TagKind::Monospaced => self.write("</fo:inline>")?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.open_flow()?;
        if !self.flow_has_content {
            self.write("<fo:block/>\n")?;
        }
        self.write("</fo:flow>\n</fo:page-sequence>\n</fo:root>\n")
    }
}

impl<W: Write> Sink for FoSink<W> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        match event {
            Event::Start(tag, attributes) => self.start(tag, attributes),
            Event::End(kind) => self.end(kind),
            Event::Text(text, attributes) => self.text(&text, &attributes),
            Event::RawText(text) => self.write(&text),
            Event::Comment(text) => self.write(&format!("<!--{}-->", escape_comment(&text))),
            Event::LineBreak(_) => self.write("<fo:block/>"),
            Event::LineBreakOpportunity => self.write("&#x200B;"),
            Event::NonBreakingSpace => self.write("&#160;"),
            Event::FigureGraphics { src, .. } => self.write(&format!(
                "<fo:external-graphic src=\"url('{}')\" content-width=\"scale-down-to-fit\" width=\"100%\"/>",
                escape_attribute(&src)
            )),
            Event::HorizontalRule(_) => self.write(
                "<fo:block><fo:leader leader-pattern=\"rule\" leader-length=\"100%\" rule-thickness=\"0.5pt\"/></fo:block>\n",
            ),
            Event::PageBreak => self.write("<fo:block break-before=\"page\"/>\n"),
            Event::Unknown { name, .. } => {
                log::debug!("fo: ignoring unknown event '{name}'");
                Ok(())
            }
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if let Err(err) = self.out.flush() {
            log::error!("fo: failed to flush output: {err}");
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Err(err) = self.finish() {
            log::error!("fo: failed to finish document: {err}");
        }
        if let Err(err) = self.out.flush() {
            log::error!("fo: failed to flush output: {err}");
        }
        self.diagnostics.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{replay, SinkExt};

    fn render(events: &[Event]) -> String {
        let mut sink = FoSink::new(Vec::new(), FoOptions::default());
        replay(events, &mut sink).unwrap();
        sink.close().unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    fn document(body: impl FnOnce(&mut Vec<Event>)) -> Vec<Event> {
        let mut events: Vec<Event> = Vec::new();
        events.start(Tag::Head).unwrap();
        events.wrap_text(Tag::Title, "Manual").unwrap();
        events.end(TagKind::Head).unwrap();
        events.start(Tag::Body).unwrap();
        body(&mut events);
        events.end(TagKind::Body).unwrap();
        events
    }

    #[test]
    fn writes_page_setup_and_running_header() {
        let fo = render(&document(|_| {}));
        assert!(fo.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<fo:root"));
        assert!(fo.contains("page-width=\"21cm\" page-height=\"29.7cm\""));
        assert!(fo.contains("<fo:block text-align=\"end\" font-size=\"8pt\">Manual</fo:block>"));
        assert!(fo.contains("<fo:page-number/>"));
        assert!(fo.trim_end().ends_with("</fo:flow>\n</fo:page-sequence>\n</fo:root>"));
    }

    #[test]
    fn numbered_list_counters_are_per_level() {
        let fo = render(&document(|events| {
            events.start(Tag::NumberedList(Numbering::Decimal)).unwrap();
            events.wrap_text(Tag::NumberedListItem, "one").unwrap();
            events.start(Tag::NumberedListItem).unwrap();
            events.start(Tag::NumberedList(Numbering::LowerAlpha)).unwrap();
            events.wrap_text(Tag::NumberedListItem, "nested").unwrap();
            events.end(TagKind::NumberedList).unwrap();
            events.end(TagKind::NumberedListItem).unwrap();
            events.end(TagKind::NumberedList).unwrap();
        }));
        assert!(fo.contains("<fo:block>1.</fo:block>"));
        assert!(fo.contains("<fo:block>2.</fo:block>"));
        assert!(fo.contains("<fo:block>a.</fo:block>"));
    }

    #[test]
    fn tables_have_columns_and_caption_after() {
        let fo = render(&document(|events| {
            events.start(Tag::Table).unwrap();
            events
                .start(Tag::TableRows {
                    justification: vec![Justification::Left, Justification::Right],
                    grid: true,
                })
                .unwrap();
            events.start(Tag::TableRow).unwrap();
            events.wrap_text(Tag::TableHeaderCell, "H").unwrap();
            events.wrap_text(Tag::TableCell, "c").unwrap();
            events.end(TagKind::TableRow).unwrap();
            events.end(TagKind::TableRows).unwrap();
            events.wrap_text(Tag::TableCaption, "Cap").unwrap();
            events.end(TagKind::Table).unwrap();
        }));
        assert_eq!(fo.matches("<fo:table-column ").count(), 2);
        assert!(fo.contains("<fo:block text-align=\"left\" font-weight=\"bold\">H</fo:block>"));
        assert!(fo.contains("<fo:block text-align=\"right\">c</fo:block>"));
        let table_end = fo.find("</fo:table>").unwrap();
        let caption = fo.find(">Cap<").unwrap();
        assert!(caption > table_end);
    }

    #[test]
    fn links_use_internal_or_external_destinations() {
        let fo = render(&document(|events| {
            events.start(Tag::Paragraph).unwrap();
            events.wrap_text(Tag::Link("#intro".into()), "in").unwrap();
            events.wrap_text(Tag::Link("http://a.org".into()), "out").unwrap();
            events.end(TagKind::Paragraph).unwrap();
        }));
        assert!(fo.contains("<fo:basic-link internal-destination=\"intro\""));
        assert!(fo.contains("<fo:basic-link external-destination=\"url('http://a.org')\""));
    }

    #[test]
    fn empty_document_is_still_valid() {
        let fo = render(&[]);
        assert!(fo.contains("<fo:flow flow-name=\"xsl-region-body\">\n<fo:block/>\n</fo:flow>"));
    }

    #[test]
    fn inline_semantics_become_properties() {
        let attributes = Attributes::new().with(keys::SEMANTICS, "strong superscript");
        assert_eq!(
            inline_properties(&attributes),
            " font-weight=\"bold\" baseline-shift=\"super\" font-size=\"smaller\""
        );
        assert_eq!(inline_properties(&Attributes::new()), "");
    }
}
