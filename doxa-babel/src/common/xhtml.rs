//! Event mapping for the XHTML vocabulary shared by the XML dialects.
//!
//! Dialect parsers implement [`XhtmlHandler`] to claim their own elements and let
//! [`walk_children`] turn everything else (paragraphs, lists, tables, inline markup)
//! into events.

use crate::common::ids::{encode_id, is_valid_id};
use crate::common::links::normalize_link;
use crate::diagnostics::Diagnostics;
use crate::error::ParseError;
use crate::location::Location;
use crate::sink::attributes::{decoration, keys, semantics};
use crate::sink::{Attributes, Event, Justification, Numbering, Sink, SinkExt, Tag, TagKind};
use roxmltree::{Node, NodeType};

/// Diagnostic key for anchor ids rewritten into valid identifiers.
pub const INVALID_ID: &str = "invalid-id";

/// Elements whitespace next to which is layout only. Includes the XDoc and FML
/// structure elements.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "answer", "article", "aside", "blockquote", "body", "caption", "dd", "div",
    "dl", "dt", "faq", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "macro", "main", "nav", "ol", "p", "part", "pre", "question",
    "section", "source", "subsection", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "ul",
];

pub fn is_block_element(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

/// Whitespace handling for text nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub preformatted: bool,
}

/// Hooks a dialect parser provides to the shared walker.
pub trait XhtmlHandler {
    fn diagnostics(&mut self) -> &mut Diagnostics;

    fn file(&self) -> Option<&str>;

    /// Handles a dialect specific element. Returns `false` to fall back to the XHTML
    /// mapping.
    fn custom_element(
        &mut self,
        _node: Node<'_, '_>,
        _sink: &mut dyn Sink,
        _context: Context,
    ) -> Result<bool, ParseError> {
        Ok(false)
    }
}

/// Source position of `node`.
pub fn location(file: Option<&str>, node: Node<'_, '_>) -> Location {
    let pos = node.document().text_pos_at(node.range().start);
    Location::new(file, Some(pos.row as usize), Some(pos.col as usize))
}

/// All attributes of `node` as an attribute bag, in document order.
pub fn attributes_of(node: Node<'_, '_>) -> Attributes {
    let mut attributes = Attributes::new();
    for attribute in node.attributes() {
        attributes.set(attribute.name(), attribute.value());
    }
    attributes
}

/// Concatenated text of `node` with whitespace collapsed.
pub fn text_content(node: Node<'_, '_>) -> String {
    let raw: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    collapse_whitespace(&raw).trim().to_string()
}

pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Child elements of `node` named `name`.
pub fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn adjacent_is_block(node: Node<'_, '_>) -> bool {
    let block = |n: Option<Node<'_, '_>>| match n {
        None => true,
        Some(n) => n.is_element() && is_block_element(n.tag_name().name()),
    };
    block(node.prev_sibling()) || block(node.next_sibling())
}

pub fn walk_children<H: XhtmlHandler + ?Sized>(
    handler: &mut H,
    node: Node<'_, '_>,
    sink: &mut dyn Sink,
    context: Context,
) -> Result<(), ParseError> {
    for child in node.children() {
        walk_node(handler, child, sink, context)?;
    }
    Ok(())
}

pub fn walk_node<H: XhtmlHandler + ?Sized>(
    handler: &mut H,
    node: Node<'_, '_>,
    sink: &mut dyn Sink,
    context: Context,
) -> Result<(), ParseError> {
    match node.node_type() {
        NodeType::Text => {
            let text = node.text().unwrap_or_default();
            if context.preformatted {
                sink.text(text)?;
                return Ok(());
            }
            if text.trim().is_empty() && adjacent_is_block(node) {
                return Ok(());
            }
            let mut collapsed = collapse_whitespace(text);
            if node.prev_sibling().is_none() {
                collapsed = collapsed.trim_start().to_string();
            }
            if node.next_sibling().is_none() {
                collapsed = collapsed.trim_end().to_string();
            }
            if !collapsed.is_empty() {
                sink.text(&collapsed)?;
            }
            Ok(())
        }
        NodeType::Comment => {
            sink.emit(Event::Comment(node.text().unwrap_or_default().to_string()))?;
            Ok(())
        }
        NodeType::Element => {
            sink.locate(&location(handler.file(), node));
            if handler.custom_element(node, sink, context)? {
                return Ok(());
            }
            walk_element(handler, node, sink, context)
        }
        _ => Ok(()),
    }
}

fn numbering_of(node: Node<'_, '_>) -> Numbering {
    let style = node.attribute("style").unwrap_or_default();
    match node.attribute("type") {
        Some("a") => Numbering::LowerAlpha,
        Some("A") => Numbering::UpperAlpha,
        Some("i") => Numbering::LowerRoman,
        Some("I") => Numbering::UpperRoman,
        _ if style.contains("lower-alpha") => Numbering::LowerAlpha,
        _ if style.contains("upper-alpha") => Numbering::UpperAlpha,
        _ if style.contains("lower-roman") => Numbering::LowerRoman,
        _ if style.contains("upper-roman") => Numbering::UpperRoman,
        _ => Numbering::Decimal,
    }
}

/// Attributes for an inline element that maps to a semantic role.
fn inline_semantics(name: &str) -> Option<Attributes> {
    let role = match name {
        "strong" => semantics::STRONG,
        "em" => semantics::EMPHASIS,
        "code" => semantics::CODE,
        "cite" => semantics::CITATION,
        "q" => semantics::QUOTE,
        "sub" => semantics::SUBSCRIPT,
        "sup" => semantics::SUPERSCRIPT,
        "small" => semantics::SMALL,
        "s" | "strike" => semantics::LINE_THROUGH,
        "del" => semantics::DELETE,
        "ins" => semantics::INSERT,
        "abbr" => semantics::ABBREVIATION,
        "dfn" => semantics::DEFINITION,
        "kbd" => semantics::KEYBOARD,
        "samp" => semantics::SAMPLE,
        "var" => semantics::VARIABLE,
        "mark" => semantics::HIGHLIGHT,
        "u" => return Some(Attributes::new().with(keys::DECORATION, decoration::UNDERLINE)),
        _ => return None,
    };
    Some(Attributes::new().with(keys::SEMANTICS, role))
}

fn wrap<H: XhtmlHandler + ?Sized>(
    handler: &mut H,
    node: Node<'_, '_>,
    sink: &mut dyn Sink,
    context: Context,
    tag: Tag,
    attributes: Attributes,
) -> Result<(), ParseError> {
    let kind = tag.kind();
    sink.start_with(tag, attributes)?;
    walk_children(handler, node, sink, context)?;
    sink.end(kind)?;
    Ok(())
}

fn checked_id<H: XhtmlHandler + ?Sized>(handler: &mut H, id: &str) -> String {
    if is_valid_id(id) {
        return id.to_string();
    }
    match encode_id(id) {
        Some(encoded) => {
            handler.diagnostics().warn(
                INVALID_ID,
                format!("Modified invalid anchor name '{id}' to '{encoded}'"),
            );
            encoded
        }
        None => id.to_string(),
    }
}

pub fn walk_element<H: XhtmlHandler + ?Sized>(
    handler: &mut H,
    node: Node<'_, '_>,
    sink: &mut dyn Sink,
    context: Context,
) -> Result<(), ParseError> {
    let name = node.tag_name().name();
    let attributes = attributes_of(node);

    match name {
        "p" => wrap(handler, node, sink, context, Tag::Paragraph, attributes),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<u8>().unwrap_or(1);
            wrap(handler, node, sink, context, Tag::SectionTitle(level), attributes)
        }
        "ul" => wrap(handler, node, sink, context, Tag::List, attributes),
        "ol" => {
            let numbering = numbering_of(node);
            wrap(handler, node, sink, context, Tag::NumberedList(numbering), attributes)
        }
        "li" => {
            let numbered = node
                .parent_element()
                .map(|p| p.tag_name().name() == "ol")
                .unwrap_or(false);
            let tag = if numbered { Tag::NumberedListItem } else { Tag::ListItem };
            wrap(handler, node, sink, context, tag, attributes)
        }
        "dl" => definition_list(handler, node, sink, context, attributes),
        "dt" => wrap(handler, node, sink, context, Tag::DefinedTerm, attributes),
        "dd" => wrap(handler, node, sink, context, Tag::Definition, attributes),
        "pre" => {
            let mut attributes = attributes;
            let is_source = attributes
                .get(keys::CLASS)
                .map(|c| c.split_whitespace().any(|c| c == "source"))
                .unwrap_or(false);
            if is_source {
                attributes.set(keys::DECORATION, decoration::SOURCE);
            }
            let context = Context { preformatted: true };
            wrap(handler, node, sink, context, Tag::Verbatim, attributes)
        }
        "table" => table(handler, node, sink, context, attributes),
        "a" => {
            if let Some(href) = node.attribute("href") {
                let href = if href.starts_with('#') {
                    normalize_link(href, handler.diagnostics())
                } else {
                    href.to_string()
                };
                let mut attributes = attributes;
                attributes.remove("href");
                wrap(handler, node, sink, context, Tag::Link(href), attributes)
            } else if let Some(id) = node.attribute("id").or_else(|| node.attribute("name")) {
                let id = checked_id(handler, id);
                wrap(handler, node, sink, context, Tag::Anchor(id), Attributes::new())
            } else {
                walk_children(handler, node, sink, context)
            }
        }
        "img" => {
            let mut attributes = attributes;
            let src = attributes
                .remove("src")
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            sink.emit(Event::FigureGraphics { src, attributes })?;
            Ok(())
        }
        "figure" => wrap(handler, node, sink, context, Tag::Figure, attributes),
        "figcaption" => wrap(handler, node, sink, context, Tag::FigureCaption, attributes),
        "b" => wrap(handler, node, sink, context, Tag::Bold, attributes),
        "i" => wrap(handler, node, sink, context, Tag::Italic, attributes),
        "tt" => wrap(handler, node, sink, context, Tag::Monospaced, attributes),
        "span" => wrap(handler, node, sink, context, Tag::Inline, attributes),
        "br" => Ok(sink.emit(Event::LineBreak(attributes))?),
        "wbr" => Ok(sink.emit(Event::LineBreakOpportunity)?),
        "hr" => Ok(sink.emit(Event::HorizontalRule(attributes))?),
        "blockquote" => wrap(handler, node, sink, context, Tag::Blockquote, attributes),
        "div" | "section" => wrap(handler, node, sink, context, Tag::Division, attributes),
        "address" => wrap(handler, node, sink, context, Tag::Address, attributes),
        "article" => wrap(handler, node, sink, context, Tag::Article, attributes),
        "nav" => wrap(handler, node, sink, context, Tag::Navigation, attributes),
        "aside" => wrap(handler, node, sink, context, Tag::Sidebar, attributes),
        "header" => wrap(handler, node, sink, context, Tag::Header, attributes),
        "main" => wrap(handler, node, sink, context, Tag::Content, attributes),
        "footer" => wrap(handler, node, sink, context, Tag::Footer, attributes),
        "data" => {
            let value = node.attribute("value").unwrap_or_default().to_string();
            wrap(handler, node, sink, context, Tag::Data(value), attributes)
        }
        "time" => {
            let datetime = node.attribute("datetime").unwrap_or_default().to_string();
            wrap(handler, node, sink, context, Tag::Time(datetime), attributes)
        }
        _ => match inline_semantics(name) {
            Some(mut inline) => {
                inline.merge(&attributes);
                wrap(handler, node, sink, context, Tag::Inline, inline)
            }
            None => unknown(handler, node, sink, context, attributes),
        },
    }
}

/// Elements without an event of their own pass through as `Unknown` start/end pairs.
fn unknown<H: XhtmlHandler + ?Sized>(
    handler: &mut H,
    node: Node<'_, '_>,
    sink: &mut dyn Sink,
    context: Context,
    attributes: Attributes,
) -> Result<(), ParseError> {
    let name = node.tag_name().name().to_string();
    if !node.has_children() {
        sink.emit(Event::Unknown {
            name,
            params: vec!["simple".to_string()],
            attributes,
        })?;
        return Ok(());
    }
    sink.emit(Event::Unknown {
        name: name.clone(),
        params: vec!["start".to_string()],
        attributes,
    })?;
    walk_children(handler, node, sink, context)?;
    sink.emit(Event::Unknown {
        name,
        params: vec!["end".to_string()],
        attributes: Attributes::new(),
    })?;
    Ok(())
}

/// `dt`/`dd` runs are grouped into definition list items: an item starts at a term
/// and takes every following description.
fn definition_list<H: XhtmlHandler + ?Sized>(
    handler: &mut H,
    node: Node<'_, '_>,
    sink: &mut dyn Sink,
    context: Context,
    attributes: Attributes,
) -> Result<(), ParseError> {
    sink.start_with(Tag::DefinitionList, attributes)?;
    let mut item_open = false;
    let mut seen_definition = false;
    for child in node.children() {
        if !child.is_element() {
            walk_node(handler, child, sink, context)?;
            continue;
        }
        match child.tag_name().name() {
            "dt" => {
                if item_open && seen_definition {
                    sink.end(TagKind::DefinitionListItem)?;
                    item_open = false;
                }
                if !item_open {
                    sink.start(Tag::DefinitionListItem)?;
                    item_open = true;
                    seen_definition = false;
                }
            }
            "dd" => {
                if !item_open {
                    sink.start(Tag::DefinitionListItem)?;
                    item_open = true;
                }
                seen_definition = true;
            }
            _ => {}
        }
        walk_node(handler, child, sink, context)?;
    }
    if item_open {
        sink.end(TagKind::DefinitionListItem)?;
    }
    sink.end(TagKind::DefinitionList)?;
    Ok(())
}

fn table_rows<'a, 'input>(table: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    let mut rows = Vec::new();
    for child in table.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(children_named(child, "tr")),
            _ => {}
        }
    }
    rows
}

fn justification_of(cell: Node<'_, '_>) -> Justification {
    let style = cell.attribute("style").unwrap_or_default();
    match cell.attribute("align") {
        Some("center") => Justification::Center,
        Some("right") => Justification::Right,
        Some(_) => Justification::Left,
        None if style.contains("text-align: center") => Justification::Center,
        None if style.contains("text-align: right") => Justification::Right,
        None => Justification::Left,
    }
}

/// Tables are emitted rows first, caption last, whatever the source order.
fn table<H: XhtmlHandler + ?Sized>(
    handler: &mut H,
    node: Node<'_, '_>,
    sink: &mut dyn Sink,
    context: Context,
    attributes: Attributes,
) -> Result<(), ParseError> {
    let rows = table_rows(node);
    let justification = rows
        .first()
        .map(|row| {
            row.children()
                .filter(|c| c.is_element() && matches!(c.tag_name().name(), "td" | "th"))
                .map(justification_of)
                .collect()
        })
        .unwrap_or_default();
    let grid = attributes
        .get(keys::BORDER)
        .map(|b| b.trim() != "0")
        .unwrap_or(false)
        || attributes
            .get(keys::CLASS)
            .map(|c| c.split_whitespace().any(|c| c == "grid"))
            .unwrap_or(false);

    sink.start_with(Tag::Table, attributes)?;
    sink.start(Tag::TableRows {
        justification,
        grid,
    })?;
    for row in rows {
        sink.locate(&location(handler.file(), row));
        sink.start_with(Tag::TableRow, attributes_of(row))?;
        for cell in row.children().filter(Node::is_element) {
            let tag = match cell.tag_name().name() {
                "th" => Tag::TableHeaderCell,
                "td" => Tag::TableCell,
                _ => continue,
            };
            let mut cell_attributes = attributes_of(cell);
            cell_attributes.remove(keys::ALIGN);
            wrap(handler, cell, sink, context, tag, cell_attributes)?;
        }
        sink.end(TagKind::TableRow)?;
    }
    sink.end(TagKind::TableRows)?;
    if let Some(caption) = children_named(node, "caption").next() {
        wrap(
            handler,
            caption,
            sink,
            context,
            Tag::TableCaption,
            attributes_of(caption),
        )?;
    }
    sink.end(TagKind::Table)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct Plain {
        pub diagnostics: Diagnostics,
    }

    impl XhtmlHandler for Plain {
        fn diagnostics(&mut self) -> &mut Diagnostics {
            &mut self.diagnostics
        }

        fn file(&self) -> Option<&str> {
            None
        }
    }

    fn walk(xml: &str) -> Vec<Event> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut handler = Plain {
            diagnostics: Diagnostics::new(false),
        };
        let mut events: Vec<Event> = Vec::new();
        walk_children(&mut handler, doc.root_element(), &mut events, Context::default())
            .unwrap();
        events
    }

    fn names(events: &[Event]) -> Vec<&'static str> {
        events.iter().map(Event::name).collect()
    }

    #[test]
    fn paragraph_whitespace_is_collapsed() {
        let events = walk("<body>\n  <p>  Hello\n   <b>bold</b> world </p>\n</body>");
        assert_eq!(
            events,
            vec![
                Event::start(Tag::Paragraph),
                Event::text("Hello "),
                Event::start(Tag::Bold),
                Event::text("bold"),
                Event::end(TagKind::Bold),
                Event::text(" world"),
                Event::end(TagKind::Paragraph),
            ]
        );
    }

    #[test]
    fn preformatted_text_is_kept() {
        let events = walk("<body><pre class=\"source\">a\n  b</pre></body>");
        assert_eq!(
            events[0],
            Event::Start(
                Tag::Verbatim,
                Attributes::new()
                    .with(keys::CLASS, "source")
                    .with(keys::DECORATION, decoration::SOURCE)
            )
        );
        assert_eq!(events[1], Event::text("a\n  b"));
    }

    #[test]
    fn definition_items_group_terms_and_descriptions() {
        let events = walk("<body><dl><dt>a</dt><dd>1</dd><dt>b</dt><dd>2</dd><dd>3</dd></dl></body>");
        assert_eq!(
            names(&events).iter().filter(|n| **n == "definitionListItem").count(),
            2
        );
        assert_eq!(names(&events).iter().filter(|n| **n == "definition").count(), 3);
        crate::sink::check_balanced(&events).unwrap();
    }

    #[test]
    fn table_caption_follows_rows() {
        let events = walk(
            "<body><table border=\"1\"><caption>Cap</caption>\
             <tr><th align=\"right\">H</th></tr><tr><td>c</td></tr></table></body>",
        );
        assert_eq!(
            events[1],
            Event::start(Tag::TableRows {
                justification: vec![Justification::Right],
                grid: true,
            })
        );
        let caption = names(&events).iter().position(|n| *n == "tableCaption").unwrap();
        let rows_end = names(&events).iter().position(|n| *n == "tableRows_").unwrap();
        assert!(caption > rows_end);
    }

    #[test]
    fn semantic_inline_and_unknown_elements() {
        let events = walk("<body><p><em>x</em><blink>y</blink><video/></p></body>");
        assert_eq!(
            events[1],
            Event::Start(
                Tag::Inline,
                Attributes::new().with(keys::SEMANTICS, semantics::EMPHASIS)
            )
        );
        assert!(events.contains(&Event::Unknown {
            name: "blink".into(),
            params: vec!["start".into()],
            attributes: Attributes::new(),
        }));
        assert!(events.contains(&Event::Unknown {
            name: "video".into(),
            params: vec!["simple".into()],
            attributes: Attributes::new(),
        }));
    }

    #[test]
    fn invalid_anchor_ids_are_encoded() {
        let doc = roxmltree::Document::parse("<body><a name=\"my anchor\">x</a></body>").unwrap();
        let mut handler = Plain {
            diagnostics: Diagnostics::new(false),
        };
        let mut events: Vec<Event> = Vec::new();
        walk_children(&mut handler, doc.root_element(), &mut events, Context::default())
            .unwrap();
        assert_eq!(events[0], Event::start(Tag::Anchor("my_anchor".into())));
        assert_eq!(handler.diagnostics.messages(INVALID_ID).len(), 1);
    }
}
