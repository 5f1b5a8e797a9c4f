//! XML-like event tag serialization
//!
//! Renders an event stream as an indented tag tree, for inspecting what a parser
//! produced.
//!
//! ## Format
//!
//! - Begin/end pairs → nested tags named after the event (`sectionTitle1` → `section-title1`)
//! - Tag payloads (link targets, numbering, table layout) and attributes → tag attributes
//! - Text → escaped content, kept on the line of the tag it belongs to
//! - Leaf events → self-closing tags
//!
//! ## Example
//!
//! ```text
//! <document>
//!   <body>
//!     <section1>
//!       <section-title1>Introduction</section-title1>
//!       <paragraph>Welcome to the
//!         <bold>guide</bold>
//!       </paragraph>
//!     </section1>
//!   </body>
//! </document>
//! ```

use crate::common::escape::{escape_attribute, escape_text};
use crate::error::FormatError;
use crate::format::Format;
use crate::sink::{Attributes, Event, Justification, Tag};
use std::collections::HashMap;

/// Convert an event name to a tag name (e.g., "tableHeaderCell" → "table-header-cell")
fn to_tag_name(name: &str) -> String {
    let mut tag = String::new();
    for c in name.chars() {
        if c.is_uppercase() {
            tag.push('-');
            tag.extend(c.to_lowercase());
        } else {
            tag.push(c);
        }
    }
    tag
}

fn tag_payload(tag: &Tag) -> Vec<(&'static str, String)> {
    match tag {
        Tag::NumberedList(numbering) => vec![("numbering", numbering.css_name().to_string())],
        Tag::TableRows {
            justification,
            grid,
        } => vec![
            (
                "justification",
                justification
                    .iter()
                    .map(|j: &Justification| j.css_name())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            ("grid", grid.to_string()),
        ],
        Tag::Data(value) => vec![("value", value.clone())],
        Tag::Time(datetime) => vec![("datetime", datetime.clone())],
        Tag::Anchor(name) => vec![("name", name.clone())],
        Tag::Link(href) => vec![("href", href.clone())],
        _ => Vec::new(),
    }
}

fn render_attributes(payload: &[(&str, String)], attributes: &Attributes) -> String {
    let mut out = String::new();
    for (key, value) in payload {
        out.push_str(&format!(" {key}=\"{}\"", escape_attribute(value)));
    }
    for (key, value) in attributes.string_entries() {
        out.push_str(&format!(" {key}=\"{}\"", escape_attribute(value)));
    }
    out
}

struct TagWriter {
    output: String,
    depth: usize,
    line_open: bool,
}

impl TagWriter {
    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }

    fn break_line(&mut self) {
        if self.line_open {
            self.output.push('\n');
            self.line_open = false;
        }
    }

    fn open(&mut self, name: &str, attrs: &str) {
        self.break_line();
        let indent = self.indent();
        self.output.push_str(&format!("{indent}<{name}{attrs}>"));
        self.line_open = true;
        self.depth += 1;
    }

    fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        if !self.line_open {
            let indent = self.indent();
            self.output.push_str(&indent);
        }
        self.output.push_str(&format!("</{name}>\n"));
        self.line_open = false;
    }

    fn leaf(&mut self, name: &str, attrs: &str, content: Option<&str>) {
        self.break_line();
        let indent = self.indent();
        match content {
            Some(content) => self.output.push_str(&format!(
                "{indent}<{name}{attrs}>{}</{name}>\n",
                escape_text(content)
            )),
            None => self.output.push_str(&format!("{indent}<{name}{attrs}/>\n")),
        }
    }

    fn text(&mut self, text: &str) {
        if !self.line_open {
            let indent = self.indent();
            self.output.push_str(&indent);
        }
        self.output.push_str(&escape_text(text));
        self.line_open = true;
    }
}

/// Serialize an event stream to the tag tree format
pub fn serialize_events(events: &[Event]) -> String {
    serialize_events_with_params(events, &HashMap::new())
}

/// Serialize an event stream to the tag tree format with optional parameters
///
/// # Parameters
///
/// - `"show-attributes"`: `"false"` hides attributes that are not part of a tag's payload.
pub fn serialize_events_with_params(events: &[Event], params: &HashMap<String, String>) -> String {
    let show_attributes = params
        .get("show-attributes")
        .map(|v| v != "false")
        .unwrap_or(true);
    let none = Attributes::new();
    let visible = |attributes: &Attributes| -> String {
        if show_attributes {
            render_attributes(&[], attributes)
        } else {
            String::new()
        }
    };

    let mut writer = TagWriter {
        output: String::new(),
        depth: 0,
        line_open: false,
    };
    writer.open("document", "");

    for event in events {
        match event {
            Event::Start(tag, attributes) => {
                let shown = if show_attributes { attributes } else { &none };
                let attrs = render_attributes(&tag_payload(tag), shown);
                writer.open(&to_tag_name(tag.kind().start_name()), &attrs);
            }
            Event::End(kind) => writer.close(&to_tag_name(kind.start_name())),
            Event::Text(text, attributes) => {
                let attrs = visible(attributes);
                if attrs.is_empty() {
                    writer.text(text);
                } else {
                    writer.leaf("text", &attrs, Some(text));
                }
            }
            Event::RawText(text) => writer.leaf("raw-text", "", Some(text)),
            Event::Comment(text) => writer.leaf("comment", "", Some(text)),
            Event::FigureGraphics { src, attributes } => {
                let shown = if show_attributes { attributes } else { &none };
                let attrs = render_attributes(&[("src", src.clone())], shown);
                writer.leaf("figure-graphics", &attrs, None);
            }
            Event::LineBreak(attributes) | Event::HorizontalRule(attributes) => {
                writer.leaf(&to_tag_name(event.name()), &visible(attributes), None)
            }
            Event::LineBreakOpportunity | Event::NonBreakingSpace | Event::PageBreak => {
                writer.leaf(&to_tag_name(event.name()), "", None)
            }
            Event::Unknown {
                name,
                params,
                attributes,
            } => {
                let shown = if show_attributes { attributes } else { &none };
                let payload = [("name", name.clone()), ("params", params.join(","))];
                writer.leaf("unknown", &render_attributes(&payload, shown), None);
            }
        }
    }

    writer.close("document");
    writer.output.trim_end().to_string()
}

/// Format implementation for XML-like tag format
pub struct TagFormat;

impl Format for TagFormat {
    fn name(&self) -> &str {
        "tag"
    }

    fn description(&self) -> &str {
        "XML-like tag tree of the event stream"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tag"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, events: &[Event]) -> Result<String, FormatError> {
        Ok(serialize_events(events))
    }

    fn serialize_with_options(
        &self,
        events: &[Event],
        options: &HashMap<String, String>,
    ) -> Result<crate::format::SerializedDocument, FormatError> {
        Ok(crate::format::SerializedDocument::Text(
            serialize_events_with_params(events, options),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::attributes::keys;
    use crate::sink::{Sink, SinkExt, TagKind};

    #[test]
    fn test_to_tag_name() {
        assert_eq!(to_tag_name("sectionTitle1"), "section-title1");
        assert_eq!(to_tag_name("tableHeaderCell"), "table-header-cell");
        assert_eq!(to_tag_name("paragraph"), "paragraph");
    }

    #[test]
    fn test_serialize_section_with_paragraph() {
        let mut events: Vec<Event> = Vec::new();
        events.start(Tag::Section(1)).unwrap();
        events.wrap_text(Tag::SectionTitle(1), "Introduction").unwrap();
        events.start(Tag::Paragraph).unwrap();
        events.text("Welcome to the").unwrap();
        events.wrap_text(Tag::Bold, "guide").unwrap();
        events.end(TagKind::Paragraph).unwrap();
        events.end(TagKind::Section(1)).unwrap();

        insta::assert_snapshot!(serialize_events(&events), @r###"
        <document>
          <section1>
            <section-title1>Introduction</section-title1>
            <paragraph>Welcome to the
              <bold>guide</bold>
            </paragraph>
          </section1>
        </document>
        "###);
    }

    #[test]
    fn test_payloads_and_attributes() {
        let mut events: Vec<Event> = Vec::new();
        events
            .start_with(Tag::Link("#a&b".into()), Attributes::new().with(keys::CLASS, "x"))
            .unwrap();
        events.end(TagKind::Link).unwrap();
        events.emit(Event::PageBreak).unwrap();

        let result = serialize_events(&events);
        assert!(result.contains("<link href=\"#a&amp;b\" class=\"x\"></link>"));
        assert!(result.contains("<page-break/>"));

        let mut params = HashMap::new();
        params.insert("show-attributes".to_string(), "false".to_string());
        let result = serialize_events_with_params(&events, &params);
        assert!(result.contains("<link href=\"#a&amp;b\"></link>"));
    }

    #[test]
    fn test_escaping() {
        let events = vec![
            Event::start(Tag::Paragraph),
            Event::text("Text with <special> & \"chars\""),
            Event::end(TagKind::Paragraph),
        ];
        let result = serialize_events(&events);
        assert!(result.contains("&lt;special&gt;"));
        assert!(result.contains("&amp;"));
    }
}
