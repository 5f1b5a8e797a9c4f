use crate::common::xhtml::{self, children_named, text_content, Context, XhtmlHandler};
use crate::diagnostics::Diagnostics;
use crate::error::ParseError;
use crate::macros::MacroRequest;
use crate::parser::{Parser, ParserOptions};
use crate::sink::attributes::{decoration, keys};
use crate::sink::{Attributes, Sink, SinkExt, Tag, TagKind};
use indexmap::IndexMap;
use roxmltree::{Document, Node};

const MAX_SECTION_LEVEL: u8 = 6;

/// Parser for XDoc documents: `<document>` with `<properties>` and a `<body>` of
/// nested `<section>`/`<subsection>` elements holding XHTML.
pub struct XdocParser {
    options: ParserOptions,
    diagnostics: Diagnostics,
}

impl XdocParser {
    pub fn new(options: ParserOptions) -> Self {
        let diagnostics = Diagnostics::new(options.verbose);
        Self {
            options,
            diagnostics,
        }
    }
}

impl Default for XdocParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

/// Per-document walk state; borrows the parser for options and diagnostics.
struct XdocWalk<'p, 's> {
    options: &'p ParserOptions,
    diagnostics: &'p mut Diagnostics,
    source: &'s str,
    level: u8,
}

impl XdocWalk<'_, '_> {
    fn head(&mut self, properties: Node<'_, '_>, sink: &mut dyn Sink) -> Result<(), ParseError> {
        sink.start(Tag::Head)?;
        if let Some(title) = children_named(properties, "title").next() {
            sink.wrap_text(Tag::Title, &text_content(title))?;
        }
        for author in children_named(properties, "author") {
            sink.wrap_text(Tag::Author, &text_content(author))?;
        }
        if let Some(date) = children_named(properties, "date").next() {
            sink.wrap_text(Tag::Date, &text_content(date))?;
        }
        sink.end(TagKind::Head)?;
        Ok(())
    }

    fn section(&mut self, node: Node<'_, '_>, sink: &mut dyn Sink) -> Result<(), ParseError> {
        let level = (self.level + 1).min(MAX_SECTION_LEVEL);
        let mut attributes = Attributes::new();
        if let Some(id) = node.attribute("id") {
            attributes.set(keys::ID, id);
        }

        sink.start_with(Tag::Section(level), attributes)?;
        if let Some(name) = node.attribute("name") {
            sink.wrap_text(Tag::SectionTitle(level), name)?;
        }
        let outer = self.level;
        self.level = level;
        let walked = xhtml::walk_children(self, node, sink, Context::default());
        self.level = outer;
        walked?;
        sink.end(TagKind::Section(level))?;
        Ok(())
    }

    fn execute_macro(&mut self, node: Node<'_, '_>, sink: &mut dyn Sink) -> Result<(), ParseError> {
        let location = xhtml::location(self.options.file_name.as_deref(), node);
        let name = node
            .attribute("name")
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ParseError::syntax("Macro without a name", location.clone()))?;
        let mut parameters = IndexMap::new();
        for param in children_named(node, "param") {
            if let (Some(key), Some(value)) = (param.attribute("name"), param.attribute("value")) {
                parameters.insert(key.to_string(), value.to_string());
            }
        }

        let nested = self.options.without_macros();
        let factory = move || -> Box<dyn Parser> {
            Box::new(XdocParser::new(nested.clone()))
        };
        let request = MacroRequest::new(
            name,
            parameters,
            self.source,
            self.options.base_dir.as_deref(),
            &factory,
        );
        self.options
            .macros
            .execute(&request, sink)
            .map_err(|source| ParseError::Macro { source, location })
    }
}

impl XhtmlHandler for XdocWalk<'_, '_> {
    fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut *self.diagnostics
    }

    fn file(&self) -> Option<&str> {
        self.options.file_name.as_deref()
    }

    fn custom_element(
        &mut self,
        node: Node<'_, '_>,
        sink: &mut dyn Sink,
        _context: Context,
    ) -> Result<bool, ParseError> {
        match node.tag_name().name() {
            "section" | "subsection" => self.section(node, sink)?,
            "source" => {
                let attributes = Attributes::new().with(keys::DECORATION, decoration::SOURCE);
                sink.start_with(Tag::Verbatim, attributes)?;
                let text: String = node
                    .descendants()
                    .filter(|n| n.is_text())
                    .filter_map(|n| n.text())
                    .collect();
                if !text.is_empty() {
                    sink.text(&text)?;
                }
                sink.end(TagKind::Verbatim)?;
            }
            "macro" => {
                if self.options.macros_enabled {
                    self.execute_macro(node, sink)?;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl Parser for XdocParser {
    fn parse(&mut self, source: &str, sink: &mut dyn Sink) -> Result<(), ParseError> {
        self.diagnostics.reset();
        self.diagnostics.set_verbose(self.options.verbose);

        let document = Document::parse(source)?;
        let root = document.root_element();
        if root.tag_name().name() != "document" {
            return Err(ParseError::syntax(
                format!(
                    "Expected <document> root element but found <{}>",
                    root.tag_name().name()
                ),
                xhtml::location(self.options.file_name.as_deref(), root),
            ));
        }

        let mut walk = XdocWalk {
            options: &self.options,
            diagnostics: &mut self.diagnostics,
            source,
            level: 0,
        };
        if let Some(properties) = children_named(root, "properties").next() {
            walk.head(properties, sink)?;
        }
        sink.start(Tag::Body)?;
        if let Some(body) = children_named(root, "body").next() {
            xhtml::walk_children(&mut walk, body, sink, Context::default())?;
        }
        sink.end(TagKind::Body)?;
        sink.flush()?;

        self.diagnostics.flush();
        Ok(())
    }
}
