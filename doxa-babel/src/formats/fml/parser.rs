use crate::common::ids::{encode_id, is_valid_id};
use crate::common::xhtml::{self, children_named, text_content, Context, XhtmlHandler};
use crate::diagnostics::Diagnostics;
use crate::error::ParseError;
use crate::parser::{Parser, ParserOptions};
use crate::sink::{Numbering, Sink, SinkExt, Tag, TagKind};
use roxmltree::{Document, Node};
use std::collections::HashSet;

/// Anchor at the start of the body that `[top]` links return to.
pub const TOP_ANCHOR: &str = "top";

const INVALID_ID: &str = "invalid-faq-id";

struct Faq<'a, 'input> {
    id: String,
    question: Node<'a, 'input>,
    answer: Node<'a, 'input>,
}

struct Part<'a, 'input> {
    id: String,
    title: Option<String>,
    faqs: Vec<Faq<'a, 'input>>,
}

/// Parser for FAQ documents: `<faqs>` holding `<part>`s of `<faq>` question/answer
/// pairs. Renders a linked question index followed by the answers.
pub struct FmlParser {
    options: ParserOptions,
    diagnostics: Diagnostics,
}

impl FmlParser {
    pub fn new(options: ParserOptions) -> Self {
        let diagnostics = Diagnostics::new(options.verbose);
        Self {
            options,
            diagnostics,
        }
    }
}

impl Default for FmlParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

struct FmlWalk<'p> {
    file: Option<&'p str>,
    diagnostics: &'p mut Diagnostics,
    used_ids: HashSet<String>,
}

impl XhtmlHandler for FmlWalk<'_> {
    fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut *self.diagnostics
    }

    fn file(&self) -> Option<&str> {
        self.file
    }
}

impl FmlWalk<'_> {
    /// A valid, document-unique id from an explicit id or a fallback text.
    fn unique_id(&mut self, explicit: Option<&str>, fallback: &str) -> String {
        let base = match explicit {
            Some(id) if is_valid_id(id) => id.to_string(),
            Some(id) => {
                let encoded = encode_id(id).unwrap_or_else(|| fallback.to_string());
                self.diagnostics.warn(
                    INVALID_ID,
                    format!("Modified invalid id '{id}' to '{encoded}'"),
                );
                encoded
            }
            None => encode_id(fallback).unwrap_or_else(|| "faq".to_string()),
        };
        if self.used_ids.insert(base.clone()) {
            return base;
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}_{counter}");
            if self.used_ids.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn collect<'a, 'input>(
        &mut self,
        root: Node<'a, 'input>,
    ) -> Result<Vec<Part<'a, 'input>>, ParseError> {
        let file = self.file;
        let mut parts = Vec::new();
        for (index, part) in children_named(root, "part").enumerate() {
            let id = self.unique_id(part.attribute("id"), &format!("part{}", index + 1));
            let title = children_named(part, "title")
                .next()
                .map(text_content)
                .filter(|t| !t.is_empty());
            let mut faqs = Vec::new();
            for faq in children_named(part, "faq") {
                let missing = |element: &str| {
                    ParseError::syntax(
                        format!("Missing <{element}> in faq"),
                        xhtml::location(file, faq),
                    )
                };
                let question = children_named(faq, "question")
                    .next()
                    .ok_or_else(|| missing("question"))?;
                let answer = children_named(faq, "answer")
                    .next()
                    .ok_or_else(|| missing("answer"))?;
                let id = self.unique_id(faq.attribute("id"), &text_content(question));
                faqs.push(Faq {
                    id,
                    question,
                    answer,
                });
            }
            parts.push(Part { id, title, faqs });
        }
        Ok(parts)
    }

    fn index(&mut self, parts: &[Part<'_, '_>], sink: &mut dyn Sink) -> Result<(), ParseError> {
        for part in parts {
            if let Some(title) = &part.title {
                sink.start(Tag::Paragraph)?;
                sink.start(Tag::Bold)?;
                sink.wrap_text(Tag::Link(format!("#{}", part.id)), title)?;
                sink.end(TagKind::Bold)?;
                sink.end(TagKind::Paragraph)?;
            }
            if part.faqs.is_empty() {
                continue;
            }
            sink.start(Tag::NumberedList(Numbering::Decimal))?;
            for faq in &part.faqs {
                sink.start(Tag::NumberedListItem)?;
                sink.wrap_text(Tag::Link(format!("#{}", faq.id)), &text_content(faq.question))?;
                sink.end(TagKind::NumberedListItem)?;
            }
            sink.end(TagKind::NumberedList)?;
        }
        Ok(())
    }

    fn answers(
        &mut self,
        parts: &[Part<'_, '_>],
        top_link: bool,
        sink: &mut dyn Sink,
    ) -> Result<(), ParseError> {
        for part in parts {
            sink.start(Tag::Section(2))?;
            sink.start(Tag::SectionTitle(2))?;
            sink.wrap_text(
                Tag::Anchor(part.id.clone()),
                part.title.as_deref().unwrap_or_default(),
            )?;
            sink.end(TagKind::SectionTitle(2))?;

            if !part.faqs.is_empty() {
                sink.start(Tag::DefinitionList)?;
                for faq in &part.faqs {
                    sink.locate(&xhtml::location(self.file, faq.question));
                    sink.start(Tag::DefinitionListItem)?;
                    sink.start(Tag::DefinedTerm)?;
                    sink.start(Tag::Anchor(faq.id.clone()))?;
                    xhtml::walk_children(self, faq.question, sink, Context::default())?;
                    sink.end(TagKind::Anchor)?;
                    sink.end(TagKind::DefinedTerm)?;

                    sink.start(Tag::Definition)?;
                    xhtml::walk_children(self, faq.answer, sink, Context::default())?;
                    if top_link {
                        sink.start(Tag::Paragraph)?;
                        sink.wrap_text(Tag::Link(format!("#{TOP_ANCHOR}")), "[top]")?;
                        sink.end(TagKind::Paragraph)?;
                    }
                    sink.end(TagKind::Definition)?;
                    sink.end(TagKind::DefinitionListItem)?;
                }
                sink.end(TagKind::DefinitionList)?;
            }
            sink.end(TagKind::Section(2))?;
        }
        Ok(())
    }
}

impl Parser for FmlParser {
    fn parse(&mut self, source: &str, sink: &mut dyn Sink) -> Result<(), ParseError> {
        self.diagnostics.reset();
        self.diagnostics.set_verbose(self.options.verbose);

        let document = Document::parse(source)?;
        let root = document.root_element();
        let file = self.options.file_name.as_deref();
        if root.tag_name().name() != "faqs" {
            return Err(ParseError::syntax(
                format!(
                    "Expected <faqs> root element but found <{}>",
                    root.tag_name().name()
                ),
                xhtml::location(file, root),
            ));
        }
        let title = root.attribute("title").unwrap_or_default().trim();
        let top_link = root.attribute("toplink") == Some("true");

        let mut walk = FmlWalk {
            file,
            diagnostics: &mut self.diagnostics,
            used_ids: HashSet::from([TOP_ANCHOR.to_string()]),
        };
        let parts = walk.collect(root)?;

        sink.start(Tag::Head)?;
        if !title.is_empty() {
            sink.wrap_text(Tag::Title, title)?;
        }
        sink.end(TagKind::Head)?;

        sink.start(Tag::Body)?;
        sink.wrap_text(Tag::Anchor(TOP_ANCHOR.to_string()), "")?;
        sink.start(Tag::Section(1))?;
        if !title.is_empty() {
            sink.wrap_text(Tag::SectionTitle(1), title)?;
        }
        walk.index(&parts, sink)?;
        walk.answers(&parts, top_link, sink)?;
        sink.end(TagKind::Section(1))?;
        sink.end(TagKind::Body)?;
        sink.flush()?;

        self.diagnostics.flush();
        Ok(())
    }
}
