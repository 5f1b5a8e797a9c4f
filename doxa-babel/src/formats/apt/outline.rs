//! Open sections and lists of the document being parsed.
//!
//! Neither sections nor lists are closed explicitly in the source: a heading closes
//! every open section of the same or a deeper level, and list nesting follows
//! indentation. The [`Outline`] keeps the open structures on an explicit stack and emits
//! the begin/end events as frames are pushed and popped, so the rules can be exercised
//! without any source text.

use crate::error::SinkError;
use crate::sink::{Numbering, Sink, SinkExt, Tag, TagKind};

/// The three kinds of list a list item can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Numbered(Numbering),
    Definition,
}

impl ListKind {
    fn same_list(self, other: ListKind) -> bool {
        std::mem::discriminant(&self) == std::mem::discriminant(&other)
    }

    fn list_tag(self) -> Tag {
        match self {
            ListKind::Bullet => Tag::List,
            ListKind::Numbered(numbering) => Tag::NumberedList(numbering),
            ListKind::Definition => Tag::DefinitionList,
        }
    }

    fn list_end(self) -> TagKind {
        match self {
            ListKind::Bullet => TagKind::List,
            ListKind::Numbered(_) => TagKind::NumberedList,
            ListKind::Definition => TagKind::DefinitionList,
        }
    }

    fn item_tag(self) -> Tag {
        match self {
            ListKind::Bullet => Tag::ListItem,
            ListKind::Numbered(_) => Tag::NumberedListItem,
            ListKind::Definition => Tag::DefinitionListItem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Section(u8),
    List { kind: ListKind, indent: usize },
}

#[derive(Debug, Default)]
pub struct Outline {
    frames: Vec<Frame>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Level of the innermost open section, 0 when none is open.
    pub fn section_level(&self) -> u8 {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Section(level) => Some(*level),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn in_list(&self) -> bool {
        matches!(self.frames.last(), Some(Frame::List { .. }))
    }

    /// Closes every list and every section at `level` or deeper, then opens a section
    /// of `level`. The caller emits the title.
    pub fn open_section(&mut self, level: u8, sink: &mut dyn Sink) -> Result<(), SinkError> {
        self.close_lists_while(sink, |_| true)?;
        while let Some(Frame::Section(open)) = self.frames.last() {
            if *open < level {
                break;
            }
            let open = *open;
            self.frames.pop();
            sink.end(TagKind::Section(open))?;
        }
        self.frames.push(Frame::Section(level));
        sink.start(Tag::Section(level))
    }

    /// Positions the outline for a list item of `kind` at `indent` and opens the item.
    ///
    /// Deeper indentation nests a new list inside the open item, equal indentation adds
    /// a sibling item, and shallower indentation closes lists until one matches. A list
    /// of another kind at the same indentation is closed and replaced. For definition
    /// lists only the item is opened: the caller emits the term and the definition
    /// start, and closing the item ends the definition.
    pub fn enter_list_item(
        &mut self,
        kind: ListKind,
        indent: usize,
        sink: &mut dyn Sink,
    ) -> Result<(), SinkError> {
        loop {
            match self.frames.last().cloned() {
                Some(Frame::List {
                    kind: open,
                    indent: open_indent,
                }) if indent < open_indent => self.close_list(open, sink)?,
                Some(Frame::List {
                    kind: open,
                    indent: open_indent,
                }) if indent == open_indent => {
                    if open.same_list(kind) {
                        close_item(open, sink)?;
                        return sink.start(open.item_tag());
                    }
                    self.close_list(open, sink)?;
                }
                _ => break,
            }
        }

        self.frames.push(Frame::List { kind, indent });
        sink.start(kind.list_tag())?;
        sink.start(kind.item_tag())
    }

    /// Prepares for a non-list block at `indent`: every list indented at least as far
    /// is closed, deeper lists keep the block inside their open item.
    pub fn enter_block(&mut self, indent: usize, sink: &mut dyn Sink) -> Result<(), SinkError> {
        self.close_lists_while(sink, |list_indent| list_indent >= indent)
    }

    /// Handles an explicit list break at `indent`. Returns `false` when no list was
    /// open, which is a structural error for the caller to report.
    pub fn list_break(&mut self, indent: usize, sink: &mut dyn Sink) -> Result<bool, SinkError> {
        if !self.in_list() {
            return Ok(false);
        }
        let before = self.frames.len();
        self.close_lists_while(sink, |list_indent| list_indent >= indent)?;
        if self.frames.len() == before {
            if let Some(Frame::List { kind, .. }) = self.frames.last().cloned() {
                self.close_list(kind, sink)?;
            }
        }
        Ok(true)
    }

    /// Closes everything that is still open.
    pub fn close_all(&mut self, sink: &mut dyn Sink) -> Result<(), SinkError> {
        while let Some(frame) = self.frames.last().cloned() {
            match frame {
                Frame::List { kind, .. } => self.close_list(kind, sink)?,
                Frame::Section(level) => {
                    self.frames.pop();
                    sink.end(TagKind::Section(level))?;
                }
            }
        }
        Ok(())
    }

    fn close_lists_while(
        &mut self,
        sink: &mut dyn Sink,
        mut predicate: impl FnMut(usize) -> bool,
    ) -> Result<(), SinkError> {
        while let Some(Frame::List { kind, indent }) = self.frames.last().cloned() {
            if !predicate(indent) {
                break;
            }
            self.close_list(kind, sink)?;
        }
        Ok(())
    }

    fn close_list(&mut self, kind: ListKind, sink: &mut dyn Sink) -> Result<(), SinkError> {
        self.frames.pop();
        close_item(kind, sink)?;
        sink.end(kind.list_end())
    }
}

fn close_item(kind: ListKind, sink: &mut dyn Sink) -> Result<(), SinkError> {
    match kind {
        ListKind::Bullet => sink.end(TagKind::ListItem),
        ListKind::Numbered(_) => sink.end(TagKind::NumberedListItem),
        ListKind::Definition => {
            sink.end(TagKind::Definition)?;
            sink.end(TagKind::DefinitionListItem)
        }
    }
}
