//! Table of contents.

use crate::index::IndexEntry;
use crate::macros::{Macro, MacroError, MacroRequest};
use crate::sink::attributes::keys;
use crate::sink::wrappers::IndexingSink;
use crate::sink::{Attributes, Sink, SinkAdapter, SinkExt, Tag, TagKind};

/// Re-parses the whole document into an [`IndexingSink`] and renders the collected
/// sections as nested lists of links.
///
/// Parameters:
/// - `section`: 1-based index of the top-level section to list; 0 (default) lists all
/// - `fromDepth`, `toDepth`: depth window of entries to render (default 0 and 5)
/// - `class`, `id`: attributes for the outermost list
pub struct TocMacro;

struct TocOptions {
    from_depth: usize,
    to_depth: usize,
    attributes: Attributes,
}

impl Macro for TocMacro {
    fn execute(&self, request: &MacroRequest<'_>, sink: &mut dyn Sink) -> Result<(), MacroError> {
        let section = request.int_parameter("section", 0)?;
        let options = TocOptions {
            from_depth: request.int_parameter("fromDepth", 0)?,
            to_depth: request.int_parameter("toDepth", 5)?,
            attributes: list_attributes(request),
        };

        // Anchors are generated the same way the rendering pipeline does, so ids match.
        let mut indexing = IndexingSink::with_anchors(SinkAdapter);
        let mut parser = request.fresh_parser();
        parser.parse(request.source, &mut indexing)?;
        indexing.close()?;
        let (_, index) = indexing.into_parts();

        let entries: &[IndexEntry] = if section == 0 {
            &index.children
        } else {
            match index.children.get(section - 1) {
                Some(entry) => &entry.children,
                None => return Ok(()),
            }
        };
        let start_depth = if section == 0 { 1 } else { 2 };
        write_entries(sink, entries, start_depth, &options, true)?;
        Ok(())
    }
}

fn list_attributes(request: &MacroRequest<'_>) -> Attributes {
    let mut attributes = Attributes::new();
    for key in [keys::CLASS, keys::ID] {
        if let Some(value) = request.parameter(key) {
            attributes.set(key, value);
        }
    }
    attributes
}

fn write_entries(
    sink: &mut dyn Sink,
    entries: &[IndexEntry],
    depth: usize,
    options: &TocOptions,
    outermost: bool,
) -> Result<(), MacroError> {
    if entries.is_empty() || depth > options.to_depth {
        return Ok(());
    }
    if depth < options.from_depth {
        for entry in entries {
            write_entries(sink, &entry.children, depth + 1, options, outermost)?;
        }
        return Ok(());
    }

    let attributes = if outermost {
        options.attributes.clone()
    } else {
        Attributes::new()
    };
    sink.start_with(Tag::List, attributes)?;
    for entry in entries {
        sink.start(Tag::ListItem)?;
        match &entry.id {
            Some(id) => sink.wrap_text(Tag::Link(format!("#{id}")), &entry.title)?,
            None => sink.text(&entry.title)?,
        }
        write_entries(sink, &entry.children, depth + 1, options, false)?;
        sink.end(TagKind::ListItem)?;
    }
    sink.end(TagKind::List)?;
    Ok(())
}
