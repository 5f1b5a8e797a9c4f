//! Includes (part of) a text file as a source verbatim block.

use crate::macros::{Macro, MacroError, MacroRequest};
use crate::sink::attributes::SOURCE;
use crate::sink::{Event, Sink, SinkExt, Tag, TagKind};
use std::fs;
use std::path::PathBuf;

/// `%{snippet|file=src/main.rs|id=usage}`
///
/// With an `id`, only the lines strictly between the ones containing
/// `START SNIPPET: <id>` and `END SNIPPET: <id>` are included. `verbatim=false` emits
/// the content as raw text instead.
pub struct SnippetMacro;

impl SnippetMacro {
    fn resolve(request: &MacroRequest<'_>, file: &str) -> PathBuf {
        match request.base_dir {
            Some(base) => base.join(file),
            None => PathBuf::from(file),
        }
    }
}

impl Macro for SnippetMacro {
    fn execute(&self, request: &MacroRequest<'_>, sink: &mut dyn Sink) -> Result<(), MacroError> {
        let file = request.required("file")?;
        let path = Self::resolve(request, file);
        let content = fs::read_to_string(&path).map_err(|err| {
            MacroError::Failed(format!("cannot read snippet file {}: {err}", path.display()))
        })?;

        let content = match request.parameter("id") {
            Some(id) => extract(&content, id).ok_or_else(|| {
                MacroError::Failed(format!("snippet '{id}' not found in {}", path.display()))
            })?,
            None => content,
        };

        let verbatim = request
            .parameter("verbatim")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        if verbatim {
            sink.start_with(Tag::Verbatim, SOURCE.to_attributes())?;
            sink.text(content.trim_end_matches('\n'))?;
            sink.end(TagKind::Verbatim)?;
        } else {
            sink.emit(Event::RawText(content))?;
        }
        Ok(())
    }
}

fn extract(content: &str, id: &str) -> Option<String> {
    let start = format!("START SNIPPET: {id}");
    let end = format!("END SNIPPET: {id}");

    let mut lines = content.lines();
    lines.by_ref().find(|line| line.contains(&start))?;
    let mut out = String::new();
    for line in lines {
        if line.contains(&end) {
            return Some(out);
        }
        out.push_str(line);
        out.push('\n');
    }
    None
}
