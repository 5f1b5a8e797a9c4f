//! CLI-specific transforms
//!
//! `doxa inspect` parses a document with any parsing format and prints one view of the
//! resulting event stream:
//!
//! - `event-names`: one canonical event name per line, indented by nesting depth
//! - `events-json`: the full events (tags, payloads, attributes) as JSON
//! - `tag`: an XML-like tag tree (see [`doxa_babel::formats::tag`])
//! - `toc`: the section outline with the anchor ids a render with
//!   `generate-anchors` would assign
//!
//! ## Extra Parameters
//!
//! Transforms accept the parse options (`--extra-macros false`, ...) plus:
//!
//! - `show-attributes`: `"false"` hides attributes in the `tag` view
//!
//! Example: `doxa inspect guide.apt tag --extra-show-attributes false`

use doxa_babel::formats::tag::serialize_events_with_params;
use doxa_babel::sink::wrappers::IndexingSink;
use doxa_babel::sink::{replay, SinkAdapter};
use doxa_babel::{Event, FormatRegistry, Sink};
use std::collections::HashMap;

/// All available CLI transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &["event-names", "events-json", "tag", "toc"];

/// Transform used when none is named.
pub const DEFAULT_TRANSFORM: &str = "tag";

/// Parses `source` as `from` and renders the events with `transform_name`.
///
/// # Examples
///
/// ```ignore
/// let output = execute_transform("Intro\n\n Text\n", "apt", "event-names", &HashMap::new())?;
/// assert!(output.starts_with("head\n"));
/// ```
pub fn execute_transform(
    source: &str,
    from: &str,
    transform_name: &str,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    let registry = FormatRegistry::default();
    let events = registry
        .parse_with_options(source, from, extra_params)
        .map_err(|e| format!("Transform failed: {e}"))?;

    match transform_name {
        "event-names" => Ok(event_names(&events)),
        "events-json" => serde_json::to_string_pretty(&events)
            .map(|json| json + "\n")
            .map_err(|e| format!("JSON serialization failed: {e}")),
        "tag" => Ok(serialize_events_with_params(&events, extra_params)),
        "toc" => outline(&events),
        other => Err(format!(
            "Unknown transform '{other}'. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn event_names(events: &[Event]) -> String {
    let mut out = String::new();
    let mut depth: usize = 0;
    for event in events {
        if event.is_end() {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&"  ".repeat(depth));
        out.push_str(event.name());
        out.push('\n');
        if event.is_start() {
            depth += 1;
        }
    }
    out
}

fn outline(events: &[Event]) -> Result<String, String> {
    let mut indexing = IndexingSink::with_anchors(SinkAdapter);
    replay(events, &mut indexing).map_err(|e| format!("Transform failed: {e}"))?;
    indexing
        .close()
        .map_err(|e| format!("Transform failed: {e}"))?;
    let (_, index) = indexing.into_parts();
    Ok(index.to_outline())
}
