//! Helpers shared by the format tests.

use doxa_babel::format::Format;
use doxa_babel::formats::AptFormat;
use doxa_babel::Event;
use std::collections::HashMap;

pub const KITCHEN_SINK: &str = include_str!("../fixtures/kitchensink.apt");

/// Parses APT with the default macro set.
pub fn parse_apt(source: &str) -> Vec<Event> {
    AptFormat::default().parse(source).unwrap()
}

pub fn parse_apt_with(source: &str, pairs: &[(&str, &str)]) -> Vec<Event> {
    AptFormat::default()
        .parse_with_options(source, &options(pairs))
        .unwrap()
}

pub fn options(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Canonical event names, e.g. `sectionTitle1_`.
pub fn names(events: &[Event]) -> Vec<&'static str> {
    events.iter().map(Event::name).collect()
}
