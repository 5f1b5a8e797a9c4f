//! Export tests for APT (events → APT → events)

use crate::common::{parse_apt, KITCHEN_SINK};
use doxa_babel::format::Format;
use doxa_babel::formats::AptFormat;
use doxa_babel::sink::check_balanced;
use doxa_babel::{Event, Tag};

fn rewrite(source: &str) -> String {
    AptFormat::default().serialize(&parse_apt(source)).unwrap()
}

#[test]
fn test_simple_document_survives_a_rewrite() {
    let source = "Intro\n\n Hello <<world>>.\n\n * one\n\n * two\n";
    let apt = rewrite(source);
    assert_eq!(apt, "\nIntro\n\n Hello <<world>>.\n\n\n * one\n * two\n []\n");
    assert_eq!(parse_apt(&apt), parse_apt(source));
}

#[test]
fn test_head_is_written_first() {
    let apt = rewrite(" -----\n Guide\n -----\n Ada\n -----\n 2024\n\nIntro\n");
    assert!(apt.starts_with(" -----\n Guide\n -----\n Ada\n -----\n 2024\n -----\n"));
}

#[test]
fn test_markup_characters_are_escaped() {
    let events = vec![
        Event::start(Tag::Paragraph),
        Event::text("1 < 2 and {braces}"),
        Event::end(doxa_babel::TagKind::Paragraph),
    ];
    let apt = AptFormat::default().serialize(&events).unwrap();
    assert_eq!(apt, "\n 1 \\< 2 and \\{braces\\}\n");
}

#[test]
fn test_kitchen_sink_rewrite_reparses() {
    let apt = rewrite(KITCHEN_SINK);
    let events = parse_apt(&apt);
    check_balanced(&events).unwrap();
    assert!(events.contains(&Event::text("The Kitchen Sink")));
    assert!(events.contains(&Event::text("Values by name")));
    assert!(events.contains(&Event::start(Tag::Link("https://example.org".into()))));
}
