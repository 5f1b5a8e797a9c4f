//! Import tests for APT (APT → events)

use crate::common::{names, parse_apt, parse_apt_with, KITCHEN_SINK};
use doxa_babel::format::Format;
use doxa_babel::formats::AptFormat;
use doxa_babel::sink::attributes::{decoration, keys};
use doxa_babel::sink::{check_balanced, Justification};
use doxa_babel::{Attributes, Event, FormatError, ParseError, Tag, TagKind};

#[test]
fn test_section_with_list() {
    let events = parse_apt("Title\n\n * a\n\n * b\n");
    assert_eq!(
        names(&events),
        vec![
            "head",
            "head_",
            "body",
            "section1",
            "sectionTitle1",
            "text",
            "sectionTitle1_",
            "list",
            "listItem",
            "text",
            "listItem_",
            "listItem",
            "text",
            "listItem_",
            "list_",
            "section1_",
            "body_",
        ]
    );
}

#[test]
fn test_kitchen_sink_is_balanced() {
    let events = parse_apt(KITCHEN_SINK);
    check_balanced(&events).unwrap();
    assert_eq!(events.first(), Some(&Event::start(Tag::Head)));
    assert_eq!(events.last(), Some(&Event::end(TagKind::Body)));
}

#[test]
fn test_kitchen_sink_head() {
    let events = parse_apt(KITCHEN_SINK);
    let head_end = events
        .iter()
        .position(|e| *e == Event::end(TagKind::Head))
        .unwrap();
    let head = &events[..head_end];
    assert!(head.contains(&Event::text("The Kitchen Sink")));
    assert_eq!(
        head.iter()
            .filter(|e| **e == Event::start(Tag::Author))
            .count(),
        2
    );
    assert!(head.contains(&Event::text("Grace Hopper")));
    assert!(head.contains(&Event::text("2024-03-01")));
}

#[test]
fn test_kitchen_sink_blocks() {
    let events = parse_apt(KITCHEN_SINK);

    assert!(events.contains(&Event::start(Tag::SectionTitle(2))));
    assert!(events.contains(&Event::start(Tag::Anchor("Anchor".into()))));
    assert!(events.contains(&Event::start(Tag::Link("https://example.org".into()))));
    assert!(events.contains(&Event::start(Tag::Monospaced)));
    assert!(events.contains(&Event::start(Tag::DefinedTerm)));
    assert!(events.contains(&Event::text("the meaning")));
    assert!(events.contains(&Event::FigureGraphics {
        src: "figure.png".into(),
        attributes: Default::default(),
    }));
    assert!(events.contains(&Event::Comment("trailing comment".into())));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::HorizontalRule(_))));

    let verbatim = events
        .iter()
        .position(|e| matches!(e, Event::Start(Tag::Verbatim, _)))
        .unwrap();
    match &events[verbatim] {
        Event::Start(_, attributes) => {
            assert_eq!(attributes.get(keys::DECORATION), Some(decoration::BOXED))
        }
        _ => unreachable!(),
    }
    assert_eq!(events[verbatim + 1], Event::text("fn main() {}"));
}

#[test]
fn test_kitchen_sink_lists_nest() {
    let events = parse_apt(KITCHEN_SINK);
    let list_starts = events
        .iter()
        .filter(|e| **e == Event::start(Tag::List))
        .count();
    assert_eq!(list_starts, 2);
    assert!(events.contains(&Event::start(Tag::NumberedList(
        doxa_babel::sink::Numbering::Decimal
    ))));
}

#[test]
fn test_kitchen_sink_table() {
    let events = parse_apt(KITCHEN_SINK);
    let rows = events
        .iter()
        .find_map(|e| match e {
            Event::Start(Tag::TableRows { justification, grid }, _) => {
                Some((justification.clone(), *grid))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(rows, (vec![Justification::Left, Justification::Right], true));

    let header_cells = events
        .iter()
        .filter(|e| **e == Event::start(Tag::TableHeaderCell))
        .count();
    assert_eq!(header_cells, 2);
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == Event::start(Tag::TableRow))
            .count(),
        3
    );

    // The caption follows the rows.
    let rows_end = events
        .iter()
        .position(|e| *e == Event::end(TagKind::TableRows))
        .unwrap();
    assert_eq!(events[rows_end + 1], Event::start(Tag::TableCaption));
    assert_eq!(events[rows_end + 2], Event::text("Values by name"));
}

#[test]
fn test_table_cell_continuation_lines() {
    let events = parse_apt("Intro\n\n *--+--+\n | one\\ | two |\n | more | three |\n *--+--+\n");
    let break_at = events
        .iter()
        .position(|e| *e == Event::LineBreak(Attributes::new()))
        .unwrap();
    assert_eq!(events[break_at - 1], Event::text("one"));
    assert_eq!(events[break_at + 1], Event::text("more"));
    assert!(events.contains(&Event::text("two three")));
}

#[test]
fn test_macros_can_be_switched_off() {
    let source = "Intro\n\n%{echo|a=b}\n";
    let with = parse_apt(source);
    assert!(with.contains(&Event::text("echo\na ---> b")));

    let without = parse_apt_with(source, &[("macros", "false")]);
    assert!(!without
        .iter()
        .any(|e| matches!(e, Event::Start(Tag::Verbatim, _))));
}

#[test]
fn test_unknown_macro_reports_location() {
    let options = crate::common::options(&[("file", "guide.apt")]);
    let err = AptFormat::default()
        .parse_with_options("Intro\n\n%{nothing}\n", &options)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Parse error: guide.apt, line 3: Macro 'nothing' not found"
    );
}

#[test]
fn test_stray_list_break_is_rejected() {
    let err = AptFormat::default().parse("Intro\n\n []\n").unwrap_err();
    assert!(matches!(
        err,
        FormatError::Parse(ParseError::UnexpectedBlock { ref found, .. }) if found == "LIST_BREAK"
    ));
}

#[test]
fn test_snippet_reads_relative_to_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("code.rs"),
        "// START SNIPPET: main\nfn main() {}\n// END SNIPPET: main\n",
    )
    .unwrap();
    let base = dir.path().to_string_lossy().into_owned();
    let events = parse_apt_with(
        "Code\n\n%{snippet|file=code.rs|id=main}\n",
        &[("base-dir", base.as_str())],
    );
    assert!(events.contains(&Event::text("fn main() {}")));
}
