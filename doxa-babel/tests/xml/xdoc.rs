//! Import tests for XDoc (XDoc → events → HTML)

use crate::common::{names, options};
use doxa_babel::sink::check_balanced;
use doxa_babel::{Event, FormatRegistry, Tag};

const GUIDE: &str = r#"<?xml version="1.0"?>
<document>
  <properties>
    <title>Guide</title>
    <author email="ada@example.org">Ada</author>
  </properties>
  <body>
    <section name="Install">
      <p>Run the <b>installer</b>.</p>
      <table border="1">
        <tr><th>Key</th><th>Value</th></tr>
        <tr><td>a</td><td>1</td></tr>
      </table>
      <subsection name="From source">
        <source>make install</source>
      </subsection>
    </section>
  </body>
</document>"#;

#[test]
fn test_sections_nest_by_element() {
    let events = FormatRegistry::default().parse(GUIDE, "xdoc").unwrap();
    check_balanced(&events).unwrap();
    let names = names(&events);
    let section = names.iter().position(|n| *n == "section1").unwrap();
    let subsection = names.iter().position(|n| *n == "section2").unwrap();
    assert!(section < subsection);
    assert!(events.contains(&Event::text("From source")));
    assert!(events.contains(&Event::text("make install")));
}

#[test]
fn test_tables_map_to_table_events() {
    let events = FormatRegistry::default().parse(GUIDE, "xdoc").unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Start(Tag::TableRows { grid: true, .. }, _)
    )));
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == Event::start(Tag::TableHeaderCell))
            .count(),
        2
    );
}

#[test]
fn test_xdoc_to_html() {
    let document = FormatRegistry::default()
        .convert(
            GUIDE,
            "xdoc",
            "html",
            &options(&[]),
            &options(&[("full-document", "false")]),
        )
        .unwrap();
    let html = String::from_utf8(document.into_bytes()).unwrap();
    assert!(html.contains("<h1>Install</h1>"));
    assert!(html.contains("<h2>From source</h2>"));
    assert!(html.contains("<b>installer</b>"));
    assert!(html.contains("<div class=\"verbatim source\"><pre>make install</pre></div>"));
}

#[test]
fn test_malformed_xml_is_a_parse_error() {
    let err = FormatRegistry::default()
        .parse("<document><body>", "xdoc")
        .unwrap_err();
    assert!(err.to_string().starts_with("Parse error: XML parsing error"));
}
