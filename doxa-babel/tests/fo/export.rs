//! Export tests for XSL-FO (APT → FO)

use crate::common::{options, KITCHEN_SINK};
use doxa_babel::FormatRegistry;

fn apt_to_fo(source: &str, pairs: &[(&str, &str)]) -> String {
    let document = FormatRegistry::default()
        .convert(source, "apt", "fo", &options(&[]), &options(pairs))
        .unwrap();
    String::from_utf8(document.into_bytes()).unwrap()
}

#[test]
fn test_kitchen_sink_is_complete() {
    let fo = apt_to_fo(KITCHEN_SINK, &[]);
    assert!(fo.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<fo:root"));
    assert!(fo.trim_end().ends_with("</fo:root>"));
    assert!(fo.contains("<fo:block text-align=\"end\" font-size=\"8pt\">The Kitchen Sink</fo:block>"));
    assert!(fo.contains(">Introduction</fo:block>\n"));
    assert_eq!(fo.matches("<fo:table-column ").count(), 2);
    assert!(fo.contains("<fo:block>1.</fo:block>"));
    assert!(fo.contains("<fo:block>2.</fo:block>"));
    assert!(fo.contains("external-destination=\"url('https://example.org')\""));
    assert!(fo.contains("Values by name"));
}

#[test]
fn test_page_options() {
    let fo = apt_to_fo(
        "Intro\n",
        &[("page-size", "letter"), ("margin", "1in"), ("font-family", "Times")],
    );
    assert!(fo.contains("page-width=\"8.5in\" page-height=\"11in\""));
    assert!(fo.contains("margin-left=\"1in\""));
    assert!(fo.contains("font-family=\"Times\""));
}

#[test]
fn test_generated_anchors_become_ids() {
    let fo = apt_to_fo("Intro\n\n {{Intro}}\n", &[("generate-anchors", "true")]);
    assert!(fo.contains("<fo:inline id=\"Intro\">"));
    assert!(fo.contains("internal-destination=\"Intro\""));
}
