//! Import tests for FML (FML → events → HTML)

use crate::common::options;
use doxa_babel::formats::fml::TOP_ANCHOR;
use doxa_babel::sink::check_balanced;
use doxa_babel::{Event, FormatRegistry, Tag};

const FAQ: &str = r#"<faqs title="Questions" toplink="true">
  <part id="install">
    <title>Installing</title>
    <faq id="where">
      <question>Where do I get it?</question>
      <answer><p>From the <a href="https://example.org">site</a>.</p></answer>
    </faq>
  </part>
  <part>
    <title>Usage</title>
    <faq>
      <question>How?</question>
      <answer><p>Carefully.</p></answer>
    </faq>
  </part>
</faqs>"#;

#[test]
fn test_faq_structure() {
    let events = FormatRegistry::default().parse(FAQ, "fml").unwrap();
    check_balanced(&events).unwrap();
    assert!(events.contains(&Event::start(Tag::Anchor(TOP_ANCHOR.into()))));
    assert!(events.contains(&Event::start(Tag::Link("#install".into()))));
    assert!(events.contains(&Event::start(Tag::Link("#part2".into()))));
    assert!(events.contains(&Event::start(Tag::Anchor("where".into()))));
    assert_eq!(
        events
            .iter()
            .filter(|e| **e == Event::start(Tag::SectionTitle(2)))
            .count(),
        2
    );
}

#[test]
fn test_faq_to_html() {
    let document = FormatRegistry::default()
        .convert(
            FAQ,
            "fml",
            "html",
            &options(&[]),
            &options(&[("full-document", "false")]),
        )
        .unwrap();
    let html = String::from_utf8(document.into_bytes()).unwrap();
    assert!(html.contains("<h1>Questions</h1>"));
    assert!(html.contains("<a href=\"#where\">Where do I get it?</a>"));
    assert!(html.contains("<a href=\"https://example.org\" class=\"externalLink\">site</a>"));
    assert_eq!(html.matches("<a href=\"#top\">[top]</a>").count(), 2);
}
