//! Export tests for HTML format (APT → HTML)
//!
//! These tests verify that APT documents are correctly converted to HTML
//! by checking the resulting markup.

use crate::common::{options, KITCHEN_SINK};
use doxa_babel::FormatRegistry;
use insta::assert_snapshot;
use once_cell::sync::Lazy;
use regex::Regex;

static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<style>.*</style>\n").unwrap());

fn apt_to_html(source: &str, pairs: &[(&str, &str)]) -> String {
    let registry = FormatRegistry::default();
    let document = registry
        .convert(source, "apt", "html", &options(&[]), &options(pairs))
        .unwrap();
    String::from_utf8(document.into_bytes()).unwrap()
}

fn fragment(source: &str) -> String {
    apt_to_html(source, &[("full-document", "false")])
}

// ============================================================================
// DOCUMENT STRUCTURE
// ============================================================================

#[test]
fn test_full_document_head() {
    let html = apt_to_html(" -----\n Guide\n -----\n Ada\n -----\n 2024\n\nIntro\n", &[]);
    let html = STYLE_BLOCK.replace(&html, "<style/>\n");
    assert_snapshot!(html, @r###"
    <!DOCTYPE html>
    <html>
    <head>
    <meta charset="UTF-8" />
    <title>Guide</title>
    <meta name="author" content="Ada" />
    <meta name="date" content="2024" />
    <style/>
    </head>
    <body>
    <section>
    <h1>Intro</h1>
    </section>
    </body>
    </html>
    "###);
}

#[test]
fn test_paragraph_and_inline_markup() {
    let html = fragment("Intro\n\n Some <italic>, <<bold>> and <<<code>>>.\n");
    assert!(html.contains("<p>Some <i>italic</i>, <b>bold</b> and <code>code</code>.</p>\n"));
}

#[test]
fn test_nested_lists() {
    let html = fragment("Intro\n\n * one\n\n   [[i]] sub\n\n * two\n");
    assert!(html.contains("<ul>\n<li>one<ol style=\"list-style-type: lower-roman\">\n<li>sub</li>\n</ol>\n</li>\n<li>two</li>\n</ul>\n"));
}

#[test]
fn test_links_and_anchors() {
    let html = fragment("Intro\n\n {Target} and {{Target}} or {{{https://example.org}out}}\n");
    assert!(html.contains("<a id=\"Target\">Target</a>"));
    assert!(html.contains("<a href=\"#Target\">Target</a>"));
    assert!(html.contains("<a href=\"https://example.org\" class=\"externalLink\">out</a>"));
}

// ============================================================================
// TABLES
// ============================================================================

#[test]
fn test_table_caption_comes_first() {
    let html = fragment(KITCHEN_SINK);
    let table = html.find("<table class=\"bodyTable grid\" border=\"1\">").unwrap();
    let caption = html.find("<caption>Values by name</caption>").unwrap();
    let first_row = html.find("<tr class=\"a\">").unwrap();
    assert!(table < caption && caption < first_row);
}

#[test]
fn test_table_rows_alternate() {
    let html = fragment(KITCHEN_SINK);
    assert_eq!(html.matches("<tr class=\"a\">").count(), 2);
    assert_eq!(html.matches("<tr class=\"b\">").count(), 1);
    assert!(html.contains("<th style=\"text-align: left;\">Name</th>"));
    assert!(html.contains("<td style=\"text-align: right;\">2</td>"));
}

// ============================================================================
// OPTIONS
// ============================================================================

#[test]
fn test_generated_anchors() {
    let html = apt_to_html(
        "Intro\n\nIntro\n",
        &[("full-document", "false"), ("generate-anchors", "true")],
    );
    assert!(html.contains("<h1><a id=\"Intro\"></a>Intro</h1>"));
    assert!(html.contains("<h1><a id=\"Intro_1\"></a>Intro</h1>"));
}

#[test]
fn test_unique_anchors_reject_duplicates() {
    let registry = FormatRegistry::default();
    let err = registry
        .convert(
            "Intro\n\n {a} {a}\n",
            "apt",
            "html",
            &options(&[]),
            &options(&[("unique-anchors", "true")]),
        )
        .unwrap_err();
    assert!(err.to_string().contains("Anchor name \"a\" used more than once"));
}

#[test]
fn test_verbatim_blocks() {
    let html = fragment("Intro\n\n+--\na < b\n+--\n");
    assert!(html.contains("<div class=\"verbatim boxed\"><pre>a &lt; b</pre></div>\n"));
}
