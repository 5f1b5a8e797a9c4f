//! Whatever blocks a document mixes, a successful parse nests properly.

use doxa_babel::format::Format;
use doxa_babel::formats::AptFormat;
use doxa_babel::sink::check_balanced;
use proptest::prelude::*;

const BLOCKS: &[&str] = &[
    "Section",
    "* Subsection",
    "** Subsubsection",
    " A paragraph.",
    " * item",
    "   * deeper item",
    "      * deepest item",
    " [[1]] numbered",
    "   [[a]] lettered",
    " [term] definition",
    " []",
    "=====",
    "~~ comment",
    "+--\ncode\n+--",
    "[image.png] caption",
];

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(BLOCKS), 1..24)
        .prop_map(|blocks| blocks.join("\n\n") + "\n")
}

proptest! {
    #[test]
    fn parsed_documents_are_balanced(source in document()) {
        if let Ok(events) = AptFormat::default().parse(&source) {
            prop_assert!(check_balanced(&events).is_ok(), "unbalanced events for:\n{}", source);
        }
    }

    #[test]
    fn rewritten_documents_are_balanced(source in document()) {
        let format = AptFormat::default();
        if let Ok(events) = format.parse(&source) {
            let apt = format.serialize(&events).unwrap();
            let reparsed = format.parse(&apt).unwrap();
            prop_assert!(check_balanced(&reparsed).is_ok());
        }
    }
}
