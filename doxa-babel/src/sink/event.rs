//! The closed vocabulary of structural document events.
//!
//! Paired structures travel as [`Event::Start`] / [`Event::End`]; everything that
//! cannot contain content is a leaf variant. A well-formed stream nests like a tree:
//! every `Start` is closed by exactly one `End` of the same [`TagKind`], in stack order.

use crate::sink::attributes::Attributes;
use serde::Serialize;

/// Numbering style of a numbered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Numbering {
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

impl Numbering {
    /// Formats the 1-based `ordinal` in this numbering style.
    pub fn format(self, ordinal: usize) -> String {
        match self {
            Numbering::Decimal => ordinal.to_string(),
            Numbering::LowerAlpha => alpha(ordinal),
            Numbering::UpperAlpha => alpha(ordinal).to_uppercase(),
            Numbering::LowerRoman => roman(ordinal),
            Numbering::UpperRoman => roman(ordinal).to_uppercase(),
        }
    }

    /// The CSS `list-style-type` value for this style.
    pub fn css_name(self) -> &'static str {
        match self {
            Numbering::Decimal => "decimal",
            Numbering::LowerAlpha => "lower-alpha",
            Numbering::UpperAlpha => "upper-alpha",
            Numbering::LowerRoman => "lower-roman",
            Numbering::UpperRoman => "upper-roman",
        }
    }
}

fn alpha(mut ordinal: usize) -> String {
    if ordinal == 0 {
        return "0".to_string();
    }
    let mut letters = Vec::new();
    while ordinal > 0 {
        ordinal -= 1;
        letters.push((b'a' + (ordinal % 26) as u8) as char);
        ordinal /= 26;
    }
    letters.iter().rev().collect()
}

fn roman(mut ordinal: usize) -> String {
    const TABLE: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    if ordinal == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    for (value, digits) in TABLE {
        while ordinal >= value {
            out.push_str(digits);
            ordinal -= value;
        }
    }
    out
}

/// Horizontal justification of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Justification {
    Left,
    Center,
    Right,
}

impl Justification {
    pub fn css_name(self) -> &'static str {
        match self {
            Justification::Left => "left",
            Justification::Center => "center",
            Justification::Right => "right",
        }
    }
}

/// A paired structure, carried by [`Event::Start`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Tag {
    Head,
    Title,
    Author,
    Date,
    Body,
    Article,
    Navigation,
    Sidebar,
    /// Section of level 1..=6
    Section(u8),
    /// Title of a section of level 1..=6
    SectionTitle(u8),
    Header,
    Content,
    Footer,
    List,
    ListItem,
    NumberedList(Numbering),
    NumberedListItem,
    DefinitionList,
    DefinitionListItem,
    DefinedTerm,
    Definition,
    Figure,
    FigureCaption,
    Table,
    /// Must precede every row of its table.
    TableRows {
        justification: Vec<Justification>,
        grid: bool,
    },
    TableRow,
    TableCell,
    TableHeaderCell,
    TableCaption,
    Paragraph,
    Data(String),
    Time(String),
    Address,
    Blockquote,
    Division,
    Verbatim,
    Anchor(String),
    Link(String),
    Inline,
    Italic,
    Bold,
    Monospaced,
}

/// The payload-free identity of a [`Tag`], carried by [`Event::End`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TagKind {
    Head,
    Title,
    Author,
    Date,
    Body,
    Article,
    Navigation,
    Sidebar,
    Section(u8),
    SectionTitle(u8),
    Header,
    Content,
    Footer,
    List,
    ListItem,
    NumberedList,
    NumberedListItem,
    DefinitionList,
    DefinitionListItem,
    DefinedTerm,
    Definition,
    Figure,
    FigureCaption,
    Table,
    TableRows,
    TableRow,
    TableCell,
    TableHeaderCell,
    TableCaption,
    Paragraph,
    Data,
    Time,
    Address,
    Blockquote,
    Division,
    Verbatim,
    Anchor,
    Link,
    Inline,
    Italic,
    Bold,
    Monospaced,
}

impl Tag {
    pub fn kind(&self) -> TagKind {
        match self {
            Tag::Head => TagKind::Head,
            Tag::Title => TagKind::Title,
            Tag::Author => TagKind::Author,
            Tag::Date => TagKind::Date,
            Tag::Body => TagKind::Body,
            Tag::Article => TagKind::Article,
            Tag::Navigation => TagKind::Navigation,
            Tag::Sidebar => TagKind::Sidebar,
            Tag::Section(level) => TagKind::Section(*level),
            Tag::SectionTitle(level) => TagKind::SectionTitle(*level),
            Tag::Header => TagKind::Header,
            Tag::Content => TagKind::Content,
            Tag::Footer => TagKind::Footer,
            Tag::List => TagKind::List,
            Tag::ListItem => TagKind::ListItem,
            Tag::NumberedList(_) => TagKind::NumberedList,
            Tag::NumberedListItem => TagKind::NumberedListItem,
            Tag::DefinitionList => TagKind::DefinitionList,
            Tag::DefinitionListItem => TagKind::DefinitionListItem,
            Tag::DefinedTerm => TagKind::DefinedTerm,
            Tag::Definition => TagKind::Definition,
            Tag::Figure => TagKind::Figure,
            Tag::FigureCaption => TagKind::FigureCaption,
            Tag::Table => TagKind::Table,
            Tag::TableRows { .. } => TagKind::TableRows,
            Tag::TableRow => TagKind::TableRow,
            Tag::TableCell => TagKind::TableCell,
            Tag::TableHeaderCell => TagKind::TableHeaderCell,
            Tag::TableCaption => TagKind::TableCaption,
            Tag::Paragraph => TagKind::Paragraph,
            Tag::Data(_) => TagKind::Data,
            Tag::Time(_) => TagKind::Time,
            Tag::Address => TagKind::Address,
            Tag::Blockquote => TagKind::Blockquote,
            Tag::Division => TagKind::Division,
            Tag::Verbatim => TagKind::Verbatim,
            Tag::Anchor(_) => TagKind::Anchor,
            Tag::Link(_) => TagKind::Link,
            Tag::Inline => TagKind::Inline,
            Tag::Italic => TagKind::Italic,
            Tag::Bold => TagKind::Bold,
            Tag::Monospaced => TagKind::Monospaced,
        }
    }
}

const SECTION_NAMES: [(&str, &str); 6] = [
    ("section1", "section1_"),
    ("section2", "section2_"),
    ("section3", "section3_"),
    ("section4", "section4_"),
    ("section5", "section5_"),
    ("section6", "section6_"),
];

const SECTION_TITLE_NAMES: [(&str, &str); 6] = [
    ("sectionTitle1", "sectionTitle1_"),
    ("sectionTitle2", "sectionTitle2_"),
    ("sectionTitle3", "sectionTitle3_"),
    ("sectionTitle4", "sectionTitle4_"),
    ("sectionTitle5", "sectionTitle5_"),
    ("sectionTitle6", "sectionTitle6_"),
];

fn level_index(level: u8) -> usize {
    usize::from(level.clamp(1, 6)) - 1
}

impl TagKind {
    /// Begin and end operation names, e.g. `("bold", "bold_")`.
    pub fn names(self) -> (&'static str, &'static str) {
        match self {
            TagKind::Head => ("head", "head_"),
            TagKind::Title => ("title", "title_"),
            TagKind::Author => ("author", "author_"),
            TagKind::Date => ("date", "date_"),
            TagKind::Body => ("body", "body_"),
            TagKind::Article => ("article", "article_"),
            TagKind::Navigation => ("navigation", "navigation_"),
            TagKind::Sidebar => ("sidebar", "sidebar_"),
            TagKind::Section(level) => SECTION_NAMES[level_index(level)],
            TagKind::SectionTitle(level) => SECTION_TITLE_NAMES[level_index(level)],
            TagKind::Header => ("header", "header_"),
            TagKind::Content => ("content", "content_"),
            TagKind::Footer => ("footer", "footer_"),
            TagKind::List => ("list", "list_"),
            TagKind::ListItem => ("listItem", "listItem_"),
            TagKind::NumberedList => ("numberedList", "numberedList_"),
            TagKind::NumberedListItem => ("numberedListItem", "numberedListItem_"),
            TagKind::DefinitionList => ("definitionList", "definitionList_"),
            TagKind::DefinitionListItem => ("definitionListItem", "definitionListItem_"),
            TagKind::DefinedTerm => ("definedTerm", "definedTerm_"),
            TagKind::Definition => ("definition", "definition_"),
            TagKind::Figure => ("figure", "figure_"),
            TagKind::FigureCaption => ("figureCaption", "figureCaption_"),
            TagKind::Table => ("table", "table_"),
            TagKind::TableRows => ("tableRows", "tableRows_"),
            TagKind::TableRow => ("tableRow", "tableRow_"),
            TagKind::TableCell => ("tableCell", "tableCell_"),
            TagKind::TableHeaderCell => ("tableHeaderCell", "tableHeaderCell_"),
            TagKind::TableCaption => ("tableCaption", "tableCaption_"),
            TagKind::Paragraph => ("paragraph", "paragraph_"),
            TagKind::Data => ("data", "data_"),
            TagKind::Time => ("time", "time_"),
            TagKind::Address => ("address", "address_"),
            TagKind::Blockquote => ("blockquote", "blockquote_"),
            TagKind::Division => ("division", "division_"),
            TagKind::Verbatim => ("verbatim", "verbatim_"),
            TagKind::Anchor => ("anchor", "anchor_"),
            TagKind::Link => ("link", "link_"),
            TagKind::Inline => ("inline", "inline_"),
            TagKind::Italic => ("italic", "italic_"),
            TagKind::Bold => ("bold", "bold_"),
            TagKind::Monospaced => ("monospaced", "monospaced_"),
        }
    }

    pub fn start_name(self) -> &'static str {
        self.names().0
    }

    pub fn end_name(self) -> &'static str {
        self.names().1
    }
}

/// One structural document event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    Start(Tag, Attributes),
    End(TagKind),
    Text(String, Attributes),
    /// Text written to the output unescaped
    RawText(String),
    Comment(String),
    LineBreak(Attributes),
    LineBreakOpportunity,
    NonBreakingSpace,
    FigureGraphics {
        src: String,
        attributes: Attributes,
    },
    HorizontalRule(Attributes),
    PageBreak,
    /// Escape hatch for tags without a dedicated event. Sinks that do not recognise
    /// `name` must ignore the event.
    Unknown {
        name: String,
        params: Vec<String>,
        attributes: Attributes,
    },
}

impl Event {
    pub fn start(tag: Tag) -> Self {
        Event::Start(tag, Attributes::new())
    }

    pub fn end(kind: TagKind) -> Self {
        Event::End(kind)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Event::Text(text.into(), Attributes::new())
    }

    /// The canonical operation name, e.g. `sectionTitle2_` or `text`.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start(tag, _) => tag.kind().start_name(),
            Event::End(kind) => kind.end_name(),
            Event::Text(..) => "text",
            Event::RawText(_) => "rawText",
            Event::Comment(_) => "comment",
            Event::LineBreak(_) => "lineBreak",
            Event::LineBreakOpportunity => "lineBreakOpportunity",
            Event::NonBreakingSpace => "nonBreakingSpace",
            Event::FigureGraphics { .. } => "figureGraphics",
            Event::HorizontalRule(_) => "horizontalRule",
            Event::PageBreak => "pageBreak",
            Event::Unknown { .. } => "unknown",
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Event::Start(..))
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Event::End(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names() {
        assert_eq!(Event::start(Tag::Bold).name(), "bold");
        assert_eq!(Event::end(TagKind::Bold).name(), "bold_");
        assert_eq!(Event::start(Tag::Section(2)).name(), "section2");
        assert_eq!(Event::end(TagKind::SectionTitle(6)).name(), "sectionTitle6_");
        assert_eq!(Event::text("x").name(), "text");
    }

    #[test]
    fn level_six_is_distinct_from_level_five() {
        assert_ne!(
            TagKind::Section(6).start_name(),
            TagKind::Section(5).start_name()
        );
    }

    #[test]
    fn kinds_match_tags() {
        let tag = Tag::TableRows {
            justification: vec![Justification::Left],
            grid: true,
        };
        assert_eq!(tag.kind(), TagKind::TableRows);
        assert_eq!(Tag::NumberedList(Numbering::UpperRoman).kind(), TagKind::NumberedList);
    }

    #[test]
    fn numbering_formats() {
        assert_eq!(Numbering::Decimal.format(12), "12");
        assert_eq!(Numbering::LowerAlpha.format(1), "a");
        assert_eq!(Numbering::LowerAlpha.format(27), "aa");
        assert_eq!(Numbering::UpperAlpha.format(3), "C");
        assert_eq!(Numbering::LowerRoman.format(4), "iv");
        assert_eq!(Numbering::UpperRoman.format(1994), "MCMXCIV");
    }
}
