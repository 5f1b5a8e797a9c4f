//! Document outline collected from section events.

use serde::Serialize;

/// One section of a document outline. The root entry has level 0 and no title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub id: Option<String>,
    pub title: String,
    pub level: u8,
    pub children: Vec<IndexEntry>,
}

impl IndexEntry {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(level: u8) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    /// The first entry (depth first, including `self`) whose id is `id`.
    pub fn find(&self, id: &str) -> Option<&IndexEntry> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Total number of entries below this one.
    pub fn count(&self) -> usize {
        self.children.iter().map(|child| 1 + child.count()).sum()
    }

    /// Renders the outline as indented `level title (#id)` lines.
    pub fn to_outline(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.write_outline(&mut out, 0);
        }
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.title);
        if let Some(id) = &self.id {
            out.push_str(" (#");
            out.push_str(id);
            out.push(')');
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}
