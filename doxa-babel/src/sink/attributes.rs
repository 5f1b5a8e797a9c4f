//! Attribute bags attached to events.
//!
//! An [`Attributes`] value is an insertion-ordered map from names to string values (or
//! nested bags). Lookups fall back to an optional parent bag, which is how defaults are
//! layered under per-event overrides. [`FrozenAttributes`] is the shared read-only form
//! used for the canonical constants in this module.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

/// Well-known attribute names.
pub mod keys {
    pub const ALIGN: &str = "align";
    pub const BORDER: &str = "border";
    pub const CLASS: &str = "class";
    pub const DECORATION: &str = "decoration";
    pub const ID: &str = "id";
    pub const LANG: &str = "lang";
    pub const SEMANTICS: &str = "semantics";
    pub const STYLE: &str = "style";
    pub const TITLE: &str = "title";
    pub const WIDTH: &str = "width";
    pub const HREF: &str = "href";
    pub const NAME: &str = "name";
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("Invalid argument: attribute '{0}' has no value (key/value list of odd length)")]
    UnpairedKey(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Str(String),
    Set(Attributes),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(value) => Some(value),
            AttrValue::Set(_) => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<Attributes> for AttrValue {
    fn from(value: Attributes) -> Self {
        AttrValue::Set(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Attributes {
    entries: IndexMap<String, AttrValue>,
    #[serde(skip)]
    parent: Option<Arc<Attributes>>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bag from alternating key/value strings.
    pub fn from_pairs(pairs: &[&str]) -> Result<Self, AttributeError> {
        if pairs.len() % 2 != 0 {
            let dangling = pairs.last().copied().unwrap_or_default();
            return Err(AttributeError::UnpairedKey(dangling.to_string()));
        }
        let mut attributes = Self::new();
        for pair in pairs.chunks(2) {
            attributes.set(pair[0], pair[1]);
        }
        Ok(attributes)
    }

    /// Builder-style [`Attributes::set`].
    pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_parent(mut self, parent: Arc<Attributes>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn set_parent(&mut self, parent: Option<Arc<Attributes>>) {
        self.parent = parent;
    }

    pub fn parent(&self) -> Option<&Attributes> {
        self.parent.as_deref()
    }

    /// Sets `key`, keeping its original position when it already exists.
    pub fn set(&mut self, key: &str, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.entries.insert(key.to_string(), value.into())
    }

    /// Removes a local entry, preserving the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.entries.shift_remove(key)
    }

    /// Value lookup that falls through to the parent chain.
    pub fn get_value(&self, key: &str) -> Option<&AttrValue> {
        self.entries
            .get(key)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get_value(key)))
    }

    /// String lookup that falls through to the parent chain.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_value(key).and_then(AttrValue::as_str)
    }

    /// Local-only lookup.
    pub fn get_local(&self, key: &str) -> Option<&AttrValue> {
        self.entries.get(key)
    }

    pub fn is_defined(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// Copies every entry of `other` into `self`, overwriting duplicates.
    pub fn merge(&mut self, other: &Attributes) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Whether every entry of `other` is present here with an equal value.
    pub fn contains_all(&self, other: &Attributes) -> bool {
        other
            .entries
            .iter()
            .all(|(key, value)| self.get_value(key) == Some(value))
    }

    /// Whether the whitespace separated `semantics` value names `role`.
    pub fn has_semantics(&self, role: &str) -> bool {
        self.get(keys::SEMANTICS)
            .is_some_and(|value| value.split_whitespace().any(|r| r == role))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Local string-valued entries, in insertion order.
    pub fn string_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
    }

    /// String entries of this bag and its parent chain, nearest definition first.
    /// A key defined at a nearer level hides the same key further up, whatever its value.
    pub fn resolved_string_entries(&self) -> Vec<(&str, &str)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut entries = Vec::new();
        let mut level = Some(self);
        while let Some(attributes) = level {
            for (key, value) in attributes.iter() {
                if seen.contains(&key) {
                    continue;
                }
                seen.push(key);
                if let Some(value) = value.as_str() {
                    entries.push((key, value));
                }
            }
            level = attributes.parent();
        }
        entries
    }

    pub fn freeze(self) -> FrozenAttributes {
        FrozenAttributes(Arc::new(self))
    }
}

/// An immutable, cheaply shareable attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenAttributes(Arc<Attributes>);

impl FrozenAttributes {
    /// A mutable copy of the frozen entries.
    pub fn to_attributes(&self) -> Attributes {
        self.0.as_ref().clone()
    }

    /// An empty bag whose lookups fall back to this frozen one.
    pub fn as_parent(&self) -> Attributes {
        Attributes::new().with_parent(Arc::clone(&self.0))
    }

    pub fn ptr_eq(&self, other: &FrozenAttributes) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for FrozenAttributes {
    type Target = Attributes;

    fn deref(&self) -> &Attributes {
        &self.0
    }
}

/// Values of the `semantics` attribute understood by the renderers.
pub mod semantics {
    pub const ABBREVIATION: &str = "abbreviation";
    pub const ANNOTATION: &str = "annotation";
    pub const BOLD: &str = "bold";
    pub const CITATION: &str = "citation";
    pub const CODE: &str = "code";
    pub const DEFINITION: &str = "definition";
    pub const DELETE: &str = "delete";
    pub const EMPHASIS: &str = "emphasis";
    pub const HIGHLIGHT: &str = "highlight";
    pub const INSERT: &str = "insert";
    pub const ITALIC: &str = "italic";
    pub const KEYBOARD: &str = "keyboard";
    pub const LINE_THROUGH: &str = "line-through";
    pub const MONOSPACED: &str = "monospaced";
    pub const PHRASE: &str = "phrase";
    pub const QUOTE: &str = "quote";
    pub const SAMPLE: &str = "sample";
    pub const SMALL: &str = "small";
    pub const STRONG: &str = "strong";
    pub const SUBSCRIPT: &str = "subscript";
    pub const SUPERSCRIPT: &str = "superscript";
    pub const VARIABLE: &str = "variable";
}

/// Values of the `decoration` attribute.
pub mod decoration {
    pub const BOXED: &str = "boxed";
    pub const LINE_THROUGH: &str = "line-through";
    pub const OVERLINE: &str = "overline";
    pub const SOURCE: &str = "source";
    pub const UNDERLINE: &str = "underline";
}

fn frozen(key: &str, value: &str) -> FrozenAttributes {
    Attributes::new().with(key, value).freeze()
}

pub static BOLD: Lazy<FrozenAttributes> = Lazy::new(|| frozen(keys::SEMANTICS, semantics::BOLD));
pub static ITALIC: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::SEMANTICS, semantics::ITALIC));
pub static MONOSPACED: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::SEMANTICS, semantics::MONOSPACED));
pub static CODE: Lazy<FrozenAttributes> = Lazy::new(|| frozen(keys::SEMANTICS, semantics::CODE));
pub static EMPHASIS: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::SEMANTICS, semantics::EMPHASIS));
pub static STRONG: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::SEMANTICS, semantics::STRONG));
pub static SUPERSCRIPT: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::SEMANTICS, semantics::SUPERSCRIPT));
pub static SUBSCRIPT: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::SEMANTICS, semantics::SUBSCRIPT));

pub static UNDERLINE: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::DECORATION, decoration::UNDERLINE));
pub static OVERLINE: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::DECORATION, decoration::OVERLINE));
pub static LINETHROUGH: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::DECORATION, decoration::LINE_THROUGH));
pub static BOXED: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::DECORATION, decoration::BOXED));
pub static SOURCE: Lazy<FrozenAttributes> =
    Lazy::new(|| frozen(keys::DECORATION, decoration::SOURCE));

pub static LEFT: Lazy<FrozenAttributes> = Lazy::new(|| frozen(keys::ALIGN, "left"));
pub static CENTER: Lazy<FrozenAttributes> = Lazy::new(|| frozen(keys::ALIGN, "center"));
pub static RIGHT: Lazy<FrozenAttributes> = Lazy::new(|| frozen(keys::ALIGN, "right"));
pub static JUSTIFY: Lazy<FrozenAttributes> = Lazy::new(|| frozen(keys::ALIGN, "justify"));
