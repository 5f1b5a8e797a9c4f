//! Section indexing, with optional anchor creation for untitled targets.

use crate::common::ids::encode_id;
use crate::error::SinkError;
use crate::index::IndexEntry;
use crate::location::Location;
use crate::sink::attributes::keys;
use crate::sink::{Event, Sink, SinkWrapperFactory, Tag, TagKind};
use std::collections::HashSet;

/// Builds an [`IndexEntry`] tree from section events while passing every event on.
///
/// An entry takes its id from the section's `id` attribute, or else from the first
/// anchor inside its title. In anchor mode ([`IndexingSink::with_anchors`]) titles
/// that end up without an id get a generated anchor inserted at the start of the
/// title, so every entry of the index can be linked to.
pub struct IndexingSink<S: Sink> {
    inner: S,
    root: IndexEntry,
    open: Vec<IndexEntry>,
    create_anchors: bool,
    used_ids: HashSet<String>,
    title: Option<TitleState>,
}

struct TitleState {
    level: u8,
    attributes: crate::sink::Attributes,
    text: String,
    has_anchor: bool,
    held: Vec<Event>,
}

impl<S: Sink> IndexingSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            root: IndexEntry::root(),
            open: Vec::new(),
            create_anchors: false,
            used_ids: HashSet::new(),
            title: None,
        }
    }

    pub fn with_anchors(inner: S) -> Self {
        Self {
            create_anchors: true,
            ..Self::new(inner)
        }
    }

    /// Sections closed so far. Complete once the sink has been closed.
    pub fn index(&self) -> &IndexEntry {
        &self.root
    }

    pub fn into_parts(mut self) -> (S, IndexEntry) {
        self.close_open_entries();
        (self.inner, self.root)
    }

    fn close_open_entries(&mut self) {
        while let Some(entry) = self.open.pop() {
            self.attach(entry);
        }
    }

    fn attach(&mut self, entry: IndexEntry) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(entry),
            None => self.root.children.push(entry),
        }
    }

    fn unique_id(&mut self, base: String) -> String {
        if self.used_ids.insert(base.clone()) {
            return base;
        }
        let mut counter = 1;
        loop {
            let candidate = format!("{base}_{counter}");
            if self.used_ids.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn end_title(&mut self, state: TitleState) -> Result<(), SinkError> {
        let title = state.text.trim().to_string();
        let mut generated = None;

        if let Some(entry) = self.open.last_mut() {
            entry.title = title.clone();
        }
        let needs_anchor = self.create_anchors
            && !state.has_anchor
            && self.open.last().map(|e| e.id.is_none()).unwrap_or(false);
        if needs_anchor {
            if let Some(base) = encode_id(&title) {
                let id = self.unique_id(base);
                if let Some(entry) = self.open.last_mut() {
                    entry.id = Some(id.clone());
                }
                generated = Some(id);
            }
        }

        if self.create_anchors {
            self.inner
                .emit(Event::Start(Tag::SectionTitle(state.level), state.attributes))?;
            if let Some(id) = generated {
                self.inner.emit(Event::start(Tag::Anchor(id)))?;
                self.inner.emit(Event::end(TagKind::Anchor))?;
            }
            for event in state.held {
                self.inner.emit(event)?;
            }
        }
        self.inner.emit(Event::end(TagKind::SectionTitle(state.level)))
    }
}

impl<S: Sink> Sink for IndexingSink<S> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        match &event {
            Event::Start(Tag::Section(level), attributes) => {
                let mut entry = IndexEntry::new(*level);
                if let Some(id) = attributes.get(keys::ID) {
                    self.used_ids.insert(id.to_string());
                    entry.id = Some(id.to_string());
                }
                self.open.push(entry);
            }
            Event::End(TagKind::Section(_)) => {
                if let Some(entry) = self.open.pop() {
                    self.attach(entry);
                }
            }
            Event::Start(Tag::SectionTitle(level), attributes) if self.title.is_none() => {
                self.title = Some(TitleState {
                    level: *level,
                    attributes: attributes.clone(),
                    text: String::new(),
                    has_anchor: false,
                    held: Vec::new(),
                });
                if self.create_anchors {
                    return Ok(());
                }
            }
            Event::End(TagKind::SectionTitle(_)) => {
                if let Some(state) = self.title.take() {
                    return self.end_title(state);
                }
            }
            Event::Start(Tag::Anchor(name), _) => {
                self.used_ids.insert(name.clone());
                if let Some(state) = self.title.as_mut() {
                    state.has_anchor = true;
                    if let Some(entry) = self.open.last_mut() {
                        if entry.id.is_none() {
                            entry.id = Some(name.clone());
                        }
                    }
                }
            }
            Event::Text(text, _) => {
                if let Some(state) = self.title.as_mut() {
                    state.text.push_str(text);
                }
            }
            Event::NonBreakingSpace => {
                if let Some(state) = self.title.as_mut() {
                    state.text.push(' ');
                }
            }
            _ => {}
        }

        match self.title.as_mut() {
            Some(state) if self.create_anchors => {
                state.held.push(event);
                Ok(())
            }
            _ => self.inner.emit(event),
        }
    }

    fn locate(&mut self, location: &Location) {
        self.inner.locate(location);
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.close_open_entries();
        self.inner.close()
    }
}

/// Pipeline factory inserting anchors for index entries. Runs outside other wrappers
/// so that they see the generated anchors.
pub struct AnchorsForIndexEntries;

impl SinkWrapperFactory for AnchorsForIndexEntries {
    fn name(&self) -> &str {
        "anchors-for-index-entries"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn wrap<'a>(&self, sink: Box<dyn Sink + 'a>) -> Box<dyn Sink + 'a> {
        Box::new(IndexingSink::with_anchors(sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{Attributes, SinkAdapter, SinkExt};

    fn section(sink: &mut dyn Sink, level: u8, title: &str) -> Result<(), SinkError> {
        sink.start(Tag::Section(level))?;
        sink.wrap_text(Tag::SectionTitle(level), title)
    }

    #[test]
    fn builds_nested_index() {
        let mut sink = IndexingSink::new(SinkAdapter);
        section(&mut sink, 1, "Intro").unwrap();
        section(&mut sink, 2, "Details").unwrap();
        sink.end(TagKind::Section(2)).unwrap();
        sink.end(TagKind::Section(1)).unwrap();
        section(&mut sink, 1, "Usage").unwrap();
        sink.close().unwrap();

        let index = sink.index();
        assert_eq!(index.children.len(), 2);
        assert_eq!(index.children[0].title, "Intro");
        assert_eq!(index.children[0].children[0].title, "Details");
        assert_eq!(index.children[0].children[0].level, 2);
        assert_eq!(index.children[1].title, "Usage");
        assert_eq!(index.children[1].id, None);
    }

    #[test]
    fn ids_come_from_attributes_or_title_anchors() {
        let mut sink = IndexingSink::new(SinkAdapter);
        sink.start_with(Tag::Section(1), Attributes::new().with(keys::ID, "top"))
            .unwrap();
        sink.wrap_text(Tag::SectionTitle(1), "Top").unwrap();
        sink.end(TagKind::Section(1)).unwrap();

        sink.start(Tag::Section(1)).unwrap();
        sink.start(Tag::SectionTitle(1)).unwrap();
        sink.start(Tag::Anchor("second".into())).unwrap();
        sink.text("Second").unwrap();
        sink.end(TagKind::Anchor).unwrap();
        sink.end(TagKind::SectionTitle(1)).unwrap();
        sink.end(TagKind::Section(1)).unwrap();

        let (_, index) = sink.into_parts();
        assert_eq!(index.children[0].id.as_deref(), Some("top"));
        assert_eq!(index.children[1].id.as_deref(), Some("second"));
        assert_eq!(index.children[1].title, "Second");
    }

    #[test]
    fn inserts_unique_anchors_for_titles() {
        let mut sink = IndexingSink::with_anchors(Vec::new());
        section(&mut sink, 1, "Getting Started").unwrap();
        sink.end(TagKind::Section(1)).unwrap();
        section(&mut sink, 1, "Getting Started").unwrap();
        sink.end(TagKind::Section(1)).unwrap();

        let (events, index) = sink.into_parts();
        assert_eq!(index.children[0].id.as_deref(), Some("Getting_Started"));
        assert_eq!(index.children[1].id.as_deref(), Some("Getting_Started_1"));
        assert_eq!(
            &events[..5],
            &[
                Event::start(Tag::Section(1)),
                Event::start(Tag::SectionTitle(1)),
                Event::start(Tag::Anchor("Getting_Started".into())),
                Event::end(TagKind::Anchor),
                Event::text("Getting Started"),
            ]
        );
        assert!(crate::sink::check_balanced(&events).is_ok());
    }

    #[test]
    fn existing_anchor_is_kept() {
        let mut sink = IndexingSink::with_anchors(Vec::new());
        sink.start(Tag::Section(1)).unwrap();
        sink.start(Tag::SectionTitle(1)).unwrap();
        sink.start(Tag::Anchor("mine".into())).unwrap();
        sink.end(TagKind::Anchor).unwrap();
        sink.text("Title").unwrap();
        sink.end(TagKind::SectionTitle(1)).unwrap();
        sink.end(TagKind::Section(1)).unwrap();

        let (events, _) = sink.into_parts();
        let anchors = events
            .iter()
            .filter(|e| matches!(e, Event::Start(Tag::Anchor(_), _)))
            .count();
        assert_eq!(anchors, 1);
    }
}
