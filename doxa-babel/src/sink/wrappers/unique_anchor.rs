use crate::error::SinkError;
use crate::location::Location;
use crate::sink::{Event, Sink, SinkWrapperFactory, Tag};
use std::collections::HashSet;

/// Rejects a document the second time any anchor name shows up.
pub struct UniqueAnchorSink<S: Sink> {
    inner: S,
    seen: HashSet<String>,
    location: Location,
}

impl<S: Sink> UniqueAnchorSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            location: Location::default(),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Sink> Sink for UniqueAnchorSink<S> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        if let Event::Start(Tag::Anchor(name), _) = &event {
            if name.is_empty() {
                return Err(SinkError::InvalidEvent(
                    "anchor name must not be empty".to_string(),
                ));
            }
            if !self.seen.insert(name.clone()) {
                return Err(SinkError::DuplicateAnchor {
                    name: name.clone(),
                    location: self.location.clone(),
                });
            }
        }
        self.inner.emit(event)
    }

    fn locate(&mut self, location: &Location) {
        self.location = location.clone();
        self.inner.locate(location);
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.inner.close()
    }
}

/// Pipeline factory for [`UniqueAnchorSink`].
pub struct UniqueAnchors;

impl SinkWrapperFactory for UniqueAnchors {
    fn name(&self) -> &str {
        "unique-anchors"
    }

    fn wrap<'a>(&self, sink: Box<dyn Sink + 'a>) -> Box<dyn Sink + 'a> {
        Box::new(UniqueAnchorSink::new(sink))
    }
}
