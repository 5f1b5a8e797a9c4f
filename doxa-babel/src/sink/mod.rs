//! The event-sink contract.
//!
//! Parsers push [`Event`]s into a [`Sink`]; renderers and decorators implement it. Any
//! parser can drive any renderer because this module is the only thing they share.
//!
//! Sinks are single-threaded and stateful: give each document its own instance.

pub mod attributes;
pub mod event;
pub mod pipeline;
pub mod wrappers;

pub use attributes::{AttrValue, AttributeError, Attributes, FrozenAttributes};
pub use event::{Event, Justification, Numbering, Tag, TagKind};
pub use pipeline::{wrap_sink, SinkWrapperFactory};

use crate::error::SinkError;
use crate::location::Location;

/// Consumer of structural document events.
pub trait Sink {
    fn emit(&mut self, event: Event) -> Result<(), SinkError>;

    /// Tells the sink where in the source the upcoming events come from.
    fn locate(&mut self, _location: &Location) {}

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        (**self).emit(event)
    }

    fn locate(&mut self, location: &Location) {
        (**self).locate(location)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        (**self).close()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        (**self).emit(event)
    }

    fn locate(&mut self, location: &Location) {
        (**self).locate(location)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        (**self).close()
    }
}

/// Recording sink: the events themselves are the document.
impl Sink for Vec<Event> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        self.push(event);
        Ok(())
    }
}

/// Sink that accepts and discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkAdapter;

impl Sink for SinkAdapter {
    fn emit(&mut self, _event: Event) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Shorthands for emitting common events.
pub trait SinkExt: Sink {
    fn start(&mut self, tag: Tag) -> Result<(), SinkError> {
        self.emit(Event::Start(tag, Attributes::new()))
    }

    fn start_with(&mut self, tag: Tag, attributes: Attributes) -> Result<(), SinkError> {
        self.emit(Event::Start(tag, attributes))
    }

    fn end(&mut self, kind: TagKind) -> Result<(), SinkError> {
        self.emit(Event::End(kind))
    }

    fn text(&mut self, text: &str) -> Result<(), SinkError> {
        self.emit(Event::text(text))
    }

    /// Emits `start`, the text, and the matching end.
    fn wrap_text(&mut self, tag: Tag, text: &str) -> Result<(), SinkError> {
        let kind = tag.kind();
        self.start(tag)?;
        if !text.is_empty() {
            self.text(text)?;
        }
        self.end(kind)
    }
}

impl<S: Sink + ?Sized> SinkExt for S {}

/// Feeds recorded events into `sink`, in order.
pub fn replay<'a, I>(events: I, sink: &mut dyn Sink) -> Result<(), SinkError>
where
    I: IntoIterator<Item = &'a Event>,
{
    for event in events {
        sink.emit(event.clone())?;
    }
    Ok(())
}

/// Checks stack discipline: every end closes the innermost open begin of its kind and
/// nothing is left open.
pub fn check_balanced<'a, I>(events: I) -> Result<(), SinkError>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut open: Vec<TagKind> = Vec::new();
    for event in events {
        match event {
            Event::Start(tag, _) => open.push(tag.kind()),
            Event::End(kind) => match open.pop() {
                Some(top) if top == *kind => {}
                Some(top) => {
                    return Err(SinkError::Unbalanced(format!(
                        "{} closes {}",
                        kind.end_name(),
                        top.start_name()
                    )))
                }
                None => {
                    return Err(SinkError::Unbalanced(format!(
                        "{} without matching {}",
                        kind.end_name(),
                        kind.start_name()
                    )))
                }
            },
            _ => {}
        }
    }
    match open.last() {
        Some(kind) => Err(SinkError::Unbalanced(format!(
            "{} never closed",
            kind.start_name()
        ))),
        None => Ok(()),
    }
}
