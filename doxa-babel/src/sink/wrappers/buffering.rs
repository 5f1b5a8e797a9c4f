use crate::error::SinkError;
use crate::location::Location;
use crate::sink::{Event, Sink};

/// Queues every event until [`Sink::flush`], then replays them to the inner sink in
/// call order.
///
/// Lets a producer lay down structure first and decide later when it reaches the
/// renderer. A flush with nothing queued replays nothing.
pub struct BufferingSink<S: Sink> {
    inner: S,
    buffer: Vec<Event>,
}

impl<S: Sink> BufferingSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    pub fn pending(&self) -> &[Event] {
        &self.buffer
    }

    /// Drops queued events without replaying them.
    pub fn discard(&mut self) {
        self.buffer.clear();
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Sink> Sink for BufferingSink<S> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        self.buffer.push(event);
        Ok(())
    }

    fn locate(&mut self, location: &Location) {
        self.inner.locate(location);
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        for event in self.buffer.drain(..) {
            self.inner.emit(event)?;
        }
        self.inner.flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.flush()?;
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::wrappers::EventCapture;
    use crate::sink::{SinkAdapter, SinkExt, Tag, TagKind};

    #[test]
    fn replays_in_call_order_once() {
        let capture = EventCapture::new(SinkAdapter);
        let log = capture.log();
        let mut sink = BufferingSink::new(capture);

        sink.start(Tag::Bold).unwrap();
        sink.text("x").unwrap();
        sink.end(TagKind::Bold).unwrap();
        assert!(log.borrow().is_empty());

        sink.flush().unwrap();
        assert_eq!(*log.borrow(), vec!["bold", "text", "bold_"]);

        sink.flush().unwrap();
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn close_flushes() {
        let mut sink = BufferingSink::new(Vec::new());
        sink.text("late").unwrap();
        sink.close().unwrap();
        assert_eq!(sink.into_inner(), vec![Event::text("late")]);
    }

    #[test]
    fn discard_drops_pending() {
        let mut sink = BufferingSink::new(Vec::new());
        sink.text("gone").unwrap();
        sink.discard();
        sink.flush().unwrap();
        assert!(sink.inner().is_empty());
    }
}
