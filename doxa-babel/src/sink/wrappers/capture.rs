use crate::error::SinkError;
use crate::location::Location;
use crate::sink::{Event, Sink};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle on the names recorded by an [`EventCapture`].
pub type CaptureLog = Rc<RefCell<Vec<&'static str>>>;

/// Records the name of every event that passes through, then delegates.
///
/// The log is shared so it stays readable after the capture has been boxed into a
/// pipeline.
pub struct EventCapture<S: Sink> {
    inner: S,
    log: CaptureLog,
}

impl<S: Sink> EventCapture<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn log(&self) -> CaptureLog {
        Rc::clone(&self.log)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.log.borrow().clone()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Sink> Sink for EventCapture<S> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        self.log.borrow_mut().push(event.name());
        self.inner.emit(event)
    }

    fn locate(&mut self, location: &Location) {
        self.inner.locate(location);
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.inner.flush()
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.inner.close()
    }
}
