use crate::error::SinkError;
use crate::location::Location;
use crate::sink::{Event, Sink};

/// Sends every event to each of its sinks, in list order.
#[derive(Default)]
pub struct FanOutSink<'a> {
    sinks: Vec<Box<dyn Sink + 'a>>,
}

impl<'a> FanOutSink<'a> {
    pub fn new(sinks: Vec<Box<dyn Sink + 'a>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Box<dyn Sink + 'a>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Sink for FanOutSink<'_> {
    fn emit(&mut self, event: Event) -> Result<(), SinkError> {
        if let Some((last, rest)) = self.sinks.split_last_mut() {
            for sink in rest {
                sink.emit(event.clone())?;
            }
            last.emit(event)?;
        }
        Ok(())
    }

    fn locate(&mut self, location: &Location) {
        for sink in &mut self.sinks {
            sink.locate(location);
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        for sink in &mut self.sinks {
            sink.close()?;
        }
        Ok(())
    }
}
