//! Ordered composition of wrapper sinks.
//!
//! Each [`SinkWrapperFactory`] decorates a sink with one cross-cutting policy. When
//! several are configured, [`wrap_sink`] orders them by descending priority (ties by
//! name) so the same configuration always yields the same chain. The highest priority
//! factory becomes the outermost wrapper and therefore sees every event first.

use crate::sink::Sink;

pub trait SinkWrapperFactory {
    fn name(&self) -> &str;

    /// Higher values wrap further out.
    fn priority(&self) -> i32 {
        0
    }

    fn wrap<'a>(&self, sink: Box<dyn Sink + 'a>) -> Box<dyn Sink + 'a>;
}

/// Wraps `sink` with every factory, highest priority outermost.
pub fn wrap_sink<'a>(
    sink: Box<dyn Sink + 'a>,
    factories: &[Box<dyn SinkWrapperFactory>],
) -> Box<dyn Sink + 'a> {
    let mut ordered: Vec<&dyn SinkWrapperFactory> = factories.iter().map(|f| f.as_ref()).collect();
    ordered.sort_by(|a, b| {
        b.priority()
            .cmp(&a.priority())
            .then_with(|| a.name().cmp(b.name()))
    });

    // Innermost first, so the head of the ordering ends up outside.
    ordered
        .into_iter()
        .rev()
        .fold(sink, |inner, factory| factory.wrap(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::sink::{Event, SinkExt, Tag};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Trace = Rc<RefCell<Vec<String>>>;

    struct Tracing<'a> {
        label: String,
        trace: Trace,
        inner: Box<dyn Sink + 'a>,
    }

    impl Sink for Tracing<'_> {
        fn emit(&mut self, event: Event) -> Result<(), SinkError> {
            self.trace.borrow_mut().push(self.label.clone());
            self.inner.emit(event)
        }
    }

    struct Factory {
        name: &'static str,
        priority: i32,
        trace: Trace,
    }

    impl SinkWrapperFactory for Factory {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn wrap<'a>(&self, sink: Box<dyn Sink + 'a>) -> Box<dyn Sink + 'a> {
            Box::new(Tracing {
                label: self.name.to_string(),
                trace: Rc::clone(&self.trace),
                inner: sink,
            })
        }
    }

    #[test]
    fn highest_priority_is_outermost() {
        let trace: Trace = Rc::default();
        let factory = |name, priority| -> Box<dyn SinkWrapperFactory> {
            Box::new(Factory {
                name,
                priority,
                trace: Rc::clone(&trace),
            })
        };
        let factories = vec![factory("low", 1), factory("high", 10), factory("mid", 5)];

        let mut events: Vec<Event> = Vec::new();
        {
            let mut sink = wrap_sink(Box::new(&mut events), &factories);
            sink.start(Tag::Paragraph).unwrap();
        }

        assert_eq!(*trace.borrow(), vec!["high", "mid", "low"]);
        assert_eq!(events, vec![Event::start(Tag::Paragraph)]);
    }

    #[test]
    fn ties_are_ordered_by_name() {
        let trace: Trace = Rc::default();
        let factories: Vec<Box<dyn SinkWrapperFactory>> = ["b", "a"]
            .into_iter()
            .map(|name| {
                Box::new(Factory {
                    name,
                    priority: 0,
                    trace: Rc::clone(&trace),
                }) as Box<dyn SinkWrapperFactory>
            })
            .collect();

        let mut sink = wrap_sink(Box::new(Vec::<Event>::new()), &factories);
        sink.emit(Event::PageBreak).unwrap();
        assert_eq!(*trace.borrow(), vec!["a", "b"]);
    }
}
