use crate::{
    error::Result,
    types::{ELabel, VId, VLabel},
};
use derive_more::Display;
use std::sync::Arc;

/// What the stream tells the compressor, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    VertexDeclared {
        id: VId,
        label: VLabel,
    },
    EdgeDeclared {
        source: VId,
        target: VId,
        label: ELabel,
    },
    /// The current file is exhausted; more files may follow.
    EndOfFile,
    EndOfStream,
}

/// A line in a named input.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "{}:{}", file, line)]
pub struct Position {
    pub file: Arc<str>,
    pub line: usize,
}

impl Position {
    pub fn new(file: &str, line: usize) -> Self {
        Self {
            file: Arc::from(file),
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedEvent {
    pub position: Position,
    pub event: Event,
}

/// A producer of parsed stream events.
///
/// Once `EndOfStream` has been returned every further call returns it again.
pub trait EventSource {
    fn next_event(&mut self) -> Result<LocatedEvent>;
}

/// Events held in memory, as a single file.
///
/// Event `i` is reported at line `i + 1`; an `EndOfFile` is emitted before `EndOfStream`
/// unless the list already ends with one.
pub struct EventList {
    name: Arc<str>,
    events: std::vec::IntoIter<Event>,
    line: usize,
    closed_file: bool,
}

impl EventList {
    pub fn new(name: &str, events: Vec<Event>) -> Self {
        Self {
            name: Arc::from(name),
            events: events.into_iter(),
            line: 0,
            closed_file: false,
        }
    }

    fn locate(&self, event: Event) -> LocatedEvent {
        LocatedEvent {
            position: Position {
                file: self.name.clone(),
                line: self.line,
            },
            event,
        }
    }
}

impl From<Vec<Event>> for EventList {
    fn from(events: Vec<Event>) -> Self {
        EventList::new("<memory>", events)
    }
}

impl EventSource for EventList {
    fn next_event(&mut self) -> Result<LocatedEvent> {
        let event = match self.events.next() {
            Some(Event::EndOfStream) | None if !self.closed_file => {
                self.closed_file = true;
                Event::EndOfFile
            }
            Some(Event::EndOfStream) | None => Event::EndOfStream,
            Some(event) => {
                self.line += 1;
                self.closed_file = event == Event::EndOfFile;
                event
            }
        };
        Ok(self.locate(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(mut source: impl EventSource) -> Vec<Event> {
        let mut events = vec![];
        loop {
            let event = source.next_event().unwrap().event;
            events.push(event);
            if event == Event::EndOfStream {
                return events;
            }
        }
    }

    #[test]
    fn test_event_list() {
        let v = Event::VertexDeclared { id: 1, label: 2 };
        assert_eq!(
            drain(EventList::from(vec![v])),
            vec![v, Event::EndOfFile, Event::EndOfStream]
        );
        assert_eq!(
            drain(EventList::from(vec![v, Event::EndOfFile])),
            vec![v, Event::EndOfFile, Event::EndOfStream]
        );
        assert_eq!(
            drain(EventList::from(vec![])),
            vec![Event::EndOfFile, Event::EndOfStream]
        );
    }

    #[test]
    fn test_positions() {
        let mut list = EventList::new("mem", vec![Event::EndOfFile]);
        assert_eq!(list.next_event().unwrap().position.to_string(), "mem:1");
    }
}
