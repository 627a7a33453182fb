//! The `.graph` stream front end.
//!
//! A `.graph` file is a sequence of lines:
//!
//! ```text
//! % comment
//! v <id> <label>
//! e <source> <target> <label>
//! ```
//!
//! `u` and `d` are accepted in place of `e`; whether edges are directed is a property of
//! the whole run.

pub use event::{Event, EventList, EventSource, LocatedEvent, Position};
pub use parser::parse_line;
pub use reader::{GraphReader, GraphSequence};

mod event;
mod parser;
mod reader;
