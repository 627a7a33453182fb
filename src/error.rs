//! Error management.

use crate::{
    front_end::Position,
    types::{VId, VLabel},
};
use derive_more::Display;

#[derive(Debug, Display)]
pub enum Error {
    #[display(fmt = "malformed record at {}: {}", position, message)]
    MalformedRecord { position: Position, message: String },
    #[display(fmt = "unknown vertex {} at {}", vid, position)]
    UnknownVertex { position: Position, vid: VId },
    #[display(
        fmt = "vertex {} relabeled from {} to {} at {}",
        vid,
        old,
        new,
        position
    )]
    VertexRelabeled {
        position: Position,
        vid: VId,
        old: VLabel,
        new: VLabel,
    },
    #[display(fmt = "invalid hyperparameter {}={}: must be >= 1", name, value)]
    InvalidHyperparameter { name: &'static str, value: usize },
    #[display(fmt = "dictionary holds {} entries after eviction to {}", len, theta)]
    CapacityInvariantViolation { len: usize, theta: usize },
    #[display(fmt = "cannot record a pattern without edges")]
    EmptyPattern,
    #[display(fmt = "cannot record a disconnected pattern")]
    DisconnectedPattern,
    #[display(fmt = "the stream has already been closed")]
    StreamClosed,
    #[display(
        fmt = "saved state has directed={} but the run has directed={}",
        saved,
        run
    )]
    IncompatibleState { saved: bool, run: bool },
    #[display(fmt = "corrupt saved state: {}", _0)]
    CorruptState(String),
    #[display(fmt = "{}", _0)]
    Io(std::io::Error),
    #[display(fmt = "{}", _0)]
    Sqlite(rusqlite::Error),
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Sqlite(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
