use super::{parse_line, Event, EventSource, LocatedEvent, Position};
use crate::error::{Error, Result};
use log::info;
use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind, Lines},
    path::{Path, PathBuf},
    sync::Arc,
};

const PROGRESS_LINES: usize = 1000;

/// Reads the events of a single `.graph` input.
pub struct GraphReader<R: BufRead> {
    name: Arc<str>,
    lines: Lines<R>,
    line: usize,
    num_edges: usize,
    state: ReaderState,
}

#[derive(PartialEq)]
enum ReaderState {
    Reading,
    FileEnded,
    StreamEnded,
}

impl GraphReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(GraphReader::new(
            &path.display().to_string(),
            BufReader::new(file),
        ))
    }
}

impl<R: BufRead> GraphReader<R> {
    pub fn new(name: &str, reader: R) -> Self {
        Self {
            name: Arc::from(name),
            lines: reader.lines(),
            line: 0,
            num_edges: 0,
            state: ReaderState::Reading,
        }
    }

    fn position(&self) -> Position {
        Position {
            file: self.name.clone(),
            line: self.line,
        }
    }

    fn located(&self, event: Event) -> LocatedEvent {
        LocatedEvent {
            position: self.position(),
            event,
        }
    }
}

impl<R: BufRead> EventSource for GraphReader<R> {
    fn next_event(&mut self) -> Result<LocatedEvent> {
        match self.state {
            ReaderState::FileEnded | ReaderState::StreamEnded => {
                self.state = ReaderState::StreamEnded;
                return Ok(self.located(Event::EndOfStream));
            }
            ReaderState::Reading => {}
        }
        while let Some(line) = self.lines.next() {
            self.line += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    return Err(Error::MalformedRecord {
                        position: self.position(),
                        message: e.to_string(),
                    })
                }
                Err(e) => return Err(e.into()),
            };
            if self.line % PROGRESS_LINES == 0 {
                info!(
                    "read {} lines ({} edges) from {}",
                    self.line, self.num_edges, self.name
                );
            }
            match parse_line(&line) {
                Ok(Some(event)) => {
                    if let Event::EdgeDeclared { .. } = event {
                        self.num_edges += 1;
                    }
                    return Ok(self.located(event));
                }
                Ok(None) => {}
                Err(message) => {
                    return Err(Error::MalformedRecord {
                        position: self.position(),
                        message,
                    })
                }
            }
        }
        info!(
            "read {} lines ({} edges) from {}",
            self.line, self.num_edges, self.name
        );
        self.state = ReaderState::FileEnded;
        Ok(self.located(Event::EndOfFile))
    }
}

/// Reads `1.graph` .. `<num_files>.graph` from a directory as one logical stream.
///
/// Files are opened lazily, one at a time. Each file ends with an `EndOfFile` event,
/// the last one is followed by `EndOfStream`.
pub struct GraphSequence {
    dir: PathBuf,
    num_files: usize,
    next_file: usize,
    current: Option<GraphReader<BufReader<File>>>,
}

impl GraphSequence {
    pub fn new<P: AsRef<Path>>(dir: P, num_files: usize) -> Result<Self> {
        if num_files == 0 {
            return Err(Error::InvalidHyperparameter {
                name: "num_files",
                value: num_files,
            });
        }
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            num_files,
            next_file: 1,
            current: None,
        })
    }

    /// The paths of the files, in stream order.
    pub fn paths(&self) -> Vec<PathBuf> {
        (1..=self.num_files)
            .map(|i| self.dir.join(format!("{}.graph", i)))
            .collect()
    }
}

impl EventSource for GraphSequence {
    fn next_event(&mut self) -> Result<LocatedEvent> {
        loop {
            if let Some(reader) = self.current.as_mut() {
                let located = reader.next_event()?;
                if located.event != Event::EndOfStream {
                    return Ok(located);
                }
                if self.next_file > self.num_files {
                    return Ok(located);
                }
                self.current = None;
            }
            let path = self.dir.join(format!("{}.graph", self.next_file));
            info!("opening {}", path.display());
            self.current = Some(GraphReader::open(&path)?);
            self.next_file += 1;
        }
    }
}
