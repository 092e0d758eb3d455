use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::entity::EntityEvent;
use crate::{Error, Result};

/// An entity event log produced by the replay decoder, one JSON object per
/// line. Logs ending in `.gz` are decompressed on the fly.
///
/// The underlying file is closed when the `ReplayFile` or the
/// [`EventStream`] built from it is dropped.
pub struct ReplayFile {
    reader: Box<dyn BufRead>,
}

impl ReplayFile {
    pub fn open(path: &Path) -> Result<ReplayFile> {
        let file = File::open(path)?;
        let compressed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

        let reader: Box<dyn BufRead> = if compressed {
            debug!("opening {} as gzip", path.display());
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        Ok(ReplayFile { reader })
    }

    pub fn from_reader(reader: impl Read + 'static) -> ReplayFile {
        ReplayFile {
            reader: Box::new(BufReader::new(reader)),
        }
    }

    /// Consumes the file; the stream can only be walked once.
    pub fn events(self) -> EventStream<Box<dyn BufRead>> {
        EventStream::new(self.reader)
    }
}

/// Lazily decodes one [`EntityEvent`] per non-blank line.
///
/// The first error ends the stream.
pub struct EventStream<R> {
    reader: R,
    line: usize,
    buf: String,
    failed: bool,
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
            failed: false,
        }
    }

    fn next_event(&mut self) -> Result<Option<EntityEvent>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return serde_json::from_str(text)
                .map(Some)
                .map_err(|source| Error::Json {
                    line: self.line,
                    source,
                });
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<EntityEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.next_event();
        if next.is_err() {
            self.failed = true;
        }
        next.transpose()
    }
}
