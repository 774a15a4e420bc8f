// crates/utilmat-ingest/src/events_csv.rs
//
// Chunked rating event source over CSV files.
//
// The file is read sequentially; each batch holds up to `chunk_size`
// records and only one batch is held in memory at a time. A malformed
// record ends iteration with an error carrying its line number.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, Reader, ReaderBuilder, StringRecord};
use utilmat_core::{EventBatches, EventSource, RatingEvent, UtilmatError};

use crate::encoding::TextEncoding;

/// Upper bound on the initial batch allocation.
const MAX_PREALLOC: usize = 8192;

/// Event source reading a CSV ratings log (`userId,movieId,rating,...`).
///
/// The location passed to [`EventSource::batches`] is a file path.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEventSource {
    encoding: TextEncoding,
}

impl CsvEventSource {
    pub fn new(encoding: TextEncoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Batches over any CSV byte stream with a header row.
    pub fn batches_from_reader<R: Read>(
        &self,
        reader: R,
        chunk_size: usize,
    ) -> Result<CsvBatches<R>, UtilmatError> {
        CsvBatches::new(reader, self.encoding, chunk_size)
    }
}

impl EventSource for CsvEventSource {
    fn batches<'a>(
        &'a self,
        location: &str,
        chunk_size: usize,
    ) -> Result<EventBatches<'a>, UtilmatError> {
        let file = File::open(location)
            .map_err(|e| UtilmatError::Source(format!("cannot open {}: {}", location, e)))?;
        tracing::info!(
            "Streaming ratings from {} in chunks of {} ({})",
            location,
            chunk_size,
            self.encoding
        );
        Ok(Box::new(self.batches_from_reader(BufReader::new(file), chunk_size)?))
    }
}

/// Iterator of fixed-size event batches read from CSV.
pub struct CsvBatches<R: Read> {
    reader: Reader<R>,
    headers: StringRecord,
    encoding: TextEncoding,
    chunk_size: usize,
    raw: ByteRecord,
    done: bool,
}

impl<R: Read> CsvBatches<R> {
    fn new(reader: R, encoding: TextEncoding, chunk_size: usize) -> Result<Self, UtilmatError> {
        if chunk_size == 0 {
            return Err(UtilmatError::Usage("chunk size must be at least 1".to_string()));
        }
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = reader
            .byte_headers()
            .map_err(|e| UtilmatError::Source(format!("cannot read header row: {}", e)))?
            .clone();
        let headers = encoding
            .decode(&headers)
            .map_err(|e| UtilmatError::Source(format!("cannot decode header row: {}", e)))?;

        Ok(Self {
            reader,
            headers,
            encoding,
            chunk_size,
            raw: ByteRecord::new(),
            done: false,
        })
    }

    fn read_event(&mut self) -> Result<Option<RatingEvent>, UtilmatError> {
        let more = self
            .reader
            .read_byte_record(&mut self.raw)
            .map_err(|e| UtilmatError::Source(e.to_string()))?;
        if !more {
            return Ok(None);
        }

        let line = self.raw.position().map_or(0, |p| p.line());
        let record = self.encoding.decode(&self.raw).map_err(|e| {
            UtilmatError::Source(format!("cannot decode rating record at line {}: {}", line, e))
        })?;
        let event: RatingEvent = record.deserialize(Some(&self.headers)).map_err(|e| {
            UtilmatError::Source(format!("malformed rating record at line {}: {}", line, e))
        })?;
        Ok(Some(event))
    }
}

impl<R: Read> Iterator for CsvBatches<R> {
    type Item = Result<Vec<RatingEvent>, UtilmatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.chunk_size.min(MAX_PREALLOC));
        while batch.len() < self.chunk_size {
            match self.read_event() {
                Ok(Some(event)) => batch.push(event),
                Ok(None) => {
                    self.done = true;
                    break;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        if batch.is_empty() {
            None
        } else {
            Some(Ok(batch))
        }
    }
}

/// Read a whole ratings file into memory, for the in-memory build path.
pub fn read_events<P: AsRef<Path>>(
    path: P,
    encoding: TextEncoding,
) -> Result<Vec<RatingEvent>, UtilmatError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| UtilmatError::Source(format!("cannot open {}: {}", path.display(), e)))?;
    let mut events = Vec::new();
    for batch in CsvBatches::new(BufReader::new(file), encoding, MAX_PREALLOC)? {
        events.extend(batch?);
    }
    tracing::info!("Loaded {} rating events from {}", events.len(), path.display());
    Ok(events)
}
