// crates/utilmat-build/src/source.rs
//
// Event source over a preloaded event set.
//
// Lets the streaming path run without a file: the events are handed out in
// fixed-size batches, in order. The location string is ignored.

use utilmat_core::{EventBatches, EventSource, RatingEvent, UtilmatError};

/// Batches a vector of events already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSource {
    events: Vec<RatingEvent>,
}

impl MemoryEventSource {
    pub fn new(events: Vec<RatingEvent>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for MemoryEventSource {
    fn batches<'a>(
        &'a self,
        _location: &str,
        chunk_size: usize,
    ) -> Result<EventBatches<'a>, UtilmatError> {
        if chunk_size == 0 {
            return Err(UtilmatError::Usage("chunk size must be at least 1".to_string()));
        }
        Ok(Box::new(
            self.events.chunks(chunk_size).map(|chunk| Ok(chunk.to_vec())),
        ))
    }
}
