// crates/utilmat-core/src/traits.rs

use crate::error::UtilmatError;
use crate::event::RatingEvent;

/// Sequential iterator of fixed-size event batches.
///
/// Every batch holds at most the requested chunk size; only the last may be
/// shorter. An `Err` item ends the build.
pub type EventBatches<'a> = Box<dyn Iterator<Item = Result<Vec<RatingEvent>, UtilmatError>> + 'a>;

/// Trait for batch producers feeding the streaming build path.
///
/// Implemented by utilmat-ingest (CSV files) and utilmat-build (preloaded
/// events). The location string is opaque to the pipeline; only the source
/// interprets it. Sources must be re-iterable: each call to `batches`
/// starts from the beginning.
pub trait EventSource {
    /// Open the source at `location` and yield batches of `chunk_size` events.
    fn batches<'a>(
        &'a self,
        location: &str,
        chunk_size: usize,
    ) -> Result<EventBatches<'a>, UtilmatError>;
}
