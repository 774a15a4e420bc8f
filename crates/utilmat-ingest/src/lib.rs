// crates/utilmat-ingest/src/lib.rs
//
// utilmat-ingest: File-backed collaborators of the matrix pipeline.
//
// Loads the item catalog from a CSV table and streams rating events from a
// CSV log in fixed-size batches, decoding fields as UTF-8 or ISO-8859-1.

pub mod catalog_csv;
pub mod encoding;
pub mod events_csv;

pub use catalog_csv::{load_catalog, read_catalog};
pub use encoding::TextEncoding;
pub use events_csv::{read_events, CsvBatches, CsvEventSource};
