// crates/utilmat-ingest/src/encoding.rs
//
// Text decoding of raw CSV fields.

use std::fmt;
use std::str::FromStr;

use csv::{ByteRecord, FromUtf8Error, StringRecord};
use serde::{Deserialize, Serialize};
use utilmat_core::UtilmatError;

/// Character encoding of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1: every byte is the code point of the same value.
    #[default]
    Latin1,
}

impl TextEncoding {
    /// Decode a raw record into text fields.
    ///
    /// Only UTF-8 can fail; callers map the error to their own boundary.
    pub fn decode(&self, record: &ByteRecord) -> Result<StringRecord, FromUtf8Error> {
        match self {
            TextEncoding::Utf8 => StringRecord::from_byte_record(record.clone()),
            TextEncoding::Latin1 => {
                let fields: Vec<String> = record
                    .iter()
                    .map(|field| field.iter().map(|&b| char::from(b)).collect())
                    .collect();
                let mut decoded = StringRecord::from(fields);
                decoded.set_position(record.position().cloned());
                Ok(decoded)
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "utf8"),
            TextEncoding::Latin1 => write!(f, "latin1"),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = UtilmatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Latin1),
            other => Err(UtilmatError::Usage(format!(
                "unsupported encoding {:?} (expected \"utf8\" or \"latin1\")",
                other
            ))),
        }
    }
}
