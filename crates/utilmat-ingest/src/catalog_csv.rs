// crates/utilmat-ingest/src/catalog_csv.rs
//
// Item catalog loader for CSV tables with a header row.
//
// Accepts `movieId`/`itemId`/`item_id` for the id column and
// `title`/`movie_title`/`itemName`/`item_name` for the name column; other
// columns (e.g. `genres`) are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use utilmat_core::{Catalog, CatalogEntry, UtilmatError};

use crate::encoding::TextEncoding;

/// Load a catalog from a CSV file.
pub fn load_catalog<P: AsRef<Path>>(
    path: P,
    encoding: TextEncoding,
) -> Result<Catalog, UtilmatError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| UtilmatError::Catalog(format!("cannot open {}: {}", path.display(), e)))?;
    let catalog = read_catalog(BufReader::new(file), encoding)?;
    tracing::info!(
        "Loaded catalog from {}: {} items",
        path.display(),
        catalog.len()
    );
    Ok(catalog)
}

/// Read a catalog from any CSV byte stream.
pub fn read_catalog<R: Read>(reader: R, encoding: TextEncoding) -> Result<Catalog, UtilmatError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader
        .byte_headers()
        .map_err(|e| UtilmatError::Catalog(format!("cannot read header row: {}", e)))?
        .clone();
    let headers = encoding
        .decode(&headers)
        .map_err(|e| UtilmatError::Catalog(format!("cannot decode header row: {}", e)))?;

    let mut catalog = Catalog::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| UtilmatError::Catalog(e.to_string()))?;
        let line = record.position().map_or(0, |p| p.line());
        let record = encoding.decode(&record).map_err(|e| {
            UtilmatError::Catalog(format!("cannot decode catalog row at line {}: {}", line, e))
        })?;
        let entry: CatalogEntry = record
            .deserialize(Some(&headers))
            .map_err(|e| UtilmatError::Catalog(format!("malformed catalog row: {}", e)))?;
        catalog.insert(entry.item_id, entry.item_name);
    }

    if catalog.ignored_duplicates() > 0 {
        tracing::warn!(
            "Catalog lists {} repeated item ids; the first name of each was kept",
            catalog.ignored_duplicates()
        );
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_movielens_layout() {
        let data = "movieId,title,genres\n\
                    1,Toy Story (1995),Animation|Children\n\
                    2,\"Heat, The (1995)\",Action\n";
        let catalog = read_catalog(data.as_bytes(), TextEncoding::Utf8).expect("read");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name_of("2"), Some("Heat, The (1995)"));
    }

    #[test]
    fn accepts_generic_headers() {
        let data = "item_id,item_name\na,Alpha\nb,Beta\n";
        let catalog = read_catalog(data.as_bytes(), TextEncoding::Utf8).expect("read");
        assert_eq!(catalog.name_of("b"), Some("Beta"));
    }

    #[test]
    fn missing_name_column_is_a_catalog_error() {
        let data = "movieId,genres\n1,Drama\n";
        let result = read_catalog(data.as_bytes(), TextEncoding::Utf8);
        assert!(matches!(result, Err(UtilmatError::Catalog(_))));
    }

    #[test]
    fn invalid_utf8_is_a_catalog_error_with_line() {
        let data: &[u8] = b"movieId,title\n1,Alpha\n7,Am\xe9lie (2001)\n";
        match read_catalog(data, TextEncoding::Utf8) {
            Err(UtilmatError::Catalog(msg)) => {
                assert!(msg.contains("line 3"), "{}", msg);
                assert!(!msg.contains("Serialization"), "{}", msg);
            }
            other => panic!("expected a catalog error, got {:?}", other),
        }
    }

    #[test]
    fn latin1_titles_decode() {
        let data: &[u8] = b"movieId,title\n7,Am\xe9lie (2001)\n";
        let catalog = read_catalog(data, TextEncoding::Latin1).expect("read");
        assert_eq!(catalog.name_of("7"), Some("Amélie (2001)"));
    }
}
