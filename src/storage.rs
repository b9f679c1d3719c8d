// Tabular store: CSV persistence and price-ordered reload.

use crate::error::{AppError, AppResult};
use crate::models::AdRecord;
use regex::Regex;
use std::path::Path;

pub const CSV_HEADER: [&str; 5] = ["title", "price", "product_url", "store_name", "image_url"];

// Serializes the records to a CSV file with the fixed header, overwriting any
// existing file. An empty record list is treated as a caller bug, and write
// failures propagate: an unwritable path is an environment problem the
// operator has to see.
pub fn save_to_csv(records: &[AdRecord], path: &Path) -> AppResult<()> {
    if records.is_empty() {
        return Err(AppError::EmptyInput);
    }

    let mut writer = csv::Writer::from_path(path).map_err(|source| AppError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    for record in records {
        writer.serialize(record).map_err(|source| AppError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
    }
    writer.flush().map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), rows = records.len(), "Wrote CSV");
    Ok(())
}

// Extracts a numeric value from a Brazilian-formatted price string:
// "R$ 1.899,00" -> 1899.0. Strips the currency marker and thousands
// separators, turns the decimal comma into a dot, and takes the first number
// found. Unparsable input maps to +infinity so those rows sort last.
pub fn parse_price(price: &str) -> f64 {
    let normalized = price
        .replace("R$", "")
        .replace(' ', "")
        .replace('.', "")
        .replace(',', ".");

    let number = Regex::new(r"\d+(?:\.\d+)?").unwrap();
    number
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::INFINITY)
}

// Reads a CSV previously written by save_to_csv and returns the rows sorted
// ascending by parsed price, ties kept in file order. A missing file or a
// header that does not match the expected schema is fatal; downstream stages
// have nothing sensible to do with a partial load.
pub fn load_and_sort_by_price(path: &Path) -> AppResult<Vec<AdRecord>> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| AppError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let headers = reader.headers().map_err(|source| AppError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let found: Vec<String> = headers.iter().map(str::to_string).collect();
    if found != CSV_HEADER {
        return Err(AppError::SchemaMismatch {
            path: path.to_path_buf(),
            expected: CSV_HEADER.iter().map(|s| s.to_string()).collect(),
            found,
        });
    }

    let mut keyed: Vec<(f64, AdRecord)> = Vec::new();
    for row in reader.deserialize::<AdRecord>() {
        let record = row.map_err(|source| AppError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        keyed.push((parse_price(&record.price), record));
    }

    // Stable sort keeps equal prices in file order; total_cmp because f64 is
    // only PartialOrd (the key is never NaN, at worst +inf).
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    let records: Vec<AdRecord> = keyed.into_iter().map(|(_, record)| record).collect();

    tracing::debug!(path = %path.display(), rows = records.len(), "Loaded and sorted CSV");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn record(title: &str, price: &str) -> AdRecord {
        AdRecord {
            title: title.to_string(),
            price: price.to_string(),
            product_url: format!("https://example.com/{title}"),
            store_name: "Loja".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn parses_brazilian_prices() {
        assert_eq!(parse_price("R$ 1.899,00"), 1899.0);
        assert_eq!(parse_price("R$ 2.199,00"), 2199.0);
        assert_eq!(parse_price("R$ 999,99"), 999.99);
        assert_eq!(parse_price("1234"), 1234.0);
    }

    #[test]
    fn unparsable_price_maps_to_infinity() {
        assert_eq!(parse_price(""), f64::INFINITY);
        assert_eq!(parse_price("sob consulta"), f64::INFINITY);
    }

    #[test]
    fn empty_input_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        assert!(matches!(save_to_csv(&[], &path), Err(AppError::EmptyInput)));
    }

    #[test]
    fn round_trip_preserves_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ads.csv");
        let records = vec![
            record("Geladeira A", "R$ 2.199,00"),
            record("Geladeira B", "R$ 1.899,00"),
            record("Geladeira C", "R$ 3.299,00"),
        ];
        save_to_csv(&records, &path).unwrap();

        let loaded = load_and_sort_by_price(&path).unwrap();
        assert_eq!(loaded.len(), records.len());
        // Sorted ascending: B (1899) < A (2199) < C (3299)
        assert_eq!(loaded[0], records[1]);
        assert_eq!(loaded[1], records[0]);
        assert_eq!(loaded[2], records[2]);
    }

    #[test]
    fn sort_is_ascending_and_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ads.csv");
        let records = vec![
            record("Caro", "R$ 4.499,00"),
            record("Barato", "R$ 1.899,00"),
            record("Medio", "R$ 3.299,00"),
            record("Sem preco", ""),
        ];
        save_to_csv(&records, &path).unwrap();

        let sorted = load_and_sort_by_price(&path).unwrap();
        for pair in sorted.windows(2) {
            assert!(parse_price(&pair[0].price) <= parse_price(&pair[1].price));
        }
        // Unparsable price goes last
        assert_eq!(sorted.last().unwrap().title, "Sem preco");

        // Re-saving the sorted output and reloading changes nothing
        save_to_csv(&sorted, &path).unwrap();
        let resorted = load_and_sort_by_price(&path).unwrap();
        assert_eq!(resorted, sorted);
    }

    #[test]
    fn equal_prices_keep_file_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ads.csv");
        let records = vec![
            record("Primeiro", "R$ 100,00"),
            record("Segundo", "R$ 100,00"),
            record("Terceiro", "R$ 100,00"),
        ];
        save_to_csv(&records, &path).unwrap();

        let titles: Vec<String> = load_and_sort_by_price(&path)
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["Primeiro", "Segundo", "Terceiro"]);
    }

    #[test]
    fn header_mismatch_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "titulo,preco,url\nGeladeira,R$ 100,x\n").unwrap();

        match load_and_sort_by_price(&path) {
            Err(AppError::SchemaMismatch { found, .. }) => {
                assert_eq!(found, ["titulo", "preco", "url"]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.csv");
        assert!(load_and_sort_by_price(&path).is_err());
    }
}
