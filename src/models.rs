// Data structures shared across the pipeline stages.

use serde::{Deserialize, Serialize};

// A single shopping advertisement as fetched from the search API (or the
// offline sample dataset). Field order doubles as the CSV column order:
// title, price, product_url, store_name, image_url.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdRecord {
    pub title: String,
    // Price as displayed, e.g. "R$ 1.899,00". Parsed into a number only when
    // sorting; rows whose price cannot be parsed sort to the end.
    pub price: String,
    pub product_url: String,
    pub store_name: String,
    pub image_url: String,
}

// Where a batch of records came from. The pipeline only ever consumes the
// plain record list, but keeping the variant around lets tests (and logs)
// distinguish a real API response from the offline fallback.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Live(Vec<AdRecord>),
    Fallback(Vec<AdRecord>),
}

impl FetchOutcome {
    pub fn into_records(self) -> Vec<AdRecord> {
        match self {
            FetchOutcome::Live(records) | FetchOutcome::Fallback(records) => records,
        }
    }

    pub fn records(&self) -> &[AdRecord] {
        match self {
            FetchOutcome::Live(records) | FetchOutcome::Fallback(records) => records,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchOutcome::Fallback(_))
    }
}
