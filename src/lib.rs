// Fetch shopping ads for a search term, persist them to CSV, download the
// product images, and reload the rows sorted ascending by price.

pub mod config;
pub mod error;
pub mod images;
pub mod models;
pub mod scraper;
pub mod storage;
