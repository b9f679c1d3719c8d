// Shopping-ads pipeline: fetch listings for a search term, save them to CSV,
// download the product images, then reload the CSV sorted by price and print
// the cheapest items.
//
// Usage:
//
//     adscraper_rust [search term]
//
// With no argument the term defaults to "geladeira". Set SERPAPI_KEY (in the
// environment or a .env file) to hit the live API; without it, or if the API
// call fails, a canned sample dataset is used so the run works fully offline.

use anyhow::{Context, Result};
use reqwest::Client;
use std::env;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use adscraper_rust::models::AdRecord;
use adscraper_rust::{config, images, scraper, storage};

fn print_top(records: &[AdRecord], n: usize) {
    for (i, record) in records.iter().take(n).enumerate() {
        println!(
            "{:02}. {} — {} ({})",
            i + 1,
            record.title,
            record.price,
            record.store_name
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "adscraper_rust=info".into()))
        .with(fmt::layer())
        .init();

    // Load configuration (also pulls in .env if present)
    let settings = config::Settings::new().context("Failed to load configuration")?;

    // Search term from the command line, or the default
    let term = {
        let joined = env::args().skip(1).collect::<Vec<_>>().join(" ");
        let trimmed = joined.trim().to_string();
        if trimmed.is_empty() {
            "geladeira".to_string()
        } else {
            trimmed
        }
    };

    let client = Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36")
        .build()
        .context("Failed to build shared reqwest client")?;

    println!("Buscando anúncios para: {term:?}");
    let outcome = scraper::fetch_ads(&client, &term, settings.api_key()).await;
    if outcome.is_fallback() {
        tracing::info!("Serving offline sample data");
    }
    let records = outcome.into_records();
    if records.is_empty() {
        println!("Nenhum anúncio encontrado.");
        return Ok(());
    }

    let raw_path = std::path::Path::new(&settings.raw_csv_path);
    let sorted_path = std::path::Path::new(&settings.sorted_csv_path);
    let images_dir = std::path::Path::new(&settings.images_dir);

    // Raw records, in fetch order
    storage::save_to_csv(&records, raw_path)?;
    println!("Dados brutos salvos em '{}'.", raw_path.display());

    // Product images (placeholders when a download is not possible)
    images::download_images(&client, &records, images_dir).await?;
    println!("Imagens baixadas na pasta '{}'.", images_dir.display());

    // Reload sorted by price and persist
    let sorted = storage::load_and_sort_by_price(raw_path)?;
    storage::save_to_csv(&sorted, sorted_path)?;
    println!("Dados ordenados salvos em '{}'.", sorted_path.display());

    println!("\nTop {} produtos mais baratos:\n", settings.top_n);
    print_top(&sorted, settings.top_n);

    Ok(())
}
