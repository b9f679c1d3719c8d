// Listing source: queries the SerpApi Google Shopping endpoint, or serves a
// canned sample dataset when no key is configured or the call fails.

use crate::models::{AdRecord, FetchOutcome};
use reqwest::Client;
use serde_json::Value;
use tokio::time::Duration;

const SERPAPI_ENDPOINT: &str = "https://serpapi.com/search.json";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);

// Builds the 25-item sample dataset used whenever the live API is not an
// option: 5 synthetic refrigerator ads repeated 5 times. Deterministic, no
// network involved, shaped exactly like mapped API output so the rest of the
// pipeline cannot tell the difference.
fn sample_data() -> Vec<AdRecord> {
    let examples = [
        (
            "Geladeira Consul Frost Free 340 litros",
            "R$ 1.899,00",
            "https://www.lojaexemplo.com/produto2",
            "Loja Exemplo 2",
            "https://via.placeholder.com/150?text=Produto2",
        ),
        (
            "Geladeira Brastemp Frost Free Duplex 375 litros",
            "R$ 2.199,00",
            "https://www.lojaexemplo.com/produto1",
            "Loja Exemplo 1",
            "https://via.placeholder.com/150?text=Produto1",
        ),
        (
            "Geladeira Electrolux Frost Free Inverse 454 litros",
            "R$ 3.299,00",
            "https://www.lojaexemplo.com/produto3",
            "Loja Exemplo 3",
            "https://via.placeholder.com/150?text=Produto3",
        ),
        (
            "Geladeira Samsung Side by Side 501 litros",
            "R$ 4.499,00",
            "https://www.lojaexemplo.com/produto4",
            "Loja Exemplo 4",
            "https://via.placeholder.com/150?text=Produto4",
        ),
        (
            "Geladeira LG Smart Inverter 437 litros",
            "R$ 3.999,00",
            "https://www.lojaexemplo.com/produto5",
            "Loja Exemplo 5",
            "https://via.placeholder.com/150?text=Produto5",
        ),
    ];

    let mut records = Vec::with_capacity(examples.len() * 5);
    for _ in 0..5 {
        for (title, price, product_url, store_name, image_url) in &examples {
            records.push(AdRecord {
                title: title.to_string(),
                price: price.to_string(),
                product_url: product_url.to_string(),
                store_name: store_name.to_string(),
                image_url: image_url.to_string(),
            });
        }
    }
    records
}

// Renders a numeric price in the Brazilian display format, e.g.
// 1899.0 -> "R$ 1.899,00". The API sometimes returns extracted_price as a
// bare number instead of the formatted string.
fn format_price_brl(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = (cents % 100).abs();

    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if whole < 0 { "-" } else { "" };
    format!("R$ {}{},{:02}", sign, grouped, frac)
}

fn string_field(obj: &Value, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .unwrap_or("")
        .to_string()
}

// Maps one shopping_results item from the SerpApi response into an AdRecord.
fn map_shopping_item(obj: &Value) -> AdRecord {
    let price = match obj.get("price") {
        Some(Value::String(s)) => s.clone(),
        Some(v) if v.is_number() => format_price_brl(v.as_f64().unwrap_or(0.0)),
        _ => match obj.get("extracted_price").and_then(Value::as_f64) {
            Some(n) => format_price_brl(n),
            None => String::new(),
        },
    };

    AdRecord {
        title: string_field(obj, &["title"]),
        price,
        product_url: string_field(obj, &["product_link", "link"]),
        store_name: string_field(obj, &["source", "merchant"]),
        image_url: string_field(obj, &["thumbnail", "image"]),
    }
}

// One attempt against the live endpoint. Any failure bubbles up as anyhow so
// the caller can collapse it into the fallback path.
async fn fetch_live(client: &Client, term: &str, api_key: &str) -> anyhow::Result<Vec<AdRecord>> {
    let params = [
        ("q", term),
        ("tbm", "shop"),
        ("gl", "br"),
        ("hl", "pt"),
        ("api_key", api_key),
    ];

    let response = client
        .get(SERPAPI_ENDPOINT)
        .query(&params)
        .timeout(SEARCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;

    let body: Value = response.json().await?;
    let results = body
        .get("shopping_results")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let records: Vec<AdRecord> = results.iter().map(map_shopping_item).collect();
    if records.is_empty() {
        anyhow::bail!("API returned no shopping_results for term {term:?}");
    }
    Ok(records)
}

// Fetches ads for a search term. With a configured key, exactly one request
// is made against SerpApi; on any error (network down, bad key, malformed
// body, empty result set) the sample dataset is returned instead so the run
// always completes, even fully offline. No retries.
pub async fn fetch_ads(client: &Client, term: &str, api_key: Option<&str>) -> FetchOutcome {
    let key = match api_key {
        Some(k) if !k.is_empty() => k,
        _ => {
            tracing::warn!("SERPAPI_KEY absent; using sample data");
            return FetchOutcome::Fallback(sample_data());
        }
    };

    match fetch_live(client, term, key).await {
        Ok(records) => {
            tracing::info!(term, count = records.len(), "Fetched live shopping results");
            FetchOutcome::Live(records)
        }
        Err(e) => {
            tracing::error!(term, error = %e, "SerpApi request failed; using sample data");
            FetchOutcome::Fallback(sample_data())
        }
    }
}
