// Runtime configuration, loaded with the 'config' crate plus 'dotenv'.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    // SerpApi key; when absent or empty the scraper serves the sample dataset.
    pub serpapi_key: Option<String>,
    pub raw_csv_path: String,
    pub sorted_csv_path: String,
    pub images_dir: String,
    // How many of the cheapest items get printed at the end of a run.
    pub top_n: usize,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("raw_csv_path", "anuncios.csv")?
            .set_default("sorted_csv_path", "anuncios_ordenados.csv")?
            .set_default("images_dir", "imagens")?
            .set_default("top_n", 20)?
            // Optional config.toml can override the defaults
            .add_source(File::with_name("config").required(false))
            // Environment wins; SERPAPI_KEY lands in serpapi_key
            .add_source(Environment::default());

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    // The key as the scraper wants it: None when unset or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.serpapi_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
