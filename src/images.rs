// Asset fetcher: downloads each record's image into a local directory.
//
// The destination name is "<NN>_<slug>.jpg" where NN is the 1-based record
// position zero-padded to two digits and slug is the sanitized title. The
// index prefix keeps names collision-free even when titles repeat (the sample
// dataset repeats every title five times).

use crate::error::{AppError, AppResult};
use crate::models::AdRecord;
use regex::Regex;
use reqwest::Client;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::{Duration, sleep};

const IMAGE_TIMEOUT: Duration = Duration::from_secs(15);
// Pause between downloads so we do not hammer the image hosts.
const POLITENESS_DELAY: Duration = Duration::from_millis(50);
const MAX_SLUG_LEN: usize = 60;

// Turns an arbitrary title into a safe filename stem: runs of anything
// outside [A-Za-z0-9_-] collapse to a single underscore, trimmed and capped
// at 60 chars, never empty.
pub fn slugify(name: &str) -> String {
    let unsafe_chars = Regex::new(r"[^a-zA-Z0-9_-]+").unwrap();
    let base = unsafe_chars.replace_all(name, "_");
    let base = base.trim_matches('_');
    let base = if base.is_empty() { "imagem" } else { base };
    base.chars().take(MAX_SLUG_LEN).collect()
}

// Destination path for the image of the record at 1-based position `index`.
pub fn image_path(directory: &Path, index: usize, record: &AdRecord) -> PathBuf {
    let title = if record.title.is_empty() {
        format!("produto_{index}")
    } else {
        record.title.clone()
    };
    directory.join(format!("{index:02}_{}.jpg", slugify(&title)))
}

fn write_placeholder(path: &Path) -> AppResult<()> {
    fs::File::create(path)
        .map(|_| ())
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })
}

// Downloads every record's image, strictly one at a time in record order.
// A missing URL, a network error, or a non-2xx status produces a zero-byte
// placeholder file instead of failing the run; only local filesystem errors
// (directory not creatable, file not writable) propagate.
pub async fn download_images(
    client: &Client,
    records: &[AdRecord],
    directory: &Path,
) -> AppResult<()> {
    fs::create_dir_all(directory).map_err(|source| AppError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    for (i, record) in records.iter().enumerate() {
        let index = i + 1;
        let path = image_path(directory, index, record);

        if record.image_url.is_empty() {
            tracing::debug!(index, path = %path.display(), "No image URL; writing placeholder");
            write_placeholder(&path)?;
            continue;
        }

        match fetch_image(client, &record.image_url).await {
            Ok(bytes) => {
                fs::write(&path, &bytes).map_err(|source| AppError::Io {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!(index, bytes = bytes.len(), path = %path.display(), "Saved image");
                sleep(POLITENESS_DELAY).await;
            }
            Err(e) => {
                tracing::warn!(index, url = %record.image_url, error = %e, "Image download failed; writing placeholder");
                write_placeholder(&path)?;
            }
        }
    }
    Ok(())
}

async fn fetch_image(client: &Client, url: &str) -> anyhow::Result<Vec<u8>> {
    let bytes = client
        .get(url)
        .timeout(IMAGE_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    Ok(bytes.to_vec())
}
