//! Fetch a database file over HTTP.

use std::path::Path;

use super::StoreError;

/// Download `url` into `file_path`.
///
/// The body is fetched completely before anything is written, so a failed
/// download leaves no partial file behind.
pub async fn download_database(url: &str, file_path: &Path) -> Result<(), StoreError> {
    log::info!("Downloading database from {}...", url);

    let bytes = async {
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await
    }
    .await
    .map_err(|e| {
        log::error!("Error: Failed to download database. {}", e);
        StoreError::Download(e.to_string())
    })?;

    tokio::fs::write(file_path, &bytes).await?;
    log::info!("Download complete.");
    Ok(())
}
