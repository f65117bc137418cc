// src/services/source.rs

//! Raw list sources.
//!
//! List files are named `{date}{file_code}.txt`. Over HTTP the direct URL is
//! tried first, then each configured proxy in order; the first endpoint that
//! answers with a non-empty body wins.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{FetcherConfig, Region};
use crate::utils::http::{create_client, fetch_text};

/// Supplier of raw list text for a region and week.
#[async_trait]
pub trait ListSource: Send + Sync {
    async fn fetch(&self, region: &Region, week: NaiveDate) -> Result<String>;
}

/// File name stem shared by the URL template and local files.
fn file_stem(date_format: &str, region: &Region, week: NaiveDate) -> String {
    format!("{}{}", week.format(date_format), region.file_code)
}

/// HTTP source with proxy fallbacks.
pub struct HttpListSource {
    client: Client,
    config: FetcherConfig,
}

impl HttpListSource {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            config: config.clone(),
        })
    }

    /// Direct URL of a region's list file.
    pub fn list_url(&self, region: &Region, week: NaiveDate) -> Result<Url> {
        let url = self
            .config
            .url_template
            .replace("{date}", &week.format(&self.config.date_format).to_string())
            .replace("{code}", &region.file_code);
        Ok(Url::parse(&url)?)
    }

    /// Direct URL followed by every proxied variant, in fallback order.
    pub fn candidate_urls(&self, region: &Region, week: NaiveDate) -> Result<Vec<String>> {
        let direct = self.list_url(region, week)?;
        let encoded: String =
            url::form_urlencoded::byte_serialize(direct.as_str().as_bytes()).collect();

        let mut urls = vec![direct.to_string()];
        for proxy in &self.config.proxies {
            urls.push(proxy.replace("{url}", &encoded));
        }
        Ok(urls)
    }
}

#[async_trait]
impl ListSource for HttpListSource {
    async fn fetch(&self, region: &Region, week: NaiveDate) -> Result<String> {
        let urls = self.candidate_urls(region, week)?;
        let mut last_error = None;

        for (attempt, url) in urls.iter().enumerate() {
            log::debug!("Fetching {} list ({}/{}): {}", region.code, attempt + 1, urls.len(), url);
            match fetch_text(&self.client, url).await {
                Ok(text) => {
                    if attempt > 0 {
                        log::info!("Fetched {} list through fallback {}", region.code, url);
                    }
                    return Ok(text);
                }
                Err(e) => {
                    log::warn!("Failed to fetch {} list from {}: {}", region.code, url, e);
                    last_error = Some(e);
                }
            }
        }

        let message = last_error.map_or_else(|| "no endpoints".to_string(), |e| e.to_string());
        Err(AppError::fetch(&urls[0], message))
    }
}

/// Reads list files from a local directory.
pub struct FileListSource {
    dir: PathBuf,
    date_format: String,
}

impl FileListSource {
    pub fn new(dir: impl Into<PathBuf>, date_format: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            date_format: date_format.into(),
        }
    }

    pub fn path(&self, region: &Region, week: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}.txt", file_stem(&self.date_format, region, week)))
    }
}

#[async_trait]
impl ListSource for FileListSource {
    async fn fetch(&self, region: &Region, week: NaiveDate) -> Result<String> {
        let path = self.path(region, week);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::fetch(path.display().to_string(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn region() -> Region {
        Region::new("pn", "Pacific Northwest", "pn")
    }

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
    }

    #[test]
    fn test_list_url() {
        let config = FetcherConfig {
            url_template: "https://lists.example.com/files/{date}{code}.txt".into(),
            ..FetcherConfig::default()
        };
        let source = HttpListSource::new(&config).unwrap();

        assert_eq!(
            source.list_url(&region(), week()).unwrap().as_str(),
            "https://lists.example.com/files/240313pn.txt"
        );
    }

    #[test]
    fn test_candidate_urls_encode_target() {
        let config = FetcherConfig {
            url_template: "https://lists.example.com/{date}{code}.txt".into(),
            proxies: vec!["https://proxy.example.com/raw?url={url}".into()],
            ..FetcherConfig::default()
        };
        let source = HttpListSource::new(&config).unwrap();

        let urls = source.candidate_urls(&region(), week()).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://lists.example.com/240313pn.txt".to_string(),
                "https://proxy.example.com/raw?url=https%3A%2F%2Flists.example.com%2F240313pn.txt"
                    .to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_file_source_reads_named_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("240313pn.txt"), "YOUNG ADULT\n").unwrap();

        let source = FileListSource::new(tmp.path(), "%y%m%d");
        let text = source.fetch(&region(), week()).await.unwrap();
        assert_eq!(text, "YOUNG ADULT\n");
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let tmp = TempDir::new().unwrap();
        let source = FileListSource::new(tmp.path(), "%y%m%d");

        assert!(matches!(
            source.fetch(&region(), week()).await,
            Err(AppError::Fetch { .. })
        ));
    }
}
