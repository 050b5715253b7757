use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::ContentError;

/// Where module documents come from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the full document at `url` as text.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` on transport failures or non-success responses.
    async fn fetch(&self, url: &Url) -> Result<String, ContentError>;
}

/// Fetches `http(s)` documents with `reqwest` and reads `file` URLs from disk.
#[derive(Clone, Default)]
pub struct HttpContentSource {
    client: Client,
}

impl HttpContentSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, url: &Url) -> Result<String, ContentError> {
        match url.scheme() {
            "http" | "https" => {
                let response = self.client.get(url.clone()).send().await?;
                if !response.status().is_success() {
                    return Err(ContentError::HttpStatus(response.status()));
                }
                Ok(response.text().await?)
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| ContentError::UnsupportedUrl(url.to_string()))?;
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| ContentError::Io { path, source })
            }
            _ => Err(ContentError::UnsupportedUrl(url.to_string())),
        }
    }
}
