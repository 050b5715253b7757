//! Downloads files shared through Drive share links.
//!
//! Redirects are followed by hand, with the client's cookie store replaying
//! whatever the host set along the way; large files answer with an
//! interstitial page carrying a `confirm=` token that has to be sent back once.

use reqwest::header::{CONTENT_TYPE, HeaderMap, LOCATION};
use reqwest::{Client, Response, StatusCode, redirect};
use tracing::debug;
use url::Url;

use crate::error::DriveError;

const DEFAULT_DOWNLOAD_BASE: &str = "https://drive.google.com/uc";
const MAX_REDIRECTS: usize = 5;

/// A downloaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriveFile {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl DriveFile {
    fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("text/html"))
    }
}

#[derive(Clone)]
pub struct DriveFetcher {
    client: Client,
    download_base: Url,
}

impl DriveFetcher {
    /// Fetcher against the public Drive download endpoint.
    ///
    /// # Errors
    ///
    /// Returns `DriveError::Http` if the HTTP client cannot be built.
    pub fn new() -> Result<Self, DriveError> {
        let base = Url::parse(DEFAULT_DOWNLOAD_BASE)
            .map_err(|_| DriveError::InvalidShareUrl(DEFAULT_DOWNLOAD_BASE.to_string()))?;
        Self::with_download_base(base)
    }

    /// Fetcher against another download endpoint, e.g. a local test server.
    ///
    /// # Errors
    ///
    /// Returns `DriveError::Http` if the HTTP client cannot be built.
    pub fn with_download_base(download_base: Url) -> Result<Self, DriveError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            download_base,
        })
    }

    /// Download the file behind a share link.
    ///
    /// # Errors
    ///
    /// Returns `DriveError::InvalidShareUrl` when no file id can be found,
    /// `DriveError::AccessDenied` when the host answers with a sign-in or
    /// permission page, and `DriveError::HttpStatus` for other failures.
    pub async fn fetch(&self, share_url: &str) -> Result<DriveFile, DriveError> {
        let id = extract_file_id(share_url)
            .ok_or_else(|| DriveError::InvalidShareUrl(share_url.to_string()))?;

        let file = self
            .download(download_url(&self.download_base, &id, None))
            .await?;
        if !file.is_html() {
            return Ok(file);
        }

        let page = String::from_utf8_lossy(&file.bytes);
        if let Some(token) = confirm_token(&page) {
            debug!("drive file {id} needs confirmation");
            let url = download_url(&self.download_base, &id, Some(&token));
            let confirmed = self.download(url).await?;
            if confirmed.is_html()
                && looks_like_sign_in(&String::from_utf8_lossy(&confirmed.bytes))
            {
                return Err(DriveError::AccessDenied);
            }
            return Ok(confirmed);
        }
        if looks_like_sign_in(&page) {
            return Err(DriveError::AccessDenied);
        }
        Ok(file)
    }

    /// GET `url`, following redirects manually.
    async fn download(&self, mut url: Url) -> Result<DriveFile, DriveError> {
        for _ in 0..=MAX_REDIRECTS {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();
            if matches!(
                status,
                StatusCode::MOVED_PERMANENTLY
                    | StatusCode::FOUND
                    | StatusCode::SEE_OTHER
                    | StatusCode::TEMPORARY_REDIRECT
            ) {
                url = redirect_target(&url, response.headers()).ok_or(DriveError::BadRedirect)?;
                continue;
            }
            if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                return Err(DriveError::AccessDenied);
            }
            if !status.is_success() {
                return Err(DriveError::HttpStatus(status));
            }
            return read_file(response).await;
        }
        Err(DriveError::TooManyRedirects)
    }
}

async fn read_file(response: Response) -> Result<DriveFile, DriveError> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response.bytes().await?.to_vec();
    Ok(DriveFile {
        bytes,
        content_type,
    })
}

/// File id from `/file/d/{id}`, `/d/{id}` or `?id={id}` links.
#[must_use]
pub fn extract_file_id(share_url: &str) -> Option<String> {
    let url = Url::parse(share_url).ok()?;
    if let Some(id) = url
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|id| is_file_id(id))
    {
        return Some(id);
    }

    let segments: Vec<&str> = url.path_segments()?.collect();
    segments
        .windows(2)
        .find(|pair| pair[0] == "d" && is_file_id(pair[1]))
        .map(|pair| pair[1].to_string())
}

fn is_file_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn download_url(base: &Url, id: &str, confirm: Option<&str>) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("export", "download").append_pair("id", id);
        if let Some(token) = confirm {
            query.append_pair("confirm", token);
        }
    }
    url
}

/// The `confirm=` token of an interstitial download page.
fn confirm_token(page: &str) -> Option<String> {
    let start = page.find("confirm=")? + "confirm=".len();
    let token: String = page[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    (!token.is_empty()).then_some(token)
}

fn looks_like_sign_in(page: &str) -> bool {
    let lower = page.to_ascii_lowercase();
    ["accounts.google.com", "servicelogin", "sign in", "you need access", "request access"]
        .iter()
        .any(|marker| lower.contains(marker))
}

fn redirect_target(current: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn extracts_ids_from_common_link_shapes() {
        assert_eq!(
            extract_file_id("https://drive.google.com/file/d/1AbC-d_9/view?usp=sharing").as_deref(),
            Some("1AbC-d_9")
        );
        assert_eq!(
            extract_file_id("https://drive.google.com/d/XYZ123/edit").as_deref(),
            Some("XYZ123")
        );
        assert_eq!(
            extract_file_id("https://drive.google.com/open?id=QQ77").as_deref(),
            Some("QQ77")
        );
        assert_eq!(extract_file_id("https://drive.google.com/drive/my-drive"), None);
        assert_eq!(extract_file_id("not a url"), None);
    }

    #[test]
    fn builds_download_urls() {
        let base = Url::parse(DEFAULT_DOWNLOAD_BASE).unwrap();
        assert_eq!(
            download_url(&base, "abc", None).as_str(),
            "https://drive.google.com/uc?export=download&id=abc"
        );
        assert_eq!(
            download_url(&base, "abc", Some("t0K")).as_str(),
            "https://drive.google.com/uc?export=download&id=abc&confirm=t0K"
        );
    }

    #[test]
    fn finds_confirm_token_in_interstitial() {
        let page = r#"<a href="/uc?export=download&amp;confirm=Xy_9-z&amp;id=abc">Download anyway</a>"#;
        assert_eq!(confirm_token(page).as_deref(), Some("Xy_9-z"));
        assert_eq!(confirm_token("<p>nothing here</p>"), None);
    }

    #[test]
    fn detects_sign_in_pages() {
        assert!(looks_like_sign_in(
            r#"<form action="https://accounts.google.com/ServiceLogin">"#
        ));
        assert!(looks_like_sign_in("<h1>You need access</h1>"));
        assert!(!looks_like_sign_in("<h1>Quarterly report</h1>"));
    }

    #[test]
    fn resolves_relative_redirects() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/download/abc"));
        let current = Url::parse("https://drive.google.com/uc?id=abc").unwrap();
        assert_eq!(
            redirect_target(&current, &headers).unwrap().as_str(),
            "https://drive.google.com/download/abc"
        );
    }

    #[test]
    fn access_denied_carries_sharing_hint() {
        assert!(
            DriveError::AccessDenied
                .to_string()
                .contains("ensure sharing is set to anyone with the link")
        );
    }
}
