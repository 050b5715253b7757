use url::Url;

use crate::error::ResolveError;
use crate::html::{AssetRewriter, TOKEN_PARAM, append_token, as_directory};
use crate::model::Phase;
use crate::page::{ENTRY_DOCUMENT, PageContext};

/// Path segment that precedes the project identifier in page and API URLs.
pub const PROJECTS_SEGMENT: &str = "realtime-projects";

const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

/// Deployment knobs for resolving the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API base remembered from an earlier resolution; used as-is when set.
    pub api_base: Option<Url>,
    /// Credential remembered from an earlier resolution.
    pub token: Option<String>,
    pub production_host: String,
    pub production_api_origin: Url,
    pub loopback_api_port: u16,
}

impl GatewayConfig {
    #[must_use]
    pub fn new(production_host: impl Into<String>, production_api_origin: Url) -> Self {
        Self {
            api_base: None,
            token: None,
            production_host: production_host.into(),
            production_api_origin,
            loopback_api_port: 5000,
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: Option<Url>) -> Self {
        self.api_base = api_base;
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_loopback_api_port(mut self, port: u16) -> Self {
        self.loopback_api_port = port;
        self
    }
}

/// Everything gateway mode needs, resolved once per page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayContext {
    api_base: Option<Url>,
    token: Option<String>,
    phase_folder: Option<String>,
}

impl GatewayContext {
    #[must_use]
    pub fn new(api_base: Option<Url>, token: Option<String>, phase_folder: Option<String>) -> Self {
        Self {
            api_base,
            token,
            phase_folder,
        }
    }

    /// Resolves API base, token and phase folder for a page.
    #[must_use]
    pub fn from_page(page: &PageContext, config: &GatewayConfig) -> Self {
        let api_base = config
            .api_base
            .clone()
            .or_else(|| reconstruct_api_base(page, config));
        let token = config
            .token
            .clone()
            .or_else(|| page.query_param(TOKEN_PARAM));
        Self {
            api_base,
            token,
            phase_folder: page.phase_folder_segment(),
        }
    }

    /// # Errors
    ///
    /// Returns `ResolveError::ApiBaseUnresolved` when no source yielded a base.
    pub fn api_base(&self) -> Result<&Url, ResolveError> {
        self.api_base.as_ref().ok_or(ResolveError::ApiBaseUnresolved)
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn phase_folder(&self) -> Option<&str> {
        self.phase_folder.as_deref()
    }

    /// `{apiBase}/{phaseFolder}/{file}?token=…`, folder percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` when the API base is unknown or cannot take a path.
    pub fn document_url(&self, phase: Phase, file: &str) -> Result<Url, ResolveError> {
        let mut url = as_directory(self.api_base()?);
        url.path_segments_mut()
            .map_err(|()| ResolveError::ApiBaseUnresolved)?
            .pop_if_empty()
            .push(phase.gateway_folder())
            .push(file);
        if let Some(token) = self.token() {
            append_token(&mut url, token);
        }
        Ok(url)
    }

    /// Entry document of a phase on the gateway.
    ///
    /// # Errors
    ///
    /// See [`GatewayContext::document_url`].
    pub fn entry_url(&self, phase: Phase) -> Result<Url, ResolveError> {
        self.document_url(phase, ENTRY_DOCUMENT)
    }

    /// Rewriter bound to this context, `None` while the API base is unknown.
    #[must_use]
    pub fn asset_rewriter(&self) -> Option<AssetRewriter> {
        self.api_base
            .as_ref()
            .map(|base| AssetRewriter::new(base, self.phase_folder(), self.token()))
    }
}

/// Rebuilds the API base from the page host and the project identifier.
///
/// Production host → configured API origin; loopback → same host on the
/// loopback API port; anything else → the page's own origin.
#[must_use]
pub fn reconstruct_api_base(page: &PageContext, config: &GatewayConfig) -> Option<Url> {
    let project_id = project_id(page)?;
    let location = page.location();
    let host = location.host_str()?;

    let mut origin = if host.eq_ignore_ascii_case(&config.production_host) {
        config.production_api_origin.clone()
    } else if LOOPBACK_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h)) {
        let mut url = location.clone();
        url.set_port(Some(config.loopback_api_port)).ok()?;
        url
    } else {
        location.clone()
    };

    origin.set_query(None);
    origin.set_fragment(None);
    origin
        .path_segments_mut()
        .ok()?
        .clear()
        .push("api")
        .push(PROJECTS_SEGMENT)
        .push(&project_id);
    Some(origin)
}

/// Project identifier from page data, else the segment after `realtime-projects`.
#[must_use]
pub fn project_id(page: &PageContext) -> Option<String> {
    if let Some(id) = page.project_id() {
        return Some(id.to_string());
    }
    let mut segments = page.location().path_segments()?;
    segments.by_ref().find(|segment| *segment == PROJECTS_SEGMENT)?;
    segments
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
