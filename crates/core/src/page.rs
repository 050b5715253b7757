use serde::Deserialize;
use url::Url;

use crate::model::Phase;

/// Document a phase folder opens with.
pub const ENTRY_DOCUMENT: &str = "index.html";

/// Bootstrap payload embedded in a phase page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl PageData {
    /// Parses the embedded JSON; anything unparseable counts as absent.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Where the navigator is running: the page URL and its bootstrap data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageContext {
    location: Url,
    page_data: Option<PageData>,
}

impl PageContext {
    #[must_use]
    pub fn new(location: Url, page_data: Option<PageData>) -> Self {
        Self {
            location,
            page_data,
        }
    }

    /// Builds a context from the raw embedded payload, ignoring it if malformed.
    #[must_use]
    pub fn from_raw(location: Url, raw_page_data: Option<&str>) -> Self {
        Self::new(location, raw_page_data.and_then(PageData::parse))
    }

    #[must_use]
    pub fn location(&self) -> &Url {
        &self.location
    }

    #[must_use]
    pub fn page_data(&self) -> Option<&PageData> {
        self.page_data.as_ref()
    }

    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.page_data
            .as_ref()
            .and_then(|data| data.project_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Phase to open: page data first, then the URL path, then the first phase.
    #[must_use]
    pub fn initial_phase(&self) -> Phase {
        self.page_data
            .as_ref()
            .and_then(|data| data.phase.as_deref())
            .and_then(|raw| raw.parse().ok())
            .or_else(|| self.phase_from_path())
            .unwrap_or(Phase::INITIAL)
    }

    /// Phase named by a folder-style segment of the URL path.
    #[must_use]
    pub fn phase_from_path(&self) -> Option<Phase> {
        self.decoded_segments().find_map(|segment| Phase::from_folder(&segment))
    }

    /// The first path segment that is a known phase folder, decoded.
    #[must_use]
    pub fn phase_folder_segment(&self) -> Option<String> {
        self.decoded_segments()
            .find(|segment| Phase::from_folder(segment).is_some())
    }

    /// Value of a query parameter of the page URL.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.location
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    /// Context of the page reached by a full navigation to `phase`.
    ///
    /// The project identifier carries over; the phase comes from the target.
    #[must_use]
    pub fn navigated(&self, location: Url, phase: Phase) -> Self {
        let project_id = self.project_id().map(str::to_string);
        Self {
            location,
            page_data: Some(PageData {
                phase: Some(phase.as_str().to_string()),
                project_id,
            }),
        }
    }

    fn decoded_segments(&self) -> impl Iterator<Item = String> + '_ {
        self.location
            .path_segments()
            .into_iter()
            .flatten()
            .map(|segment| segment.replace("%20", " "))
    }
}
