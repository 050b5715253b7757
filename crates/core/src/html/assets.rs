use std::ops::Range;

use url::Url;

use super::scan::TagScanner;

/// Query parameter carrying the gateway credential.
pub const TOKEN_PARAM: &str = "token";

/// Rewrites resource references of fetched fragments so they load from
/// where the fragment came from rather than from the window's own origin.
///
/// Against a gateway:
///
/// * `../x` resolves against the API base root.
/// * `./x` resolves against the phase folder under the API base, or the API
///   base root when no phase folder is known.
/// * bare `x` resolves against the API base root.
///
/// Against a local document, references join the document URL as a browser
/// would. Scheme-qualified, protocol-relative, root-absolute, fragment-only
/// and empty references are left exactly as they are in both cases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRewriter {
    base: RewriteBase,
    token: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum RewriteBase {
    Gateway {
        api_root: Url,
        phase_root: Option<Url>,
    },
    Document(Url),
}

impl AssetRewriter {
    #[must_use]
    pub fn new(api_base: &Url, phase_folder: Option<&str>, token: Option<&str>) -> Self {
        let api_root = as_directory(api_base);
        let phase_root = phase_folder.and_then(|folder| {
            let mut root = api_root.clone();
            let pushed = match root.path_segments_mut() {
                Ok(mut segments) => {
                    segments.pop_if_empty().push(folder).push("");
                    true
                }
                Err(()) => false,
            };
            pushed.then_some(root)
        });
        Self {
            base: RewriteBase::Gateway {
                api_root,
                phase_root,
            },
            token: token.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    /// Token-less rewriter resolving references next to `document`.
    #[must_use]
    pub fn for_document(document: &Url) -> Self {
        Self {
            base: RewriteBase::Document(document.clone()),
            token: None,
        }
    }

    /// Rewritten form of a single reference, or `None` when it stays untouched.
    #[must_use]
    pub fn rewrite_url(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if is_passthrough(trimmed) {
            return None;
        }

        let joined = match &self.base {
            RewriteBase::Document(document) => document.join(trimmed),
            RewriteBase::Gateway {
                api_root,
                phase_root,
            } => {
                if let Some(rest) = strip_parent_segments(trimmed) {
                    api_root.join(rest)
                } else if let Some(rest) = trimmed.strip_prefix("./") {
                    phase_root.as_ref().unwrap_or(api_root).join(rest)
                } else {
                    api_root.join(trimmed)
                }
            }
        };

        let mut url = joined.ok()?;
        if let Some(token) = &self.token {
            append_token(&mut url, token);
        }
        Some(url.to_string())
    }

    /// Rewrites every asset-bearing attribute of a fragment; all other bytes
    /// are copied unchanged.
    #[must_use]
    pub fn rewrite_fragment(&self, html: &str) -> String {
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();

        for tag in TagScanner::new(html).filter(|tag| !tag.closing) {
            for attr in &tag.attributes {
                let Some(range) = attr.value.clone() else {
                    continue;
                };
                if !is_asset_attribute(&tag.name, &attr.name) {
                    continue;
                }
                let decoded = html[range.clone()].replace("&amp;", "&");
                if let Some(rewritten) = self.rewrite_url(&decoded) {
                    edits.push((range, escape_attribute(&rewritten)));
                }
            }
        }

        if edits.is_empty() {
            return html.to_string();
        }

        let mut out = String::with_capacity(html.len() + edits.len() * 64);
        let mut cursor = 0;
        for (range, replacement) in edits {
            out.push_str(&html[cursor..range.start]);
            out.push_str(&replacement);
            cursor = range.end;
        }
        out.push_str(&html[cursor..]);
        out
    }
}

/// Appends `token=<value>` unless the URL already carries a token.
pub fn append_token(url: &mut Url, token: &str) {
    if url.query_pairs().any(|(key, _)| key == TOKEN_PARAM) {
        return;
    }
    url.query_pairs_mut().append_pair(TOKEN_PARAM, token);
}

/// Copy of `url` whose path ends with `/`, without query or fragment, so
/// relative joins land underneath it.
#[must_use]
pub fn as_directory(url: &Url) -> Url {
    let mut dir = url.clone();
    dir.set_query(None);
    dir.set_fragment(None);
    if !dir.path().ends_with('/') {
        let path = format!("{}/", dir.path());
        dir.set_path(&path);
    }
    dir
}

fn is_asset_attribute(tag: &str, attr: &str) -> bool {
    match attr {
        "data-src" => true,
        "src" => matches!(
            tag,
            "img" | "script" | "source" | "video" | "audio" | "iframe" | "embed" | "track"
        ),
        "href" => matches!(tag, "a" | "link" | "area"),
        "poster" => tag == "video",
        _ => false,
    }
}

fn is_passthrough(value: &str) -> bool {
    value.is_empty()
        || value.starts_with('#')
        || value.starts_with('/')
        || value.starts_with('\\')
        || has_scheme(value)
}

/// `scheme:` prefix per RFC 3986 (`https:`, `data:`, `mailto:`, `tel:`, ...).
fn has_scheme(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn strip_parent_segments(value: &str) -> Option<&str> {
    let mut rest = value.strip_prefix("../")?;
    while let Some(next) = rest.strip_prefix("../") {
        rest = next;
    }
    Some(rest)
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
