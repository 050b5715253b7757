use super::scan::{Tag, TagScanner};

/// Class (or id) marking the part of a module document shown in the content pane.
pub const CONTENT_REGION: &str = "content-area";

/// Where an extracted fragment came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentSource {
    Region,
    Body,
    Document,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub html: String,
    pub source: FragmentSource,
}

/// Extracts the inner markup of the designated region of a document.
///
/// Falls back to the `<body>` contents, and to the whole document when it has
/// no body. Returns `None` when the result is blank.
#[must_use]
pub fn extract_content(document: &str, region: &str) -> Option<Fragment> {
    let in_region = |src: &str, tag: &Tag| matches_region(src, tag, region);
    let (html, source) = if let Some(inner) = inner_of(document, in_region) {
        (inner, FragmentSource::Region)
    } else if let Some(inner) = inner_of(document, |_, tag| tag.name == "body") {
        (inner, FragmentSource::Body)
    } else {
        (document, FragmentSource::Document)
    };

    let trimmed = html.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(Fragment {
        html: trimmed.to_string(),
        source,
    })
}

fn matches_region(src: &str, tag: &Tag, region: &str) -> bool {
    tag.attribute(src, "id").is_some_and(|id| id.trim() == region)
        || tag
            .attribute(src, "class")
            .is_some_and(|class| class.split_ascii_whitespace().any(|c| c == region))
}

/// Inner markup of the first open element accepted by `select`.
fn inner_of<'s>(src: &'s str, select: impl Fn(&str, &Tag) -> bool) -> Option<&'s str> {
    let mut tags = TagScanner::new(src);
    let open = tags.by_ref().find(|tag| tag.is_open() && select(src, tag))?;

    let mut depth = 1usize;
    for tag in tags {
        if tag.name != open.name {
            continue;
        }
        if tag.closing {
            depth -= 1;
            if depth == 0 {
                return Some(&src[open.span.end..tag.span.start]);
            }
        } else if tag.is_open() {
            depth += 1;
        }
    }

    // Unterminated element: everything after the start tag belongs to it.
    Some(&src[open.span.end..])
}
