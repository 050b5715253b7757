use services::ContentPane;

/// Content pane as the view draws it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentVm {
    Loading,
    Ready { title: &'static str, html: String },
    Failed { title: &'static str, message: String },
}

impl ContentVm {
    #[must_use]
    pub fn from_pane(pane: &ContentPane) -> Self {
        match pane {
            ContentPane::Ready { module, html, .. } => ContentVm::Ready {
                title: module.label,
                html: sanitize_content(html),
            },
            ContentPane::Failed { module, file, message } => ContentVm::Failed {
                title: module.label,
                message: format!("Error loading content from {file}: {message}"),
            },
        }
    }
}

/// Cleans a module fragment before it is injected into the window.
///
/// Scripts, inline handlers and styles go. Document structure, media,
/// stylesheets, embeds and links stay, together with the references the
/// asset rewriter produced (gateway `https` and local `file` URLs alike).
#[must_use]
pub fn sanitize_content(html: &str) -> String {
    ammonia::Builder::default()
        .add_tags([
            "section", "article", "figure", "figcaption", "video", "audio", "source", "track",
            "link", "iframe", "embed",
        ])
        .add_generic_attributes(["class", "id", "data-src"])
        .add_tag_attributes("video", ["src", "poster", "controls", "width", "height"])
        .add_tag_attributes("audio", ["src", "controls"])
        .add_tag_attributes("source", ["src", "type"])
        .add_tag_attributes("track", ["src", "kind", "srclang", "label"])
        .add_tag_attributes("img", ["loading"])
        .add_tag_attributes("link", ["rel", "href", "type", "media"])
        .add_tag_attributes(
            "iframe",
            ["src", "width", "height", "title", "allowfullscreen", "loading"],
        )
        .add_tag_attributes("embed", ["src", "type", "width", "height"])
        .add_url_schemes(["file"])
        .clean(html)
        .to_string()
}
