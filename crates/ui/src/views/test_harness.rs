use std::sync::Arc;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use progress_core::model::PROGRESS_SLOT_KEY;
use progress_core::navigation::NavigatorConfig;
use progress_core::page::PageContext;
use services::{ContentError, ContentSource, PhaseNavigator, ProgressStore};
use storage::repository::InMemoryRepository;
use url::Url;

use crate::context::{UiApp, build_app_context};
use crate::views::{PhaseView, ProgressView};

/// Serves a small document for every module file.
struct StaticSource;

#[async_trait]
impl ContentSource for StaticSource {
    async fn fetch(&self, url: &Url) -> Result<String, ContentError> {
        let file = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string();
        Ok(format!(
            r#"<html><body><div class="content-area"><h1>{file}</h1><p>Body of {file}</p><script>alert(1)</script></div></body></html>"#
        ))
    }
}

struct TestApp {
    progress: Arc<ProgressStore>,
    page: PageContext,
}

impl UiApp for TestApp {
    fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    fn navigator_for(&self, page: &PageContext) -> Arc<PhaseNavigator> {
        Arc::new(PhaseNavigator::new(
            page.initial_phase(),
            NavigatorConfig::local(page),
            Arc::clone(&self.progress),
            Arc::new(StaticSource),
        ))
    }

    fn initial_page(&self) -> PageContext {
        self.page.clone()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Phase,
    Progress,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    match use_context::<ViewKind>() {
        ViewKind::Phase => rsx! { PhaseView {} },
        ViewKind::Progress => rsx! { ProgressView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub progress: Arc<ProgressStore>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Harness on the local page at `page_url`, with `saved` as the stored
/// progress slot when given.
pub async fn setup_view_harness(
    view: ViewKind,
    page_url: &str,
    saved: Option<&str>,
) -> ViewHarness {
    let repo = match saved {
        Some(raw) => InMemoryRepository::with_slot(PROGRESS_SLOT_KEY, raw),
        None => InMemoryRepository::new(),
    };
    let progress = Arc::new(ProgressStore::new(Arc::new(repo)));
    progress.initialize().await.expect("initialize progress");

    let page = PageContext::new(Url::parse(page_url).expect("page url"), None);
    let app = Arc::new(TestApp {
        progress: Arc::clone(&progress),
        page,
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness { dom, progress }
}
