use std::sync::{Arc, Mutex, PoisonError};

use progress_core::page::PageContext;
use services::{PhaseNavigator, ProgressStore};

pub trait UiApp: Send + Sync {
    fn progress(&self) -> Arc<ProgressStore>;

    /// A fresh navigator for `page`; each page gets its own content cache.
    fn navigator_for(&self, page: &PageContext) -> Arc<PhaseNavigator>;

    /// The page the window opens on.
    fn initial_page(&self) -> PageContext;
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
    current_page: Arc<Mutex<PageContext>>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let current_page = Arc::new(Mutex::new(app.initial_page()));
        Self {
            app: Arc::clone(app),
            current_page,
        }
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        self.app.progress()
    }

    /// The page currently shown; survives route changes within the window.
    #[must_use]
    pub fn current_page(&self) -> PageContext {
        self.current_page
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current page (history is replaced, not pushed) and build
    /// its navigator.
    #[must_use]
    pub fn open_page(&self, page: PageContext) -> Arc<PhaseNavigator> {
        let navigator = self.app.navigator_for(&page);
        *self
            .current_page
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = page;
        navigator
    }

    #[must_use]
    pub fn navigator_for_current_page(&self) -> Arc<PhaseNavigator> {
        self.app.navigator_for(&self.current_page())
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
