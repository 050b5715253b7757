use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use progress_core::html::{CONTENT_REGION, extract_content};
use progress_core::model::{ModuleDescriptor, Phase};
use progress_core::navigation::{NavigatorConfig, NavigatorState, SidebarItem};
use tracing::{debug, info, warn};
use url::Url;

use crate::content::{ContentCache, ContentSource};
use crate::error::{ContentError, NavigationError, ProgressError};
use crate::progress_store::ProgressStore;

/// What the content pane shows after a load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentPane {
    Ready {
        module: &'static ModuleDescriptor,
        html: String,
        from_cache: bool,
    },
    /// Inline error naming the document that failed.
    Failed {
        module: &'static ModuleDescriptor,
        file: &'static str,
        message: String,
    },
}

impl ContentPane {
    #[must_use]
    pub fn module(&self) -> &'static ModuleDescriptor {
        match self {
            ContentPane::Ready { module, .. } | ContentPane::Failed { module, .. } => module,
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, ContentPane::Ready { .. })
    }
}

/// A full page navigation to another phase's entry document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseNavigation {
    pub phase: Phase,
    pub url: Url,
    /// The current history entry is replaced, not pushed.
    pub replace_history: bool,
}

/// Drives tab switching, module completion and content loading for one page.
pub struct PhaseNavigator {
    config: NavigatorConfig,
    progress: Arc<ProgressStore>,
    source: Arc<dyn ContentSource>,
    state: Mutex<NavigatorState>,
    cache: ContentCache,
}

impl PhaseNavigator {
    #[must_use]
    pub fn new(
        phase: Phase,
        config: NavigatorConfig,
        progress: Arc<ProgressStore>,
        source: Arc<dyn ContentSource>,
    ) -> Self {
        let state = NavigatorState::new(phase, config.enforce_locks);
        Self {
            config,
            progress,
            source,
            state: Mutex::new(state),
            cache: ContentCache::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state().phase()
    }

    #[must_use]
    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    #[must_use]
    pub fn progress(&self) -> &Arc<ProgressStore> {
        &self.progress
    }

    #[must_use]
    pub fn current_module(&self) -> Option<&'static ModuleDescriptor> {
        self.state().current_module()
    }

    #[must_use]
    pub fn cached_modules(&self) -> usize {
        self.cache.len()
    }

    /// Enter the page: check the phase is reachable, then open its first module.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Locked` when the page's phase is locked.
    pub async fn load_initial_content(&self) -> Result<ContentPane, NavigationError> {
        let first = {
            let state = self.state();
            state.check_phase_entry(&self.progress.snapshot())?;
            state.initial_module()
        };
        self.switch_tab(first.id).await
    }

    /// Make `target` the active module and load it.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Locked` for a locked or unknown module; the
    /// active module stays as it was.
    pub async fn switch_tab(&self, target: &str) -> Result<ContentPane, NavigationError> {
        let module = {
            let mut state = self.state();
            let module = state.plan_switch(&self.progress.snapshot(), target)?;
            state.commit_switch(module);
            module
        };
        debug!("switched to {}/{}", self.phase(), module.id);
        Ok(self.load_content(module).await)
    }

    /// Complete the active module and move to the one after it.
    ///
    /// Returns `Ok(None)` when there is no active or next module.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` when the completion cannot be recorded or the
    /// next module is still locked.
    pub async fn go_to_next(&self) -> Result<Option<ContentPane>, NavigationError> {
        let (current, next) = {
            let state = self.state();
            let Some(current) = state.current_module() else {
                return Ok(None);
            };
            let Some(next) = state.next_module() else {
                return Ok(None);
            };
            (current, next)
        };

        self.record_completion(current).await?;
        self.switch_tab(next.id).await.map(Some)
    }

    /// Complete the active terminal module and head for the following phase.
    ///
    /// Returns `Ok(None)` when the active module is not terminal, or when the
    /// finished phase is the last one.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError` when the completion cannot be recorded or the
    /// next phase's entry URL cannot be built.
    pub async fn finish_phase(&self) -> Result<Option<PhaseNavigation>, NavigationError> {
        let Some(current) = self.current_module().filter(|module| module.is_terminal) else {
            return Ok(None);
        };
        self.record_completion(current).await?;
        match self.phase().next() {
            Some(next) => self.navigate_to_phase(next).map(Some),
            None => Ok(None),
        }
    }

    /// Resolve a navigation to another phase's entry document.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Locked` for a locked phase, or
    /// `NavigationError::Resolve` when the entry URL cannot be built.
    pub fn navigate_to_phase(&self, target: Phase) -> Result<PhaseNavigation, NavigationError> {
        let phase = self
            .state()
            .plan_phase_navigation(&self.progress.snapshot(), target)?;
        let url = self.config.resolver.entry_url(phase)?;
        info!("navigating to {phase} at {url}");
        Ok(PhaseNavigation {
            phase,
            url,
            replace_history: true,
        })
    }

    /// Cached fragment for `module`, else fetch, extract and cache it.
    ///
    /// Failures never escape: they become `ContentPane::Failed`.
    pub async fn load_content(&self, module: &'static ModuleDescriptor) -> ContentPane {
        if let Some(html) = self.cache.get(module.id) {
            debug!("content cache hit for {}", module.id);
            return ContentPane::Ready {
                module,
                html,
                from_cache: true,
            };
        }

        debug!("content cache miss for {}", module.id);
        match self.fetch_fragment(module).await {
            Ok(html) => {
                self.cache.insert(module.id, html.clone());
                ContentPane::Ready {
                    module,
                    html,
                    from_cache: false,
                }
            }
            Err(err) => {
                warn!("failed to load {}: {err}", module.file);
                ContentPane::Failed {
                    module,
                    file: module.file,
                    message: err.to_string(),
                }
            }
        }
    }

    #[must_use]
    pub fn sidebar(&self) -> Vec<SidebarItem> {
        self.state().sidebar(&self.progress.snapshot())
    }

    #[must_use]
    pub fn shows_next_control(&self) -> bool {
        self.state().shows_next_control()
    }

    async fn fetch_fragment(&self, module: &ModuleDescriptor) -> Result<String, ContentError> {
        let url = self.config.resolver.module_url(self.phase(), module)?;
        let document = self.source.fetch(&url).await?;
        let fragment =
            extract_content(&document, CONTENT_REGION).ok_or(ContentError::MissingRegion)?;
        Ok(match &self.config.asset_rewriter {
            Some(rewriter) => rewriter.rewrite_fragment(&fragment.html),
            None => fragment.html,
        })
    }

    /// With locks disabled the store may refuse modules it never unlocked;
    /// that refusal is not an error here.
    async fn record_completion(&self, module: &ModuleDescriptor) -> Result<(), NavigationError> {
        match self.progress.complete_module(self.phase(), module.id).await {
            Ok(_) => Ok(()),
            Err(ProgressError::Locked(violation)) if !self.config.enforce_locks => {
                debug!("completion not recorded with locks disabled: {violation}");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn state(&self) -> MutexGuard<'_, NavigatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
