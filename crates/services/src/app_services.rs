use std::sync::{Arc, Mutex, PoisonError};

use progress_core::gateway::{GatewayConfig, GatewayContext};
use progress_core::navigation::NavigatorConfig;
use progress_core::page::PageContext;
use storage::repository::{SlotRepository, Storage};
use tracing::info;

use crate::content::{ContentSource, HttpContentSource};
use crate::drive::DriveFetcher;
use crate::error::AppServicesError;
use crate::navigator::PhaseNavigator;
use crate::progress_store::ProgressStore;

/// How phase pages are served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Same-origin pages with locks enforced.
    Local,
    /// Pages proxied by the project gateway; locks are not enforced.
    Gateway(GatewayConfig),
}

/// Assembles app-facing services and builds one navigator per page.
#[derive(Clone)]
pub struct AppServices {
    mode: Arc<Mutex<DeploymentMode>>,
    progress: Arc<ProgressStore>,
    content: Arc<dyn ContentSource>,
    drive: Arc<DriveFetcher>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage or progress initialization fails.
    pub async fn new_sqlite(db_url: &str, mode: DeploymentMode) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_parts(
            Arc::clone(&storage.slots),
            Arc::new(HttpContentSource::new()),
            mode,
        )
        .await
    }

    /// Build services from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if progress cannot be initialized or the
    /// HTTP client for Drive downloads cannot be built.
    pub async fn from_parts(
        slots: Arc<dyn SlotRepository>,
        content: Arc<dyn ContentSource>,
        mode: DeploymentMode,
    ) -> Result<Self, AppServicesError> {
        let progress = Arc::new(ProgressStore::new(slots));
        let state = progress.initialize().await?;
        info!("progress loaded, current phase {}", state.current_phase());

        Ok(Self {
            mode: Arc::new(Mutex::new(mode)),
            progress,
            content,
            drive: Arc::new(DriveFetcher::new()?),
        })
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn drive(&self) -> Arc<DriveFetcher> {
        Arc::clone(&self.drive)
    }

    #[must_use]
    pub fn mode(&self) -> DeploymentMode {
        self.mode.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Navigator configuration for a page.
    ///
    /// In gateway mode the resolved API base and token are remembered and
    /// reused for later pages.
    #[must_use]
    pub fn navigator_config(&self, page: &PageContext) -> NavigatorConfig {
        let mut mode = self.mode.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *mode {
            DeploymentMode::Local => NavigatorConfig::local(page),
            DeploymentMode::Gateway(config) => {
                let context = GatewayContext::from_page(page, config);
                if config.api_base.is_none() {
                    config.api_base = context.api_base().ok().cloned();
                }
                if config.token.is_none() {
                    config.token = context.token().map(str::to_string);
                }
                NavigatorConfig::gateway(context)
            }
        }
    }

    /// A fresh navigator (and content cache) for one page.
    #[must_use]
    pub fn navigator_for(&self, page: &PageContext) -> Arc<PhaseNavigator> {
        let phase = page.initial_phase();
        Arc::new(PhaseNavigator::new(
            phase,
            self.navigator_config(page),
            Arc::clone(&self.progress),
            Arc::clone(&self.content),
        ))
    }
}
