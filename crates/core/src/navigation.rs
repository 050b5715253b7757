//! Decision logic of the phase navigator, free of I/O and rendering.
//!
//! `NavigatorState` answers "may the learner go there?" and tracks which
//! module is active. Fetching, caching and persisting live in the services
//! crate; drawing lives in the UI crate.

use url::Url;

use crate::error::{LockViolation, ResolveError};
use crate::gateway::GatewayContext;
use crate::html::AssetRewriter;
use crate::model::{ModuleDescriptor, Phase, ProgressState};
use crate::page::{ENTRY_DOCUMENT, PageContext};

//
// ─── CONFIGURATION ─────────────────────────────────────────────────────────────
//

/// How module and entry documents are located.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentResolver {
    /// Documents sit next to the current page.
    Local { page: Url },
    /// Documents are served by the gateway under the API base.
    Gateway(GatewayContext),
}

impl ContentResolver {
    /// URL of a module document of `phase`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError` if the URL cannot be built (gateway base unknown,
    /// unjoinable page URL).
    pub fn module_url(&self, phase: Phase, module: &ModuleDescriptor) -> Result<Url, ResolveError> {
        match self {
            ContentResolver::Local { page } => Ok(page.join(module.file)?),
            ContentResolver::Gateway(gateway) => gateway.document_url(phase, module.file),
        }
    }

    /// URL of the page that hosts `phase`.
    ///
    /// # Errors
    ///
    /// See [`ContentResolver::module_url`].
    pub fn entry_url(&self, phase: Phase) -> Result<Url, ResolveError> {
        match self {
            ContentResolver::Local { page } => {
                Ok(page.join(&format!("../{}/{ENTRY_DOCUMENT}", phase.local_folder()))?)
            }
            ContentResolver::Gateway(gateway) => gateway.entry_url(phase),
        }
    }
}

/// One navigator, two deployments: lock-enforcing local pages and
/// gateway-proxied pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigatorConfig {
    pub enforce_locks: bool,
    pub resolver: ContentResolver,
    pub asset_rewriter: Option<AssetRewriter>,
}

impl NavigatorConfig {
    /// Same-origin pages: locks enforced, documents and their assets
    /// relative to the page.
    #[must_use]
    pub fn local(page: &PageContext) -> Self {
        Self {
            enforce_locks: true,
            resolver: ContentResolver::Local {
                page: page.location().clone(),
            },
            asset_rewriter: Some(AssetRewriter::for_document(page.location())),
        }
    }

    /// Gateway pages: every module open, documents and assets via the API base.
    #[must_use]
    pub fn gateway(context: GatewayContext) -> Self {
        Self {
            enforce_locks: false,
            asset_rewriter: context.asset_rewriter(),
            resolver: ContentResolver::Gateway(context),
        }
    }
}

//
// ─── STATE MACHINE ─────────────────────────────────────────────────────────────
//

/// Sidebar entry for one module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarItem {
    pub module: &'static ModuleDescriptor,
    pub locked: bool,
    pub completed: bool,
    pub active: bool,
}

/// Active phase and module of one page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigatorState {
    phase: Phase,
    current: Option<&'static ModuleDescriptor>,
    enforce_locks: bool,
}

impl NavigatorState {
    #[must_use]
    pub fn new(phase: Phase, enforce_locks: bool) -> Self {
        Self {
            phase,
            current: None,
            enforce_locks,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn current_module(&self) -> Option<&'static ModuleDescriptor> {
        self.current
    }

    #[must_use]
    pub fn modules(&self) -> &'static [ModuleDescriptor] {
        self.phase.modules()
    }

    #[must_use]
    pub fn initial_module(&self) -> &'static ModuleDescriptor {
        self.phase.first_module()
    }

    #[must_use]
    pub fn is_module_open(&self, progress: &ProgressState, module: &str) -> bool {
        !self.enforce_locks || progress.is_module_unlocked(self.phase, module)
    }

    #[must_use]
    pub fn is_phase_open(&self, progress: &ProgressState, phase: Phase) -> bool {
        !self.enforce_locks || progress.is_phase_unlocked_aliased(phase)
    }

    /// The page's own phase must be reachable before anything loads.
    ///
    /// # Errors
    ///
    /// Returns `LockViolation::PhaseLocked` for a locked phase.
    pub fn check_phase_entry(&self, progress: &ProgressState) -> Result<(), LockViolation> {
        if self.is_phase_open(progress, self.phase) {
            Ok(())
        } else {
            Err(LockViolation::PhaseLocked { phase: self.phase })
        }
    }

    /// Validates a tab switch without changing anything.
    ///
    /// # Errors
    ///
    /// Returns `LockViolation` for unknown or locked targets.
    pub fn plan_switch(
        &self,
        progress: &ProgressState,
        target: &str,
    ) -> Result<&'static ModuleDescriptor, LockViolation> {
        let module = self
            .phase
            .module(target)
            .ok_or_else(|| LockViolation::UnknownModule {
                phase: self.phase,
                module: target.to_string(),
            })?;
        if !self.is_module_open(progress, module.id) {
            return Err(LockViolation::ModuleLocked {
                phase: self.phase,
                module: target.to_string(),
            });
        }
        Ok(module)
    }

    pub fn commit_switch(&mut self, module: &'static ModuleDescriptor) {
        self.current = Some(module);
    }

    /// Module after the current one in the fixed order.
    #[must_use]
    pub fn next_module(&self) -> Option<&'static ModuleDescriptor> {
        let current = self.current?;
        let index = self.phase.module_index(current.id)?;
        self.modules().get(index + 1)
    }

    /// Terminal modules hide the forward control.
    #[must_use]
    pub fn shows_next_control(&self) -> bool {
        self.current.is_some_and(|module| !module.is_terminal)
    }

    /// Validates a cross-phase navigation.
    ///
    /// # Errors
    ///
    /// Returns `LockViolation::PhaseLocked` when the target is locked.
    pub fn plan_phase_navigation(
        &self,
        progress: &ProgressState,
        target: Phase,
    ) -> Result<Phase, LockViolation> {
        if self.is_phase_open(progress, target) {
            Ok(target)
        } else {
            Err(LockViolation::PhaseLocked { phase: target })
        }
    }

    #[must_use]
    pub fn sidebar(&self, progress: &ProgressState) -> Vec<SidebarItem> {
        self.modules()
            .iter()
            .map(|module| SidebarItem {
                module,
                locked: !self.is_module_open(progress, module.id),
                completed: progress.is_module_completed(self.phase, module.id),
                active: self.current.is_some_and(|current| current.id == module.id),
            })
            .collect()
    }
}
