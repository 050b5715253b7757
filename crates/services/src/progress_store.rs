use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use progress_core::model::{
    CompletionOutcome, PROGRESS_SLOT_KEY, Phase, PhaseProgress, ProgressState,
};
use storage::repository::SlotRepository;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use crate::error::ProgressError;

/// Owns the learner's progress and its durable slot.
///
/// The only writer of `ProgressState`; navigators query it and ask it to
/// record completions.
///
/// Writes to the slot are serialized: a mutation and the write that persists
/// it happen under one `writes` guard, so the slot never goes back to an
/// older record.
pub struct ProgressStore {
    slots: Arc<dyn SlotRepository>,
    state: Mutex<ProgressState>,
    writes: AsyncMutex<()>,
}

impl ProgressStore {
    /// Store starting from the initial state; call [`Self::initialize`] to
    /// adopt the persisted record.
    #[must_use]
    pub fn new(slots: Arc<dyn SlotRepository>) -> Self {
        Self {
            slots,
            state: Mutex::new(ProgressState::initial()),
            writes: AsyncMutex::new(()),
        }
    }

    /// Load the persisted record, or write and adopt the initial state when
    /// the slot is empty or unreadable as progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the slot cannot be read or written.
    pub async fn initialize(&self) -> Result<ProgressState, ProgressError> {
        let _writing = self.writes.lock().await;
        if let Some(raw) = self.slots.read_slot(PROGRESS_SLOT_KEY).await? {
            match ProgressState::from_json(&raw) {
                Ok(loaded) => {
                    *self.state() = loaded.clone();
                    return Ok(loaded);
                }
                Err(err) => debug!("resetting unreadable progress record: {err}"),
            }
        }

        let initial = ProgressState::initial();
        self.slots
            .write_slot(PROGRESS_SLOT_KEY, &initial.to_json()?)
            .await?;
        *self.state() = initial.clone();
        Ok(initial)
    }

    /// Record a completed module and persist the result once.
    ///
    /// Completing an already-completed module changes and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Locked` for a module that is not unlocked (state
    /// unchanged), or a storage/serialization error if persisting fails.
    pub async fn complete_module(
        &self,
        phase: Phase,
        module: &str,
    ) -> Result<CompletionOutcome, ProgressError> {
        let _writing = self.writes.lock().await;
        let outcome = self.state().complete_module(phase, module)?;
        if !outcome.newly_completed {
            return Ok(outcome);
        }

        if let Some(next) = outcome.unlocked_phase {
            info!("{phase} complete, unlocked {next}");
        }
        self.write_current().await?;
        Ok(outcome)
    }

    /// Write the whole current record to the slot.
    ///
    /// # Errors
    ///
    /// Returns a storage or serialization error.
    pub async fn save(&self) -> Result<(), ProgressError> {
        let _writing = self.writes.lock().await;
        self.write_current().await
    }

    /// Caller holds `writes`.
    async fn write_current(&self) -> Result<(), ProgressError> {
        let raw = self.state().to_json()?;
        self.slots.write_slot(PROGRESS_SLOT_KEY, &raw).await?;
        Ok(())
    }

    #[must_use]
    pub fn is_phase_unlocked(&self, id: &str) -> bool {
        self.state().is_phase_unlocked(id)
    }

    #[must_use]
    pub fn is_phase_unlocked_aliased(&self, phase: Phase) -> bool {
        self.state().is_phase_unlocked_aliased(phase)
    }

    #[must_use]
    pub fn is_module_unlocked(&self, phase: Phase, module: &str) -> bool {
        self.state().is_module_unlocked(phase, module)
    }

    #[must_use]
    pub fn is_module_completed(&self, phase: Phase, module: &str) -> bool {
        self.state().is_module_completed(phase, module)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressState {
        self.state().clone()
    }

    /// Per-phase counts in learning order.
    #[must_use]
    pub fn progress_summary(&self) -> Vec<PhaseProgress> {
        let state = self.state();
        Phase::ALL
            .iter()
            .map(|&phase| state.phase_progress(phase))
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
