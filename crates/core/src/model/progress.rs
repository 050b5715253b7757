use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::LockViolation;
use crate::model::phase::Phase;

/// Storage key of the persisted progress record.
pub const PROGRESS_SLOT_KEY: &str = "ecommerceProjectProgress";

//
// ─── PROGRESS STATE ────────────────────────────────────────────────────────────
//

/// Unlock and completion state of the learner for the fixed project.
///
/// Sets only grow: nothing here ever removes an unlocked phase or module.
/// The serialized form is the JSON record kept under [`PROGRESS_SLOT_KEY`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    current_phase: Phase,
    unlocked_phases: BTreeSet<String>,
    unlocked_modules: BTreeMap<String, BTreeSet<String>>,
    completed_modules: BTreeMap<String, BTreeSet<String>>,
}

/// What a single `complete_module` call changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// False when the module was already complete and nothing changed.
    pub newly_completed: bool,
    pub unlocked_module: Option<&'static str>,
    pub unlocked_phase: Option<Phase>,
}

/// Completed/total module counts for one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseProgress {
    pub phase: Phase,
    pub unlocked: bool,
    pub completed: usize,
    pub total: usize,
}

impl PhaseProgress {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::initial()
    }
}

impl ProgressState {
    /// Fresh state: only the first phase and its first module are unlocked.
    #[must_use]
    pub fn initial() -> Self {
        let mut state = Self {
            current_phase: Phase::INITIAL,
            unlocked_phases: BTreeSet::new(),
            unlocked_modules: BTreeMap::new(),
            completed_modules: BTreeMap::new(),
        };
        state.unlock_phase(Phase::INITIAL);
        state
    }

    /// Parses a persisted record, repairing missing invariant entries.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the record is not a progress state.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: Self = serde_json::from_str(raw)?;
        Ok(parsed.normalized())
    }

    /// Serializes the record for the durable slot.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.current_phase
    }

    /// Raw membership test; `id` may be a canonical phase id or an alias.
    #[must_use]
    pub fn is_phase_unlocked(&self, id: &str) -> bool {
        self.unlocked_phases.contains(id)
    }

    /// Membership test that accepts either the canonical id or the alias.
    #[must_use]
    pub fn is_phase_unlocked_aliased(&self, phase: Phase) -> bool {
        self.is_phase_unlocked(phase.as_str())
            || phase.alias().is_some_and(|alias| self.is_phase_unlocked(alias))
    }

    #[must_use]
    pub fn is_module_unlocked(&self, phase: Phase, module: &str) -> bool {
        self.unlocked_modules
            .get(phase.as_str())
            .is_some_and(|set| set.contains(module))
    }

    #[must_use]
    pub fn is_module_completed(&self, phase: Phase, module: &str) -> bool {
        self.completed_modules
            .get(phase.as_str())
            .is_some_and(|set| set.contains(module))
    }

    pub fn unlocked_phase_ids(&self) -> impl Iterator<Item = &str> {
        self.unlocked_phases.iter().map(String::as_str)
    }

    #[must_use]
    pub fn unlocked_module_count(&self, phase: Phase) -> usize {
        self.unlocked_modules.get(phase.as_str()).map_or(0, BTreeSet::len)
    }

    #[must_use]
    pub fn completed_module_count(&self, phase: Phase) -> usize {
        self.completed_modules.get(phase.as_str()).map_or(0, BTreeSet::len)
    }

    #[must_use]
    pub fn phase_progress(&self, phase: Phase) -> PhaseProgress {
        PhaseProgress {
            phase,
            unlocked: self.is_phase_unlocked_aliased(phase),
            completed: self.completed_module_count(phase),
            total: phase.modules().len(),
        }
    }

    /// Marks a module done and unlocks whatever follows it.
    ///
    /// Completing the module at index `i` unlocks index `i + 1`. Completing a
    /// terminal module unlocks the next phase and its first module. Repeating
    /// a completion changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `LockViolation` when the module is unknown to the phase or is
    /// not unlocked yet; the state is left untouched.
    pub fn complete_module(
        &mut self,
        phase: Phase,
        module: &str,
    ) -> Result<CompletionOutcome, LockViolation> {
        let Some(index) = phase.module_index(module) else {
            return Err(LockViolation::UnknownModule {
                phase,
                module: module.to_string(),
            });
        };

        if self.is_module_completed(phase, module) {
            return Ok(CompletionOutcome::default());
        }
        if !self.is_module_unlocked(phase, module) {
            return Err(LockViolation::ModuleLocked {
                phase,
                module: module.to_string(),
            });
        }

        insert_into(&mut self.completed_modules, phase, module);
        let mut outcome = CompletionOutcome {
            newly_completed: true,
            ..CompletionOutcome::default()
        };

        let modules = phase.modules();
        if let Some(next) = modules.get(index + 1) {
            if insert_into(&mut self.unlocked_modules, phase, next.id) {
                outcome.unlocked_module = Some(next.id);
            }
        }

        if modules[index].is_terminal {
            if let Some(next_phase) = phase.next() {
                if self.unlock_phase(next_phase) {
                    outcome.unlocked_phase = Some(next_phase);
                }
                if next_phase > self.current_phase {
                    self.current_phase = next_phase;
                }
            }
        }

        Ok(outcome)
    }

    /// Adds a phase (and its alias) plus its first module. Returns whether the
    /// canonical phase id was new.
    fn unlock_phase(&mut self, phase: Phase) -> bool {
        let added = self.unlocked_phases.insert(phase.as_str().to_string());
        if let Some(alias) = phase.alias() {
            self.unlocked_phases.insert(alias.to_string());
        }
        insert_into(&mut self.unlocked_modules, phase, phase.first_module().id);
        added
    }

    /// Restores invariants a hand-edited or older record may be missing.
    ///
    /// Only adds entries, so it never takes progress away.
    fn normalized(mut self) -> Self {
        self.unlock_phase(Phase::INITIAL);
        self.unlock_phase(self.current_phase);
        for phase in Phase::ALL {
            if self.is_phase_unlocked_aliased(phase) {
                self.unlock_phase(phase);
            }
            let completed: Vec<String> = self
                .completed_modules
                .get(phase.as_str())
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            for module in completed {
                self.unlocked_modules
                    .entry(phase.as_str().to_string())
                    .or_default()
                    .insert(module);
            }
        }
        self
    }
}

fn insert_into(map: &mut BTreeMap<String, BTreeSet<String>>, phase: Phase, module: &str) -> bool {
    map.entry(phase.as_str().to_string())
        .or_default()
        .insert(module.to_string())
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_phase(state: &mut ProgressState, phase: Phase) {
        for module in phase.modules() {
            state.complete_module(phase, module.id).unwrap();
        }
    }

    #[test]
    fn initial_state_unlocks_only_brd_overview() {
        let state = ProgressState::initial();
        assert_eq!(state.current_phase(), Phase::Brd);
        assert_eq!(state.unlocked_phase_ids().collect::<Vec<_>>(), ["brd"]);
        assert!(state.is_module_unlocked(Phase::Brd, "overview"));
        assert!(!state.is_module_unlocked(Phase::Brd, "functional-requirements"));
        assert_eq!(state.completed_module_count(Phase::Brd), 0);
    }

    #[test]
    fn serialized_shape_uses_camel_case_keys() {
        let json = ProgressState::initial().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"currentPhase":"brd","unlockedPhases":["brd"],"unlockedModules":{"brd":["overview"]},"completedModules":{}}"#
        );
    }

    #[test]
    fn completing_overview_unlocks_only_the_next_module() {
        let mut state = ProgressState::initial();
        let outcome = state.complete_module(Phase::Brd, "overview").unwrap();
        assert!(outcome.newly_completed);
        assert_eq!(outcome.unlocked_module, Some("functional-requirements"));
        assert_eq!(outcome.unlocked_phase, None);
        assert!(state.is_module_unlocked(Phase::Brd, "functional-requirements"));
        assert!(!state.is_module_unlocked(Phase::Brd, "non-functional-requirements"));
    }

    #[test]
    fn completing_a_locked_module_is_refused_without_changes() {
        let mut state = ProgressState::initial();
        let before = state.clone();
        let err = state.complete_module(Phase::Brd, "user-stories").unwrap_err();
        assert!(matches!(err, LockViolation::ModuleLocked { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn unknown_module_is_refused() {
        let mut state = ProgressState::initial();
        let err = state.complete_module(Phase::Brd, "final-steps").unwrap_err();
        assert!(matches!(err, LockViolation::UnknownModule { .. }));
    }

    #[test]
    fn repeated_completion_is_a_no_op() {
        let mut once = ProgressState::initial();
        once.complete_module(Phase::Brd, "overview").unwrap();
        let mut twice = once.clone();
        let outcome = twice.complete_module(Phase::Brd, "overview").unwrap();
        assert_eq!(outcome, CompletionOutcome::default());
        assert_eq!(once, twice);
    }

    #[test]
    fn finishing_brd_rolls_over_to_uiux() {
        let mut state = ProgressState::initial();
        complete_phase(&mut state, Phase::Brd);
        assert!(state.is_phase_unlocked("uiux"));
        assert!(state.is_module_unlocked(Phase::Uiux, "overview"));
        assert!(!state.is_module_unlocked(Phase::Uiux, "design-system"));
        assert_eq!(state.current_phase(), Phase::Uiux);
    }

    #[test]
    fn finishing_architecture_unlocks_development_and_its_alias() {
        let mut state = ProgressState::initial();
        for phase in [Phase::Brd, Phase::Uiux, Phase::Architectural] {
            complete_phase(&mut state, phase);
        }
        assert!(state.is_phase_unlocked("development"));
        assert!(state.is_phase_unlocked("code-development"));
    }

    #[test]
    fn finishing_development_keeps_both_development_ids_and_unlocks_testing() {
        let mut state = ProgressState::initial();
        for phase in [Phase::Brd, Phase::Uiux, Phase::Architectural, Phase::Development] {
            complete_phase(&mut state, phase);
        }
        assert!(state.is_phase_unlocked("development"));
        assert!(state.is_phase_unlocked("code-development"));
        assert!(state.is_phase_unlocked_aliased(Phase::Development));
        assert!(state.is_phase_unlocked("testing"));
    }

    #[test]
    fn final_steps_unlocks_no_further_phase() {
        let mut state = ProgressState::initial();
        for phase in &Phase::ALL[..5] {
            complete_phase(&mut state, *phase);
        }
        let mut phases_before: Vec<String> =
            state.unlocked_phase_ids().map(str::to_string).collect();
        complete_phase(&mut state, Phase::Deployment);
        let mut phases_after: Vec<String> =
            state.unlocked_phase_ids().map(str::to_string).collect();
        phases_before.sort();
        phases_after.sort();
        assert_eq!(phases_before, phases_after);
        assert!(state.is_module_completed(Phase::Deployment, "final-steps"));
        assert!(state.phase_progress(Phase::Deployment).is_complete());
    }

    #[test]
    fn parsing_repairs_missing_invariant_entries() {
        let raw = r#"{"currentPhase":"uiux","unlockedPhases":[],"unlockedModules":{},"completedModules":{"brd":["overview"]}}"#;
        let state = ProgressState::from_json(raw).unwrap();
        assert!(state.is_phase_unlocked("brd"));
        assert!(state.is_phase_unlocked("uiux"));
        assert!(state.is_module_unlocked(Phase::Uiux, "overview"));
        assert!(state.is_module_unlocked(Phase::Brd, "overview"));
    }

    #[test]
    fn parsing_rejects_wrong_shape() {
        assert!(ProgressState::from_json("{not json").is_err());
        assert!(ProgressState::from_json(r#"{"currentPhase":"moon"}"#).is_err());
        assert!(ProgressState::from_json("[]").is_err());
    }
}
