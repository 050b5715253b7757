use progress_core::model::{Phase, ProgressState};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn attempt() -> impl Strategy<Value = (Phase, usize)> {
    (0..Phase::ALL.len(), 0..6usize).prop_map(|(p, m)| (Phase::ALL[p], m))
}

fn unlocked_pairs(state: &ProgressState) -> Vec<(Phase, &'static str)> {
    Phase::ALL
        .iter()
        .flat_map(|&phase| phase.modules().iter().map(move |m| (phase, m.id)))
        .filter(|&(phase, id)| state.is_module_unlocked(phase, id))
        .collect()
}

fn try_complete(state: &mut ProgressState, (phase, index): (Phase, usize)) {
    if let Some(module) = phase.modules().get(index) {
        let _ = state.complete_module(phase, module.id);
    }
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn unlocks_never_shrink(attempts in prop::collection::vec(attempt(), 0..120)) {
        let mut state = ProgressState::initial();
        for step in attempts {
            let phases_before: Vec<String> =
                state.unlocked_phase_ids().map(str::to_string).collect();
            let modules_before = unlocked_pairs(&state);
            try_complete(&mut state, step);
            for id in &phases_before {
                prop_assert!(state.is_phase_unlocked(id), "phase {id} was locked again");
            }
            for (phase, id) in modules_before {
                prop_assert!(state.is_module_unlocked(phase, id));
            }
        }
    }

    #[test]
    fn completion_implies_unlock(attempts in prop::collection::vec(attempt(), 0..120)) {
        let mut state = ProgressState::initial();
        for step in attempts {
            try_complete(&mut state, step);
        }
        for phase in Phase::ALL {
            for module in phase.modules() {
                if state.is_module_completed(phase, module.id) {
                    prop_assert!(state.is_module_unlocked(phase, module.id));
                    prop_assert!(state.is_phase_unlocked_aliased(phase));
                }
            }
        }
    }

    #[test]
    fn repeated_completion_is_a_no_op(attempts in prop::collection::vec(attempt(), 1..80)) {
        let mut state = ProgressState::initial();
        for step in &attempts {
            try_complete(&mut state, *step);
        }
        let settled = state.clone();
        for step in &attempts {
            let (phase, index) = *step;
            if let Some(module) = phase.modules().get(index) {
                if settled.is_module_completed(phase, module.id) {
                    let outcome = state.complete_module(phase, module.id).unwrap();
                    prop_assert!(!outcome.newly_completed);
                }
            }
        }
        prop_assert_eq!(state, settled);
    }

    #[test]
    fn persisted_form_survives_reload(attempts in prop::collection::vec(attempt(), 0..60)) {
        let mut state = ProgressState::initial();
        for step in attempts {
            try_complete(&mut state, step);
        }
        let reloaded = ProgressState::from_json(&state.to_json().unwrap()).unwrap();
        prop_assert_eq!(reloaded, state);
    }
}
