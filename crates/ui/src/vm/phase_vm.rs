use progress_core::model::{Phase, PhaseProgress};
use progress_core::navigation::SidebarItem;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseTabVm {
    pub phase: Phase,
    pub label: &'static str,
    pub locked: bool,
    pub active: bool,
    pub progress_label: String,
}

impl PhaseTabVm {
    #[must_use]
    pub fn class(&self) -> String {
        let mut class = String::from("phase-tab");
        if self.active {
            class.push_str(" phase-tab--active");
        }
        if self.locked {
            class.push_str(" phase-tab--locked");
        }
        class
    }
}

/// Phase bar entries; with locks disabled nothing shows as locked.
#[must_use]
pub fn map_phase_bar(
    summary: &[PhaseProgress],
    active: Phase,
    enforce_locks: bool,
) -> Vec<PhaseTabVm> {
    summary
        .iter()
        .map(|item| PhaseTabVm {
            phase: item.phase,
            label: item.phase.display_name(),
            locked: enforce_locks && !item.unlocked,
            active: item.phase == active,
            progress_label: format!("{}/{}", item.completed, item.total),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarItemVm {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub locked: bool,
    pub completed: bool,
    pub active: bool,
}

impl SidebarItemVm {
    #[must_use]
    pub fn class(&self) -> String {
        let mut class = String::from("module-tab");
        for (flag, suffix) in [
            (self.active, " module-tab--active"),
            (self.completed, " module-tab--completed"),
            (self.locked, " module-tab--locked"),
        ] {
            if flag {
                class.push_str(suffix);
            }
        }
        class
    }

    #[must_use]
    pub fn marker(&self) -> &'static str {
        if self.locked {
            "🔒"
        } else if self.completed {
            "✓"
        } else {
            ""
        }
    }
}

#[must_use]
pub fn map_sidebar(items: &[SidebarItem]) -> Vec<SidebarItemVm> {
    items
        .iter()
        .map(|item| SidebarItemVm {
            id: item.module.id,
            label: item.module.label,
            icon: item.module.icon,
            locked: item.locked,
            completed: item.completed,
            active: item.active,
        })
        .collect()
}

/// The forward control under the content pane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NextControlVm {
    Hidden,
    Next { label: String },
    FinishPhase { label: String },
}

#[must_use]
pub fn next_control(
    phase: Phase,
    current: Option<&SidebarItemVm>,
    next: Option<&SidebarItemVm>,
    shows_next: bool,
) -> NextControlVm {
    match (current, next) {
        (Some(_), Some(next)) if shows_next => NextControlVm::Next {
            label: format!("Next: {}", next.label),
        },
        (Some(_), None) => NextControlVm::FinishPhase {
            label: match phase.next() {
                Some(following) => {
                    format!("Complete phase and continue to {}", following.display_name())
                }
                None => "Complete project".to_string(),
            },
        },
        _ => NextControlVm::Hidden,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::model::ProgressState;
    use progress_core::navigation::NavigatorState;

    #[test]
    fn sidebar_marks_locked_and_completed_modules() {
        let mut progress = ProgressState::initial();
        progress.complete_module(Phase::Brd, "overview").unwrap();
        let mut state = NavigatorState::new(Phase::Brd, true);
        state.commit_switch(Phase::Brd.first_module());

        let items = map_sidebar(&state.sidebar(&progress));
        assert_eq!(items[0].marker(), "✓");
        assert_eq!(items[0].class(), "module-tab module-tab--active module-tab--completed");
        assert_eq!(items[1].marker(), "");
        assert_eq!(items[2].marker(), "🔒");
    }

    #[test]
    fn phase_bar_hides_locks_when_not_enforced() {
        let progress = ProgressState::initial();
        let summary: Vec<_> = Phase::ALL.iter().map(|&p| progress.phase_progress(p)).collect();

        let enforced = map_phase_bar(&summary, Phase::Brd, true);
        assert!(!enforced[0].locked);
        assert!(enforced[1].locked);
        assert_eq!(enforced[0].progress_label, "0/5");
        assert_eq!(enforced[0].class(), "phase-tab phase-tab--active");

        let open = map_phase_bar(&summary, Phase::Brd, false);
        assert!(open.iter().all(|tab| !tab.locked));
    }

    #[test]
    fn terminal_module_offers_finish_instead_of_next() {
        let progress = ProgressState::initial();
        let mut state = NavigatorState::new(Phase::Deployment, false);
        state.commit_switch(Phase::Deployment.module("monitoring").unwrap());
        let items = map_sidebar(&state.sidebar(&progress));
        let control = next_control(
            Phase::Deployment,
            items.get(3),
            items.get(4),
            state.shows_next_control(),
        );
        assert_eq!(control, NextControlVm::Next { label: "Next: Final Steps".into() });

        let finish = next_control(Phase::Deployment, items.get(4), None, false);
        assert_eq!(finish, NextControlVm::FinishPhase { label: "Complete project".into() });

        let brd = next_control(Phase::Brd, items.get(4), None, false);
        assert_eq!(
            brd,
            NextControlVm::FinishPhase {
                label: "Complete phase and continue to UI/UX Design".into()
            }
        );
    }
}
