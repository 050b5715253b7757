use crate::model::phase::Phase;

/// Static description of one content unit inside a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub id: &'static str,
    /// Document holding the module content, relative to the phase folder.
    pub file: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    /// Terminal modules end a phase: they hide the "next" control and their
    /// completion unlocks the following phase.
    pub is_terminal: bool,
}

const fn module(
    id: &'static str,
    file: &'static str,
    label: &'static str,
    icon: &'static str,
) -> ModuleDescriptor {
    ModuleDescriptor {
        id,
        file,
        label,
        icon,
        is_terminal: false,
    }
}

const fn terminal(
    id: &'static str,
    file: &'static str,
    label: &'static str,
    icon: &'static str,
) -> ModuleDescriptor {
    ModuleDescriptor {
        id,
        file,
        label,
        icon,
        is_terminal: true,
    }
}

const OVERVIEW: ModuleDescriptor = module("overview", "Overview_Content.html", "Overview", "📘");
const CONCLUSION: ModuleDescriptor = terminal("conclusion", "Conclusion.html", "Conclusion", "🏁");

static BRD: [ModuleDescriptor; 5] = [
    OVERVIEW,
    module(
        "functional-requirements",
        "Functional_Requirements.html",
        "Functional Requirements",
        "🧩",
    ),
    module(
        "non-functional-requirements",
        "Non_Functional_Requirements.html",
        "Non-Functional Requirements",
        "🛡",
    ),
    module("user-stories", "User_Stories.html", "User Stories", "👥"),
    CONCLUSION,
];

static UIUX: [ModuleDescriptor; 6] = [
    OVERVIEW,
    module("design-system", "Design_System.html", "Design System", "🎨"),
    module("wireframes", "Wireframes.html", "Wireframes", "📐"),
    module("user-flows", "User_Flows.html", "User Flows", "🔀"),
    module("prototypes", "Prototypes.html", "Prototypes", "🖱"),
    CONCLUSION,
];

static ARCHITECTURAL: [ModuleDescriptor; 6] = [
    OVERVIEW,
    module(
        "system-architecture",
        "System_Architecture.html",
        "System Architecture",
        "🏗",
    ),
    module("database-design", "Database_Design.html", "Database Design", "🗄"),
    module("api-design", "API_Design.html", "API Design", "🔌"),
    module("security-design", "Security_Design.html", "Security Design", "🔒"),
    CONCLUSION,
];

static DEVELOPMENT: [ModuleDescriptor; 6] = [
    OVERVIEW,
    module("project-setup", "Project_Setup.html", "Project Setup", "🛠"),
    module(
        "backend-development",
        "Backend_Development.html",
        "Backend Development",
        "⚙",
    ),
    module(
        "frontend-development",
        "Frontend_Development.html",
        "Frontend Development",
        "🖥",
    ),
    module("integration", "Integration.html", "Integration", "🔗"),
    CONCLUSION,
];

static TESTING: [ModuleDescriptor; 6] = [
    OVERVIEW,
    module("unit-testing", "Unit_Testing.html", "Unit Testing", "🧪"),
    module(
        "integration-testing",
        "Integration_Testing.html",
        "Integration Testing",
        "🔬",
    ),
    module(
        "performance-testing",
        "Performance_Testing.html",
        "Performance Testing",
        "⏱",
    ),
    module(
        "user-acceptance-testing",
        "User_Acceptance_Testing.html",
        "User Acceptance Testing",
        "✅",
    ),
    CONCLUSION,
];

static DEPLOYMENT: [ModuleDescriptor; 5] = [
    OVERVIEW,
    module(
        "environment-setup",
        "Environment_Setup.html",
        "Environment Setup",
        "🌐",
    ),
    module("ci-cd-pipeline", "CI_CD_Pipeline.html", "CI/CD Pipeline", "🚀"),
    module("monitoring", "Monitoring.html", "Monitoring", "📈"),
    terminal("final-steps", "Final_Steps.html", "Final Steps", "🎓"),
];

/// Fixed, ordered module list of a phase.
#[must_use]
pub fn catalog(phase: Phase) -> &'static [ModuleDescriptor] {
    match phase {
        Phase::Brd => &BRD,
        Phase::Uiux => &UIUX,
        Phase::Architectural => &ARCHITECTURAL,
        Phase::Development => &DEVELOPMENT,
        Phase::Testing => &TESTING,
        Phase::Deployment => &DEPLOYMENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_phase_starts_with_overview_and_ends_with_its_single_terminal() {
        for phase in Phase::ALL {
            let modules = catalog(phase);
            assert_eq!(modules[0].id, "overview", "{phase}");
            let terminals: Vec<_> = modules.iter().filter(|m| m.is_terminal).collect();
            assert_eq!(terminals.len(), 1, "{phase}");
            assert!(modules.last().unwrap().is_terminal, "{phase}");
        }
    }

    #[test]
    fn deployment_ends_with_final_steps() {
        assert_eq!(catalog(Phase::Deployment).last().unwrap().id, "final-steps");
        assert_eq!(catalog(Phase::Brd).last().unwrap().id, "conclusion");
    }

    #[test]
    fn module_ids_are_unique_within_a_phase() {
        for phase in Phase::ALL {
            let modules = catalog(phase);
            for (i, a) in modules.iter().enumerate() {
                for b in &modules[i + 1..] {
                    assert_ne!(a.id, b.id, "{phase}");
                }
            }
        }
    }

    #[test]
    fn brd_order_matches_learning_sequence() {
        let ids: Vec<_> = catalog(Phase::Brd).iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            [
                "overview",
                "functional-requirements",
                "non-functional-requirements",
                "user-stories",
                "conclusion"
            ]
        );
    }
}
