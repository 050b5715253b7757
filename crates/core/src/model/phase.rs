use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::module::{ModuleDescriptor, catalog};

/// Identifier the UI uses for the development phase in some places.
pub const DEVELOPMENT_ALIAS: &str = "code-development";

/// A top-level stage of the learning project.
///
/// Phases are strictly ordered; completing the terminal module of one phase
/// unlocks the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Brd,
    Uiux,
    Architectural,
    Development,
    Testing,
    Deployment,
}

impl Phase {
    /// All phases in learning order.
    pub const ALL: [Phase; 6] = [
        Phase::Brd,
        Phase::Uiux,
        Phase::Architectural,
        Phase::Development,
        Phase::Testing,
        Phase::Deployment,
    ];

    /// The phase every learner starts in.
    pub const INITIAL: Phase = Phase::Brd;

    /// Canonical identifier used in persisted state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Brd => "brd",
            Phase::Uiux => "uiux",
            Phase::Architectural => "architectural",
            Phase::Development => "development",
            Phase::Testing => "testing",
            Phase::Deployment => "deployment",
        }
    }

    /// Alternate identifier that must observe the same unlock as the canonical one.
    #[must_use]
    pub fn alias(self) -> Option<&'static str> {
        match self {
            Phase::Development => Some(DEVELOPMENT_ALIAS),
            _ => None,
        }
    }

    /// Human readable name for the phase bar.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Phase::Brd => "Business Requirements",
            Phase::Uiux => "UI/UX Design",
            Phase::Architectural => "Architectural Design",
            Phase::Development => "Development",
            Phase::Testing => "Testing",
            Phase::Deployment => "Deployment",
        }
    }

    /// Folder holding the phase's documents when served from the same origin.
    #[must_use]
    pub fn local_folder(self) -> &'static str {
        match self {
            Phase::Brd => "BRD",
            Phase::Uiux => "UI_UX",
            Phase::Architectural => "Architectural_Design",
            Phase::Development => "Code_Development",
            Phase::Testing => "Testing",
            Phase::Deployment => "Deployment",
        }
    }

    /// Folder name on the gateway. Some contain spaces and need percent-encoding.
    #[must_use]
    pub fn gateway_folder(self) -> &'static str {
        match self {
            Phase::Brd => "BRD",
            Phase::Uiux => "UI UX",
            Phase::Architectural => "Architectural Design",
            Phase::Development => "Code Development",
            Phase::Testing => "Testing",
            Phase::Deployment => "Deployment",
        }
    }

    /// Position in the learning order, starting at 0.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Phase::Brd => 0,
            Phase::Uiux => 1,
            Phase::Architectural => 2,
            Phase::Development => 3,
            Phase::Testing => 4,
            Phase::Deployment => 5,
        }
    }

    /// The phase unlocked after this one; `None` for the terminal phase.
    #[must_use]
    pub fn next(self) -> Option<Phase> {
        Phase::ALL.get(self.index() + 1).copied()
    }

    /// Ordered module catalog for this phase.
    #[must_use]
    pub fn modules(self) -> &'static [ModuleDescriptor] {
        catalog(self)
    }

    /// First module; unlocked together with the phase.
    #[must_use]
    pub fn first_module(self) -> &'static ModuleDescriptor {
        &self.modules()[0]
    }

    /// Looks up a module of this phase by id.
    #[must_use]
    pub fn module(self, id: &str) -> Option<&'static ModuleDescriptor> {
        self.modules().iter().find(|module| module.id == id)
    }

    /// Index of a module in this phase's fixed order.
    #[must_use]
    pub fn module_index(self, id: &str) -> Option<usize> {
        self.modules().iter().position(|module| module.id == id)
    }

    /// Resolves a folder-style name (`BRD`, `UI_UX`, `UI UX`, ...) to a phase.
    #[must_use]
    pub fn from_folder(folder: &str) -> Option<Phase> {
        let folder = folder.trim();
        if folder.eq_ignore_ascii_case("Development") {
            return Some(Phase::Development);
        }
        Phase::ALL.into_iter().find(|phase| {
            folder.eq_ignore_ascii_case(phase.local_folder())
                || folder.eq_ignore_ascii_case(phase.gateway_folder())
        })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a phase identifier is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePhaseError {
    raw: String,
}

impl fmt::Display for ParsePhaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown phase identifier: {}", self.raw)
    }
}

impl std::error::Error for ParsePhaseError {}

impl FromStr for Phase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == DEVELOPMENT_ALIAS {
            return Ok(Phase::Development);
        }
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == trimmed)
            .ok_or_else(|| ParsePhaseError {
                raw: trimmed.to_string(),
            })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
