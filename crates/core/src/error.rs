use thiserror::Error;

use crate::model::Phase;

/// A navigation or completion attempt hit a locked phase or module.
///
/// This is an expected interaction outcome: callers surface the message to
/// the learner and keep their state unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LockViolation {
    #[error("This module is locked. Complete the earlier {} modules first.", .phase.display_name())]
    ModuleLocked { phase: Phase, module: String },

    #[error("The {} phase is locked. Finish the previous phase first.", .phase.display_name())]
    PhaseLocked { phase: Phase },

    #[error("\"{module}\" is not a module of the {phase} phase")]
    UnknownModule { phase: Phase, module: String },
}

/// Failures turning a phase or module into a URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("unable to determine the API base: no project identifier in page data or URL")]
    ApiBaseUnresolved,

    #[error("invalid content URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
