mod module;
mod phase;
mod progress;

pub use module::{ModuleDescriptor, catalog};
pub use phase::{DEVELOPMENT_ALIAS, ParsePhaseError, Phase};
pub use progress::{CompletionOutcome, PROGRESS_SLOT_KEY, PhaseProgress, ProgressState};
