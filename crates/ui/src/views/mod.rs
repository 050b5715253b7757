mod components;
mod phase;
mod progress;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use phase::PhaseView;
pub use progress::ProgressView;
pub use state::{ViewError, ViewState, view_state_from_resource};
