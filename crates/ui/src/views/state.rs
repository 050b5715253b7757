use dioxus::prelude::*;
use services::NavigationError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The page's phase is not unlocked yet.
    Locked(String),
    Unavailable(String),
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ViewError::Locked(message) | ViewError::Unavailable(message) => message,
        }
    }
}

impl From<&NavigationError> for ViewError {
    fn from(err: &NavigationError) -> Self {
        match err.lock_violation() {
            Some(violation) => ViewError::Locked(violation.to_string()),
            None => ViewError::Unavailable(err.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unavailable("No data".into())),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
