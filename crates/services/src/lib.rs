#![forbid(unsafe_code)]

pub mod app_services;
pub mod content;
pub mod drive;
pub mod error;
pub mod navigator;
pub mod progress_store;

pub use app_services::{AppServices, DeploymentMode};
pub use content::{ContentCache, ContentSource, HttpContentSource};
pub use drive::{DriveFetcher, DriveFile};
pub use error::{AppServicesError, ContentError, DriveError, NavigationError, ProgressError};
pub use navigator::{ContentPane, PhaseNavigation, PhaseNavigator};
pub use progress_store::ProgressStore;
