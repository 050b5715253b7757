#![forbid(unsafe_code)]

pub mod error;
pub mod gateway;
pub mod html;
pub mod model;
pub mod navigation;
pub mod page;

pub use error::{LockViolation, ResolveError};
pub use gateway::{GatewayConfig, GatewayContext};
pub use model::{ModuleDescriptor, Phase, ProgressState};
pub use navigation::{ContentResolver, NavigatorConfig, NavigatorState, SidebarItem};
pub use page::{PageContext, PageData};
