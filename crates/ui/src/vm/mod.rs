mod content_vm;
mod phase_vm;

pub use content_vm::{ContentVm, sanitize_content};
pub use phase_vm::{
    NextControlVm, PhaseTabVm, SidebarItemVm, map_phase_bar, map_sidebar, next_control,
};
