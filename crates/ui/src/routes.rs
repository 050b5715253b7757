use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{PhaseView, ProgressView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", PhaseView)] Phase {},
        #[route("/progress", ProgressView)] Progress {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            header { class: "topbar",
                h1 { "Project Walkthrough" }
                nav {
                    Link { to: Route::Phase {}, "Modules" }
                    Link { to: Route::Progress {}, "Progress" }
                }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
