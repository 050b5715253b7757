use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn ProgressView() -> Element {
    let ctx = use_context::<AppContext>();
    let progress = ctx.progress();
    let current = progress.snapshot().current_phase();
    let rows = progress.progress_summary();

    rsx! {
        div { class: "page progress-page",
            h2 { "Progress" }
            p { class: "progress-current", "Current phase: {current.display_name()}" }
            ul { class: "progress-list",
                for row in rows {
                    li {
                        key: "{row.phase}",
                        class: if row.unlocked {
                            "progress-row"
                        } else {
                            "progress-row progress-row--locked"
                        },
                        span { class: "progress-row__name", "{row.phase.display_name()}" }
                        span { class: "progress-row__count", "{row.completed}/{row.total}" }
                        if row.is_complete() {
                            span { class: "progress-row__badge", "Complete" }
                        } else if !row.unlocked {
                            span { class: "progress-row__badge", "Locked" }
                        }
                    }
                }
            }
            Link { to: Route::Phase {}, "Back to modules" }
        }
    }
}
