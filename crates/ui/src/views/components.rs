use dioxus::prelude::*;
use progress_core::model::Phase;

use crate::vm::{ContentVm, NextControlVm, PhaseTabVm, SidebarItemVm};

#[component]
pub fn PhaseBar(tabs: Vec<PhaseTabVm>, on_select: EventHandler<Phase>) -> Element {
    rsx! {
        nav { class: "phase-bar",
            for tab in tabs {
                button {
                    key: "{tab.phase}",
                    class: tab.class(),
                    r#type: "button",
                    onclick: move |_| on_select.call(tab.phase),
                    span { class: "phase-tab__label", "{tab.label}" }
                    span { class: "phase-tab__progress", "{tab.progress_label}" }
                }
            }
        }
    }
}

#[component]
pub fn ModuleSidebar(items: Vec<SidebarItemVm>, on_select: EventHandler<&'static str>) -> Element {
    rsx! {
        aside { class: "module-sidebar",
            ul {
                for item in items {
                    li { key: "{item.id}",
                        button {
                            class: item.class(),
                            r#type: "button",
                            onclick: move |_| on_select.call(item.id),
                            span { class: "module-tab__icon", "{item.icon}" }
                            span { class: "module-tab__label", "{item.label}" }
                            span { class: "module-tab__marker", "{item.marker()}" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn ContentPanel(content: ContentVm) -> Element {
    match content {
        ContentVm::Loading => rsx! {
            div { class: "content-pane content-pane--loading", p { "Loading…" } }
        },
        ContentVm::Ready { title, html } => rsx! {
            article { class: "content-pane",
                h2 { class: "content-pane__title", "{title}" }
                div { class: "module-content", dangerous_inner_html: "{html}" }
            }
        },
        ContentVm::Failed { title, message } => rsx! {
            ErrorCard { title: title.to_string(), message }
        },
    }
}

#[component]
pub fn ErrorCard(title: String, message: String) -> Element {
    rsx! {
        div { class: "error-card", role: "alert",
            h3 { "{title}" }
            p { "{message}" }
        }
    }
}

/// Modal shown when the learner tries to open something still locked.
#[component]
pub fn LockNotice(message: String, on_close: EventHandler<()>) -> Element {
    rsx! {
        div { class: "modal-backdrop",
            div { class: "modal", role: "dialog",
                h3 { "Locked" }
                p { "{message}" }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| on_close.call(()),
                    "OK"
                }
            }
        }
    }
}

#[component]
pub fn NextControl(
    control: NextControlVm,
    on_next: EventHandler<()>,
    on_finish: EventHandler<()>,
) -> Element {
    match control {
        NextControlVm::Hidden => rsx! {},
        NextControlVm::Next { label } => rsx! {
            div { class: "next-control",
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| on_next.call(()),
                    "{label}"
                }
            }
        },
        NextControlVm::FinishPhase { label } => rsx! {
            div { class: "next-control",
                button {
                    class: "btn btn-success",
                    r#type: "button",
                    onclick: move |_| on_finish.call(()),
                    "{label}"
                }
            }
        },
    }
}
