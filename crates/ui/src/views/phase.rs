use dioxus::prelude::*;
use dioxus_router::Link;

use progress_core::model::Phase;
use services::{ContentPane, NavigationError, PhaseNavigation};

use super::components::{
    ContentPanel, ErrorCard, LockNotice, ModuleSidebar, NextControl, PhaseBar,
};
use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ContentVm, map_phase_bar, map_sidebar, next_control};

#[component]
pub fn PhaseView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut navigator = use_signal({
        let ctx = ctx.clone();
        move || ctx.navigator_for_current_page()
    });
    let mut pane = use_signal(|| None::<ContentPane>);
    let mut notice = use_signal(|| None::<String>);
    let mut failure = use_signal(|| None::<ViewError>);

    let initial = use_resource(move || async move {
        let nav = navigator();
        let mut pane = pane;
        let loaded = nav
            .load_initial_content()
            .await
            .map_err(|err| ViewError::from(&err))?;
        pane.set(Some(loaded));
        Ok::<_, ViewError>(())
    });

    // Lock refusals become the modal notice; anything else the error card.
    let report = use_callback(move |err: NavigationError| {
        let mut notice = notice;
        let mut failure = failure;
        match ViewError::from(&err) {
            ViewError::Locked(message) => notice.set(Some(message)),
            other => failure.set(Some(other)),
        }
    });

    let show_pane = use_callback(move |loaded: ContentPane| {
        let mut pane = pane;
        let mut failure = failure;
        failure.set(None);
        pane.set(Some(loaded));
    });

    let open_navigation = use_callback({
        let ctx = ctx.clone();
        move |navigation: PhaseNavigation| {
            let page = ctx.current_page().navigated(navigation.url, navigation.phase);
            pane.set(None);
            failure.set(None);
            navigator.set(ctx.open_page(page));
        }
    });

    let on_tab = use_callback(move |id: &'static str| {
        let nav = navigator();
        spawn(async move {
            match nav.switch_tab(id).await {
                Ok(loaded) => show_pane.call(loaded),
                Err(err) => report.call(err),
            }
        });
    });

    let on_next = use_callback(move |()| {
        let nav = navigator();
        spawn(async move {
            match nav.go_to_next().await {
                Ok(Some(loaded)) => show_pane.call(loaded),
                Ok(None) => {}
                Err(err) => report.call(err),
            }
        });
    });

    let on_finish = use_callback(move |()| {
        let nav = navigator();
        spawn(async move {
            match nav.finish_phase().await {
                Ok(Some(navigation)) => open_navigation.call(navigation),
                Ok(None) => {
                    let mut notice = notice;
                    notice.set(Some("Every phase is complete. Well done!".to_string()));
                }
                Err(err) => report.call(err),
            }
        });
    });

    let on_phase = use_callback(move |phase: Phase| {
        match navigator().navigate_to_phase(phase) {
            Ok(navigation) => open_navigation.call(navigation),
            Err(err) => report.call(err),
        }
    });

    let nav = navigator.read().clone();
    let tabs = map_phase_bar(
        &nav.progress().progress_summary(),
        nav.phase(),
        nav.config().enforce_locks,
    );
    let sidebar = map_sidebar(&nav.sidebar());
    let active = sidebar.iter().position(|item| item.active);
    let control = next_control(
        nav.phase(),
        active.and_then(|index| sidebar.get(index)),
        active.and_then(|index| sidebar.get(index + 1)),
        nav.shows_next_control(),
    );
    let state = view_state_from_resource(initial);
    let failure_message = failure.read().as_ref().map(|err| err.message().to_string());
    let notice_message = notice.read().clone();
    let content = pane
        .read()
        .as_ref()
        .map_or(ContentVm::Loading, ContentVm::from_pane);

    rsx! {
        div { class: "page phase-page",
            PhaseBar { tabs, on_select: on_phase }
            match state {
                ViewState::Error(ViewError::Locked(message)) => rsx! {
                    div { class: "locked-phase",
                        h2 { "{nav.phase().display_name()}" }
                        p { "{message}" }
                        Link { to: Route::Progress {}, "View progress" }
                    }
                },
                ViewState::Error(err) => rsx! {
                    ErrorCard {
                        title: "Unable to open this phase".to_string(),
                        message: err.message().to_string(),
                    }
                },
                ViewState::Idle | ViewState::Loading => rsx! {
                    div { class: "phase-body",
                        ModuleSidebar { items: sidebar, on_select: on_tab }
                        ContentPanel { content: ContentVm::Loading }
                    }
                },
                ViewState::Ready(()) => rsx! {
                    div { class: "phase-body",
                        ModuleSidebar { items: sidebar, on_select: on_tab }
                        div { class: "phase-main",
                            if let Some(message) = failure_message {
                                ErrorCard { title: "Something went wrong".to_string(), message }
                            }
                            ContentPanel { content }
                            NextControl { control, on_next, on_finish }
                        }
                    }
                },
            }
            if let Some(message) = notice_message {
                LockNotice {
                    message,
                    on_close: move |()| notice.set(None),
                }
            }
        }
    }
}
