use progress_core::model::Phase;

use super::test_harness::{ViewKind, setup_view_harness};

const BRD_PAGE: &str = "http://localhost:8080/course/BRD/index.html";

#[tokio::test(flavor = "current_thread")]
async fn phase_view_smoke_renders_sidebar_and_first_module() {
    let mut harness = setup_view_harness(ViewKind::Phase, BRD_PAGE, None).await;

    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("Business Requirements"), "missing phase bar in {html}");
    assert!(html.contains("Functional Requirements"), "missing sidebar in {html}");
    assert!(html.contains("🔒"), "missing lock marker in {html}");
    assert!(html.contains("Body of Overview_Content.html"), "missing content in {html}");
    assert!(!html.contains("alert(1)"), "script survived sanitizing in {html}");
    assert!(html.contains("Next: Functional Requirements"), "missing next control in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn phase_view_smoke_shows_locked_phase() {
    let mut harness = setup_view_harness(
        ViewKind::Phase,
        "http://localhost:8080/course/Testing/index.html",
        None,
    )
    .await;

    harness.rebuild();
    harness.drive_async().await;
    harness.drive_async().await;
    let html = harness.render();

    assert!(html.contains("locked-phase"), "missing locked card in {html}");
    assert!(html.contains("View progress"), "missing progress link in {html}");
    assert!(!html.contains("module-content"), "content rendered for locked phase in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_renders_counts() {
    let mut harness = setup_view_harness(ViewKind::Progress, BRD_PAGE, None).await;
    harness
        .progress
        .complete_module(Phase::Brd, "overview")
        .await
        .expect("complete overview");

    harness.rebuild();
    let html = harness.render();

    assert!(
        html.contains("Current phase: Business Requirements"),
        "missing current phase in {html}"
    );
    assert!(html.contains("1/5"), "missing brd count in {html}");
    assert!(html.contains("Locked"), "missing locked badge in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn progress_view_smoke_marks_completed_phase() {
    let saved = r#"{
        "currentPhase": "uiux",
        "unlockedPhases": ["brd", "uiux"],
        "completedModules": {"brd": ["overview", "functional-requirements", "non-functional-requirements", "user-stories", "conclusion"]},
        "unlockedModules": {"brd": ["overview", "functional-requirements", "non-functional-requirements", "user-stories", "conclusion"], "uiux": ["overview"]}
    }"#;
    let mut harness = setup_view_harness(ViewKind::Progress, BRD_PAGE, Some(saved)).await;

    harness.rebuild();
    let html = harness.render();

    assert!(html.contains("5/5"), "missing brd count in {html}");
    assert!(html.contains("Complete"), "missing complete badge in {html}");
    assert!(html.contains("Current phase: UI/UX Design"), "missing current phase in {html}");
}
