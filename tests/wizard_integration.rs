//! End-to-end tests for a wizard installed on disk
//!
//! Each test builds a `steps/` directory in a temp install root and walks it
//! with the filesystem repository and the HTML page renderer.

use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use stepdeck::render::{HtmlPageRenderer, Page};
use stepdeck::{FsStepRepository, Presenter, StepError};

// ─── Fixture Helpers ─────────────────────────────────────────────────────────

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Install a three-step wizard: intro, select_data (with a shared script), finish
fn install_wizard(root: &Path) {
    let steps = root.join("steps");
    write(
        &steps.join("steps.json"),
        r#"["intro", "select_data", "finish"]"#,
    );

    write(
        &steps.join("intro/step.json"),
        r#"{"name": "intro", "view": "intro.html", "styles": ["intro.css"], "scripts": []}"#,
    );
    write(&steps.join("intro/intro.html"), "<h1>Welcome {{user}}</h1>");
    write(&steps.join("intro/intro.css"), "h1 { color: red; }");

    write(
        &steps.join("select_data/step.json"),
        r#"{
            "name": "select_data",
            "view": "select_data.html",
            "styles": ["select_data.css"],
            "scripts": ["select_data.js", "shared/forms.js"]
        }"#,
    );
    write(
        &steps.join("select_data/select_data.html"),
        "<div id=\"select-data-step\">{{#each formats}}<span>{{this}}</span>{{/each}}</div>",
    );
    write(&steps.join("select_data/select_data.css"), "");
    write(&steps.join("select_data/select_data.js"), "");
    write(&steps.join("shared/forms.js"), "");

    write(
        &steps.join("finish/step.json"),
        r#"{"name": "finish", "view": "finish.html", "styles": [], "scripts": []}"#,
    );
    write(&steps.join("finish/finish.html"), "<p>Done, {{user}}.</p>");
}

fn setup() -> (TempDir, Presenter, Arc<HtmlPageRenderer>) {
    let temp_dir = TempDir::new().unwrap();
    install_wizard(temp_dir.path());

    let repository = Arc::new(FsStepRepository::new(temp_dir.path()));
    let renderer = Arc::new(HtmlPageRenderer::new(Page::new("Wizard")));
    let presenter = Presenter::new(repository, renderer.clone());
    (temp_dir, presenter, renderer)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn walk_whole_wizard() {
    let (_temp_dir, presenter, renderer) = setup();
    let context = json!({"user": "Sam", "formats": ["csv", "json"]});

    presenter.render_current(&context).await.unwrap();
    assert!(renderer.page_html().await.contains("<h1>Welcome Sam</h1>"));

    presenter.render_next(&context).await.unwrap();
    let html = renderer.page_html().await;
    assert!(html.contains("<span>csv</span><span>json</span>"));
    assert!(html.contains("select_data.css"));
    assert!(html.contains("forms.js"));
    assert!(!html.contains("intro.css"));

    presenter.render_next(&context).await.unwrap();
    let html = renderer.page_html().await;
    assert!(html.contains("<p>Done, Sam.</p>"));
    assert!(!html.contains("late-js-content-holder"));

    let err = presenter.render_next(&context).await.unwrap_err();
    assert!(matches!(err, StepError::NoMoreSteps));
    assert_eq!(presenter.current_step_name().await.unwrap(), "finish");
}

#[tokio::test]
async fn step_with_missing_resource_is_not_rendered() {
    let (temp_dir, presenter, renderer) = setup();
    std::fs::remove_file(temp_dir.path().join("steps/shared/forms.js")).unwrap();

    presenter.render_current(&json!({"user": "Sam"})).await.unwrap();
    let err = presenter.render_next(&json!({})).await.unwrap_err();
    assert!(matches!(err, StepError::ResourceNotFound(ref r) if r == "shared/forms.js"));

    // The intro page is still what is shown
    assert!(renderer.page_html().await.contains("Welcome Sam"));
}

#[tokio::test]
async fn missing_manifest_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let repository = Arc::new(FsStepRepository::new(temp_dir.path()));
    let renderer = Arc::new(HtmlPageRenderer::new(Page::new("Wizard")));
    let presenter = Presenter::new(repository, renderer);

    let err = presenter.render_current(&json!({})).await.unwrap_err();
    assert!(matches!(err, StepError::NotFound(_)));
    assert!(!presenter.is_loaded());
}

#[tokio::test]
async fn malformed_descriptor_is_parse_error() {
    let (temp_dir, presenter, _renderer) = setup();
    write(
        &temp_dir.path().join("steps/finish/step.json"),
        r#"{"name": "finish"}"#,
    );

    let err = presenter.render_named("finish", &json!({})).await.unwrap_err();
    assert!(matches!(err, StepError::ParseError(_)));
}

#[tokio::test]
async fn jump_back_and_forth() {
    let (_temp_dir, presenter, renderer) = setup();
    let context = json!({"user": "Sam"});

    presenter.render_named("finish", &context).await.unwrap();
    presenter.render_previous(&context).await.unwrap();
    assert_eq!(presenter.current_step_name().await.unwrap(), "select_data");
    assert_eq!(
        presenter.format_progress().await.unwrap(),
        "intro > [select_data] > finish"
    );

    presenter.render_previous(&context).await.unwrap();
    let err = presenter.render_previous(&context).await.unwrap_err();
    assert!(matches!(err, StepError::OutOfRange { .. }));
    assert!(renderer.page_html().await.contains("Welcome Sam"));
}
