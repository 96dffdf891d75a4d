use std::sync::Arc;

use super::support::{OWNER, RecordingStore, session};
use crate::annotation::PageNumber;
use crate::command::parse_script;
use crate::error::AppError;
use crate::nav::{SaveDecision, ScriptedPrompt};
use crate::store::AnnotationStore;

const DRAW_ON_FIRST_PAGE: &str = "
    # one pen stroke on the start page
    tool pen
    down 10 10
    move 20 25
    up 30 40
";

async fn page_one_saved(store: &RecordingStore) -> bool {
    store
        .fetch_for_page(OWNER.key(PageNumber(1)))
        .await
        .expect("fetch should succeed")
        .is_some()
}

#[tokio::test]
async fn quit_saves_the_dirty_page_first() {
    let store = Arc::new(RecordingStore::default());
    let prompt = ScriptedPrompt::new([SaveDecision::Save]);
    let mut app = session(3, 1, store.clone(), prompt);
    let script = format!("{DRAW_ON_FIRST_PAGE}\nquit");

    app.run(parse_script(&script).expect("script should parse"))
        .await
        .expect("session should end cleanly");

    assert!(page_one_saved(&store).await);
    assert!(app.surface().is_none());
}

#[tokio::test]
async fn quit_with_discard_stores_nothing() {
    let store = Arc::new(RecordingStore::default());
    let prompt = ScriptedPrompt::new([SaveDecision::Discard]);
    let mut app = session(3, 1, store.clone(), prompt);
    let script = format!("{DRAW_ON_FIRST_PAGE}\nquit");

    app.run(parse_script(&script).expect("script should parse"))
        .await
        .expect("session should end cleanly");

    assert!(!page_one_saved(&store).await);
    assert!(store.save_calls().is_empty());
}

#[tokio::test]
async fn end_of_input_goes_through_the_save_gate() {
    let store = Arc::new(RecordingStore::default());
    let mut app = session(3, 1, store.clone(), ScriptedPrompt::default());

    app.run(parse_script(DRAW_ON_FIRST_PAGE).expect("script should parse"))
        .await
        .expect("session should end cleanly");

    assert!(page_one_saved(&store).await);
}

#[tokio::test]
async fn unsaved_work_at_end_of_input_fails_the_session() {
    let store = Arc::new(RecordingStore::default());
    store.fail_saves(true);
    let mut app = session(3, 1, store.clone(), ScriptedPrompt::default());

    let err = app
        .run(parse_script(DRAW_ON_FIRST_PAGE).expect("script should parse"))
        .await
        .expect_err("lost annotations should fail the session");

    assert!(matches!(err, AppError::Persistence { .. }));
    assert_eq!(store.save_calls(), [PageNumber(1)]);
    assert!(app.surface().expect("surface is kept").is_dirty());
}

#[tokio::test]
async fn navigation_script_moves_across_pages() {
    let store = Arc::new(RecordingStore::default());
    let mut app = session(4, 1, store.clone(), ScriptedPrompt::default());
    let script = format!("{DRAW_ON_FIRST_PAGE}\nnext-page\nlast-page\nprev-page");

    app.run(parse_script(&script).expect("script should parse"))
        .await
        .expect("session should end cleanly");

    assert_eq!(app.state.view.page, PageNumber(3));
    assert!(page_one_saved(&store).await);
}
