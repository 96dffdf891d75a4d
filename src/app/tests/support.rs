use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::annotation::{
    AnnotationKey, AnnotationRecord, MaterialId, PageNumber, RecordId, UserId,
};
use crate::app::{App, SessionOwner};
use crate::backend::{FixedPageRenderer, PageDimensions, PageRenderer};
use crate::command::parse_command_text;
use crate::config::{Config, StoreBackend};
use crate::error::{AppError, AppResult};
use crate::nav::{SaveDecision, SavePrompt};
use crate::store::{AnnotationStore, MemoryAnnotationStore};

pub(super) const OWNER: SessionOwner = SessionOwner {
    material: MaterialId(7),
    user: UserId(42),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StoreCall {
    List(Option<PageNumber>),
    Save(PageNumber),
}

/// Memory store that records calls and can be told to fail.
#[derive(Default)]
pub(super) struct RecordingStore {
    inner: MemoryAnnotationStore,
    calls: Mutex<Vec<StoreCall>>,
    fail_saves: AtomicBool,
    fail_fetches: AtomicBool,
}

impl RecordingStore {
    pub(super) fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(super) fn save_calls(&self) -> Vec<PageNumber> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Save(page) => Some(page),
                StoreCall::List(_) => None,
            })
            .collect()
    }

    pub(super) fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub(super) fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl AnnotationStore for RecordingStore {
    async fn list(
        &self,
        material: MaterialId,
        user: UserId,
        page: Option<PageNumber>,
    ) -> AppResult<Vec<AnnotationRecord>> {
        self.record(StoreCall::List(page));
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(AppError::persistence("fetch", "connection refused"));
        }
        self.inner.list(material, user, page).await
    }

    async fn save(&self, key: AnnotationKey, payload: String) -> AppResult<AnnotationRecord> {
        self.record(StoreCall::Save(key.page));
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AppError::persistence("save", "connection refused"));
        }
        self.inner.save(key, payload).await
    }

    async fn update(
        &self,
        material: MaterialId,
        user: UserId,
        id: RecordId,
        payload: String,
    ) -> AppResult<AnnotationRecord> {
        self.inner.update(material, user, id, payload).await
    }

    async fn delete(&self, material: MaterialId, user: UserId, id: RecordId) -> AppResult<()> {
        self.inner.delete(material, user, id).await
    }
}

/// Answers from a script and keeps the pages it was asked about readable from the test.
#[derive(Clone, Default)]
pub(super) struct SharedPrompt {
    answers: Arc<Mutex<Vec<SaveDecision>>>,
    asked: Arc<Mutex<Vec<PageNumber>>>,
}

impl SharedPrompt {
    pub(super) fn answering(answers: impl IntoIterator<Item = SaveDecision>) -> Self {
        let mut answers: Vec<_> = answers.into_iter().collect();
        answers.reverse();
        Self {
            answers: Arc::new(Mutex::new(answers)),
            asked: Arc::default(),
        }
    }

    pub(super) fn asked(&self) -> Vec<PageNumber> {
        self.asked.lock().expect("asked lock").clone()
    }
}

impl SavePrompt for SharedPrompt {
    fn decide(&mut self, page: PageNumber) -> SaveDecision {
        self.asked.lock().expect("asked lock").push(page);
        self.answers
            .lock()
            .expect("answers lock")
            .pop()
            .unwrap_or(SaveDecision::Save)
    }
}

pub(super) fn memory_config() -> Config {
    let mut config = Config::default();
    config.store.backend = StoreBackend::Memory;
    config
}

/// Letter pages that come back without a size for the first `blank` renders.
pub(super) struct SizelessFirst {
    blank: AtomicUsize,
    inner: FixedPageRenderer,
}

impl SizelessFirst {
    pub(super) fn new(page_count: usize, blank: usize) -> Self {
        Self {
            blank: AtomicUsize::new(blank),
            inner: FixedPageRenderer::letter(page_count),
        }
    }
}

impl PageRenderer for SizelessFirst {
    fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    fn render_page(&self, page: PageNumber, scale: f32) -> AppResult<PageDimensions> {
        let blank = self
            .blank
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1));
        if blank.is_ok() {
            return Ok(PageDimensions::new(0, 0));
        }
        self.inner.render_page(page, scale)
    }
}

pub(super) fn session(
    page_count: usize,
    start: u32,
    store: Arc<RecordingStore>,
    prompt: impl SavePrompt + 'static,
) -> App<RecordingStore> {
    session_with_renderer(
        Arc::new(FixedPageRenderer::letter(page_count)),
        start,
        store,
        prompt,
    )
}

pub(super) fn session_with_renderer(
    renderer: Arc<dyn PageRenderer>,
    start: u32,
    store: Arc<RecordingStore>,
    prompt: impl SavePrompt + 'static,
) -> App<RecordingStore> {
    App::new(memory_config(), OWNER, store, renderer)
        .expect("session should build")
        .with_prompt(Box::new(prompt))
        .with_start_page(PageNumber(start))
}

/// Processes completions until no background work is left.
pub(super) async fn settle(app: &mut App<RecordingStore>) {
    while app.in_flight() > 0 {
        let event = app
            .channels
            .rx
            .recv()
            .await
            .expect("session channel stays open");
        app.handle_event(event).expect("event should be handled");
    }
}

pub(super) async fn open(app: &mut App<RecordingStore>) {
    app.open_initial_page().expect("initial page should open");
    settle(app).await;
}

/// Runs each script line as if typed, then waits for the results.
pub(super) async fn exec(app: &mut App<RecordingStore>, lines: &str) {
    for line in lines.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let command = parse_command_text(line).expect("test command should parse");
        app.handle_command(command).expect("command should be handled");
    }
    settle(app).await;
}
