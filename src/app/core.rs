use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::annotation::{AnnotationKey, AnnotationRecord, MaterialId, PageNumber, UserId};
use crate::backend::PageRenderer;
use crate::canvas::{CanvasSlot, DrawingSurface};
use crate::config::{Config, OnDirty};
use crate::error::{AppError, AppResult};
use crate::event::{AppEvent, DomainEvent, NavReason};
use crate::input::GestureTracker;
use crate::nav::{
    FixedDecision, NavPhase, NavigationController, PageView, SaveDecision, SavePrompt, StdinPrompt,
};
use crate::store::AnnotationStore;
use crate::tool::ToolState;

use super::state::AppState;

/// Whose annotations the session edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOwner {
    pub material: MaterialId,
    pub user: UserId,
}

impl SessionOwner {
    pub fn new(material: MaterialId, user: UserId) -> Self {
        Self { material, user }
    }

    pub fn key(&self, page: PageNumber) -> AnnotationKey {
        AnnotationKey::new(self.material, self.user, page)
    }
}

pub struct EditingSubsystem {
    pub tools: ToolState,
    pub gesture: GestureTracker,
    pub canvas: CanvasSlot,
}

pub struct TransitionSubsystem {
    pub nav: NavigationController,
    pub prompt: Box<dyn SavePrompt>,
    pub deferred: VecDeque<crate::command::Command>,
    pub(crate) reason: NavReason,
    pub(crate) loaded: Option<AppResult<Option<AnnotationRecord>>>,
}

pub(crate) struct Channels {
    pub(crate) tx: UnboundedSender<DomainEvent>,
    pub(crate) rx: UnboundedReceiver<DomainEvent>,
    pub(crate) in_flight: usize,
    pub(crate) input_closed: bool,
    pub(crate) exit: Option<AppResult<()>>,
}

/// One editing session over one document for one owner.
pub struct App<S: AnnotationStore> {
    pub state: AppState,
    pub config: Config,
    pub owner: SessionOwner,
    pub editing: EditingSubsystem,
    pub transition: TransitionSubsystem,
    pub(crate) store: Arc<S>,
    pub(crate) renderer: Arc<dyn PageRenderer>,
    pub(crate) channels: Channels,
    pub(crate) journal: Vec<AppEvent>,
}

impl<S: AnnotationStore> App<S> {
    pub fn new(
        config: Config,
        owner: SessionOwner,
        store: Arc<S>,
        renderer: Arc<dyn PageRenderer>,
    ) -> AppResult<Self> {
        let page_count = renderer.page_count();
        if page_count == 0 {
            return Err(AppError::invalid_argument("document has no pages"));
        }

        let prompt = default_prompt(config.navigation.on_dirty);
        let view = PageView::new(PageNumber::FIRST, config.view.initial_zoom);
        let (tx, rx) = unbounded_channel();
        Ok(Self {
            state: AppState::new(view, page_count),
            config,
            owner,
            editing: EditingSubsystem {
                tools: ToolState::default(),
                gesture: GestureTracker::default(),
                canvas: CanvasSlot::default(),
            },
            transition: TransitionSubsystem {
                nav: NavigationController::default(),
                prompt,
                deferred: VecDeque::new(),
                reason: NavReason::Initial,
                loaded: None,
            },
            store,
            renderer,
            channels: Channels {
                tx,
                rx,
                in_flight: 0,
                input_closed: false,
                exit: None,
            },
            journal: Vec::new(),
        })
    }

    pub fn with_prompt(mut self, prompt: Box<dyn SavePrompt>) -> Self {
        self.transition.prompt = prompt;
        self
    }

    /// Page shown first; out-of-range pages are clamped to the document.
    pub fn with_start_page(mut self, page: PageNumber) -> Self {
        let last = u32::try_from(self.state.page_count).unwrap_or(u32::MAX);
        let page = PageNumber(page.get().clamp(1, last));
        self.state.view = self.state.view.with_page(page);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn surface(&self) -> Option<&DrawingSurface> {
        self.editing.canvas.get()
    }

    pub fn nav_phase(&self) -> NavPhase {
        self.transition.nav.phase()
    }

    pub fn deferred_len(&self) -> usize {
        self.transition.deferred.len()
    }

    pub fn events(&self) -> &[AppEvent] {
        &self.journal
    }

    pub(crate) fn emit(&mut self, event: AppEvent) {
        log::debug!("app event: {event:?}");
        self.journal.push(event);
    }

    pub(crate) fn current_key(&self) -> AnnotationKey {
        self.owner.key(self.state.view.page)
    }
}

fn default_prompt(on_dirty: OnDirty) -> Box<dyn SavePrompt> {
    match on_dirty {
        OnDirty::Ask => Box::new(StdinPrompt),
        OnDirty::Save => Box::new(FixedDecision(SaveDecision::Save)),
        OnDirty::Discard => Box::new(FixedDecision(SaveDecision::Discard)),
    }
}
