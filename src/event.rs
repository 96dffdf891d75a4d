use crate::annotation::{AnnotationKey, AnnotationRecord, PageNumber, RecordId};
use crate::backend::PageDimensions;
use crate::command::{ActionId, Command, CommandOutcome};
use crate::error::AppResult;
use crate::nav::PageView;
use crate::tool::Tool;

/// Describes *why* the view changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavReason {
    /// First page shown by the session.
    Initial,
    /// Incremental movement (next-page, prev-page).
    Step,
    /// Direct jump (first-page, last-page, goto-page).
    Jump,
    /// Same page at a new zoom.
    Zoom,
}

/// Observable session history, in the order things happened.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    CommandExecuted {
        id: ActionId,
        outcome: CommandOutcome,
    },
    ToolChanged {
        tool: Tool,
    },
    ObjectAdded {
        page: PageNumber,
        kind: &'static str,
    },
    /// A stroke still being drawn when its page was left; it is never committed.
    StrokeDropped {
        page: PageNumber,
    },
    Saved {
        key: AnnotationKey,
        record: Option<RecordId>,
        objects: usize,
    },
    SaveFailed {
        key: AnnotationKey,
        message: String,
    },
    Discarded {
        page: PageNumber,
        objects: usize,
    },
    SurfaceInitialized {
        key: AnnotationKey,
        size: PageDimensions,
    },
    AnnotationsLoaded {
        key: AnnotationKey,
        objects: usize,
    },
    PageChanged {
        from: PageView,
        to: PageView,
        reason: NavReason,
    },
}

#[derive(Debug)]
pub(crate) enum DomainEvent {
    Command(Command),
    InputClosed,
    RenderComplete {
        generation: u64,
        view: PageView,
        result: AppResult<PageDimensions>,
    },
    SaveFinished {
        generation: u64,
        key: AnnotationKey,
        revision: u64,
        objects: usize,
        result: AppResult<AnnotationRecord>,
    },
    AnnotationsLoaded {
        generation: u64,
        key: AnnotationKey,
        result: AppResult<Option<AnnotationRecord>>,
    },
}
