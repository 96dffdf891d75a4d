use crate::command::ActionId;
use crate::nav::PageView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeLevel {
    #[default]
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: String,
    pub level: NoticeLevel,
    pub last_action_id: Option<ActionId>,
}

impl StatusState {
    pub fn set_action(&mut self, id: ActionId) {
        self.last_action_id = Some(id);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.set(NoticeLevel::Info, message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.set(NoticeLevel::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.set(NoticeLevel::Error, message.into());
    }

    fn set(&mut self, level: NoticeLevel, message: String) {
        self.level = level;
        self.message = message;
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Page and zoom on screen. Only moves once a transition completes.
    pub view: PageView,
    pub page_count: usize,
    pub status: StatusState,
}

impl AppState {
    pub fn new(view: PageView, page_count: usize) -> Self {
        Self {
            view,
            page_count,
            status: StatusState::default(),
        }
    }
}
