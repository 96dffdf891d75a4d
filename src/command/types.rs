use kurbo::Rect;

use crate::input::InputEvent;
use crate::tool::Tool;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SelectTool { tool: Tool },
    Pointer(InputEvent),
    /// Rectangle in the current brush style, or pen style when not drawing.
    Rect { rect: Rect },
    DeleteSelected,
    ClearAll,
    Undo,
    Save,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GotoPage { page: usize },
    SetZoom { value: f32 },
    ZoomIn,
    ZoomOut,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionId {
    SelectTool,
    PointerDown,
    PointerMove,
    PointerUp,
    MultiTouch,
    Rect,
    DeleteSelected,
    ClearAll,
    Undo,
    Save,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    GotoPage,
    SetZoom,
    ZoomIn,
    ZoomOut,
    Quit,
    RenderPage,
    LoadAnnotations,
    SaveAnnotations,
}

impl ActionId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SelectTool => "tool",
            Self::PointerDown => "down",
            Self::PointerMove => "move",
            Self::PointerUp => "up",
            Self::MultiTouch => "touch",
            Self::Rect => "rect",
            Self::DeleteSelected => "delete-selected",
            Self::ClearAll => "clear-all",
            Self::Undo => "undo",
            Self::Save => "save",
            Self::NextPage => "next-page",
            Self::PrevPage => "prev-page",
            Self::FirstPage => "first-page",
            Self::LastPage => "last-page",
            Self::GotoPage => "goto-page",
            Self::SetZoom => "set-zoom",
            Self::ZoomIn => "zoom-in",
            Self::ZoomOut => "zoom-out",
            Self::Quit => "quit",
            Self::RenderPage => "render-page",
            Self::LoadAnnotations => "load-annotations",
            Self::SaveAnnotations => "save-annotations",
        }
    }
}

impl Command {
    pub fn action_id(&self) -> ActionId {
        match self {
            Self::SelectTool { .. } => ActionId::SelectTool,
            Self::Pointer(InputEvent::PointerDown(_)) => ActionId::PointerDown,
            Self::Pointer(InputEvent::PointerMove(_)) => ActionId::PointerMove,
            Self::Pointer(InputEvent::PointerUp(_)) => ActionId::PointerUp,
            Self::Pointer(InputEvent::MultiTouch { .. }) => ActionId::MultiTouch,
            Self::Rect { .. } => ActionId::Rect,
            Self::DeleteSelected => ActionId::DeleteSelected,
            Self::ClearAll => ActionId::ClearAll,
            Self::Undo => ActionId::Undo,
            Self::Save => ActionId::Save,
            Self::NextPage => ActionId::NextPage,
            Self::PrevPage => ActionId::PrevPage,
            Self::FirstPage => ActionId::FirstPage,
            Self::LastPage => ActionId::LastPage,
            Self::GotoPage { .. } => ActionId::GotoPage,
            Self::SetZoom { .. } => ActionId::SetZoom,
            Self::ZoomIn => ActionId::ZoomIn,
            Self::ZoomOut => ActionId::ZoomOut,
            Self::Quit => ActionId::Quit,
        }
    }

    /// Tool changes apply even while a page transition is in flight.
    pub fn applies_during_transition(&self) -> bool {
        matches!(self, Self::SelectTool { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    F64,
    I32,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub args: &'static [ArgSpec],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Noop,
    QuitRequested,
}
