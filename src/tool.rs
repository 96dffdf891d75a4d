use crate::canvas::{Color, StrokeStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    None,
    Pen,
    Highlighter,
    Eraser,
}

impl Tool {
    pub fn id(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pen => "pen",
            Self::Highlighter => "highlighter",
            Self::Eraser => "eraser",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "pen" => Some(Self::Pen),
            "highlighter" => Some(Self::Highlighter),
            "eraser" => Some(Self::Eraser),
            _ => None,
        }
    }
}

pub const PEN_STYLE: StrokeStyle = StrokeStyle {
    color: Color::RED,
    width: 2.0,
    opacity: 1.0,
};

pub const HIGHLIGHTER_STYLE: StrokeStyle = StrokeStyle {
    color: Color::YELLOW,
    width: 20.0,
    opacity: 0.3,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushConfig {
    pub is_drawing: bool,
    /// `None` when the tool does not lay down ink.
    pub stroke: Option<StrokeStyle>,
}

pub fn configure_brush(tool: Tool) -> BrushConfig {
    match tool {
        Tool::Pen => BrushConfig {
            is_drawing: true,
            stroke: Some(PEN_STYLE),
        },
        Tool::Highlighter => BrushConfig {
            is_drawing: true,
            stroke: Some(HIGHLIGHTER_STYLE),
        },
        Tool::Eraser | Tool::None => BrushConfig {
            is_drawing: false,
            stroke: None,
        },
    }
}

/// Selected tool plus the multi-touch override.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolState {
    selected: Tool,
    multi_touch_suppressed: bool,
}

impl ToolState {
    pub fn selected(&self) -> Tool {
        self.selected
    }

    pub fn select(&mut self, tool: Tool) -> BrushConfig {
        self.selected = tool;
        configure_brush(tool)
    }

    pub fn brush(&self) -> BrushConfig {
        configure_brush(self.selected)
    }

    pub fn drawing_enabled(&self) -> bool {
        self.brush().is_drawing && !self.multi_touch_suppressed
    }

    pub fn suppress_for_multi_touch(&mut self) {
        self.multi_touch_suppressed = true;
    }

    pub fn on_single_pointer(&mut self) {
        self.multi_touch_suppressed = false;
    }
}
