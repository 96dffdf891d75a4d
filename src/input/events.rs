use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "mouse" => Some(Self::Mouse),
            "touch" => Some(Self::Touch),
            "pen" => Some(Self::Pen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Page-pixel position on the current surface.
    pub position: Point,
    /// 0.0..=1.0; devices without pressure report 1.0 while in contact.
    pub pressure: f32,
    pub kind: PointerKind,
}

impl PointerSample {
    pub fn mouse(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            pressure: 1.0,
            kind: PointerKind::Mouse,
        }
    }

    pub fn is_contact(&self) -> bool {
        self.kind != PointerKind::Pen || self.pressure > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerSample),
    PointerMove(PointerSample),
    PointerUp(PointerSample),
    /// Number of simultaneous contacts reported by the device.
    MultiTouch { contacts: u8 },
}
