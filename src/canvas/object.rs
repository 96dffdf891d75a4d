use std::fmt;
use std::str::FromStr;

use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const YELLOW: Color = Color {
        r: 255,
        g: 255,
        b: 0,
    };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = AppError;

    fn from_str(value: &str) -> AppResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "red" => return Ok(Self::RED),
            "yellow" => return Ok(Self::YELLOW),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }

        let hex = value
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| AppError::invalid_argument(format!("unknown color: {value}")))?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(AppError::invalid_argument(format!(
                "color must be #rrggbb: {value}"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| AppError::invalid_argument(format!("color must be #rrggbb: {value}")))
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// Freehand stroke through the captured pointer samples.
    Path { points: Vec<Point> },
    Rect { rect: Rect },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path { .. } => "path",
            Self::Rect { .. } => "rect",
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Path { points } => {
                let (first, rest) = points.split_first()?;
                Some(
                    rest.iter()
                        .fold(Rect::from_points(*first, *first), |acc, point| {
                            acc.union_pt(*point)
                        }),
                )
            }
            Self::Rect { rect } => Some(rect.abs()),
        }
    }

    fn transformed(&self, affine: Affine) -> Self {
        match self {
            Self::Path { points } => Self::Path {
                points: points.iter().map(|point| affine * *point).collect(),
            },
            Self::Rect { rect } => Self::Rect {
                rect: affine.transform_rect_bbox(*rect),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub shape: Shape,
    pub style: StrokeStyle,
}

impl VectorObject {
    pub fn new(shape: Shape, style: StrokeStyle) -> Self {
        Self {
            id: ObjectId::new(),
            shape,
            style,
        }
    }

    /// Whether `point` lands on the object, counting half the stroke width around it.
    pub fn hit_test(&self, point: Point) -> bool {
        let Some(bounds) = self.shape.bounds() else {
            return false;
        };
        let half = (self.style.width / 2.0).max(1.0);
        let hit = bounds.inflate(half, half);
        point.x >= hit.x0 && point.x <= hit.x1 && point.y >= hit.y0 && point.y <= hit.y1
    }

    pub(crate) fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            id: self.id,
            shape: self.shape.transformed(Affine::scale_non_uniform(sx, sy)),
            style: StrokeStyle {
                width: self.style.width * (sx + sy) / 2.0,
                ..self.style
            },
        }
    }
}
