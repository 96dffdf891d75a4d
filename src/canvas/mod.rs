mod object;
mod state;
mod surface;

pub use object::{Color, ObjectId, Shape, StrokeStyle, VectorObject};
pub use state::PageCanvasState;
pub use surface::{CanvasSlot, DeleteOutcome, DrawingSurface, SurfaceSnapshot};
