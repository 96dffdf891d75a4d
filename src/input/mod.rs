mod events;
mod gesture;

pub use events::{InputEvent, PointerKind, PointerSample};
pub use gesture::{GestureOutcome, GestureTracker};
