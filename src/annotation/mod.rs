pub mod codec;
mod record;

pub use codec::{deserialize, serialize};
pub use record::{AnnotationKey, AnnotationRecord, MaterialId, PageNumber, RecordId, UserId};
