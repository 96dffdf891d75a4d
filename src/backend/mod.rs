use std::path::Path;
use std::sync::Arc;

use crate::error::AppResult;

mod fixed;
mod hayro;
mod traits;

pub use fixed::FixedPageRenderer;
pub use hayro::HayroPageRenderer;
pub use traits::{PageDimensions, PageRenderer};

pub fn open_default_renderer(path: impl AsRef<Path>) -> AppResult<Arc<dyn PageRenderer>> {
    HayroPageRenderer::open(path).map(|renderer| Arc::new(renderer) as Arc<dyn PageRenderer>)
}
