use crate::annotation::PageNumber;
use crate::error::AppResult;

/// Pixel size of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageDimensions {
    pub width: u32,
    pub height: u32,
}

impl PageDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub(crate) fn from_points(width_pt: f32, height_pt: f32, scale: f32) -> Self {
        let scaled = |value: f32| (value * scale).ceil().max(0.0) as u32;
        Self::new(scaled(width_pt), scaled(height_pt))
    }
}

/// Document render provider. A successful `render_page` is the render-complete signal.
pub trait PageRenderer: Send + Sync + 'static {
    fn page_count(&self) -> usize;
    fn render_page(&self, page: PageNumber, scale: f32) -> AppResult<PageDimensions>;
}
