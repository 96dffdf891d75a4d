use crate::annotation::PageNumber;
use crate::error::{AppError, AppResult};

use super::traits::{PageDimensions, PageRenderer};

/// A document of uniformly sized pages, dimensions given in points at scale 1.0.
#[derive(Debug, Clone, Copy)]
pub struct FixedPageRenderer {
    page_count: usize,
    width_pt: f32,
    height_pt: f32,
}

impl FixedPageRenderer {
    /// US Letter portrait.
    pub fn letter(page_count: usize) -> Self {
        Self::new(page_count, 612.0, 792.0)
    }

    pub fn new(page_count: usize, width_pt: f32, height_pt: f32) -> Self {
        Self {
            page_count,
            width_pt,
            height_pt,
        }
    }
}

impl PageRenderer for FixedPageRenderer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&self, page: PageNumber, scale: f32) -> AppResult<PageDimensions> {
        if page.get() == 0 || page.index() >= self.page_count {
            return Err(AppError::invalid_argument("page number is out of range"));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AppError::invalid_argument(
                "scale must be a positive finite value",
            ));
        }
        Ok(PageDimensions::from_points(
            self.width_pt,
            self.height_pt,
            scale,
        ))
    }
}
