use crate::backend::PageDimensions;

use super::object::VectorObject;

/// Everything drawn on one page, bottom-most object first.
#[derive(Debug, Clone, PartialEq)]
pub struct PageCanvasState {
    /// Surface size the geometry was captured at.
    pub size: PageDimensions,
    pub objects: Vec<VectorObject>,
}

impl PageCanvasState {
    pub fn empty(size: PageDimensions) -> Self {
        Self {
            size,
            objects: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Re-expresses the geometry for a surface of `size`.
    pub fn rescaled_to(self, size: PageDimensions) -> Self {
        if self.size == size || self.size.is_empty() {
            return Self { size, ..self };
        }
        let sx = f64::from(size.width) / f64::from(self.size.width);
        let sy = f64::from(size.height) / f64::from(self.size.height);
        Self {
            size,
            objects: self
                .objects
                .iter()
                .map(|object| object.scaled(sx, sy))
                .collect(),
        }
    }
}
