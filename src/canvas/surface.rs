use kurbo::Point;

use crate::annotation::AnnotationKey;
use crate::backend::PageDimensions;
use crate::error::{AppError, AppResult};
use crate::tool::{BrushConfig, Tool, configure_brush};

use super::object::{ObjectId, Shape, StrokeStyle, VectorObject};
use super::state::PageCanvasState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NothingSelected,
    Removed(usize),
}

/// State captured for a save, tagged with the revision it was taken at.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSnapshot {
    pub key: AnnotationKey,
    pub state: PageCanvasState,
    pub revision: u64,
}

/// The drawable overlay of the page currently on screen.
///
/// Geometry is in page pixels at the scale the page was rendered at, so a
/// surface never outlives its page or scale.
#[derive(Debug)]
pub struct DrawingSurface {
    key: AnnotationKey,
    state: PageCanvasState,
    selection: Vec<ObjectId>,
    brush: BrushConfig,
    dirty: bool,
    revision: u64,
}

impl DrawingSurface {
    pub fn initialize(key: AnnotationKey, size: PageDimensions, tool: Tool) -> AppResult<Self> {
        if size.is_empty() {
            return Err(AppError::resource_not_ready(format!(
                "page {} has no rendered size yet",
                key.page
            )));
        }
        log::debug!(
            "initialized surface for {key} at {}x{}",
            size.width,
            size.height
        );
        Ok(Self {
            key,
            state: PageCanvasState::empty(size),
            selection: Vec::new(),
            brush: configure_brush(tool),
            dirty: false,
            revision: 0,
        })
    }

    pub fn key(&self) -> AnnotationKey {
        self.key
    }

    pub fn size(&self) -> PageDimensions {
        self.state.size
    }

    pub fn objects(&self) -> &[VectorObject] {
        &self.state.objects
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn brush(&self) -> BrushConfig {
        self.brush
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn configure_brush(&mut self, tool: Tool) {
        self.brush = configure_brush(tool);
        if self.brush.is_drawing {
            self.selection.clear();
        }
    }

    /// Appends a finished freehand stroke in the active brush style.
    pub fn add_stroke(&mut self, points: Vec<Point>) -> Option<ObjectId> {
        if !self.brush.is_drawing {
            return None;
        }
        let style = self.brush.stroke?;
        self.add_shape(Shape::Path { points }, style)
    }

    pub fn add_shape(&mut self, shape: Shape, style: StrokeStyle) -> Option<ObjectId> {
        let valid = match &shape {
            Shape::Path { points } => {
                !points.is_empty() && points.iter().all(|point| point.is_finite())
            }
            Shape::Rect { rect } => [rect.x0, rect.y0, rect.x1, rect.y1]
                .iter()
                .all(|value| value.is_finite()),
        };
        if !valid || !style.width.is_finite() || style.width <= 0.0 {
            return None;
        }

        let object = VectorObject::new(shape, style);
        let id = object.id;
        self.state.objects.push(object);
        self.mark_mutated();
        Some(id)
    }

    /// Selects the top-most object under `point`, replacing the selection.
    pub fn select_at(&mut self, point: Point) -> Option<ObjectId> {
        self.selection.clear();
        let hit = self
            .state
            .objects
            .iter()
            .rev()
            .find(|object| object.hit_test(point))
            .map(|object| object.id)?;
        self.selection.push(hit);
        Some(hit)
    }

    pub fn delete_selected(&mut self) -> DeleteOutcome {
        if self.selection.is_empty() {
            return DeleteOutcome::NothingSelected;
        }

        let before = self.state.objects.len();
        let selection = std::mem::take(&mut self.selection);
        self.state
            .objects
            .retain(|object| !selection.contains(&object.id));
        let removed = before - self.state.objects.len();
        if removed > 0 {
            self.mark_mutated();
        }
        DeleteOutcome::Removed(removed)
    }

    /// Removes every object; a no-op on an empty surface.
    pub fn clear_all(&mut self) -> usize {
        self.selection.clear();
        if self.state.objects.is_empty() {
            return 0;
        }
        let removed = self.state.objects.len();
        self.state.objects.clear();
        self.mark_mutated();
        removed
    }

    pub fn undo(&mut self) -> Option<VectorObject> {
        let removed = self.state.objects.pop()?;
        self.selection.retain(|id| *id != removed.id);
        self.mark_mutated();
        Some(removed)
    }

    /// Replaces the contents with freshly loaded state; the result is clean.
    pub fn populate(&mut self, loaded: PageCanvasState) {
        self.state = loaded.rescaled_to(self.state.size);
        self.selection.clear();
        self.dirty = false;
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        SurfaceSnapshot {
            key: self.key,
            state: self.state.clone(),
            revision: self.revision,
        }
    }

    /// Clears the dirty flag if nothing changed since the snapshot at `revision`.
    pub fn mark_saved(&mut self, revision: u64) -> bool {
        if self.revision != revision {
            return false;
        }
        self.dirty = false;
        true
    }

    pub fn dispose(self) -> PageCanvasState {
        log::debug!(
            "disposed surface for {} (dirty: {})",
            self.key,
            self.dirty
        );
        self.state
    }

    fn mark_mutated(&mut self) {
        self.dirty = true;
        self.revision = self.revision.saturating_add(1);
    }
}

/// Owner of the single live surface.
#[derive(Debug, Default)]
pub struct CanvasSlot {
    surface: Option<DrawingSurface>,
}

impl CanvasSlot {
    pub fn install(&mut self, surface: DrawingSurface) {
        self.dispose();
        self.surface = Some(surface);
    }

    pub fn dispose(&mut self) -> Option<PageCanvasState> {
        self.surface.take().map(DrawingSurface::dispose)
    }

    pub fn get(&self) -> Option<&DrawingSurface> {
        self.surface.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut DrawingSurface> {
        self.surface.as_mut()
    }

    pub fn is_dirty(&self) -> bool {
        self.surface.as_ref().is_some_and(DrawingSurface::is_dirty)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};

    use super::{CanvasSlot, DeleteOutcome, DrawingSurface};
    use crate::annotation::{AnnotationKey, MaterialId, PageNumber, UserId};
    use crate::backend::PageDimensions;
    use crate::canvas::{PageCanvasState, Shape};
    use crate::error::AppError;
    use crate::tool::{HIGHLIGHTER_STYLE, PEN_STYLE, Tool};

    fn key(page: u32) -> AnnotationKey {
        AnnotationKey::new(MaterialId(1), UserId(2), PageNumber(page))
    }

    fn surface(tool: Tool) -> DrawingSurface {
        DrawingSurface::initialize(key(1), PageDimensions::new(200, 100), tool)
            .expect("surface should initialize")
    }

    fn line(x: f64, y: f64) -> Vec<Point> {
        vec![Point::new(x, y), Point::new(x + 10.0, y)]
    }

    #[test]
    fn initialize_without_size_is_not_ready() {
        let err = DrawingSurface::initialize(key(1), PageDimensions::new(0, 100), Tool::Pen)
            .expect_err("empty size should be rejected");
        assert!(matches!(err, AppError::ResourceNotReady(_)));
    }

    #[test]
    fn add_stroke_uses_brush_and_marks_dirty() {
        let mut surface = surface(Tool::Highlighter);
        assert!(!surface.is_dirty());

        surface.add_stroke(line(5.0, 5.0)).expect("stroke should be added");
        assert!(surface.is_dirty());
        assert_eq!(surface.objects()[0].style, HIGHLIGHTER_STYLE);

        assert_eq!(surface.add_stroke(Vec::new()), None);
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn add_stroke_is_ignored_when_tool_does_not_draw() {
        let mut surface = surface(Tool::Eraser);
        assert_eq!(surface.add_stroke(line(5.0, 5.0)), None);
        assert!(!surface.is_dirty());
    }

    #[test]
    fn delete_selected_reports_empty_selection() {
        let mut surface = surface(Tool::Pen);
        let first = surface.add_stroke(line(5.0, 5.0)).expect("stroke");
        let second = surface.add_stroke(line(5.0, 50.0)).expect("stroke");
        surface.mark_saved(surface.revision());

        surface.configure_brush(Tool::Eraser);
        assert_eq!(surface.delete_selected(), DeleteOutcome::NothingSelected);
        assert!(!surface.is_dirty());

        assert_eq!(surface.select_at(Point::new(8.0, 51.0)), Some(second));
        assert_eq!(surface.delete_selected(), DeleteOutcome::Removed(1));
        assert!(surface.is_dirty());
        assert_eq!(surface.objects()[0].id, first);
        assert!(surface.selection().is_empty());
    }

    #[test]
    fn select_at_picks_top_most_object() {
        let mut surface = surface(Tool::Pen);
        surface.add_stroke(line(5.0, 5.0)).expect("stroke");
        let top = surface
            .add_shape(
                Shape::Rect {
                    rect: Rect::new(0.0, 0.0, 50.0, 50.0),
                },
                PEN_STYLE,
            )
            .expect("rect");
        assert_eq!(surface.select_at(Point::new(7.0, 5.0)), Some(top));
        assert_eq!(surface.select_at(Point::new(150.0, 90.0)), None);
        assert!(surface.selection().is_empty());
    }

    #[test]
    fn clear_all_is_noop_when_empty() {
        let mut surface = surface(Tool::Pen);
        assert_eq!(surface.clear_all(), 0);
        assert!(!surface.is_dirty());

        surface.add_stroke(line(1.0, 1.0)).expect("stroke");
        surface.add_stroke(line(1.0, 9.0)).expect("stroke");
        assert_eq!(surface.clear_all(), 2);
        assert!(surface.is_empty());
        assert!(surface.is_dirty());
    }

    #[test]
    fn undo_pops_last_object_and_is_idle_on_empty() {
        let mut surface = surface(Tool::Pen);
        assert!(surface.undo().is_none());
        assert!(!surface.is_dirty());
        assert_eq!(surface.revision(), 0);

        let first = surface.add_stroke(line(1.0, 1.0)).expect("stroke");
        let second = surface.add_stroke(line(1.0, 9.0)).expect("stroke");
        assert_eq!(surface.undo().map(|object| object.id), Some(second));
        assert_eq!(surface.undo().map(|object| object.id), Some(first));
        assert!(surface.undo().is_none());
    }

    #[test]
    fn mark_saved_ignores_stale_revision() {
        let mut surface = surface(Tool::Pen);
        surface.add_stroke(line(1.0, 1.0)).expect("stroke");
        let snapshot = surface.snapshot();
        surface.add_stroke(line(1.0, 9.0)).expect("stroke");

        assert!(!surface.mark_saved(snapshot.revision));
        assert!(surface.is_dirty());
        assert!(surface.mark_saved(surface.revision()));
        assert!(!surface.is_dirty());
    }

    #[test]
    fn populate_rescales_to_current_size_and_is_clean() {
        let mut surface = surface(Tool::Pen);
        surface.add_stroke(line(1.0, 1.0)).expect("stroke");

        let mut loaded = PageCanvasState::empty(PageDimensions::new(100, 50));
        loaded.objects.push(crate::canvas::VectorObject::new(
            Shape::Rect {
                rect: Rect::new(10.0, 10.0, 20.0, 20.0),
            },
            PEN_STYLE,
        ));
        surface.populate(loaded);

        assert!(!surface.is_dirty());
        assert_eq!(surface.len(), 1);
        assert_eq!(
            surface.objects()[0].shape,
            Shape::Rect {
                rect: Rect::new(20.0, 20.0, 40.0, 40.0)
            }
        );
    }

    #[test]
    fn slot_holds_one_surface_at_a_time() {
        let mut slot = CanvasSlot::default();
        assert!(!slot.is_dirty());

        let mut first = surface(Tool::Pen);
        first.add_stroke(line(1.0, 1.0)).expect("stroke");
        slot.install(first);
        assert!(slot.is_dirty());

        slot.install(
            DrawingSurface::initialize(key(2), PageDimensions::new(10, 10), Tool::Pen)
                .expect("surface"),
        );
        assert_eq!(slot.get().map(|s| s.key().page), Some(PageNumber(2)));
        assert!(!slot.is_dirty());

        let disposed = slot.dispose().expect("surface should be disposed");
        assert!(disposed.is_empty());
        assert!(slot.get().is_none());
    }
}
