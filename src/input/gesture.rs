use kurbo::Point;

use crate::tool::ToolState;

use super::events::InputEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    StrokeStarted,
    StrokeExtended,
    StrokeFinished(Vec<Point>),
    /// A stroke in progress was dropped by a multi-touch contact.
    StrokeCanceled,
    Suppressed,
    Select(Point),
}

/// Turns pointer events into whole strokes. A stroke only reaches the surface
/// once the pointer lifts, so a multi-touch contact can drop it entirely.
#[derive(Debug, Default)]
pub struct GestureTracker {
    active: Option<Vec<Point>>,
}

impl GestureTracker {
    pub fn is_stroking(&self) -> bool {
        self.active.is_some()
    }

    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn handle(&mut self, event: InputEvent, tools: &mut ToolState) -> GestureOutcome {
        match event {
            InputEvent::PointerDown(sample) => {
                if !sample.is_contact() {
                    return GestureOutcome::Ignored;
                }
                tools.on_single_pointer();
                if tools.drawing_enabled() {
                    self.active = Some(vec![sample.position]);
                    GestureOutcome::StrokeStarted
                } else {
                    self.active = None;
                    GestureOutcome::Select(sample.position)
                }
            }
            InputEvent::PointerMove(sample) => {
                let Some(points) = self.active.as_mut() else {
                    return GestureOutcome::Ignored;
                };
                push_distinct(points, sample.position);
                GestureOutcome::StrokeExtended
            }
            InputEvent::PointerUp(sample) => {
                let Some(mut points) = self.active.take() else {
                    return GestureOutcome::Ignored;
                };
                push_distinct(&mut points, sample.position);
                GestureOutcome::StrokeFinished(points)
            }
            InputEvent::MultiTouch { contacts } if contacts > 1 => {
                tools.suppress_for_multi_touch();
                if self.cancel() {
                    GestureOutcome::StrokeCanceled
                } else {
                    GestureOutcome::Suppressed
                }
            }
            InputEvent::MultiTouch { .. } => GestureOutcome::Ignored,
        }
    }
}

fn push_distinct(points: &mut Vec<Point>, point: Point) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::{GestureOutcome, GestureTracker};
    use crate::input::{InputEvent, PointerKind, PointerSample};
    use crate::tool::{Tool, ToolState};

    fn pen_tools() -> ToolState {
        let mut tools = ToolState::default();
        tools.select(Tool::Pen);
        tools
    }

    #[test]
    fn builds_stroke_from_down_move_up() {
        let mut tools = pen_tools();
        let mut tracker = GestureTracker::default();

        assert_eq!(
            tracker.handle(InputEvent::PointerDown(PointerSample::mouse(1.0, 1.0)), &mut tools),
            GestureOutcome::StrokeStarted
        );
        tracker.handle(InputEvent::PointerMove(PointerSample::mouse(2.0, 2.0)), &mut tools);
        tracker.handle(InputEvent::PointerMove(PointerSample::mouse(2.0, 2.0)), &mut tools);
        let finished =
            tracker.handle(InputEvent::PointerUp(PointerSample::mouse(3.0, 1.0)), &mut tools);

        assert_eq!(
            finished,
            GestureOutcome::StrokeFinished(vec![
                Point::new(1.0, 1.0),
                Point::new(2.0, 2.0),
                Point::new(3.0, 1.0),
            ])
        );
        assert!(!tracker.is_stroking());
    }

    #[test]
    fn multi_touch_drops_stroke_and_suppresses_until_next_down() {
        let mut tools = pen_tools();
        let mut tracker = GestureTracker::default();

        tracker.handle(InputEvent::PointerDown(PointerSample::mouse(1.0, 1.0)), &mut tools);
        tracker.handle(InputEvent::PointerMove(PointerSample::mouse(4.0, 4.0)), &mut tools);
        assert_eq!(
            tracker.handle(InputEvent::MultiTouch { contacts: 2 }, &mut tools),
            GestureOutcome::StrokeCanceled
        );
        assert!(!tools.drawing_enabled());
        assert_eq!(
            tracker.handle(InputEvent::PointerUp(PointerSample::mouse(5.0, 5.0)), &mut tools),
            GestureOutcome::Ignored
        );

        assert_eq!(
            tracker.handle(InputEvent::PointerDown(PointerSample::mouse(9.0, 9.0)), &mut tools),
            GestureOutcome::StrokeStarted
        );
        assert!(tools.drawing_enabled());
    }

    #[test]
    fn single_contact_report_is_not_multi_touch() {
        let mut tools = pen_tools();
        let mut tracker = GestureTracker::default();
        assert_eq!(
            tracker.handle(InputEvent::MultiTouch { contacts: 1 }, &mut tools),
            GestureOutcome::Ignored
        );
        assert!(tools.drawing_enabled());
    }

    #[test]
    fn pen_hover_without_pressure_is_ignored() {
        let mut tools = pen_tools();
        let mut tracker = GestureTracker::default();
        let hover = PointerSample {
            position: Point::new(1.0, 1.0),
            pressure: 0.0,
            kind: PointerKind::Pen,
        };
        assert_eq!(
            tracker.handle(InputEvent::PointerDown(hover), &mut tools),
            GestureOutcome::Ignored
        );

        let contact = PointerSample {
            pressure: 0.4,
            ..hover
        };
        assert_eq!(
            tracker.handle(InputEvent::PointerDown(contact), &mut tools),
            GestureOutcome::StrokeStarted
        );
    }

    #[test]
    fn non_drawing_tools_select() {
        let mut tools = ToolState::default();
        tools.select(Tool::Eraser);
        let mut tracker = GestureTracker::default();
        assert_eq!(
            tracker.handle(InputEvent::PointerDown(PointerSample::mouse(3.0, 4.0)), &mut tools),
            GestureOutcome::Select(Point::new(3.0, 4.0))
        );
    }
}
