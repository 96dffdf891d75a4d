use crate::app::AppState;
use crate::canvas::{CanvasSlot, DeleteOutcome, DrawingSurface, Shape};
use crate::config::ViewConfig;
use crate::error::AppResult;
use crate::event::{AppEvent, NavReason};
use crate::input::{GestureOutcome, GestureTracker, InputEvent};
use crate::nav::PageView;
use crate::tool::{PEN_STYLE, ToolState};

use super::core::{first_page, goto_page, last_page, next_page, prev_page, set_zoom_with_id};
use super::types::{ActionId, Command, CommandOutcome};

/// Session pieces a command may touch synchronously.
pub struct DispatchContext<'a> {
    pub tools: &'a mut ToolState,
    pub gesture: &'a mut GestureTracker,
    pub canvas: &'a mut CanvasSlot,
    pub view_config: &'a ViewConfig,
}

/// Work that has to go through the navigation controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionRequest {
    Navigate { target: PageView, reason: NavReason },
    Save,
}

#[derive(Debug, Clone)]
pub struct CommandDispatchResult {
    pub outcome: CommandOutcome,
    pub request: Option<SessionRequest>,
    pub emitted_events: Vec<AppEvent>,
}

pub fn dispatch(
    app: &mut AppState,
    cmd: Command,
    ctx: &mut DispatchContext<'_>,
) -> AppResult<CommandDispatchResult> {
    let action_id = cmd.action_id();
    let mut emitted_events = Vec::new();
    let mut request = None;

    let outcome = match cmd {
        Command::SelectTool { tool } => {
            app.status.set_action(action_id);
            let unchanged = ctx.tools.selected() == tool;
            let brush = ctx.tools.select(tool);
            if !brush.is_drawing && ctx.gesture.cancel() {
                log::debug!("dropped stroke in progress on switch to {}", tool.id());
            }
            if let Some(surface) = ctx.canvas.get_mut() {
                surface.configure_brush(tool);
            }
            if unchanged {
                app.status.info(format!("tool unchanged ({})", tool.id()));
                CommandOutcome::Noop
            } else {
                app.status.info(format!("tool: {}", tool.id()));
                emitted_events.push(AppEvent::ToolChanged { tool });
                CommandOutcome::Applied
            }
        }
        Command::Pointer(event) => apply_pointer(app, event, action_id, ctx, &mut emitted_events),
        Command::Rect { rect } => {
            app.status.set_action(action_id);
            match require_surface(app, ctx.canvas) {
                Some(surface) => {
                    let style = surface.brush().stroke.unwrap_or(PEN_STYLE);
                    match surface.add_shape(Shape::Rect { rect }, style) {
                        Some(_) => {
                            app.status.info("rectangle added");
                            emitted_events.push(AppEvent::ObjectAdded {
                                page: surface.key().page,
                                kind: "rect",
                            });
                            CommandOutcome::Applied
                        }
                        None => {
                            app.status.warn("rectangle rejected");
                            CommandOutcome::Noop
                        }
                    }
                }
                None => CommandOutcome::Noop,
            }
        }
        Command::DeleteSelected => {
            app.status.set_action(action_id);
            match require_surface(app, ctx.canvas).map(DrawingSurface::delete_selected) {
                Some(DeleteOutcome::Removed(count)) if count > 0 => {
                    app.status.info(format!("deleted {count} object(s)"));
                    CommandOutcome::Applied
                }
                Some(_) => {
                    app.status.warn("nothing selected");
                    CommandOutcome::Noop
                }
                None => CommandOutcome::Noop,
            }
        }
        Command::ClearAll => {
            app.status.set_action(action_id);
            match require_surface(app, ctx.canvas).map(DrawingSurface::clear_all) {
                Some(0) => {
                    app.status.info("page has no annotations");
                    CommandOutcome::Noop
                }
                Some(count) => {
                    app.status.info(format!("cleared {count} object(s)"));
                    CommandOutcome::Applied
                }
                None => CommandOutcome::Noop,
            }
        }
        Command::Undo => {
            app.status.set_action(action_id);
            match require_surface(app, ctx.canvas).map(DrawingSurface::undo) {
                Some(Some(removed)) => {
                    app.status.info(format!("undid {}", removed.shape.kind()));
                    CommandOutcome::Applied
                }
                Some(None) => {
                    app.status.info("nothing to undo");
                    CommandOutcome::Noop
                }
                None => CommandOutcome::Noop,
            }
        }
        Command::Save => {
            app.status.set_action(action_id);
            match require_surface(app, ctx.canvas) {
                Some(surface) if surface.is_dirty() => {
                    app.status.info(format!("saving page {}", surface.key().page));
                    request = Some(SessionRequest::Save);
                    CommandOutcome::Applied
                }
                Some(_) => {
                    app.status.info("no unsaved changes");
                    CommandOutcome::Noop
                }
                None => CommandOutcome::Noop,
            }
        }
        Command::NextPage => navigate(&mut request, next_page(app)?, NavReason::Step),
        Command::PrevPage => navigate(&mut request, prev_page(app)?, NavReason::Step),
        Command::FirstPage => navigate(&mut request, first_page(app)?, NavReason::Jump),
        Command::LastPage => navigate(&mut request, last_page(app)?, NavReason::Jump),
        Command::GotoPage { page } => {
            let target = match goto_page(app, page)? {
                Some(target) => Some(target),
                None => reload_target(app, ctx.canvas),
            };
            navigate(&mut request, target, NavReason::Jump)
        }
        Command::SetZoom { value } => {
            let target = set_zoom_with_id(app, ctx.view_config, value, action_id)?;
            navigate(&mut request, target, NavReason::Zoom)
        }
        Command::ZoomIn => {
            let value = app.view.zoom + ctx.view_config.zoom_step;
            let target = set_zoom_with_id(app, ctx.view_config, value, action_id)?;
            navigate(&mut request, target, NavReason::Zoom)
        }
        Command::ZoomOut => {
            let value = app.view.zoom - ctx.view_config.zoom_step;
            let target = set_zoom_with_id(app, ctx.view_config, value, action_id)?;
            navigate(&mut request, target, NavReason::Zoom)
        }
        Command::Quit => {
            app.status.set_action(action_id);
            app.status.info("quit requested");
            CommandOutcome::QuitRequested
        }
    };

    emitted_events.push(AppEvent::CommandExecuted {
        id: action_id,
        outcome,
    });

    Ok(CommandDispatchResult {
        outcome,
        request,
        emitted_events,
    })
}

fn apply_pointer(
    app: &mut AppState,
    event: InputEvent,
    action_id: ActionId,
    ctx: &mut DispatchContext<'_>,
    emitted_events: &mut Vec<AppEvent>,
) -> CommandOutcome {
    app.status.set_action(action_id);
    match ctx.gesture.handle(event, ctx.tools) {
        GestureOutcome::StrokeStarted | GestureOutcome::StrokeExtended => CommandOutcome::Applied,
        GestureOutcome::StrokeFinished(points) => {
            let Some(surface) = require_surface(app, ctx.canvas) else {
                return CommandOutcome::Noop;
            };
            match surface.add_stroke(points) {
                Some(_) => {
                    app.status.info(format!("{} object(s) on page", surface.len()));
                    emitted_events.push(AppEvent::ObjectAdded {
                        page: surface.key().page,
                        kind: "path",
                    });
                    CommandOutcome::Applied
                }
                None => CommandOutcome::Noop,
            }
        }
        GestureOutcome::StrokeCanceled => {
            app.status.info("stroke canceled by multi-touch");
            CommandOutcome::Applied
        }
        GestureOutcome::Suppressed => {
            app.status.info("drawing paused for multi-touch");
            CommandOutcome::Applied
        }
        GestureOutcome::Select(point) => {
            let Some(surface) = require_surface(app, ctx.canvas) else {
                return CommandOutcome::Noop;
            };
            if surface.select_at(point).is_some() {
                app.status.info("1 object selected");
            } else {
                app.status.info("nothing under pointer");
            }
            CommandOutcome::Applied
        }
        GestureOutcome::Ignored => CommandOutcome::Noop,
    }
}

fn require_surface<'a>(
    app: &mut AppState,
    canvas: &'a mut CanvasSlot,
) -> Option<&'a mut DrawingSurface> {
    let surface = canvas.get_mut();
    if surface.is_none() {
        app.status
            .warn(format!("page {} has no drawing surface", app.view.page));
    }
    surface
}

/// The current view again, when its last load left it without a surface.
fn reload_target(app: &mut AppState, canvas: &CanvasSlot) -> Option<PageView> {
    if canvas.get().is_some() {
        return None;
    }
    app.status.info(format!("reloading page {}", app.view.page));
    Some(app.view)
}

fn navigate(
    request: &mut Option<SessionRequest>,
    target: Option<PageView>,
    reason: NavReason,
) -> CommandOutcome {
    match target {
        Some(target) => {
            *request = Some(SessionRequest::Navigate { target, reason });
            CommandOutcome::Applied
        }
        None => CommandOutcome::Noop,
    }
}
