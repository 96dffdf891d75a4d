use crate::annotation::PageNumber;
use crate::app::AppState;
use crate::config::ViewConfig;
use crate::error::{AppError, AppResult};
use crate::nav::PageView;

use super::types::ActionId;

// Targets are only proposed here; the page changes once the transition lands.

pub(crate) fn next_page(app: &mut AppState) -> AppResult<Option<PageView>> {
    app.status.set_action(ActionId::NextPage);
    let page_count = resolve_page_count(app)?;
    let current = app.view.page.index();

    if current + 1 >= page_count {
        app.status
            .info(format!("already at last page ({}/{page_count})", current + 1));
        return Ok(None);
    }
    Ok(Some(page_target(app, current + 1)))
}

pub(crate) fn prev_page(app: &mut AppState) -> AppResult<Option<PageView>> {
    app.status.set_action(ActionId::PrevPage);
    resolve_page_count(app)?;
    let current = app.view.page.index();

    if current == 0 {
        app.status.info("already at first page (1)");
        return Ok(None);
    }
    Ok(Some(page_target(app, current - 1)))
}

pub(crate) fn first_page(app: &mut AppState) -> AppResult<Option<PageView>> {
    app.status.set_action(ActionId::FirstPage);
    resolve_page_count(app)?;

    if app.view.page.index() == 0 {
        app.status.info("already at first page (1)");
        return Ok(None);
    }
    Ok(Some(page_target(app, 0)))
}

pub(crate) fn last_page(app: &mut AppState) -> AppResult<Option<PageView>> {
    app.status.set_action(ActionId::LastPage);
    let page_count = resolve_page_count(app)?;

    let target = page_count - 1;
    if app.view.page.index() == target {
        app.status
            .info(format!("already at last page ({}/{page_count})", target + 1));
        return Ok(None);
    }
    Ok(Some(page_target(app, target)))
}

pub(crate) fn goto_page(app: &mut AppState, page: usize) -> AppResult<Option<PageView>> {
    app.status.set_action(ActionId::GotoPage);
    let page_count = resolve_page_count(app)?;

    if page < 1 {
        return Err(AppError::invalid_argument("page number must be >= 1"));
    }
    if page > page_count {
        return Err(AppError::invalid_argument(
            "page number exceeds document length",
        ));
    }

    let target = page - 1;
    if app.view.page.index() == target {
        app.status
            .info(format!("already at page {}/{page_count}", target + 1));
        return Ok(None);
    }
    Ok(Some(page_target(app, target)))
}

pub(crate) fn set_zoom_with_id(
    app: &mut AppState,
    view_config: &ViewConfig,
    value: f32,
    action_id: ActionId,
) -> AppResult<Option<PageView>> {
    app.status.set_action(action_id);

    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::invalid_argument(
            "zoom must be a positive finite value",
        ));
    }

    let clamped = view_config.clamp_zoom(value);
    if zoom_eq(app.view.zoom, clamped) {
        app.status
            .info(format!("zoom unchanged ({:.2}x)", app.view.zoom));
        return Ok(None);
    }
    Ok(Some(app.view.with_zoom(clamped)))
}

fn page_target(app: &AppState, index: usize) -> PageView {
    let page = u32::try_from(index + 1).map_or(PageNumber(u32::MAX), PageNumber);
    app.view.with_page(page)
}

fn resolve_page_count(app: &mut AppState) -> AppResult<usize> {
    if app.page_count > 0 {
        return Ok(app.page_count);
    }

    app.status.error("command requires an open document");
    Err(AppError::unsupported("document has no pages"))
}

fn zoom_eq(left: f32, right: f32) -> bool {
    (left - right).abs() <= 0.0005
}
