use crate::annotation::{AnnotationKey, AnnotationRecord, deserialize};
use crate::backend::PageDimensions;
use crate::canvas::DrawingSurface;
use crate::command::ActionId;
use crate::error::{AppError, AppResult};
use crate::event::{AppEvent, NavReason};
use crate::nav::{AfterSave, NavEffect, NavStep, PageView};
use crate::store::AnnotationStore;

use super::core::App;

impl<S: AnnotationStore> App<S> {
    /// Starts loading the current view; the session has nothing to leave behind yet.
    pub(crate) fn open_initial_page(&mut self) -> AppResult<()> {
        self.transition.reason = NavReason::Initial;
        let step = self.transition.nav.open(self.state.view)?;
        self.apply_step(step)
    }

    pub(crate) fn apply_step(&mut self, step: NavStep) -> AppResult<()> {
        for effect in step.effects {
            match effect {
                NavEffect::Save { generation, page } => self.spawn_save(generation, page),
                NavEffect::DisposeSurface => self.dispose_surface(),
                NavEffect::RequestRender { generation, view } => {
                    self.spawn_render(generation, view)
                }
                NavEffect::InitSurface { view, size } => self.init_surface(view, size)?,
                NavEffect::Fetch { generation, view } => self.spawn_fetch(generation, view.page),
                NavEffect::Finish { view } => self.finish_transition(view),
                NavEffect::Populate { view } => self.populate_surface(view),
                NavEffect::SaveAbandoned { page, then } => {
                    let notice = match then {
                        AfterSave::Stay => format!("page {page} was not saved"),
                        AfterSave::Navigate(_) => {
                            format!("page {page} was not saved; staying on this page")
                        }
                        AfterSave::Quit => format!("page {page} was not saved; quit canceled"),
                    };
                    self.state.status.error(notice);
                    if then == AfterSave::Quit && self.channels.input_closed {
                        self.channels.exit = Some(Err(AppError::persistence(
                            "save",
                            format!("unsaved annotations on page {page} could not be stored"),
                        )));
                    }
                }
                NavEffect::LoadFailed { view } => {
                    self.state.status.set_action(ActionId::RenderPage);
                    self.state.status.error(format!(
                        "page {} could not be rendered; goto-page {} to retry",
                        view.page, view.page
                    ));
                }
                NavEffect::Quit => {
                    log::info!("session for {} finished", self.current_key());
                    self.channels.exit = Some(Ok(()));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn on_render_complete(
        &mut self,
        generation: u64,
        view: PageView,
        result: AppResult<PageDimensions>,
    ) -> AppResult<()> {
        let size = match result {
            Ok(size) => Some(size),
            Err(err) => {
                match std::error::Error::source(&err) {
                    Some(source) => log::warn!("{err}: {source}"),
                    None => log::warn!("{err}"),
                }
                None
            }
        };
        let step = self
            .transition
            .nav
            .on_render_complete(generation, view.page, size);
        self.apply_step(step)
    }

    pub(crate) fn on_save_finished(
        &mut self,
        generation: u64,
        key: AnnotationKey,
        revision: u64,
        objects: usize,
        result: AppResult<AnnotationRecord>,
    ) -> AppResult<()> {
        let step = self
            .transition
            .nav
            .on_save_finished(generation, key.page, result.is_ok());
        if step.stale {
            return Ok(());
        }

        self.state.status.set_action(ActionId::SaveAnnotations);
        match result {
            Ok(record) => {
                if let Some(surface) = self.editing.canvas.get_mut()
                    && surface.key() == key
                    && !surface.mark_saved(revision)
                {
                    log::debug!("{key} changed while saving; staying dirty");
                }
                log::info!("saved {objects} annotation object(s) for {key}");
                self.state
                    .status
                    .info(format!("saved page {} ({objects} object(s))", key.page));
                self.emit(AppEvent::Saved {
                    key,
                    record: record.id,
                    objects,
                });
            }
            Err(err) => {
                log::warn!("saving {key} failed: {err}");
                self.emit(AppEvent::SaveFailed {
                    key,
                    message: err.to_string(),
                });
            }
        }
        self.apply_step(step)
    }

    pub(crate) fn on_annotations_loaded(
        &mut self,
        generation: u64,
        key: AnnotationKey,
        result: AppResult<Option<AnnotationRecord>>,
    ) -> AppResult<()> {
        if key.material != self.owner.material || key.user != self.owner.user {
            log::debug!("dropping annotations for foreign key {key}");
            return Ok(());
        }
        let step = self
            .transition
            .nav
            .on_annotations_loaded(generation, key.page);
        if step.stale {
            return Ok(());
        }
        self.transition.loaded = Some(result);
        self.apply_step(step)
    }

    fn dispose_surface(&mut self) {
        let page = self.editing.canvas.get().map(|surface| surface.key().page);
        if self.editing.gesture.cancel()
            && let Some(page) = page
        {
            log::info!("dropping the stroke in progress on page {page}");
            self.emit(AppEvent::StrokeDropped { page });
        }
        let dirty = self.editing.canvas.is_dirty();
        if let Some(state) = self.editing.canvas.dispose()
            && dirty
            && let Some(page) = page
        {
            self.emit(AppEvent::Discarded {
                page,
                objects: state.len(),
            });
        }
    }

    fn init_surface(&mut self, view: PageView, size: PageDimensions) -> AppResult<()> {
        let key = self.owner.key(view.page);
        let surface = DrawingSurface::initialize(key, size, self.editing.tools.selected())?;
        self.editing.canvas.install(surface);
        self.emit(AppEvent::SurfaceInitialized { key, size });
        Ok(())
    }

    fn finish_transition(&mut self, view: PageView) {
        let from = self.state.view;
        self.state.view = view;
        self.state.status.set_action(ActionId::RenderPage);
        self.state.status.info(format!(
            "page {}/{} at {:.2}x",
            view.page, self.state.page_count, view.zoom
        ));
        self.emit(AppEvent::PageChanged {
            from,
            to: view,
            reason: self.transition.reason,
        });
    }

    fn populate_surface(&mut self, view: PageView) {
        let key = self.owner.key(view.page);
        let Some(result) = self.transition.loaded.take() else {
            return;
        };
        self.state.status.set_action(ActionId::LoadAnnotations);

        let loaded = match result {
            Ok(Some(record)) => match deserialize(&record.annotation_objects) {
                Ok(state) => Some(state),
                Err(err) => {
                    log::warn!("stored annotations for {key} are unreadable: {err}");
                    self.state.status.warn(format!(
                        "page {}: stored annotations are unreadable",
                        view.page
                    ));
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("loading annotations for {key} failed: {err}");
                self.state.status.warn(format!(
                    "page {}: annotations unavailable ({err})",
                    view.page
                ));
                None
            }
        };

        let Some(surface) = self.editing.canvas.get_mut() else {
            return;
        };
        let objects = match loaded {
            Some(state) => {
                surface.populate(state);
                surface.len()
            }
            None => 0,
        };
        if objects > 0 {
            log::info!("loaded {objects} annotation object(s) for {key}");
        }
        self.emit(AppEvent::AnnotationsLoaded { key, objects });
    }
}
