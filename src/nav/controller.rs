use crate::annotation::PageNumber;
use crate::backend::PageDimensions;
use crate::error::{AppError, AppResult};

use super::prompt::{SaveDecision, SavePrompt};

/// Renders requested for one load before the page is shown without a surface.
/// A page left like that is loaded again by the next request for its view.
pub const MAX_RENDER_ATTEMPTS: u8 = 3;

/// A page at the zoom it is displayed with. Surface geometry is only valid
/// for the view it was drawn in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageView {
    pub page: PageNumber,
    pub zoom: f32,
}

impl PageView {
    pub fn new(page: PageNumber, zoom: f32) -> Self {
        Self { page, zoom }
    }

    pub fn with_page(self, page: PageNumber) -> Self {
        Self { page, ..self }
    }

    pub fn with_zoom(self, zoom: f32) -> Self {
        Self { zoom, ..self }
    }
}

/// What happens once the pending save succeeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AfterSave {
    Stay,
    Navigate(PageView),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    AwaitingRender { attempts: u8 },
    AwaitingAnnotations,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavPhase {
    Idle,
    Saving {
        generation: u64,
        page: PageNumber,
        then: AfterSave,
    },
    NavigationPending {
        generation: u64,
        target: PageView,
        stage: LoadStage,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEffect {
    Save {
        generation: u64,
        page: PageNumber,
    },
    DisposeSurface,
    RequestRender {
        generation: u64,
        view: PageView,
    },
    InitSurface {
        view: PageView,
        size: PageDimensions,
    },
    Fetch {
        generation: u64,
        view: PageView,
    },
    Populate {
        view: PageView,
    },
    Finish {
        view: PageView,
    },
    /// The save failed; the page and its unsaved state stay as they were.
    SaveAbandoned {
        page: PageNumber,
        then: AfterSave,
    },
    /// No usable render arrived; the target is shown without a surface
    /// until it is requested again.
    LoadFailed {
        view: PageView,
    },
    Quit,
}

/// Effects for the caller to execute, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavStep {
    pub effects: Vec<NavEffect>,
    /// The completion did not belong to the current transition.
    pub stale: bool,
}

impl NavStep {
    fn of(effects: Vec<NavEffect>) -> Self {
        Self {
            effects,
            stale: false,
        }
    }

    fn stale() -> Self {
        Self {
            effects: Vec::new(),
            stale: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Orders the save-or-discard gate, surface disposal and the reload of the
/// next page. Performs no I/O: every step is returned as a list of effects
/// and completions are fed back in with the generation they were issued for.
#[derive(Debug, Clone)]
pub struct NavigationController {
    phase: NavPhase,
    generation: u64,
    unloaded: Option<PageView>,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self {
            phase: NavPhase::Idle,
            generation: 0,
            unloaded: None,
        }
    }
}

impl NavigationController {
    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_idle(&self) -> bool {
        self.phase == NavPhase::Idle
    }

    /// The view whose last load ended without a surface, if it is still shown.
    pub fn unloaded(&self) -> Option<PageView> {
        self.unloaded
    }

    /// Loads `view` with no page to leave behind.
    pub fn open(&mut self, view: PageView) -> AppResult<NavStep> {
        self.ensure_idle()?;
        Ok(NavStep::of(self.begin_load(view)))
    }

    pub fn request(
        &mut self,
        current: PageView,
        target: PageView,
        dirty: bool,
        prompt: &mut dyn SavePrompt,
    ) -> AppResult<NavStep> {
        self.ensure_idle()?;
        if current == target && self.unloaded != Some(target) {
            return Ok(NavStep::default());
        }

        if dirty {
            match prompt.decide(current.page) {
                SaveDecision::Save => {
                    return Ok(self.begin_save(current.page, AfterSave::Navigate(target)));
                }
                SaveDecision::Discard => {
                    log::info!(
                        "discarding unsaved annotations on page {}",
                        current.page
                    );
                }
            }
        }
        Ok(NavStep::of(self.begin_load(target)))
    }

    pub fn request_save(&mut self, page: PageNumber) -> AppResult<NavStep> {
        self.ensure_idle()?;
        Ok(self.begin_save(page, AfterSave::Stay))
    }

    pub fn request_quit(
        &mut self,
        page: PageNumber,
        dirty: bool,
        prompt: &mut dyn SavePrompt,
    ) -> AppResult<NavStep> {
        self.ensure_idle()?;
        if dirty && prompt.decide(page) == SaveDecision::Save {
            return Ok(self.begin_save(page, AfterSave::Quit));
        }
        Ok(NavStep::of(vec![NavEffect::DisposeSurface, NavEffect::Quit]))
    }

    pub fn on_save_finished(&mut self, generation: u64, page: PageNumber, ok: bool) -> NavStep {
        let NavPhase::Saving {
            generation: expected,
            page: saving,
            then,
        } = self.phase
        else {
            return self.drop_stale("save", generation);
        };
        if expected != generation || saving != page {
            return self.drop_stale("save", generation);
        }

        self.phase = NavPhase::Idle;
        if !ok {
            return NavStep::of(vec![NavEffect::SaveAbandoned { page, then }]);
        }
        match then {
            AfterSave::Stay => NavStep::default(),
            AfterSave::Navigate(target) => NavStep::of(self.begin_load(target)),
            AfterSave::Quit => NavStep::of(vec![NavEffect::DisposeSurface, NavEffect::Quit]),
        }
    }

    /// `size` is `None` when the render itself failed.
    pub fn on_render_complete(
        &mut self,
        generation: u64,
        page: PageNumber,
        size: Option<PageDimensions>,
    ) -> NavStep {
        let NavPhase::NavigationPending {
            generation: expected,
            target,
            stage: LoadStage::AwaitingRender { attempts },
        } = self.phase
        else {
            return self.drop_stale("render", generation);
        };
        if expected != generation || target.page != page {
            return self.drop_stale("render", generation);
        }

        match size {
            Some(size) if !size.is_empty() => {
                self.phase = NavPhase::NavigationPending {
                    generation,
                    target,
                    stage: LoadStage::AwaitingAnnotations,
                };
                NavStep::of(vec![
                    NavEffect::InitSurface { view: target, size },
                    NavEffect::Fetch {
                        generation,
                        view: target,
                    },
                ])
            }
            Some(_) if attempts + 1 < MAX_RENDER_ATTEMPTS => {
                log::debug!("page {page} rendered without a size; waiting for another render");
                self.phase = NavPhase::NavigationPending {
                    generation,
                    target,
                    stage: LoadStage::AwaitingRender {
                        attempts: attempts + 1,
                    },
                };
                NavStep::of(vec![NavEffect::RequestRender {
                    generation,
                    view: target,
                }])
            }
            _ => {
                log::warn!("page {page} has no usable render; showing it without a surface");
                self.phase = NavPhase::Idle;
                self.unloaded = Some(target);
                NavStep::of(vec![
                    NavEffect::Finish { view: target },
                    NavEffect::LoadFailed { view: target },
                ])
            }
        }
    }

    pub fn on_annotations_loaded(&mut self, generation: u64, page: PageNumber) -> NavStep {
        let NavPhase::NavigationPending {
            generation: expected,
            target,
            stage: LoadStage::AwaitingAnnotations,
        } = self.phase
        else {
            return self.drop_stale("fetch", generation);
        };
        if expected != generation || target.page != page {
            return self.drop_stale("fetch", generation);
        }

        self.phase = NavPhase::Idle;
        NavStep::of(vec![
            NavEffect::Finish { view: target },
            NavEffect::Populate { view: target },
        ])
    }

    fn begin_save(&mut self, page: PageNumber, then: AfterSave) -> NavStep {
        let generation = self.bump();
        self.phase = NavPhase::Saving {
            generation,
            page,
            then,
        };
        NavStep::of(vec![NavEffect::Save { generation, page }])
    }

    fn begin_load(&mut self, target: PageView) -> Vec<NavEffect> {
        let generation = self.bump();
        self.unloaded = None;
        self.phase = NavPhase::NavigationPending {
            generation,
            target,
            stage: LoadStage::AwaitingRender { attempts: 0 },
        };
        vec![
            NavEffect::DisposeSurface,
            NavEffect::RequestRender {
                generation,
                view: target,
            },
        ]
    }

    fn bump(&mut self) -> u64 {
        self.generation = self.generation.saturating_add(1);
        self.generation
    }

    fn ensure_idle(&self) -> AppResult<()> {
        if self.is_idle() {
            return Ok(());
        }
        Err(AppError::resource_not_ready("a page transition is in progress"))
    }

    fn drop_stale(&self, what: &str, generation: u64) -> NavStep {
        log::debug!(
            "dropping stale {what} completion (generation {generation}, current {}, phase {:?})",
            self.generation,
            self.phase
        );
        NavStep::stale()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AfterSave, LoadStage, MAX_RENDER_ATTEMPTS, NavEffect, NavPhase, NavigationController,
        PageView,
    };
    use crate::annotation::PageNumber;
    use crate::backend::PageDimensions;
    use crate::error::AppError;
    use crate::nav::{FixedDecision, SaveDecision, ScriptedPrompt};

    const SIZE: PageDimensions = PageDimensions::new(612, 792);

    fn view(page: u32) -> PageView {
        PageView::new(PageNumber(page), 1.0)
    }

    #[test]
    fn dirty_page_saves_before_anything_else() {
        let mut nav = NavigationController::default();
        let mut prompt = ScriptedPrompt::new([SaveDecision::Save]);

        let step = nav
            .request(view(3), view(4), true, &mut prompt)
            .expect("idle controller accepts navigation");
        assert_eq!(
            step.effects,
            [NavEffect::Save {
                generation: 1,
                page: PageNumber(3)
            }]
        );
        assert_eq!(prompt.asked(), [PageNumber(3)]);

        let step = nav.on_save_finished(1, PageNumber(3), true);
        assert_eq!(
            step.effects,
            [
                NavEffect::DisposeSurface,
                NavEffect::RequestRender {
                    generation: 2,
                    view: view(4)
                }
            ]
        );

        let step = nav.on_render_complete(2, PageNumber(4), Some(SIZE));
        assert_eq!(
            step.effects,
            [
                NavEffect::InitSurface {
                    view: view(4),
                    size: SIZE
                },
                NavEffect::Fetch {
                    generation: 2,
                    view: view(4)
                }
            ]
        );

        let step = nav.on_annotations_loaded(2, PageNumber(4));
        assert_eq!(
            step.effects,
            [
                NavEffect::Finish { view: view(4) },
                NavEffect::Populate { view: view(4) }
            ]
        );
        assert!(nav.is_idle());
    }

    #[test]
    fn discard_and_clean_pages_skip_the_save() {
        let mut nav = NavigationController::default();
        let mut prompt = FixedDecision(SaveDecision::Discard);
        let step = nav
            .request(view(1), view(2), true, &mut prompt)
            .expect("navigation accepted");
        assert_eq!(step.effects[0], NavEffect::DisposeSurface);
        assert!(!step.effects.iter().any(|e| matches!(e, NavEffect::Save { .. })));

        let mut nav = NavigationController::default();
        let mut asked = ScriptedPrompt::default();
        nav.request(view(1), view(2), false, &mut asked)
            .expect("navigation accepted");
        assert!(asked.asked().is_empty());
    }

    #[test]
    fn failed_save_abandons_navigation() {
        let mut nav = NavigationController::default();
        let mut prompt = FixedDecision(SaveDecision::Save);
        nav.request(view(3), view(4), true, &mut prompt)
            .expect("navigation accepted");

        let step = nav.on_save_finished(1, PageNumber(3), false);
        assert_eq!(
            step.effects,
            [NavEffect::SaveAbandoned {
                page: PageNumber(3),
                then: AfterSave::Navigate(view(4))
            }]
        );
        assert!(nav.is_idle());
    }

    #[test]
    fn busy_controller_rejects_new_requests() {
        let mut nav = NavigationController::default();
        let mut prompt = FixedDecision(SaveDecision::Save);
        nav.open(view(1)).expect("open");
        let err = nav
            .request(view(1), view(2), false, &mut prompt)
            .expect_err("transition in flight");
        assert!(matches!(err, AppError::ResourceNotReady(_)));
        assert!(nav.request_save(PageNumber(1)).is_err());
    }

    #[test]
    fn stale_completions_are_dropped() {
        let mut nav = NavigationController::default();
        let mut prompt = FixedDecision(SaveDecision::Discard);
        nav.open(view(1)).expect("open");
        nav.on_render_complete(1, PageNumber(1), Some(SIZE));
        nav.on_annotations_loaded(1, PageNumber(1));
        nav.request(view(1), view(2), false, &mut prompt)
            .expect("navigation accepted");

        assert!(nav.on_render_complete(1, PageNumber(1), Some(SIZE)).stale);
        assert!(nav.on_render_complete(2, PageNumber(3), Some(SIZE)).stale);
        assert!(nav.on_annotations_loaded(2, PageNumber(2)).stale);
        assert!(nav.on_save_finished(2, PageNumber(2), true).stale);
        assert_eq!(
            nav.phase(),
            NavPhase::NavigationPending {
                generation: 2,
                target: view(2),
                stage: LoadStage::AwaitingRender { attempts: 0 }
            }
        );
    }

    #[test]
    fn sizeless_renders_retry_then_fail() {
        let mut nav = NavigationController::default();
        nav.open(view(1)).expect("open");
        let empty = PageDimensions::new(0, 792);

        for _ in 1..MAX_RENDER_ATTEMPTS {
            let step = nav.on_render_complete(1, PageNumber(1), Some(empty));
            assert!(matches!(
                step.effects.as_slice(),
                [NavEffect::RequestRender { .. }]
            ));
        }
        let step = nav.on_render_complete(1, PageNumber(1), Some(empty));
        assert_eq!(step.effects[1], NavEffect::LoadFailed { view: view(1) });
        assert!(nav.is_idle());
        assert_eq!(nav.unloaded(), Some(view(1)));
    }

    #[test]
    fn page_left_without_surface_is_loaded_again_on_request() {
        let mut nav = NavigationController::default();
        let mut prompt = ScriptedPrompt::default();
        nav.open(view(1)).expect("open");
        let step = nav.on_render_complete(1, PageNumber(1), None);
        assert_eq!(step.effects[1], NavEffect::LoadFailed { view: view(1) });

        let step = nav
            .request(view(1), view(1), false, &mut prompt)
            .expect("idle controller accepts the reload");
        assert_eq!(
            step.effects,
            [
                NavEffect::DisposeSurface,
                NavEffect::RequestRender {
                    generation: 2,
                    view: view(1)
                }
            ]
        );
        assert_eq!(nav.unloaded(), None);

        let step = nav.on_render_complete(2, PageNumber(1), Some(SIZE));
        assert!(matches!(
            step.effects.as_slice(),
            [NavEffect::InitSurface { size: SIZE, .. }, NavEffect::Fetch { .. }]
        ));
        nav.on_annotations_loaded(2, PageNumber(1));
        assert!(
            nav.request(view(1), view(1), false, &mut prompt)
                .expect("idle")
                .is_empty()
        );
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn zoom_change_on_same_page_goes_through_the_gate() {
        let mut nav = NavigationController::default();
        let mut prompt = ScriptedPrompt::new([SaveDecision::Save]);
        let zoomed = view(2).with_zoom(1.2);
        let step = nav
            .request(view(2), zoomed, true, &mut prompt)
            .expect("navigation accepted");
        assert!(matches!(step.effects[0], NavEffect::Save { .. }));

        let mut nav = NavigationController::default();
        let step = nav
            .request(view(2), view(2), true, &mut prompt)
            .expect("same view is a no-op");
        assert!(step.is_empty());
    }

    #[test]
    fn quit_waits_for_the_save() {
        let mut nav = NavigationController::default();
        let mut prompt = FixedDecision(SaveDecision::Save);
        let step = nav
            .request_quit(PageNumber(2), true, &mut prompt)
            .expect("quit accepted");
        assert!(matches!(step.effects.as_slice(), [NavEffect::Save { .. }]));
        let step = nav.on_save_finished(1, PageNumber(2), true);
        assert_eq!(step.effects, [NavEffect::DisposeSurface, NavEffect::Quit]);

        let step = nav
            .request_quit(PageNumber(2), false, &mut prompt)
            .expect("clean quit");
        assert_eq!(step.effects, [NavEffect::DisposeSurface, NavEffect::Quit]);
    }
}
