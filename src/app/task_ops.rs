use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::annotation::{PageNumber, serialize};
use crate::error::{AppError, AppResult};
use crate::event::DomainEvent;
use crate::nav::PageView;
use crate::store::AnnotationStore;

use super::core::App;

impl<S: AnnotationStore> App<S> {
    pub(crate) fn spawn_render(&mut self, generation: u64, view: PageView) {
        let renderer = Arc::clone(&self.renderer);
        let tx = self.channels.tx.clone();
        self.channels.in_flight += 1;
        log::debug!(
            "rendering page {} at {:.2}x (generation {generation})",
            view.page,
            view.zoom
        );
        tokio::task::spawn_blocking(move || {
            let result = renderer
                .render_page(view.page, view.zoom)
                .map_err(|err| AppError::pdf_render(view.page.get(), err));
            let _ = tx.send(DomainEvent::RenderComplete {
                generation,
                view,
                result,
            });
        });
    }

    pub(crate) fn spawn_save(&mut self, generation: u64, page: PageNumber) {
        let key = self.owner.key(page);
        let tx = self.channels.tx.clone();
        self.channels.in_flight += 1;

        let prepared = match self.editing.canvas.get() {
            Some(surface) if surface.key() == key => {
                let snapshot = surface.snapshot();
                serialize(&snapshot.state)
                    .map(|payload| (payload, snapshot.revision, snapshot.state.len()))
            }
            _ => Err(AppError::resource_not_ready(format!(
                "no surface for page {page} to save"
            ))),
        };
        let (payload, revision, objects) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                let _ = tx.send(DomainEvent::SaveFinished {
                    generation,
                    key,
                    revision: 0,
                    objects: 0,
                    result: Err(err),
                });
                return;
            }
        };

        let store = Arc::clone(&self.store);
        let timeout = self.config.store.request_timeout();
        tokio::spawn(async move {
            let result = with_timeout("save", timeout, store.save(key, payload)).await;
            let _ = tx.send(DomainEvent::SaveFinished {
                generation,
                key,
                revision,
                objects,
                result,
            });
        });
    }

    pub(crate) fn spawn_fetch(&mut self, generation: u64, page: PageNumber) {
        let key = self.owner.key(page);
        let store = Arc::clone(&self.store);
        let tx = self.channels.tx.clone();
        let timeout = self.config.store.request_timeout();
        self.channels.in_flight += 1;
        tokio::spawn(async move {
            let result = with_timeout("fetch", timeout, store.fetch_for_page(key)).await;
            let _ = tx.send(DomainEvent::AnnotationsLoaded {
                generation,
                key,
                result,
            });
        });
    }
}

pub(crate) async fn with_timeout<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    tokio::time::timeout(limit, call).await.map_err(|_| {
        AppError::persistence(
            operation,
            format!("no response within {}ms", limit.as_millis()),
        )
    })?
}
