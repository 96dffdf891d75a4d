use crate::command::Command;
use crate::error::{AppError, AppResult};
use crate::event::DomainEvent;
use crate::store::AnnotationStore;

use super::core::App;
use super::event_bus::EventBusRuntime;

enum WaitEvent {
    Event(DomainEvent),
    Closed,
}

enum LoopControl {
    Continue,
    Break,
}

impl<S: AnnotationStore> App<S> {
    /// Opens the start page, executes `commands` in order and returns once the
    /// session has quit. The end of input quits through the save gate.
    pub async fn run(&mut self, commands: Vec<Command>) -> AppResult<()> {
        let mut bus = EventBusRuntime::spawn(self.channels.tx.clone(), commands);
        self.open_initial_page()?;

        let result = loop {
            let waited = self.wait_next_event().await;
            match self.handle_waited_event(waited) {
                Ok(LoopControl::Continue) => {}
                Ok(LoopControl::Break) => break self.channels.exit.take().unwrap_or(Ok(())),
                Err(err) => break Err(err),
            }
        };

        bus.shutdown();
        result
    }

    async fn wait_next_event(&mut self) -> WaitEvent {
        match self.channels.rx.recv().await {
            Some(event) => WaitEvent::Event(event),
            None => WaitEvent::Closed,
        }
    }

    fn handle_waited_event(&mut self, waited: WaitEvent) -> AppResult<LoopControl> {
        match waited {
            WaitEvent::Event(event) => self.handle_event(event)?,
            WaitEvent::Closed => {
                return Err(AppError::unsupported("session event channel closed"));
            }
        }
        if self.channels.exit.is_some() {
            return Ok(LoopControl::Break);
        }
        Ok(LoopControl::Continue)
    }

    pub(crate) fn handle_event(&mut self, event: DomainEvent) -> AppResult<()> {
        match event {
            DomainEvent::Command(command) => self.handle_command(command)?,
            DomainEvent::InputClosed => {
                log::debug!("input closed; quitting once idle");
                self.channels.input_closed = true;
                self.handle_command(Command::Quit)?;
            }
            DomainEvent::RenderComplete {
                generation,
                view,
                result,
            } => {
                self.complete_task();
                self.on_render_complete(generation, view, result)?;
            }
            DomainEvent::SaveFinished {
                generation,
                key,
                revision,
                objects,
                result,
            } => {
                self.complete_task();
                self.on_save_finished(generation, key, revision, objects, result)?;
            }
            DomainEvent::AnnotationsLoaded {
                generation,
                key,
                result,
            } => {
                self.complete_task();
                self.on_annotations_loaded(generation, key, result)?;
            }
        }
        self.drain_deferred()
    }

    fn complete_task(&mut self) {
        self.channels.in_flight = self.channels.in_flight.saturating_sub(1);
    }

    pub fn in_flight(&self) -> usize {
        self.channels.in_flight
    }
}
