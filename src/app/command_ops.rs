use crate::command::{
    Command, CommandOutcome, DispatchContext, SessionRequest, dispatch,
};
use crate::error::AppResult;
use crate::store::AnnotationStore;

use super::core::App;

impl<S: AnnotationStore> App<S> {
    /// Runs `command` now, or queues it behind the page transition in flight.
    pub(crate) fn handle_command(&mut self, command: Command) -> AppResult<()> {
        let busy = !self.transition.nav.is_idle() || !self.transition.deferred.is_empty();
        let bypass = command.applies_during_transition() && self.transition.deferred.is_empty();
        if busy && !bypass {
            log::debug!(
                "deferring {} until the page transition completes",
                command.action_id().as_str()
            );
            self.transition.deferred.push_back(command);
            return Ok(());
        }
        self.execute_command(command)
    }

    /// Replays deferred commands while no transition is in flight.
    pub(crate) fn drain_deferred(&mut self) -> AppResult<()> {
        while self.transition.nav.is_idle() && self.channels.exit.is_none() {
            let Some(command) = self.transition.deferred.pop_front() else {
                break;
            };
            self.execute_command(command)?;
        }
        Ok(())
    }

    fn execute_command(&mut self, command: Command) -> AppResult<()> {
        let action = command.action_id();
        let mut ctx = DispatchContext {
            tools: &mut self.editing.tools,
            gesture: &mut self.editing.gesture,
            canvas: &mut self.editing.canvas,
            view_config: &self.config.view,
        };
        let result = match dispatch(&mut self.state, command, &mut ctx) {
            Ok(result) => result,
            Err(err) => {
                log::warn!("{} failed: {err}", action.as_str());
                self.state.status.error(err.to_string());
                return Ok(());
            }
        };
        for event in result.emitted_events {
            self.emit(event);
        }

        let dirty = self.editing.canvas.is_dirty();
        let page = self.state.view.page;
        let step = match (result.outcome, result.request) {
            (CommandOutcome::QuitRequested, _) => self.transition.nav.request_quit(
                page,
                dirty,
                self.transition.prompt.as_mut(),
            )?,
            (_, Some(SessionRequest::Navigate { target, reason })) => {
                self.transition.reason = reason;
                self.transition.nav.request(
                    self.state.view,
                    target,
                    dirty,
                    self.transition.prompt.as_mut(),
                )?
            }
            (_, Some(SessionRequest::Save)) => self.transition.nav.request_save(page)?,
            (_, None) => return Ok(()),
        };
        self.apply_step(step)
    }
}
