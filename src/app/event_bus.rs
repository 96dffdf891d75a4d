use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::command::Command;
use crate::event::DomainEvent;

pub(crate) struct EventBusRuntime {
    tasks: Vec<JoinHandle<()>>,
}

impl EventBusRuntime {
    pub(crate) fn spawn(tx: UnboundedSender<DomainEvent>, commands: Vec<Command>) -> Self {
        let tasks = vec![spawn_input_task(tx, commands)];
        Self { tasks }
    }

    pub(crate) fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Feeds commands one per scheduler turn, so completions can interleave with input.
fn spawn_input_task(tx: UnboundedSender<DomainEvent>, commands: Vec<Command>) -> JoinHandle<()> {
    tokio::spawn(async move {
        for command in commands {
            if tx.send(DomainEvent::Command(command)).is_err() {
                return;
            }
            tokio::task::yield_now().await;
        }
        let _ = tx.send(DomainEvent::InputClosed);
    })
}
