mod command_ops;
mod core;
mod event_bus;
mod event_loop;
mod nav_ops;
mod state;
mod task_ops;

#[cfg(test)]
mod tests;

pub use core::{App, EditingSubsystem, SessionOwner, TransitionSubsystem};
pub use state::{AppState, NoticeLevel, StatusState};
