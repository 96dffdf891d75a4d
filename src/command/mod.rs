mod core;
mod dispatch;
mod parse;
mod spec;
mod types;

pub use dispatch::{CommandDispatchResult, DispatchContext, SessionRequest, dispatch};
pub use parse::{parse_command_text, parse_script};
pub use spec::{command_registry, usage_lines};
pub use types::{ActionId, ArgKind, ArgSpec, Command, CommandOutcome, CommandSpec};
