mod controller;
mod prompt;

pub use controller::{
    AfterSave, LoadStage, MAX_RENDER_ATTEMPTS, NavEffect, NavPhase, NavStep, NavigationController,
    PageView,
};
pub use prompt::{FixedDecision, SaveDecision, SavePrompt, ScriptedPrompt, StdinPrompt};
