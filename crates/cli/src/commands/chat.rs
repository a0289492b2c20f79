use chrono::Utc;

use slotty_core::config::{AppConfig, LoadOptions};
use slotty_core::domain::conversation::ConversationState;

use super::{block_on, build_orchestrator, CommandResult};

pub fn run(message: &str) -> CommandResult {
    if message.trim().is_empty() {
        return CommandResult::failure("message must not be empty", 2);
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure(format!("config load failed: {error}"), 1),
    };

    let orchestrator = match build_orchestrator(&config) {
        Ok(orchestrator) => orchestrator,
        Err(error) => return CommandResult::failure(error, 1),
    };

    let turn = block_on(async {
        let mut state = ConversationState::default();
        orchestrator.handle_turn(message, &mut state, Utc::now()).await
    });

    match turn {
        Ok(result) => CommandResult::success(result.reply),
        Err(error) => CommandResult::failure(error, 1),
    }
}
