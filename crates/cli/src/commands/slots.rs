use chrono::{NaiveDate, Utc};

use slotty_core::config::{AppConfig, LoadOptions};
use slotty_core::display::format_day;

use super::{block_on, build_orchestrator, CommandResult};

pub fn run(day: Option<NaiveDate>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure(format!("config load failed: {error}"), 1),
    };

    let orchestrator = match build_orchestrator(&config) {
        Ok(orchestrator) => orchestrator,
        Err(error) => return CommandResult::failure(error, 1),
    };

    let tz = orchestrator.timezone();
    let day = day.unwrap_or_else(|| Utc::now().with_timezone(&tz).date_naive());

    let listing = match block_on(orchestrator.day_slots(day)) {
        Ok(listing) => listing,
        Err(error) => return CommandResult::failure(error, 1),
    };

    match listing {
        Ok(slots) if slots.is_empty() => {
            CommandResult::success(format!("no free slots on {}", format_day(day)))
        }
        Ok(slots) => {
            let mut lines = vec![format!("free slots on {} ({tz}):", format_day(day))];
            for (index, slot) in slots.iter().enumerate() {
                lines.push(format!("  {}. {}", index + 1, slot.local_label(tz)));
            }
            CommandResult::success(lines.join("\n"))
        }
        Err(error) => CommandResult::failure(error.user_message(), 1),
    }
}
