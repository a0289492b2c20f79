pub mod chat;
pub mod config;
pub mod doctor;
pub mod slots;

use std::sync::Arc;

use slotty_agent::{HttpCompletionClient, Orchestrator};
use slotty_calendar::HttpCalendarClient;
use slotty_core::config::AppConfig;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(message: impl Into<String>, exit_code: u8) -> Self {
        Self { exit_code, output: format!("error: {}", message.into()) }
    }
}

/// Builds the same orchestrator the server runs, from the same config
/// sources, so CLI answers match server answers.
fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator, String> {
    let llm = HttpCompletionClient::new(&config.llm)
        .map_err(|error| format!("language client setup failed: {error}"))?;
    let calendar = HttpCalendarClient::new(&config.calendar)
        .map_err(|error| format!("calendar client setup failed: {error}"))?;

    Ok(Orchestrator::new(&config.scheduling, Arc::new(llm), Arc::new(calendar)))
}

fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| format!("failed to initialize async runtime: {error}"))?;
    Ok(runtime.block_on(future))
}
