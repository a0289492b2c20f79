use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use slotty_agent::{HttpCompletionClient, Orchestrator};
use slotty_calendar::HttpCalendarClient;
use slotty_core::config::{AppConfig, ConfigError, LoadOptions};
use slotty_core::errors::UpstreamError;

/// Shared per-process state handed to every request handler.
#[derive(Clone)]
pub struct Application {
    pub config: Arc<AppConfig>,
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("upstream client construction failed: {0}")]
    Upstream(#[from] UpstreamError),
}

#[allow(dead_code)]
pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let llm = Arc::new(HttpCompletionClient::new(&config.llm)?);
    let calendar = Arc::new(HttpCalendarClient::new(&config.calendar)?);
    let orchestrator = Arc::new(Orchestrator::new(&config.scheduling, llm, calendar));

    info!(
        event_name = "system.bootstrap.ready",
        timezone = %config.scheduling.timezone,
        slot_minutes = config.scheduling.slot_minutes,
        "application bootstrap complete"
    );

    Ok(Application { config: Arc::new(config), orchestrator })
}

#[cfg(test)]
mod tests {
    use slotty_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    #[test]
    fn bootstrap_fails_fast_on_invalid_configuration() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                calendar_base_url: Some("not-a-url".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("error").to_string();
        assert!(message.contains("calendar.base_url"));
    }

    #[test]
    fn bootstrap_succeeds_with_defaults_and_overrides() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                llm_api_key: Some("test-key".to_string()),
                slot_minutes: Some(30),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("bootstrap should succeed with valid overrides");

        assert_eq!(app.config.scheduling.slot_minutes, 30);
        assert_eq!(app.orchestrator.slot_length(), chrono::Duration::minutes(30));
    }
}
