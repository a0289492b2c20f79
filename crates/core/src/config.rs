use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::slot::BusinessWindow;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub scheduling: SchedulingConfig,
    pub calendar: CalendarConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SchedulingConfig {
    /// The single fixed business timezone. All display formatting and all
    /// local wall-clock interpretation go through it.
    pub timezone: Tz,
    pub day_open: NaiveTime,
    pub day_close: NaiveTime,
    pub slot_minutes: u32,
}

impl SchedulingConfig {
    pub fn window(&self) -> BusinessWindow {
        BusinessWindow { open: self.day_open, close: self.day_close }
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }
}

#[derive(Clone, Debug)]
pub struct CalendarConfig {
    pub base_url: String,
    pub calendar_id: String,
    pub api_token: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub timezone: Option<Tz>,
    pub slot_minutes: Option<u32>,
    pub calendar_base_url: Option<String>,
    pub calendar_api_token: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid value for `{key}`: `{value}`")]
    InvalidValue { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scheduling: SchedulingConfig {
                timezone: chrono_tz::Asia::Kolkata,
                day_open: NaiveTime::from_hms_opt(9, 0, 0).expect("valid default open time"),
                day_close: NaiveTime::from_hms_opt(17, 0, 0).expect("valid default close time"),
                slot_minutes: 60,
            },
            calendar: CalendarConfig {
                base_url: "http://localhost:8900".to_string(),
                calendar_id: "primary".to_string(),
                api_token: None,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                base_url: "https://api.together.xyz".to_string(),
                api_key: None,
                model: "mistralai/Mistral-7B-Instruct-v0.1".to_string(),
                max_tokens: 200,
                temperature: 0.3,
                timeout_secs: 30,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("slotty.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(scheduling) = patch.scheduling {
            if let Some(timezone) = scheduling.timezone {
                self.scheduling.timezone = parse_timezone("scheduling.timezone", &timezone)?;
            }
            if let Some(day_open) = scheduling.day_open {
                self.scheduling.day_open = parse_clock("scheduling.day_open", &day_open)?;
            }
            if let Some(day_close) = scheduling.day_close {
                self.scheduling.day_close = parse_clock("scheduling.day_close", &day_close)?;
            }
            if let Some(slot_minutes) = scheduling.slot_minutes {
                self.scheduling.slot_minutes = slot_minutes;
            }
        }

        if let Some(calendar) = patch.calendar {
            if let Some(base_url) = calendar.base_url {
                self.calendar.base_url = base_url;
            }
            if let Some(calendar_id) = calendar.calendar_id {
                self.calendar.calendar_id = calendar_id;
            }
            if let Some(api_token_value) = calendar.api_token {
                self.calendar.api_token = Some(secret_value(api_token_value));
            }
            if let Some(timeout_secs) = calendar.timeout_secs {
                self.calendar.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(api_key_value));
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                self.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                self.llm.temperature = temperature;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SLOTTY_SCHEDULING_TIMEZONE") {
            self.scheduling.timezone = parse_timezone("SLOTTY_SCHEDULING_TIMEZONE", &value)?;
        }
        if let Some(value) = read_env("SLOTTY_SCHEDULING_DAY_OPEN") {
            self.scheduling.day_open = parse_clock("SLOTTY_SCHEDULING_DAY_OPEN", &value)?;
        }
        if let Some(value) = read_env("SLOTTY_SCHEDULING_DAY_CLOSE") {
            self.scheduling.day_close = parse_clock("SLOTTY_SCHEDULING_DAY_CLOSE", &value)?;
        }
        if let Some(value) = read_env("SLOTTY_SCHEDULING_SLOT_MINUTES") {
            self.scheduling.slot_minutes = parse_u32("SLOTTY_SCHEDULING_SLOT_MINUTES", &value)?;
        }

        if let Some(value) = read_env("SLOTTY_CALENDAR_BASE_URL") {
            self.calendar.base_url = value;
        }
        if let Some(value) = read_env("SLOTTY_CALENDAR_ID") {
            self.calendar.calendar_id = value;
        }
        if let Some(value) = read_env("SLOTTY_CALENDAR_API_TOKEN") {
            self.calendar.api_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("SLOTTY_CALENDAR_TIMEOUT_SECS") {
            self.calendar.timeout_secs = parse_u64("SLOTTY_CALENDAR_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SLOTTY_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("SLOTTY_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SLOTTY_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("SLOTTY_LLM_MAX_TOKENS") {
            self.llm.max_tokens = parse_u32("SLOTTY_LLM_MAX_TOKENS", &value)?;
        }
        if let Some(value) = read_env("SLOTTY_LLM_TEMPERATURE") {
            self.llm.temperature = parse_f32("SLOTTY_LLM_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("SLOTTY_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("SLOTTY_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SLOTTY_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SLOTTY_SERVER_PORT") {
            self.server.port = parse_u16("SLOTTY_SERVER_PORT", &value)?;
        }

        let log_level = read_env("SLOTTY_LOGGING_LEVEL").or_else(|| read_env("SLOTTY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SLOTTY_LOGGING_FORMAT").or_else(|| read_env("SLOTTY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(timezone) = overrides.timezone {
            self.scheduling.timezone = timezone;
        }
        if let Some(slot_minutes) = overrides.slot_minutes {
            self.scheduling.slot_minutes = slot_minutes;
        }
        if let Some(calendar_base_url) = overrides.calendar_base_url {
            self.calendar.base_url = calendar_base_url;
        }
        if let Some(calendar_api_token) = overrides.calendar_api_token {
            self.calendar.api_token = Some(secret_value(calendar_api_token));
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_scheduling(&self.scheduling)?;
        validate_calendar(&self.calendar)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("slotty.toml"), PathBuf::from("config/slotty.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_scheduling(scheduling: &SchedulingConfig) -> Result<(), ConfigError> {
    if scheduling.day_open >= scheduling.day_close {
        return Err(ConfigError::Validation(
            "scheduling.day_open must be earlier than scheduling.day_close".to_string(),
        ));
    }

    if !(5..=240).contains(&scheduling.slot_minutes) {
        return Err(ConfigError::Validation(
            "scheduling.slot_minutes must be in range 5..=240".to_string(),
        ));
    }

    let window_minutes = (scheduling.day_close - scheduling.day_open).num_minutes();
    if i64::from(scheduling.slot_minutes) > window_minutes {
        return Err(ConfigError::Validation(format!(
            "scheduling.slot_minutes ({}) does not fit the {}-minute business window",
            scheduling.slot_minutes, window_minutes
        )));
    }

    Ok(())
}

fn validate_calendar(calendar: &CalendarConfig) -> Result<(), ConfigError> {
    validate_base_url("calendar.base_url", &calendar.base_url)?;
    validate_timeout("calendar.timeout_secs", calendar.timeout_secs)?;

    if calendar.calendar_id.trim().is_empty() {
        return Err(ConfigError::Validation("calendar.calendar_id must not be empty".to_string()));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    validate_base_url("llm.base_url", &llm.base_url)?;
    validate_timeout("llm.timeout_secs", llm.timeout_secs)?;

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    if llm.max_tokens == 0 {
        return Err(ConfigError::Validation(
            "llm.max_tokens must be greater than zero".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        return Err(ConfigError::Validation(
            "llm.temperature must be in range 0.0..=2.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_base_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{key} must start with http:// or https://")))
    }
}

fn validate_timeout(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 || value > 300 {
        Err(ConfigError::Validation(format!("{key} must be in range 1..=300")))
    } else {
        Ok(())
    }
}

fn parse_timezone(key: &str, value: &str) -> Result<Tz, ConfigError> {
    value.trim().parse::<Tz>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_clock(key: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse::<f32>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    scheduling: Option<SchedulingPatch>,
    calendar: Option<CalendarPatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SchedulingPatch {
    timezone: Option<String>,
    day_open: Option<String>,
    day_close: Option<String>,
    slot_minutes: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct CalendarPatch {
    base_url: Option<String>,
    calendar_id: Option<String>,
    api_token: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_validate_and_expose_scheduling_helpers() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.scheduling.slot_minutes == 60, "default slot length should be 60 minutes")?;
        ensure(
            config.scheduling.slot_duration() == chrono::Duration::minutes(60),
            "slot_duration should derive from slot_minutes",
        )?;
        ensure(
            config.scheduling.window().open < config.scheduling.window().close,
            "default window should be non-empty",
        )?;
        Ok(())
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_CALENDAR_TOKEN", "cal-token-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("slotty.toml");
            fs::write(
                &path,
                r#"
[calendar]
api_token = "${TEST_CALENDAR_TOKEN}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let token = config
                .calendar
                .api_token
                .as_ref()
                .map(|secret| secret.expose_secret().to_string())
                .unwrap_or_default();
            ensure(token == "cal-token-from-env", "calendar token should come from environment")?;
            Ok(())
        })();

        clear_vars(&["TEST_CALENDAR_TOKEN"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTTY_SCHEDULING_TIMEZONE", "Europe/Berlin");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("slotty.toml");
            fs::write(
                &path,
                r#"
[scheduling]
timezone = "America/New_York"
slot_minutes = 30

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.scheduling.timezone == chrono_tz::Europe::Berlin,
                "env timezone should win over file and defaults",
            )?;
            ensure(
                config.scheduling.slot_minutes == 30,
                "file slot_minutes should win over defaults",
            )?;
            ensure(config.logging.level == "debug", "programmatic log level should win")?;
            Ok(())
        })();

        clear_vars(&["SLOTTY_SCHEDULING_TIMEZONE"]);
        result
    }

    #[test]
    fn invalid_timezone_fails_fast_with_the_offending_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTTY_SCHEDULING_TIMEZONE", "Mars/Olympus_Mons");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected load failure for bad timezone".to_string()),
                Err(error) => error,
            };
            let mentions_key = matches!(
                error,
                ConfigError::InvalidValue { ref key, .. } if key == "SLOTTY_SCHEDULING_TIMEZONE"
            );
            ensure(mentions_key, "error should name the offending key")
        })();

        clear_vars(&["SLOTTY_SCHEDULING_TIMEZONE"]);
        result
    }

    #[test]
    fn inverted_business_window_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTTY_SCHEDULING_DAY_OPEN", "18:00");
        env::set_var("SLOTTY_SCHEDULING_DAY_CLOSE", "09:00");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected validation failure".to_string()),
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("day_open")
            );
            ensure(has_message, "validation failure should mention day_open")
        })();

        clear_vars(&["SLOTTY_SCHEDULING_DAY_OPEN", "SLOTTY_SCHEDULING_DAY_CLOSE"]);
        result
    }

    #[test]
    fn slot_longer_than_window_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTTY_SCHEDULING_DAY_OPEN", "09:00");
        env::set_var("SLOTTY_SCHEDULING_DAY_CLOSE", "10:00");
        env::set_var("SLOTTY_SCHEDULING_SLOT_MINUTES", "120");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected validation failure".to_string()),
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("does not fit")
            );
            ensure(has_message, "validation failure should mention the window")
        })();

        clear_vars(&[
            "SLOTTY_SCHEDULING_DAY_OPEN",
            "SLOTTY_SCHEDULING_DAY_CLOSE",
            "SLOTTY_SCHEDULING_SLOT_MINUTES",
        ]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTTY_LOG_LEVEL", "warn");
        env::set_var("SLOTTY_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "log level should be set from alias var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "log format should be set from alias var",
            )?;
            Ok(())
        })();

        clear_vars(&["SLOTTY_LOG_LEVEL", "SLOTTY_LOG_FORMAT"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SLOTTY_LLM_API_KEY", "llm-secret-value");
        env::set_var("SLOTTY_CALENDAR_API_TOKEN", "calendar-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("llm-secret-value"), "debug must not contain the llm key")?;
            ensure(
                !debug.contains("calendar-secret-value"),
                "debug must not contain the calendar token",
            )?;
            Ok(())
        })();

        clear_vars(&["SLOTTY_LLM_API_KEY", "SLOTTY_CALENDAR_API_TOKEN"]);
        result
    }
}
