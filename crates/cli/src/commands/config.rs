use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use slotty_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "scheduling.timezone",
        &config.scheduling.timezone.to_string(),
        source("scheduling.timezone", "SLOTTY_SCHEDULING_TIMEZONE"),
    ));
    lines.push(render_line(
        "scheduling.day_open",
        &config.scheduling.day_open.format("%H:%M").to_string(),
        source("scheduling.day_open", "SLOTTY_SCHEDULING_DAY_OPEN"),
    ));
    lines.push(render_line(
        "scheduling.day_close",
        &config.scheduling.day_close.format("%H:%M").to_string(),
        source("scheduling.day_close", "SLOTTY_SCHEDULING_DAY_CLOSE"),
    ));
    lines.push(render_line(
        "scheduling.slot_minutes",
        &config.scheduling.slot_minutes.to_string(),
        source("scheduling.slot_minutes", "SLOTTY_SCHEDULING_SLOT_MINUTES"),
    ));

    lines.push(render_line(
        "calendar.base_url",
        &config.calendar.base_url,
        source("calendar.base_url", "SLOTTY_CALENDAR_BASE_URL"),
    ));
    lines.push(render_line(
        "calendar.calendar_id",
        &config.calendar.calendar_id,
        source("calendar.calendar_id", "SLOTTY_CALENDAR_ID"),
    ));
    lines.push(render_line(
        "calendar.api_token",
        secret_presence(config.calendar.api_token.is_some()),
        source("calendar.api_token", "SLOTTY_CALENDAR_API_TOKEN"),
    ));
    lines.push(render_line(
        "calendar.timeout_secs",
        &config.calendar.timeout_secs.to_string(),
        source("calendar.timeout_secs", "SLOTTY_CALENDAR_TIMEOUT_SECS"),
    ));

    lines.push(render_line(
        "llm.base_url",
        &config.llm.base_url,
        source("llm.base_url", "SLOTTY_LLM_BASE_URL"),
    ));
    lines.push(render_line("llm.model", &config.llm.model, source("llm.model", "SLOTTY_LLM_MODEL")));
    lines.push(render_line(
        "llm.api_key",
        secret_presence(config.llm.api_key.is_some()),
        source("llm.api_key", "SLOTTY_LLM_API_KEY"),
    ));
    lines.push(render_line(
        "llm.max_tokens",
        &config.llm.max_tokens.to_string(),
        source("llm.max_tokens", "SLOTTY_LLM_MAX_TOKENS"),
    ));
    lines.push(render_line(
        "llm.temperature",
        &config.llm.temperature.to_string(),
        source("llm.temperature", "SLOTTY_LLM_TEMPERATURE"),
    ));

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", "SLOTTY_SERVER_BIND_ADDRESS"),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", "SLOTTY_SERVER_PORT"),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", "SLOTTY_LOGGING_LEVEL"),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", "SLOTTY_LOGGING_FORMAT"),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("slotty.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/slotty.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn secret_presence(present: bool) -> &'static str {
    if present {
        "<redacted>"
    } else {
        "<unset>"
    }
}
