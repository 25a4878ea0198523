//! Runtime environment lookups used to configure the client at startup.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

/// Inline JSON or path to a JSON file holding provider settings.
pub const AUTH_CONFIG_ENV: &str = "SQUIRTLE_AUTH_CONFIG";
/// Overrides the platform reported by the host (`ios`, `android`, ...).
pub const PLATFORM_ENV: &str = "SQUIRTLE_PLATFORM";

pub(crate) fn platform_override() -> Option<String> {
    env::var(PLATFORM_ENV).ok().filter(|value| !value.trim().is_empty())
}

/// Returns the provider settings document configured through the environment, if any.
pub fn auth_config_from_env() -> Option<Value> {
    let raw = env::var(AUTH_CONFIG_ENV).ok()?;
    parse_config_source(&raw)
}

/// Accepts either an inline JSON object or a path to a file containing one.
pub(crate) fn parse_config_source(raw: &str) -> Option<Value> {
    if let Ok(json) = serde_json::from_str::<Value>(raw) {
        if json.is_object() {
            return Some(json);
        }
    }

    let path = treat_as_path(raw)?;
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str::<Value>(&contents)
        .ok()
        .filter(Value::is_object)
}

fn treat_as_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') {
        return None;
    }
    if Path::new(trimmed).exists() {
        Some(trimmed.to_string())
    } else {
        None
    }
}
