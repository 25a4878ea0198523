//! Host platform description, device permissions and async runtime helpers.

pub mod environment;
pub mod permissions;
pub mod runtime;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use permissions::{PermissionKind, PermissionOutcome, PermissionRequester, PermissionStatus};

/// Operating system the client is running on, as reported by the host shell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    #[default]
    Other,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Other => "other",
        }
    }

    /// Reads `SQUIRTLE_PLATFORM`, falling back to [`Platform::Other`].
    pub fn from_env() -> Self {
        environment::platform_override()
            .map(|raw| raw.parse::<Platform>().unwrap_or_default())
            .unwrap_or_default()
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "ios" => Platform::Ios,
            "android" => Platform::Android,
            _ => Platform::Other,
        })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
