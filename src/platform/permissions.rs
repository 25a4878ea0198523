use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::AuthResult;

/// Device capabilities requested up front for the authenticated screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    CameraScan,
    ForegroundLocation,
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionKind::CameraScan => f.write_str("camera_scan"),
            PermissionKind::ForegroundLocation => f.write_str("foreground_location"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Result of a single permission prompt, kept for diagnostics only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionOutcome {
    pub kind: PermissionKind,
    pub result: AuthResult<PermissionStatus>,
}

/// Host hook that prompts the user for one device permission.
#[async_trait]
pub trait PermissionRequester: Send + Sync {
    fn kind(&self) -> PermissionKind;

    async fn request(&self) -> AuthResult<PermissionStatus>;
}
