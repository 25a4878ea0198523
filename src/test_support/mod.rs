//! Test doubles shared across crate-level unit tests.

pub mod fakes;

pub use fakes::{
    FakeGateway, FakePermission, PanickingGateway, PendingGateway, RecordingDeepLinks,
    ScriptedBrowser,
};
