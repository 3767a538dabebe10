//! Error types for the oxidized-retro contract

use thiserror::Error;

use crate::host::CoreState;

/// Main error type
#[derive(Error, Debug)]
pub enum RetroError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] SerializeError),

    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    #[error("Memory error: {0}")]
    Memory(#[from] ox_memory::MemoryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("API version mismatch: frontend expects {expected}, core reports {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    #[error("Unsupported feature: {0}")]
    Unsupported(String),
}

/// Content loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Core needs a full path but none was given")]
    MissingPath,

    #[error("Core needs content data but none was given")]
    MissingData,

    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Failed to read content: {0}")]
    Io(String),
}

/// Save state errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("Short buffer: need {needed} bytes, got {got}")]
    ShortBuffer { needed: usize, got: usize },

    #[error("Unknown: {0}")]
    Unknown(String),
}

/// Lifecycle and callback contract errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    #[error("{op} is not valid in state {state:?}")]
    InvalidState { op: &'static str, state: CoreState },

    #[error("Callback not registered: {0}")]
    MissingCallback(&'static str),

    #[error("Contract violation: {0}")]
    Violation(#[from] ContractViolation),
}

/// Behaviour of a core that breaks the per-call rules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("Run returned without polling input")]
    InputNotPolled,

    #[error("{reads} input reads happened before the first poll")]
    InputReadBeforePoll { reads: u32 },

    #[error("Video refresh called {0} times in one frame (expected 1)")]
    VideoRefreshCount(u32),

    #[error("Frame dupe requested before any frame was presented")]
    DupeWithoutFrame,

    #[error("Frame dupe requested but the frontend does not allow duping")]
    DupeNotAllowed,

    #[error("Video frame too short: need {needed} bytes, got {got}")]
    ShortVideoFrame { needed: usize, got: usize },

    #[error("Serialize size grew from {previous} to {current} while loaded")]
    SerializeSizeGrew { previous: usize, current: usize },
}

pub type Result<T> = std::result::Result<T, RetroError>;
