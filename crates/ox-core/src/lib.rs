//! Frontend/core contract for oxidized-retro
//!
//! This crate provides the [`Core`] trait a content-execution module
//! implements, the [`CoreHost`] a frontend drives it through, and the
//! shared error handling, configuration and logging infrastructure.

pub mod callbacks;
pub mod cheat;
pub mod config;
pub mod core;
pub mod environment;
pub mod error;
pub mod frame;
pub mod host;
pub mod logging;
pub mod state;
pub mod types;

pub use callbacks::{Callbacks, VideoFrame};
pub use cheat::{CheatEntry, CheatTable};
pub use config::Config;
pub use crate::core::{Core, API_VERSION};
pub use environment::{
    CoreVariable, EnvCommand, EnvCommandId, EnvironmentPort, InputDescriptor, Language, Message,
    Negotiated,
};
pub use error::{ContractError, ContractViolation, LoadError, Result, RetroError, SerializeError};
pub use frame::{FrameIo, FrameReport};
pub use host::{CoreHost, CoreState, ViolationPolicy};
pub use state::{SaveStateBuffer, StateReader, StateWriter};
pub use types::{
    GameGeometry, GameInfo, PixelFormat, Region, Rotation, SystemAvInfo, SystemInfo, SystemTiming,
};

pub use ox_input::{Device, JoypadButton};
pub use ox_memory::{MemoryId, MemoryView};
