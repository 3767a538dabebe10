//! Frontend adapter for oxidized-retro
//!
//! Everything a frontend needs around a [`CoreHost`](ox_core::CoreHost):
//! environment answers, sinks for the I/O callbacks, content loading,
//! save RAM persistence, and a runner that ties them together.

pub mod environment;
pub mod loader;
pub mod runner;
pub mod sram;
pub mod video;

pub use environment::{FrontendEnvironment, NegotiatedState};
pub use loader::{ContentLoader, LoadedContent};
pub use runner::{FrameStats, FrontendRunner, RunnerState};
pub use sram::SaveRamStore;
pub use video::VideoSink;
