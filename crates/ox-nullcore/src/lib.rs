//! Reference core for oxidized-retro
//!
//! A deterministic test-pattern core that exercises the whole contract:
//! environment negotiation, polled joypad input, frame duping, batched
//! audio, save states, memory regions and cheats.

pub mod cheat;
pub mod layout;
pub mod null;
pub mod pattern;
pub mod tone;

pub use null::NullCore;
pub use pattern::{Pattern, Scene};
