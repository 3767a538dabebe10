//! Input handling for oxidized-retro
//!
//! Cores pull input: the frontend samples its devices when the core asks for
//! a poll, and later answers `(port, device, index, id)` queries from that
//! sample.

pub mod device;
pub mod joypad;
pub mod latch;

pub use device::{Device, PortDevices, DEVICE_JOYPAD};
pub use joypad::{JoypadButton, JoypadButtons, JOYPAD_MASK};
pub use latch::{AnalogAxis, AnalogStick, InputLatch, PortState};
