//! Memory regions for oxidized-retro cores
//!
//! A core owns a small set of addressable blocks (system RAM, save RAM, ...)
//! identified by a [`MemoryId`]. Frontends reach them through borrowed
//! [`MemoryView`]s that are only handed out while a game is loaded.

pub mod error;
pub mod id;
pub mod map;
pub mod region;
pub mod view;

pub use error::MemoryError;
pub use id::MemoryId;
pub use map::MemoryMap;
pub use region::{MemoryRegion, RegionFlags};
pub use view::MemoryView;
