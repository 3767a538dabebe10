//! The core side of the contract

use ox_input::Device;
use ox_memory::MemoryId;

use crate::environment::EnvironmentPort;
use crate::error::{LoadError, SerializeError};
use crate::frame::FrameIo;
use crate::types::{GameInfo, Region, SystemAvInfo, SystemInfo};

/// Contract revision a core must report
pub const API_VERSION: u32 = 1;

/// A pluggable content-execution unit
///
/// Cores never see the frontend's callbacks directly. Environment access is
/// lent through [`EnvironmentPort`] during registration and `load_game`, and
/// video/audio/input access through [`FrameIo`] during `run`. Lifecycle
/// ordering is enforced by [`CoreHost`](crate::CoreHost), so implementations
/// may assume every call arrives in a valid state.
pub trait Core {
    /// Must return [`API_VERSION`]
    fn api_version(&self) -> u32 {
        API_VERSION
    }

    /// Static metadata; callable at any time, even before `init`
    fn system_info(&self) -> SystemInfo;

    /// Called whenever the frontend registers its environment callback
    fn set_environment(&mut self, _env: &mut EnvironmentPort<'_>) {}

    /// Library global initialization
    fn init(&mut self);

    /// Library global deinitialization
    fn deinit(&mut self);

    /// Audio/video timing and geometry of the loaded game
    fn system_av_info(&self) -> SystemAvInfo;

    /// Video standard of the loaded game
    fn region(&self) -> Region {
        Region::Ntsc
    }

    /// Hint the device class plugged into `port`
    fn set_controller_port_device(&mut self, port: u32, device: Device);

    /// Restart the loaded game without unloading it
    fn reset(&mut self);

    /// Advance exactly one video frame
    ///
    /// Must poll input at least once and refresh video exactly once, passing
    /// `None` as the payload when repeating the previous frame.
    fn run(&mut self, io: &mut FrameIo<'_>);

    /// Capacity needed by `serialize`; must not grow while a game is loaded
    fn serialize_size(&self) -> usize;

    /// Write the internal state into the prefix of `data`
    fn serialize(&self, data: &mut [u8]) -> Result<(), SerializeError>;

    /// Replace the internal state from `data`, all or nothing
    fn unserialize(&mut self, data: &[u8]) -> Result<(), SerializeError>;

    fn set_cheat(&mut self, index: u32, enabled: bool, code: &str);

    fn reset_cheat(&mut self);

    /// Load content. May rewrite `info.path` when `need_fullpath` is set.
    fn load_game(
        &mut self,
        info: &mut GameInfo<'_>,
        env: &mut EnvironmentPort<'_>,
    ) -> Result<(), LoadError>;

    fn unload_game(&mut self);

    /// Live span over a memory region, `None` when unsupported
    fn memory_data(&mut self, id: MemoryId) -> Option<&mut [u8]>;

    /// Size of a memory region, 0 when unsupported
    fn memory_size(&self, id: MemoryId) -> usize;
}

impl<C: Core + ?Sized> Core for Box<C> {
    fn api_version(&self) -> u32 {
        (**self).api_version()
    }

    fn system_info(&self) -> SystemInfo {
        (**self).system_info()
    }

    fn set_environment(&mut self, env: &mut EnvironmentPort<'_>) {
        (**self).set_environment(env)
    }

    fn init(&mut self) {
        (**self).init()
    }

    fn deinit(&mut self) {
        (**self).deinit()
    }

    fn system_av_info(&self) -> SystemAvInfo {
        (**self).system_av_info()
    }

    fn region(&self) -> Region {
        (**self).region()
    }

    fn set_controller_port_device(&mut self, port: u32, device: Device) {
        (**self).set_controller_port_device(port, device)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn run(&mut self, io: &mut FrameIo<'_>) {
        (**self).run(io)
    }

    fn serialize_size(&self) -> usize {
        (**self).serialize_size()
    }

    fn serialize(&self, data: &mut [u8]) -> Result<(), SerializeError> {
        (**self).serialize(data)
    }

    fn unserialize(&mut self, data: &[u8]) -> Result<(), SerializeError> {
        (**self).unserialize(data)
    }

    fn set_cheat(&mut self, index: u32, enabled: bool, code: &str) {
        (**self).set_cheat(index, enabled, code)
    }

    fn reset_cheat(&mut self) {
        (**self).reset_cheat()
    }

    fn load_game(
        &mut self,
        info: &mut GameInfo<'_>,
        env: &mut EnvironmentPort<'_>,
    ) -> Result<(), LoadError> {
        (**self).load_game(info, env)
    }

    fn unload_game(&mut self) {
        (**self).unload_game()
    }

    fn memory_data(&mut self, id: MemoryId) -> Option<&mut [u8]> {
        (**self).memory_data(id)
    }

    fn memory_size(&self, id: MemoryId) -> usize {
        (**self).memory_size(id)
    }
}
