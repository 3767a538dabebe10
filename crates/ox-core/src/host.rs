//! Lifecycle host
//!
//! [`CoreHost`] is the frontend's handle on a core. It owns the registered
//! callbacks, tracks the lifecycle state, and refuses any call the current
//! state does not allow before it reaches the core.

use ox_input::{Device, PortDevices};
use ox_memory::{MemoryId, MemoryView};
use tracing::{debug, info, warn};

use crate::callbacks::{Callbacks, VideoFrame};
use crate::core::{Core, API_VERSION};
use crate::environment::{EnvCommand, EnvironmentPort, Negotiated};
use crate::error::{ContractError, ContractViolation, LoadError, RetroError, Result, SerializeError};
use crate::frame::{FrameIo, FrameReport};
use crate::types::{GameInfo, Region, SystemAvInfo, SystemInfo};

/// Lifecycle state of a hosted core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreState {
    /// Constructed, `init` not yet called
    Created,
    /// Initialized, no game loaded
    Initialized,
    /// A game is loaded
    GameLoaded,
    /// Terminal
    Deinitialized,
}

/// What the host does with per-frame contract violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViolationPolicy {
    /// Fail `run` with the first violation
    #[default]
    Strict,
    /// Log and carry on
    Lenient,
}

/// Frontend-side wrapper that drives a [`Core`] through its lifecycle
pub struct CoreHost<C: Core> {
    core: C,
    state: CoreState,
    info: SystemInfo,
    callbacks: Callbacks,
    negotiated: Negotiated,
    ports: PortDevices,
    policy: ViolationPolicy,
    trace_callbacks: bool,
    /// Smallest serialize size seen since load
    size_ceiling: Option<usize>,
    /// A real frame has been presented since load
    presented: bool,
    frames: u64,
}

impl<C: Core> CoreHost<C> {
    /// Wrap a core, rejecting it if it reports a different API version
    pub fn new(core: C) -> Result<Self> {
        let found = core.api_version();
        if found != API_VERSION {
            return Err(RetroError::ApiVersionMismatch {
                expected: API_VERSION,
                found,
            });
        }

        let info = core.system_info();
        info!(
            "Hosting core {} {} (extensions: {})",
            info.library_name, info.library_version, info.valid_extensions
        );

        Ok(Self {
            core,
            state: CoreState::Created,
            info,
            callbacks: Callbacks::new(),
            negotiated: Negotiated::default(),
            ports: PortDevices::new(),
            policy: ViolationPolicy::default(),
            trace_callbacks: false,
            size_ceiling: None,
            presented: false,
            frames: 0,
        })
    }

    pub fn with_policy(mut self, policy: ViolationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_trace_callbacks(&mut self, enabled: bool) {
        self.trace_callbacks = enabled;
    }

    pub fn state(&self) -> CoreState {
        self.state
    }

    /// Read-only access to the hosted core
    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn negotiated(&self) -> &Negotiated {
        &self.negotiated
    }

    /// Frames run since the current game was loaded
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn api_version(&self) -> u32 {
        self.core.api_version()
    }

    /// Static core metadata, available in every state
    pub fn system_info(&self) -> &SystemInfo {
        &self.info
    }

    fn require(&self, op: &'static str, allowed: &[CoreState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ContractError::InvalidState {
                op,
                state: self.state,
            }
            .into())
        }
    }

    fn require_live(&self, op: &'static str) -> Result<()> {
        self.require(op, &[CoreState::Created, CoreState::Initialized, CoreState::GameLoaded])
    }

    /// Register the environment callback and let the core negotiate
    pub fn set_environment_callback(
        &mut self,
        f: impl FnMut(&mut EnvCommand<'_>) -> bool + Send + 'static,
    ) -> Result<()> {
        self.require_live("set_environment_callback")?;
        self.callbacks.set_environment(f);

        let mut env = EnvironmentPort::new(
            self.callbacks.environment.as_mut(),
            &mut self.negotiated,
            self.trace_callbacks,
        );
        self.core.set_environment(&mut env);
        Ok(())
    }

    pub fn set_video_refresh_callback(
        &mut self,
        f: impl FnMut(&VideoFrame<'_>) + Send + 'static,
    ) -> Result<()> {
        self.require_live("set_video_refresh_callback")?;
        self.callbacks.set_video_refresh(f);
        Ok(())
    }

    pub fn set_audio_sample_callback(&mut self, f: impl FnMut(i16, i16) + Send + 'static) -> Result<()> {
        self.require_live("set_audio_sample_callback")?;
        self.callbacks.set_audio_sample(f);
        Ok(())
    }

    pub fn set_audio_sample_batch_callback(
        &mut self,
        f: impl FnMut(&[i16]) -> usize + Send + 'static,
    ) -> Result<()> {
        self.require_live("set_audio_sample_batch_callback")?;
        self.callbacks.set_audio_sample_batch(f);
        Ok(())
    }

    pub fn set_input_poll_callback(&mut self, f: impl FnMut() + Send + 'static) -> Result<()> {
        self.require_live("set_input_poll_callback")?;
        self.callbacks.set_input_poll(f);
        Ok(())
    }

    pub fn set_input_state_callback(
        &mut self,
        f: impl FnMut(u32, Device, u32, u32) -> i16 + Send + 'static,
    ) -> Result<()> {
        self.require_live("set_input_state_callback")?;
        self.callbacks.set_input_state(f);
        Ok(())
    }

    /// Global initialization; every callback must be registered first
    pub fn init(&mut self) -> Result<()> {
        self.require("init", &[CoreState::Created])?;
        if let Some(name) = self.callbacks.missing() {
            return Err(ContractError::MissingCallback(name).into());
        }

        self.core.init();
        self.state = CoreState::Initialized;
        info!("Core {} initialized", self.info.library_name);
        Ok(())
    }

    /// Load content
    ///
    /// When the core needs a full path, `info.data` is withheld from it for
    /// the duration of the call, and `info.path` may come back rewritten.
    pub fn load_game(&mut self, info: &mut GameInfo<'_>) -> Result<()> {
        self.require("load_game", &[CoreState::Initialized])?;

        let withheld = if self.info.need_fullpath {
            if info.path.is_none() {
                return Err(LoadError::MissingPath.into());
            }
            info.data.take()
        } else {
            if info.data.is_none() {
                return Err(LoadError::MissingData.into());
            }
            None
        };

        let result = {
            let mut env = EnvironmentPort::new(
                self.callbacks.environment.as_mut(),
                &mut self.negotiated,
                self.trace_callbacks,
            );
            self.core.load_game(info, &mut env)
        };

        if withheld.is_some() {
            info.data = withheld;
        }

        match result {
            Ok(()) => {
                self.state = CoreState::GameLoaded;
                self.size_ceiling = None;
                self.presented = false;
                self.frames = 0;
                info!(
                    "Game loaded: path={:?} size={} bytes",
                    info.path,
                    info.size()
                );
                Ok(())
            }
            Err(e) => {
                warn!("Core rejected content: {}", e);
                Err(e.into())
            }
        }
    }

    pub fn system_av_info(&self) -> Result<SystemAvInfo> {
        self.require("system_av_info", &[CoreState::GameLoaded])?;
        Ok(self.core.system_av_info())
    }

    pub fn region(&self) -> Result<Region> {
        self.require("region", &[CoreState::GameLoaded])?;
        Ok(self.core.region())
    }

    /// Advisory device hint for a port
    pub fn set_controller_port_device(&mut self, port: u32, device: Device) -> Result<()> {
        self.require(
            "set_controller_port_device",
            &[CoreState::Initialized, CoreState::GameLoaded],
        )?;
        debug!("Port {} device -> {}", port, device);
        self.ports.set(port, device);
        self.core.set_controller_port_device(port, device);
        Ok(())
    }

    /// Device last assigned to a port (joypad by default)
    pub fn port_device(&self, port: u32) -> Device {
        self.ports.get(port)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.require("reset", &[CoreState::GameLoaded])?;
        info!("Resetting game");
        self.core.reset();
        Ok(())
    }

    /// Run one frame and check the frame rules
    pub fn run(&mut self) -> Result<FrameReport> {
        self.require("run", &[CoreState::GameLoaded])?;

        let mut io = FrameIo::new(
            &mut self.callbacks,
            &mut self.negotiated,
            &mut self.presented,
            self.trace_callbacks,
        );
        self.core.run(&mut io);
        let report = io.finish();
        self.frames += 1;

        if let Some(first) = report.violations.first() {
            match self.policy {
                ViolationPolicy::Strict => {
                    return Err(ContractError::Violation(first.clone()).into());
                }
                ViolationPolicy::Lenient => {
                    for violation in &report.violations {
                        warn!("Frame {}: {}", self.frames, violation);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Save state capacity, checked against earlier answers
    pub fn serialize_size(&mut self) -> Result<usize> {
        self.require("serialize_size", &[CoreState::GameLoaded])?;
        let current = self.core.serialize_size();

        match self.size_ceiling {
            Some(previous) if current > previous => {
                return Err(ContractError::Violation(ContractViolation::SerializeSizeGrew {
                    previous,
                    current,
                })
                .into());
            }
            _ => self.size_ceiling = Some(current),
        }

        Ok(current)
    }

    /// Write a save state into the prefix of `buf`
    pub fn serialize(&mut self, buf: &mut [u8]) -> Result<()> {
        let needed = self.serialize_size()?;
        if buf.len() < needed {
            return Err(SerializeError::ShortBuffer {
                needed,
                got: buf.len(),
            }
            .into());
        }
        self.core.serialize(buf)?;
        debug!("Serialized {} bytes at frame {}", needed, self.frames);
        Ok(())
    }

    /// Restore a save state
    pub fn unserialize(&mut self, buf: &[u8]) -> Result<()> {
        let needed = self.serialize_size()?;
        if buf.len() < needed {
            return Err(SerializeError::ShortBuffer {
                needed,
                got: buf.len(),
            }
            .into());
        }
        self.core.unserialize(buf)?;
        debug!("Restored {} byte state", needed);
        Ok(())
    }

    pub fn set_cheat(&mut self, index: u32, enabled: bool, code: &str) -> Result<()> {
        self.require("set_cheat", &[CoreState::GameLoaded])?;
        self.core.set_cheat(index, enabled, code);
        Ok(())
    }

    pub fn reset_cheat(&mut self) -> Result<()> {
        self.require("reset_cheat", &[CoreState::GameLoaded])?;
        self.core.reset_cheat();
        Ok(())
    }

    pub fn memory_size(&self, id: MemoryId) -> Result<usize> {
        self.require("memory_size", &[CoreState::GameLoaded])?;
        Ok(self.core.memory_size(id))
    }

    /// Live view into a core region
    ///
    /// The view borrows the host, so no lifecycle call (and no frame) can
    /// happen while it exists.
    pub fn memory(&mut self, id: MemoryId) -> Result<Option<MemoryView<'_>>> {
        self.require("memory_data", &[CoreState::GameLoaded])?;
        Ok(self
            .core
            .memory_data(id)
            .filter(|data| !data.is_empty())
            .map(|data| MemoryView::new(id, data)))
    }

    pub fn unload_game(&mut self) -> Result<()> {
        self.require("unload_game", &[CoreState::GameLoaded])?;
        self.core.unload_game();
        self.state = CoreState::Initialized;
        self.size_ceiling = None;
        self.presented = false;
        info!("Game unloaded after {} frames", self.frames);
        Ok(())
    }

    /// Terminal teardown; the game must be unloaded first
    pub fn deinit(&mut self) -> Result<()> {
        self.require("deinit", &[CoreState::Initialized])?;
        self.core.deinit();
        self.state = CoreState::Deinitialized;
        info!("Core {} deinitialized", self.info.library_name);
        Ok(())
    }
}

impl<C: Core> Drop for CoreHost<C> {
    fn drop(&mut self) {
        if self.state == CoreState::GameLoaded {
            debug!("Unloading game on host drop");
            self.core.unload_game();
            self.state = CoreState::Initialized;
        }
        if self.state == CoreState::Initialized {
            debug!("Deinitializing core on host drop");
            self.core.deinit();
            self.state = CoreState::Deinitialized;
        }
    }
}
