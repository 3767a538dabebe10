//! Frontend runner that drives a core through its lifecycle
//!
//! This module provides the FrontendRunner which ties together:
//! - the lifecycle host
//! - the environment handler
//! - video, audio and input sinks wired into the callbacks
//! - content loading, save RAM and save states

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ox_audio::SampleQueue;
use ox_core::{
    Config, Core, CoreHost, CoreState, FrameReport, JoypadButton, MemoryId, MemoryView, Result,
    SaveStateBuffer, SystemAvInfo, ViolationPolicy,
};
use ox_input::{Device, InputLatch};
use parking_lot::Mutex;

use crate::environment::{FrontendEnvironment, NegotiatedState};
use crate::loader::{ContentLoader, LoadedContent};
use crate::sram::SaveRamStore;
use crate::video::VideoSink;

/// Runner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// No content running
    Stopped,
    /// Frames advance on `run_frame`
    Running,
    /// Content loaded, frames held
    Paused,
}

/// Totals since the current content was loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub dupes: u64,
    pub audio_frames: u64,
    /// Violations logged under the lenient policy
    pub violations: u64,
}

impl FrameStats {
    fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        self.dupes += report.dupes as u64;
        self.audio_frames += report.audio_frames as u64;
        self.violations += report.violations.len() as u64;
    }
}

/// Headless frontend around one core
pub struct FrontendRunner<C: Core> {
    config: Config,
    state: RunnerState,
    host: CoreHost<C>,
    environment: Arc<Mutex<FrontendEnvironment>>,
    video: Arc<Mutex<VideoSink>>,
    audio: Arc<Mutex<SampleQueue>>,
    input: Arc<Mutex<InputLatch>>,
    sram: SaveRamStore,
    content: Option<LoadedContent>,
    /// Sized by the first `serialize_size` answer after load
    state_buffer: Option<SaveStateBuffer>,
    stats: FrameStats,
}

impl<C: Core> FrontendRunner<C> {
    /// Create a new runner; the core stays in `Created` until `boot`
    pub fn new(core: C, config: Config) -> Result<Self> {
        tracing::info!("Initializing frontend runner");

        let policy = if config.general.strict_contract {
            ViolationPolicy::Strict
        } else {
            ViolationPolicy::Lenient
        };
        let mut host = CoreHost::new(core)?.with_policy(policy);
        host.set_trace_callbacks(config.debug.trace_callbacks);

        let audio = if config.audio.enable {
            SampleQueue::new(config.audio.queue_frames)
        } else {
            tracing::info!("Audio disabled; samples are discarded");
            SampleQueue::disabled()
        };

        Ok(Self {
            environment: Arc::new(Mutex::new(FrontendEnvironment::new(&config))),
            video: Arc::new(Mutex::new(VideoSink::new())),
            audio: Arc::new(Mutex::new(audio)),
            input: Arc::new(Mutex::new(InputLatch::new(config.input.max_ports as usize))),
            sram: SaveRamStore::new(config.paths.saves.clone()),
            config,
            state: RunnerState::Stopped,
            host,
            content: None,
            state_buffer: None,
            stats: FrameStats::default(),
        })
    }

    /// Register callbacks, initialize the core and plug in configured devices
    pub fn boot(&mut self) -> Result<()> {
        tracing::info!("Booting core {}", self.host.system_info().library_name);

        let env = self.environment.clone();
        self.host
            .set_environment_callback(move |cmd| env.lock().handle(cmd))?;

        let video = self.video.clone();
        let env = self.environment.clone();
        self.host.set_video_refresh_callback(move |frame| {
            let format = env.lock().state().pixel_format;
            video.lock().present(frame, format);
        })?;

        let audio = self.audio.clone();
        self.host.set_audio_sample_callback(move |left, right| {
            audio.lock().push_sample(left, right);
        })?;

        let audio = self.audio.clone();
        self.host
            .set_audio_sample_batch_callback(move |data| audio.lock().push_batch(data))?;

        let input = self.input.clone();
        self.host.set_input_poll_callback(move || input.lock().poll())?;

        let input = self.input.clone();
        self.host
            .set_input_state_callback(move |port, device, index, id| {
                input.lock().query(port, device, index, id)
            })?;

        self.host.init()?;

        let max_ports = self.config.input.max_ports as usize;
        for (port, raw) in self.config.input.port_devices.iter().take(max_ports).enumerate() {
            self.host
                .set_controller_port_device(port as u32, Device::from_raw(*raw))?;
        }
        Ok(())
    }

    /// Get the current state
    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn host(&self) -> &CoreHost<C> {
        &self.host
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn content(&self) -> Option<&LoadedContent> {
        self.content.as_ref()
    }

    /// Snapshot of what the core negotiated
    pub fn negotiated(&self) -> NegotiatedState {
        self.environment.lock().state().clone()
    }

    /// Load content and start running it
    pub fn load_content<P: AsRef<Path>>(&mut self, path: P) -> Result<SystemAvInfo> {
        if self.host.state() == CoreState::GameLoaded {
            self.unload_content()?;
        }

        let loader = ContentLoader::new(self.host.system_info().clone());
        let mut content = loader.load(path)?;
        self.environment.lock().reset_for_game();

        let rewritten = {
            let mut info = content.game_info();
            self.host.load_game(&mut info)?;
            info.path.take()
        };
        if let Some(path) = rewritten {
            content.path = path;
        }

        let av = self.host.system_av_info()?;
        tracing::info!(
            "Running {} at {}x{} {:.2} fps, {} Hz",
            content.path.display(),
            av.geometry.base_width,
            av.geometry.base_height,
            av.timing.fps,
            av.timing.sample_rate
        );

        if self.config.general.auto_load_save_ram {
            let restored = match self.host.memory(MemoryId::SaveRam)? {
                Some(mut view) => self.sram.restore(&content.stem(), &mut view),
                None => Ok(false),
            };
            if let Err(e) = restored {
                // Unload without flushing so the unreadable save file is left alone.
                tracing::error!("Save RAM for {} not restored: {}", content.stem(), e);
                self.host.unload_game()?;
                return Err(e);
            }
        }

        self.content = Some(content);
        self.state_buffer = None;
        self.stats = FrameStats::default();
        self.video.lock().clear();
        self.audio.lock().clear();
        self.state = RunnerState::Running;
        Ok(av)
    }

    /// Execute a single frame; `None` when not running
    pub fn run_frame(&mut self) -> Result<Option<FrameReport>> {
        if self.state != RunnerState::Running {
            return Ok(None);
        }

        // Headless: the previous frame's audio has been "played"
        self.audio.lock().clear();

        let report = self.host.run()?;
        self.stats.record(&report);

        let mut env = self.environment.lock();
        for message in env.drain_messages() {
            tracing::info!("[{}] {}", self.host.system_info().library_name, message.text);
        }
        if env.state().shutdown_requested {
            tracing::info!("Stopping after core shutdown request");
            self.state = RunnerState::Stopped;
        }
        Ok(Some(report))
    }

    /// Run up to `count` frames, returning how many ran
    pub fn run_frames(&mut self, count: u64) -> Result<u64> {
        let mut ran = 0;
        while ran < count {
            if self.run_frame()?.is_none() {
                break;
            }
            ran += 1;
        }
        Ok(ran)
    }

    /// Pause the runner
    pub fn pause(&mut self) -> Result<()> {
        if self.state == RunnerState::Running {
            tracing::info!("Pausing");
            self.state = RunnerState::Paused;
        }
        Ok(())
    }

    /// Resume the runner
    pub fn resume(&mut self) -> Result<()> {
        if self.state == RunnerState::Paused {
            tracing::info!("Resuming");
            self.state = RunnerState::Running;
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state == RunnerState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunnerState::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state == RunnerState::Stopped
    }

    pub fn reset(&mut self) -> Result<()> {
        self.host.reset()
    }

    /// Snapshot into the reusable state buffer
    pub fn save_state(&mut self) -> Result<&[u8]> {
        let size = self.host.serialize_size()?;
        let buffer = self
            .state_buffer
            .get_or_insert_with(|| SaveStateBuffer::new(size));
        self.host.serialize(buffer.as_mut_slice())?;
        Ok(&buffer.as_slice()[..size])
    }

    pub fn load_state(&mut self, data: &[u8]) -> Result<()> {
        self.host.unserialize(data)
    }

    /// Default state file for a slot: `<states>/<stem>.state<slot>`
    pub fn state_path(&self, slot: u32) -> Option<PathBuf> {
        let content = self.content.as_ref()?;
        Some(
            self.config
                .paths
                .states
                .join(format!("{}.state{}", content.stem(), slot)),
        )
    }

    pub fn save_state_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = self.save_state()?;
        std::fs::write(path, data)?;
        tracing::info!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn load_state_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let data = std::fs::read(path.as_ref())?;
        self.load_state(&data)?;
        tracing::info!("Loaded state from {}", path.as_ref().display());
        Ok(())
    }

    /// Update the pending input for the next poll
    pub fn set_button(&mut self, port: u32, button: JoypadButton, pressed: bool) {
        self.input.lock().set_button(port, button, pressed);
    }

    pub fn set_controller_port_device(&mut self, port: u32, device: Device) -> Result<()> {
        self.host.set_controller_port_device(port, device)
    }

    pub fn set_option(&mut self, key: &str, value: &str) {
        self.environment.lock().set_option(key, value);
    }

    pub fn set_cheat(&mut self, index: u32, enabled: bool, code: &str) -> Result<()> {
        self.host.set_cheat(index, enabled, code)
    }

    pub fn reset_cheats(&mut self) -> Result<()> {
        self.host.reset_cheat()
    }

    pub fn memory(&mut self, id: MemoryId) -> Result<Option<MemoryView<'_>>> {
        self.host.memory(id)
    }

    /// Copy of the last real frame, tightly packed
    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.video.lock().last_frame().map(<[u8]>::to_vec)
    }

    /// Refreshes seen by the video sink
    pub fn video_frames(&self) -> u64 {
        self.video.lock().frames()
    }

    /// Interleaved samples produced by the last frame
    pub fn take_audio(&mut self) -> Vec<i16> {
        self.audio.lock().drain_all()
    }

    fn flush_save_ram(&mut self) -> Result<()> {
        let Some(content) = self.content.as_ref() else {
            return Ok(());
        };
        if let Some(view) = self.host.memory(MemoryId::SaveRam)? {
            self.sram.flush(&content.stem(), &view)?;
        }
        Ok(())
    }

    /// Flush save RAM and unload the game
    pub fn unload_content(&mut self) -> Result<()> {
        if self.host.state() != CoreState::GameLoaded {
            return Ok(());
        }
        self.flush_save_ram()?;
        self.host.unload_game()?;
        self.content = None;
        self.state_buffer = None;
        self.input.lock().release_all();
        self.state = RunnerState::Stopped;
        Ok(())
    }

    /// Unload and deinitialize
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down after {} frames", self.stats.frames);
        self.unload_content()?;
        if self.host.state() == CoreState::Initialized {
            self.host.deinit()?;
        }
        self.state = RunnerState::Stopped;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ox_nullcore::NullCore;

    fn config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.paths.saves = dir.join("saves");
        config.paths.states = dir.join("states");
        config.paths.system = dir.join("system");
        config
    }

    fn content(dir: &Path) -> PathBuf {
        let path = dir.join("demo.bin");
        std::fs::write(&path, [2u8, 0, 0, 0]).unwrap();
        path
    }

    #[test]
    fn test_runner_creation() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FrontendRunner::new(NullCore::new(), config(dir.path())).unwrap();
        assert_eq!(runner.state(), RunnerState::Stopped);
        assert_eq!(runner.stats().frames, 0);
        assert_eq!(runner.host().state(), CoreState::Created);
    }

    #[test]
    fn test_runner_state_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = FrontendRunner::new(NullCore::new(), config(dir.path())).unwrap();
        runner.boot().unwrap();
        assert!(runner.is_stopped());
        assert!(runner.run_frame().unwrap().is_none());

        runner.load_content(content(dir.path())).unwrap();
        assert!(runner.is_running());

        runner.pause().unwrap();
        assert!(runner.is_paused());
        assert!(runner.run_frame().unwrap().is_none());

        runner.resume().unwrap();
        assert!(runner.is_running());
        assert_eq!(runner.run_frames(3).unwrap(), 3);

        runner.shutdown().unwrap();
        assert!(runner.is_stopped());
        assert_eq!(runner.host().state(), CoreState::Deinitialized);
    }

    #[test]
    fn test_save_ram_persisted_between_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = content(dir.path());
        {
            let mut runner = FrontendRunner::new(NullCore::new(), config(dir.path())).unwrap();
            runner.boot().unwrap();
            runner.load_content(&path).unwrap();
            runner
                .memory(MemoryId::SaveRam)
                .unwrap()
                .unwrap()
                .write_u8(10, 0x5A)
                .unwrap();
            runner.shutdown().unwrap();
        }
        assert!(dir.path().join("saves").join("demo.srm").exists());

        let mut runner = FrontendRunner::new(NullCore::new(), config(dir.path())).unwrap();
        runner.boot().unwrap();
        runner.load_content(&path).unwrap();
        let view = runner.memory(MemoryId::SaveRam).unwrap().unwrap();
        assert_eq!(view.read_u8(10).unwrap(), 0x5A);
    }

    #[test]
    fn test_state_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = FrontendRunner::new(NullCore::new(), config(dir.path())).unwrap();
        runner.boot().unwrap();
        runner.load_content(content(dir.path())).unwrap();
        runner.run_frames(2).unwrap();

        let slot = runner.state_path(0).unwrap();
        assert!(slot.ends_with("demo.state0"));
        runner.save_state_to_file(&slot).unwrap();

        runner.run_frames(5).unwrap();
        runner.load_state_from_file(&slot).unwrap();
        let view = runner.memory(MemoryId::SystemRam).unwrap().unwrap();
        assert_eq!(view.read_u8(ox_nullcore::layout::FRAME_COUNTER).unwrap(), 2);
    }

    #[test]
    fn test_failed_save_ram_restore_leaves_runner_reusable() {
        let dir = tempfile::tempdir().unwrap();
        let path = content(dir.path());
        let blocker = dir.path().join("saves").join("demo.srm");
        std::fs::create_dir_all(&blocker).unwrap();

        let mut runner = FrontendRunner::new(NullCore::new(), config(dir.path())).unwrap();
        runner.boot().unwrap();
        assert!(runner.load_content(&path).is_err());
        assert!(runner.is_stopped());
        assert!(runner.content().is_none());
        assert_eq!(runner.host().state(), CoreState::Initialized);
        // The unreadable save was not overwritten by a flush
        assert!(blocker.is_dir());

        std::fs::remove_dir(&blocker).unwrap();
        runner.load_content(&path).unwrap();
        assert!(runner.is_running());
        assert_eq!(runner.host().state(), CoreState::GameLoaded);
    }
}
