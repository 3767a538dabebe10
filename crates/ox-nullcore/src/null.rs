//! The null core

use std::path::PathBuf;

use ox_core::environment::{CoreVariable, EnvironmentPort, InputDescriptor};
use ox_core::state::{StateReader, StateWriter};
use ox_core::{
    CheatTable, Core, FrameIo, GameGeometry, GameInfo, LoadError, PixelFormat, SerializeError,
    SystemAvInfo, SystemInfo, SystemTiming,
};
use ox_input::{Device, JoypadButton, JoypadButtons, PortDevices, JOYPAD_MASK};
use ox_memory::{MemoryId, MemoryMap};
use tracing::{debug, info, warn};

use crate::cheat::Poke;
use crate::layout::*;
use crate::pattern::{render, Pattern, Scene};
use crate::tone::Tone;

const STATE_MAGIC: [u8; 4] = *b"OXNS";
const STATE_VERSION: u32 = 1;
/// Header, frame counter, cursor, palette, pattern, tone phase
const STATE_FIXED: usize = 8 + 4 + 2 + 2 + 1 + 1 + 4;

/// Deterministic test-pattern core
///
/// System RAM holds the whole game state (see [`crate::layout`]), so
/// frontend writes through a memory view take effect on the next frame.
pub struct NullCore {
    need_fullpath: bool,
    initialized: bool,
    loaded: bool,
    ram: MemoryMap,
    pixels: Vec<u32>,
    audio: Vec<i16>,
    tone: Tone,
    pattern: Pattern,
    can_dupe: bool,
    /// Scene of the last real frame handed to the frontend
    shown: Option<Scene>,
    ports: PortDevices,
    cheats: CheatTable,
    content: Vec<u8>,
    content_path: Option<PathBuf>,
}

impl NullCore {
    pub fn new() -> Self {
        Self {
            need_fullpath: false,
            initialized: false,
            loaded: false,
            ram: MemoryMap::new(),
            pixels: Vec::new(),
            audio: vec![0; SAMPLES_PER_FRAME * 2],
            tone: Tone::default(),
            pattern: Pattern::default(),
            can_dupe: false,
            shown: None,
            ports: PortDevices::new(),
            cheats: CheatTable::new(),
            content: Vec::new(),
            content_path: None,
        }
    }

    /// Variant that asks for a path and reads the file itself
    pub fn with_full_path() -> Self {
        Self {
            need_fullpath: true,
            ..Self::new()
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Bytes of the loaded content
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_path(&self) -> Option<&PathBuf> {
        self.content_path.as_ref()
    }

    pub fn cheats(&self) -> &CheatTable {
        &self.cheats
    }

    fn sys_u16(&self, offset: usize) -> u16 {
        self.ram.read_u16(MemoryId::SystemRam, offset).unwrap_or(0)
    }

    fn sys_u32(&self, offset: usize) -> u32 {
        self.ram.read_u32(MemoryId::SystemRam, offset).unwrap_or(0)
    }

    fn sys_u8(&self, offset: usize) -> u8 {
        self.ram.read_u8(MemoryId::SystemRam, offset).unwrap_or(0)
    }

    fn poke(&mut self, offset: usize, bytes: &[u8]) {
        if let Err(e) = self.ram.write_bytes(MemoryId::SystemRam, offset, bytes) {
            warn!("NullCore RAM write failed: {}", e);
        }
    }

    fn scene(&self) -> Scene {
        Scene {
            pattern: self.pattern,
            palette: self.sys_u8(PALETTE),
            cursor_x: self.sys_u16(CURSOR_X),
            cursor_y: self.sys_u16(CURSOR_Y),
        }
    }

    fn read_pattern(&mut self, env: &mut EnvironmentPort<'_>) {
        if let Some(value) = env.variable(Pattern::OPTION_KEY) {
            match Pattern::from_name(&value) {
                Some(pattern) => {
                    if pattern != self.pattern {
                        debug!("NullCore pattern -> {:?}", pattern);
                    }
                    self.pattern = pattern;
                }
                None => warn!("NullCore ignoring {}={}", Pattern::OPTION_KEY, value),
            }
        }
    }

    fn previous_buttons(&self) -> JoypadButtons {
        let mut buttons = JoypadButtons::empty();
        for button in JoypadButton::ALL {
            let pressed = self.sys_u8(BUTTONS + button.id() as usize) != 0;
            buttons.set_button(button, pressed);
        }
        buttons
    }

    fn step(&mut self, buttons: JoypadButtons) {
        let previous = self.previous_buttons();
        let max_x = (WIDTH - CURSOR_SIZE) as u16;
        let max_y = (HEIGHT - CURSOR_SIZE) as u16;
        // RAM is frontend- and cheat-writable, so the stored cursor may be out of range.
        let mut x = self.sys_u16(CURSOR_X).min(max_x);
        let mut y = self.sys_u16(CURSOR_Y).min(max_y);

        if buttons.is_pressed(JoypadButton::Left) {
            x = x.saturating_sub(1);
        }
        if buttons.is_pressed(JoypadButton::Right) {
            x = (x + 1).min(max_x);
        }
        if buttons.is_pressed(JoypadButton::Up) {
            y = y.saturating_sub(1);
        }
        if buttons.is_pressed(JoypadButton::Down) {
            y = (y + 1).min(max_y);
        }
        self.poke(CURSOR_X, &x.to_le_bytes());
        self.poke(CURSOR_Y, &y.to_le_bytes());

        if buttons.is_pressed(JoypadButton::A) && !previous.is_pressed(JoypadButton::A) {
            let palette = self.sys_u8(PALETTE).wrapping_add(1);
            self.poke(PALETTE, &[palette]);
        }

        let mut held = [0u8; BUTTON_COUNT];
        for button in JoypadButton::ALL {
            held[button.id() as usize] = buttons.is_pressed(button) as u8;
        }
        self.poke(BUTTONS, &held);

        let frame = self.sys_u32(FRAME_COUNTER).wrapping_add(1);
        self.poke(FRAME_COUNTER, &frame.to_le_bytes());
    }

    fn apply_cheats(&mut self) {
        let pokes: Vec<Poke> = self
            .cheats
            .active()
            .filter_map(|entry| Poke::parse_all(&entry.code))
            .flatten()
            .collect();
        for poke in pokes {
            self.poke(poke.address as usize, &[poke.value]);
        }
    }

    fn push_audio(&mut self, io: &mut FrameIo<'_>) {
        self.tone.fill(&mut self.audio);
        let mut sent = 0;
        while sent < SAMPLES_PER_FRAME {
            let accepted = io.audio_sample_batch(&self.audio[sent * 2..]);
            if accepted == 0 {
                break;
            }
            sent += accepted;
        }
        if sent < SAMPLES_PER_FRAME {
            debug!("NullCore dropped {} audio frames", SAMPLES_PER_FRAME - sent);
        }
    }

    fn unload(&mut self) {
        self.ram.unmap_all();
        self.pixels = Vec::new();
        self.content.clear();
        self.content_path = None;
        self.cheats.reset();
        self.shown = None;
        self.tone = Tone::default();
        self.loaded = false;
    }
}

impl Default for NullCore {
    fn default() -> Self {
        Self::new()
    }
}

impl Core for NullCore {
    fn system_info(&self) -> SystemInfo {
        SystemInfo {
            library_name: "NullCore".to_string(),
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            valid_extensions: "bin|rom|nul".to_string(),
            need_fullpath: self.need_fullpath,
            block_extract: false,
        }
    }

    fn set_environment(&mut self, env: &mut EnvironmentPort<'_>) {
        let pattern = CoreVariable::new(Pattern::OPTION_KEY, "Test pattern", &Pattern::CHOICES);
        env.set_variables(&[pattern]);
        env.set_support_no_game(false);
    }

    fn init(&mut self) {
        self.initialized = true;
        debug!("NullCore init");
    }

    fn deinit(&mut self) {
        self.unload();
        self.initialized = false;
        debug!("NullCore deinit");
    }

    fn system_av_info(&self) -> SystemAvInfo {
        SystemAvInfo {
            geometry: GameGeometry {
                base_width: WIDTH,
                base_height: HEIGHT,
                max_width: WIDTH,
                max_height: HEIGHT,
                aspect_ratio: 4.0 / 3.0,
            },
            timing: SystemTiming {
                fps: FPS,
                sample_rate: SAMPLE_RATE,
            },
        }
    }

    fn set_controller_port_device(&mut self, port: u32, device: Device) {
        self.ports.set(port, device);
    }

    fn reset(&mut self) {
        if let Some(ram) = self.ram.data_mut(MemoryId::SystemRam) {
            ram.fill(0);
        }
        let seed = self.content.first().copied().unwrap_or(0);
        self.poke(PALETTE, &[seed]);
        self.tone = Tone::default();
        self.shown = None;
    }

    fn run(&mut self, io: &mut FrameIo<'_>) {
        {
            let mut env = io.environment();
            if env.variables_updated() {
                self.read_pattern(&mut env);
            }
        }

        io.poll_input();
        let buttons = if self.ports.get(0) == Device::Joypad {
            let mask = io.input_state(0, Device::Joypad, 0, JOYPAD_MASK) as u16;
            JoypadButtons::from_bits_truncate(mask)
        } else {
            JoypadButtons::empty()
        };

        self.step(buttons);
        self.apply_cheats();

        let scene = self.scene();
        if self.can_dupe && self.shown == Some(scene) {
            io.video_refresh(None, WIDTH, HEIGHT, PITCH);
        } else {
            render(&scene, &mut self.pixels);
            io.video_refresh(Some(bytemuck::cast_slice(&self.pixels)), WIDTH, HEIGHT, PITCH);
            self.shown = Some(scene);
        }

        self.push_audio(io);
    }

    fn serialize_size(&self) -> usize {
        STATE_FIXED + SYSTEM_RAM_SIZE + SAVE_RAM_SIZE
    }

    fn serialize(&self, data: &mut [u8]) -> Result<(), SerializeError> {
        let sys = self
            .ram
            .data(MemoryId::SystemRam)
            .ok_or_else(|| SerializeError::Unknown("no game loaded".to_string()))?;
        let save = self
            .ram
            .data(MemoryId::SaveRam)
            .ok_or_else(|| SerializeError::Unknown("no game loaded".to_string()))?;

        let mut w = StateWriter::new(data);
        w.header(STATE_MAGIC, STATE_VERSION)?;
        w.write_u32(self.sys_u32(FRAME_COUNTER))?;
        w.write_u16(self.sys_u16(CURSOR_X))?;
        w.write_u16(self.sys_u16(CURSOR_Y))?;
        w.write_u8(self.sys_u8(PALETTE))?;
        w.write_u8(self.pattern.raw())?;
        w.write_u32(self.tone.phase())?;
        w.write_bytes(sys)?;
        w.write_bytes(save)?;
        Ok(())
    }

    fn unserialize(&mut self, data: &[u8]) -> Result<(), SerializeError> {
        let mut r = StateReader::new(data);
        r.expect_header(STATE_MAGIC, STATE_VERSION)?;
        let frame = r.read_u32()?;
        let x = r.read_u16()?;
        let y = r.read_u16()?;
        let palette = r.read_u8()?;
        let raw_pattern = r.read_u8()?;
        let pattern = Pattern::from_raw(raw_pattern).ok_or_else(|| {
            SerializeError::Unknown(format!("unknown pattern {:#04x}", raw_pattern))
        })?;
        let phase = r.read_u32()?;
        let sys = r.read_bytes(SYSTEM_RAM_SIZE)?;
        let save = r.read_bytes(SAVE_RAM_SIZE)?;

        // The fixed fields are a copy of system RAM and must agree with it.
        let le16 = |at: usize| u16::from_le_bytes([sys[at], sys[at + 1]]);
        let le32 = |at: usize| {
            u32::from_le_bytes([sys[at], sys[at + 1], sys[at + 2], sys[at + 3]])
        };
        if frame != le32(FRAME_COUNTER)
            || x != le16(CURSOR_X)
            || y != le16(CURSOR_Y)
            || palette != sys[PALETTE]
        {
            return Err(SerializeError::Unknown(
                "state fields disagree with system RAM".to_string(),
            ));
        }

        // Everything validated; commit.
        if let Some(ram) = self.ram.data_mut(MemoryId::SystemRam) {
            ram.copy_from_slice(sys);
        }
        if let Some(ram) = self.ram.data_mut(MemoryId::SaveRam) {
            ram.copy_from_slice(save);
        }
        self.pattern = pattern;
        self.tone.set_phase(phase);
        self.shown = None;
        Ok(())
    }

    fn set_cheat(&mut self, index: u32, enabled: bool, code: &str) {
        if Poke::parse_all(code).is_none() {
            warn!("NullCore cheat {} has no valid pokes: {:?}", index, code);
        }
        self.cheats.set(index, enabled, code);
    }

    fn reset_cheat(&mut self) {
        self.cheats.reset();
    }

    fn load_game(
        &mut self,
        info: &mut GameInfo<'_>,
        env: &mut EnvironmentPort<'_>,
    ) -> Result<(), LoadError> {
        if !env.set_pixel_format(PixelFormat::Xrgb8888) {
            return Err(LoadError::InvalidContent(
                "frontend does not accept XRGB8888".to_string(),
            ));
        }

        let (content, canonical) = if self.need_fullpath {
            let path = info.path.as_ref().ok_or(LoadError::MissingPath)?;
            let bytes = std::fs::read(path)
                .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
            let canonical =
                std::fs::canonicalize(path).map_err(|e| LoadError::Io(e.to_string()))?;
            (bytes, Some(canonical))
        } else {
            (info.data.ok_or(LoadError::MissingData)?.to_vec(), None)
        };
        if content.is_empty() {
            return Err(LoadError::InvalidContent("empty content".to_string()));
        }

        self.ram.unmap_all();
        self.ram
            .map(MemoryId::SystemRam, SYSTEM_RAM_SIZE, "system_ram")
            .map_err(|e| LoadError::InvalidContent(e.to_string()))?;
        self.ram
            .map(MemoryId::SaveRam, SAVE_RAM_SIZE, "save_ram")
            .map_err(|e| LoadError::InvalidContent(e.to_string()))?;
        self.pixels = vec![0; (WIDTH * HEIGHT) as usize];

        self.can_dupe = env.can_dupe();
        self.read_pattern(env);
        let descriptors: Vec<InputDescriptor> = [
            (JoypadButton::Left, "Cursor left"),
            (JoypadButton::Right, "Cursor right"),
            (JoypadButton::Up, "Cursor up"),
            (JoypadButton::Down, "Cursor down"),
            (JoypadButton::A, "Next palette"),
        ]
        .into_iter()
        .map(|(button, description)| InputDescriptor {
            port: 0,
            device: Device::Joypad,
            index: 0,
            id: button.id(),
            description: description.to_string(),
        })
        .collect();
        env.set_input_descriptors(&descriptors);

        // The caller's path is only rewritten once the load can no longer fail.
        if canonical.is_some() {
            info.path = canonical;
        }
        self.content = content;
        self.content_path = info.path.clone();
        self.shown = None;
        self.tone = Tone::default();
        self.loaded = true;
        self.poke(PALETTE, &[self.content[0]]);

        info!(
            "NullCore loaded {} bytes (pattern {:?}, dupe {})",
            self.content.len(),
            self.pattern,
            self.can_dupe
        );
        Ok(())
    }

    fn unload_game(&mut self) {
        self.unload();
        debug!("NullCore unloaded");
    }

    fn memory_data(&mut self, id: MemoryId) -> Option<&mut [u8]> {
        match id {
            MemoryId::VideoRam if self.loaded => Some(bytemuck::cast_slice_mut(&mut self.pixels)),
            _ => self.ram.data_mut(id),
        }
    }

    fn memory_size(&self, id: MemoryId) -> usize {
        match id {
            MemoryId::VideoRam if self.loaded => self.pixels.len() * 4,
            _ => self.ram.size(id),
        }
    }
}
