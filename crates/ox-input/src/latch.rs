//! Polled input state
//!
//! The frontend writes live device state into the pending side of the latch
//! at any time. A poll copies pending into the sampled side, and every
//! input-state query is answered from the sample. Input changed after a
//! poll is therefore invisible until the next one.

use crate::device::Device;
use crate::joypad::{JoypadButton, JoypadButtons, JOYPAD_MASK};

/// Analog stick index for [`Device::Analog`] queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogStick {
    Left = 0,
    Right = 1,
}

/// Analog axis id for [`Device::Analog`] queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogAxis {
    X = 0,
    Y = 1,
}

/// State of one controller port
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortState {
    pub buttons: JoypadButtons,
    /// `[left_x, left_y, right_x, right_y]`
    pub analog: [i16; 4],
}

impl PortState {
    fn query(&self, device: Device, index: u32, id: u32) -> i16 {
        match device {
            Device::Joypad | Device::Analog if index == 0 && id == JOYPAD_MASK => {
                self.buttons.bits() as i16
            }
            Device::Joypad => self.button(id),
            Device::Analog => match (index, id) {
                (0, _) => self.button(id),
                (1, 0) => self.analog[0],
                (1, 1) => self.analog[1],
                (2, 0) => self.analog[2],
                (2, 1) => self.analog[3],
                _ => 0,
            },
            _ => 0,
        }
    }

    fn button(&self, id: u32) -> i16 {
        match JoypadButton::from_id(id) {
            Some(button) if self.buttons.is_pressed(button) => 1,
            _ => 0,
        }
    }
}

/// Double-buffered input table shared between the frontend and the
/// input-poll/input-state callbacks
#[derive(Debug, Clone)]
pub struct InputLatch {
    pending: Vec<PortState>,
    sampled: Vec<PortState>,
    polls: u64,
}

impl InputLatch {
    pub fn new(ports: usize) -> Self {
        Self {
            pending: vec![PortState::default(); ports],
            sampled: vec![PortState::default(); ports],
            polls: 0,
        }
    }

    pub fn ports(&self) -> usize {
        self.pending.len()
    }

    /// Pending state of a port, the one the frontend edits
    pub fn pending_mut(&mut self, port: u32) -> Option<&mut PortState> {
        self.pending.get_mut(port as usize)
    }

    pub fn set_button(&mut self, port: u32, button: JoypadButton, pressed: bool) {
        match self.pending_mut(port) {
            Some(state) => state.buttons.set_button(button, pressed),
            None => tracing::warn!("Ignoring button on port {} (only {} ports)", port, self.ports()),
        }
    }

    pub fn set_buttons(&mut self, port: u32, buttons: JoypadButtons) {
        if let Some(state) = self.pending_mut(port) {
            state.buttons = buttons;
        }
    }

    pub fn set_analog(&mut self, port: u32, stick: AnalogStick, axis: AnalogAxis, value: i16) {
        if let Some(state) = self.pending_mut(port) {
            state.analog[stick as usize * 2 + axis as usize] = value;
        }
    }

    /// Sample all devices now
    pub fn poll(&mut self) {
        self.sampled.copy_from_slice(&self.pending);
        self.polls += 1;
    }

    /// Number of polls since creation
    pub fn poll_count(&self) -> u64 {
        self.polls
    }

    /// Answer an input-state query from the last sample
    pub fn query(&self, port: u32, device: Device, index: u32, id: u32) -> i16 {
        self.sampled
            .get(port as usize)
            .map(|state| state.query(device, index, id))
            .unwrap_or(0)
    }

    /// Clear both sides
    pub fn release_all(&mut self) {
        self.pending.fill(PortState::default());
        self.sampled.fill(PortState::default());
    }
}

impl Default for InputLatch {
    fn default() -> Self {
        Self::new(2)
    }
}
