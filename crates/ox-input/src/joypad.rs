//! Joypad button ids

use bitflags::bitflags;

/// Input-state id that returns every button of a joypad as a bitmask
pub const JOYPAD_MASK: u32 = 256;

/// Joypad button id as queried through the input-state callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum JoypadButton {
    B = 0,
    Y = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
    A = 8,
    X = 9,
    L = 10,
    R = 11,
    L2 = 12,
    R2 = 13,
    L3 = 14,
    R3 = 15,
}

impl JoypadButton {
    pub const ALL: [JoypadButton; 16] = [
        JoypadButton::B,
        JoypadButton::Y,
        JoypadButton::Select,
        JoypadButton::Start,
        JoypadButton::Up,
        JoypadButton::Down,
        JoypadButton::Left,
        JoypadButton::Right,
        JoypadButton::A,
        JoypadButton::X,
        JoypadButton::L,
        JoypadButton::R,
        JoypadButton::L2,
        JoypadButton::R2,
        JoypadButton::L3,
        JoypadButton::R3,
    ];

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn id(&self) -> u32 {
        *self as u32
    }

    /// Single-bit mask for this button
    pub fn mask(&self) -> JoypadButtons {
        JoypadButtons::from_bits_truncate(1 << self.id())
    }

    /// Parse a button name as used in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        let button = match name.to_ascii_lowercase().as_str() {
            "b" => JoypadButton::B,
            "y" => JoypadButton::Y,
            "select" => JoypadButton::Select,
            "start" => JoypadButton::Start,
            "up" => JoypadButton::Up,
            "down" => JoypadButton::Down,
            "left" => JoypadButton::Left,
            "right" => JoypadButton::Right,
            "a" => JoypadButton::A,
            "x" => JoypadButton::X,
            "l" => JoypadButton::L,
            "r" => JoypadButton::R,
            "l2" => JoypadButton::L2,
            "r2" => JoypadButton::R2,
            "l3" => JoypadButton::L3,
            "r3" => JoypadButton::R3,
            _ => return None,
        };
        Some(button)
    }
}

bitflags! {
    /// Joypad button state, bit N = button id N
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct JoypadButtons: u16 {
        const B      = 1 << 0;
        const Y      = 1 << 1;
        const SELECT = 1 << 2;
        const START  = 1 << 3;
        const UP     = 1 << 4;
        const DOWN   = 1 << 5;
        const LEFT   = 1 << 6;
        const RIGHT  = 1 << 7;
        const A      = 1 << 8;
        const X      = 1 << 9;
        const L      = 1 << 10;
        const R      = 1 << 11;
        const L2     = 1 << 12;
        const R2     = 1 << 13;
        const L3     = 1 << 14;
        const R3     = 1 << 15;
    }
}

impl JoypadButtons {
    pub fn is_pressed(&self, button: JoypadButton) -> bool {
        self.contains(button.mask())
    }

    pub fn set_button(&mut self, button: JoypadButton, pressed: bool) {
        self.set(button.mask(), pressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_ids() {
        assert_eq!(JoypadButton::B.id(), 0);
        assert_eq!(JoypadButton::A.id(), 8);
        assert_eq!(JoypadButton::from_id(15), Some(JoypadButton::R3));
        assert_eq!(JoypadButton::from_id(16), None);
    }

    #[test]
    fn test_button_state() {
        let mut state = JoypadButtons::empty();
        assert!(!state.is_pressed(JoypadButton::Start));

        state.set_button(JoypadButton::Start, true);
        assert!(state.is_pressed(JoypadButton::Start));
        assert_eq!(state, JoypadButtons::START);

        state.set_button(JoypadButton::Start, false);
        assert!(state.is_empty());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(JoypadButton::from_name("Start"), Some(JoypadButton::Start));
        assert_eq!(JoypadButton::from_name("l2"), Some(JoypadButton::L2));
        assert_eq!(JoypadButton::from_name("turbo"), None);
    }
}
