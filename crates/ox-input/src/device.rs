//! Device classes and per-port assignment

use std::fmt;

pub const DEVICE_NONE: u32 = 0;
/// Default device class assumed on every port
pub const DEVICE_JOYPAD: u32 = 1;
pub const DEVICE_MOUSE: u32 = 2;
pub const DEVICE_KEYBOARD: u32 = 3;
pub const DEVICE_LIGHTGUN: u32 = 4;
pub const DEVICE_ANALOG: u32 = 5;
pub const DEVICE_POINTER: u32 = 6;

/// Input device class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    /// Nothing plugged in
    None,
    /// Digital joypad
    #[default]
    Joypad,
    Mouse,
    Keyboard,
    Lightgun,
    /// Joypad with analog sticks
    Analog,
    Pointer,
    /// Core-specific device class
    Other(u32),
}

impl Device {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            DEVICE_NONE => Device::None,
            DEVICE_JOYPAD => Device::Joypad,
            DEVICE_MOUSE => Device::Mouse,
            DEVICE_KEYBOARD => Device::Keyboard,
            DEVICE_LIGHTGUN => Device::Lightgun,
            DEVICE_ANALOG => Device::Analog,
            DEVICE_POINTER => Device::Pointer,
            other => Device::Other(other),
        }
    }

    pub fn raw(&self) -> u32 {
        match self {
            Device::None => DEVICE_NONE,
            Device::Joypad => DEVICE_JOYPAD,
            Device::Mouse => DEVICE_MOUSE,
            Device::Keyboard => DEVICE_KEYBOARD,
            Device::Lightgun => DEVICE_LIGHTGUN,
            Device::Analog => DEVICE_ANALOG,
            Device::Pointer => DEVICE_POINTER,
            Device::Other(raw) => *raw,
        }
    }

    /// Whether the device reports joypad buttons
    pub fn has_buttons(&self) -> bool {
        matches!(self, Device::Joypad | Device::Analog)
    }
}

impl From<u32> for Device {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Other(raw) => write!(f, "device #{}", raw),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Advisory device assignment per controller port
///
/// Ports that were never configured report [`Device::Joypad`].
#[derive(Debug, Clone, Default)]
pub struct PortDevices {
    ports: Vec<Device>,
}

impl PortDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw device ids, one per port
    pub fn from_raw(raw: &[u32]) -> Self {
        Self {
            ports: raw.iter().copied().map(Device::from_raw).collect(),
        }
    }

    pub fn set(&mut self, port: u32, device: Device) {
        let port = port as usize;
        if port >= self.ports.len() {
            self.ports.resize(port + 1, Device::Joypad);
        }
        self.ports[port] = device;
    }

    pub fn get(&self, port: u32) -> Device {
        self.ports.get(port as usize).copied().unwrap_or_default()
    }

    /// Explicitly configured ports, in port order
    pub fn iter(&self) -> impl Iterator<Item = (u32, Device)> + '_ {
        self.ports.iter().enumerate().map(|(i, d)| (i as u32, *d))
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_joypad() {
        let ports = PortDevices::new();
        assert_eq!(ports.get(0), Device::Joypad);
        assert_eq!(ports.get(7), Device::Joypad);
        assert_eq!(Device::default().raw(), DEVICE_JOYPAD);
    }

    #[test]
    fn test_set_port_fills_gaps() {
        let mut ports = PortDevices::new();
        ports.set(2, Device::Mouse);
        assert_eq!(ports.len(), 3);
        assert_eq!(ports.get(1), Device::Joypad);
        assert_eq!(ports.get(2), Device::Mouse);
    }

    #[test]
    fn test_raw_round_trip_keeps_unknown() {
        assert_eq!(Device::from_raw(0x105), Device::Other(0x105));
        assert_eq!(Device::Other(0x105).raw(), 0x105);
        assert_eq!(Device::from_raw(DEVICE_ANALOG), Device::Analog);
    }
}
