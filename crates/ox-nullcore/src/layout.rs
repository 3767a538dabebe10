//! Fixed layout of the null core's memory

pub const WIDTH: u32 = 320;
pub const HEIGHT: u32 = 240;
pub const PITCH: usize = WIDTH as usize * 4;

pub const SYSTEM_RAM_SIZE: usize = 8192;
pub const SAVE_RAM_SIZE: usize = 2048;

/// Cursor x, LE u16
pub const CURSOR_X: usize = 0;
/// Cursor y, LE u16
pub const CURSOR_Y: usize = 2;
pub const PALETTE: usize = 4;
/// Frame counter, LE u32
pub const FRAME_COUNTER: usize = 8;
/// One byte per joypad button, 0 or 1
pub const BUTTONS: usize = 16;
pub const BUTTON_COUNT: usize = 16;

/// Size of the square cursor in pixels
pub const CURSOR_SIZE: u32 = 8;

pub const SAMPLE_RATE: f64 = 48_000.0;
pub const FPS: f64 = 60.0;
pub const SAMPLES_PER_FRAME: usize = 800;
