//! Test pattern rendering

use crate::layout::{CURSOR_SIZE, HEIGHT, WIDTH};

const BAR_COLORS: [u32; 8] = [
    0x00FF_FFFF,
    0x00FF_FF00,
    0x0000_FFFF,
    0x0000_FF00,
    0x00FF_00FF,
    0x00FF_0000,
    0x0000_00FF,
    0x0000_0000,
];

const CHECKER_CELL: u32 = 16;

/// Which pattern fills the background
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pattern {
    #[default]
    Bars,
    Checker,
}

impl Pattern {
    pub const OPTION_KEY: &'static str = "nullcore_pattern";
    pub const CHOICES: [&'static str; 2] = ["bars", "checker"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bars" => Some(Pattern::Bars),
            "checker" => Some(Pattern::Checker),
            _ => None,
        }
    }

    pub fn raw(&self) -> u8 {
        match self {
            Pattern::Bars => 0,
            Pattern::Checker => 1,
        }
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Pattern::Bars),
            1 => Some(Pattern::Checker),
            _ => None,
        }
    }
}

/// Everything that changes what is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    pub pattern: Pattern,
    pub palette: u8,
    pub cursor_x: u16,
    pub cursor_y: u16,
}

/// Draw `scene` into an XRGB8888 framebuffer of `WIDTH * HEIGHT` pixels
pub fn render(scene: &Scene, pixels: &mut [u32]) {
    let rotate = scene.palette as usize;

    for (y, row) in pixels.chunks_exact_mut(WIDTH as usize).enumerate() {
        for (x, px) in row.iter_mut().enumerate() {
            *px = match scene.pattern {
                Pattern::Bars => {
                    let bar = x * BAR_COLORS.len() / WIDTH as usize;
                    BAR_COLORS[(bar + rotate) % BAR_COLORS.len()]
                }
                Pattern::Checker => {
                    let cell = (x as u32 / CHECKER_CELL + y as u32 / CHECKER_CELL) % 2;
                    if cell == 0 {
                        BAR_COLORS[rotate % BAR_COLORS.len()]
                    } else {
                        BAR_COLORS[(rotate + 4) % BAR_COLORS.len()]
                    }
                }
            };
        }
    }

    let x0 = (scene.cursor_x as u32).min(WIDTH - CURSOR_SIZE);
    let y0 = (scene.cursor_y as u32).min(HEIGHT - CURSOR_SIZE);
    for y in y0..y0 + CURSOR_SIZE {
        let start = (y * WIDTH + x0) as usize;
        for px in &mut pixels[start..start + CURSOR_SIZE as usize] {
            *px = !*px & 0x00FF_FFFF;
        }
    }
}
