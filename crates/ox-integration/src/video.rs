//! Frame capture

use ox_core::{PixelFormat, VideoFrame};
use tracing::trace;

/// Keeps the most recent frame, tightly packed
#[derive(Debug, Default)]
pub struct VideoSink {
    frames: u64,
    dupes: u64,
    width: u32,
    height: u32,
    format: PixelFormat,
    buffer: Vec<u8>,
}

impl VideoSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one refresh in the given negotiated format
    pub fn present(&mut self, frame: &VideoFrame<'_>, format: PixelFormat) {
        self.frames += 1;
        let Some(data) = frame.data else {
            self.dupes += 1;
            trace!("Dupe frame {}", self.frames);
            return;
        };

        let bpp = format.bytes_per_pixel();
        let row_len = frame.width as usize * bpp;
        self.width = frame.width;
        self.height = frame.height;
        self.format = format;
        self.buffer.clear();
        self.buffer.reserve(row_len * frame.height as usize);

        for y in 0..frame.height {
            let start = y as usize * frame.pitch;
            match data.get(start..start + row_len) {
                Some(row) => self.buffer.extend_from_slice(row),
                None => break,
            }
        }
    }

    /// Refreshes seen, dupes included
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn dupes(&self) -> u64 {
        self.dupes
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Last real frame, `height` rows of `width * bpp` bytes
    pub fn last_frame(&self) -> Option<&[u8]> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(&self.buffer)
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_is_stripped() {
        let mut sink = VideoSink::new();
        // 2x2 RGB565 with 2 bytes of padding per row
        let data = [1, 2, 3, 4, 0, 0, 5, 6, 7, 8];
        let frame = VideoFrame {
            data: Some(&data),
            width: 2,
            height: 2,
            pitch: 6,
        };
        sink.present(&frame, PixelFormat::Rgb565);
        assert_eq!(sink.last_frame(), Some(&[1, 2, 3, 4, 5, 6, 7, 8][..]));
        assert_eq!(sink.dimensions(), (2, 2));
    }

    #[test]
    fn test_dupe_keeps_previous() {
        let mut sink = VideoSink::new();
        let data = [9u8; 4];
        sink.present(
            &VideoFrame {
                data: Some(&data),
                width: 1,
                height: 1,
                pitch: 4,
            },
            PixelFormat::Xrgb8888,
        );
        sink.present(
            &VideoFrame {
                data: None,
                width: 1,
                height: 1,
                pitch: 4,
            },
            PixelFormat::Xrgb8888,
        );
        assert_eq!(sink.frames(), 2);
        assert_eq!(sink.dupes(), 1);
        assert_eq!(sink.last_frame(), Some(&data[..]));
    }
}
