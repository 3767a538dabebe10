//! Frontend callback registration

use ox_input::Device;

use crate::environment::EnvCommand;

pub type EnvironmentFn = Box<dyn FnMut(&mut EnvCommand<'_>) -> bool + Send>;
pub type VideoRefreshFn = Box<dyn FnMut(&VideoFrame<'_>) + Send>;
pub type AudioSampleFn = Box<dyn FnMut(i16, i16) + Send>;
pub type AudioSampleBatchFn = Box<dyn FnMut(&[i16]) -> usize + Send>;
pub type InputPollFn = Box<dyn FnMut() + Send>;
pub type InputStateFn = Box<dyn FnMut(u32, Device, u32, u32) -> i16 + Send>;

/// One delivered video frame
///
/// `data == None` means "repeat the previous frame". Rows are `pitch` bytes
/// apart, which may be more than `width * bytes_per_pixel`.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub data: Option<&'a [u8]>,
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
}

impl<'a> VideoFrame<'a> {
    pub fn is_dupe(&self) -> bool {
        self.data.is_none()
    }

    /// Minimum payload length for this frame
    pub fn required_len(&self, bytes_per_pixel: usize) -> usize {
        if self.height == 0 || self.width == 0 {
            return 0;
        }
        self.pitch * (self.height as usize - 1) + self.width as usize * bytes_per_pixel
    }

    /// Visible pixels of row `y`
    pub fn row(&self, y: u32, bytes_per_pixel: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let data = self.data?;
        let start = y as usize * self.pitch;
        let end = start + self.width as usize * bytes_per_pixel;
        data.get(start..end)
    }
}

/// The callbacks a frontend registers before driving a core
///
/// All six must be present before `init`. Registering again replaces the
/// previous closure.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) environment: Option<EnvironmentFn>,
    pub(crate) video_refresh: Option<VideoRefreshFn>,
    pub(crate) audio_sample: Option<AudioSampleFn>,
    pub(crate) audio_sample_batch: Option<AudioSampleBatchFn>,
    pub(crate) input_poll: Option<InputPollFn>,
    pub(crate) input_state: Option<InputStateFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_environment(&mut self, f: impl FnMut(&mut EnvCommand<'_>) -> bool + Send + 'static) {
        self.environment = Some(Box::new(f));
    }

    pub fn set_video_refresh(&mut self, f: impl FnMut(&VideoFrame<'_>) + Send + 'static) {
        self.video_refresh = Some(Box::new(f));
    }

    pub fn set_audio_sample(&mut self, f: impl FnMut(i16, i16) + Send + 'static) {
        self.audio_sample = Some(Box::new(f));
    }

    pub fn set_audio_sample_batch(&mut self, f: impl FnMut(&[i16]) -> usize + Send + 'static) {
        self.audio_sample_batch = Some(Box::new(f));
    }

    pub fn set_input_poll(&mut self, f: impl FnMut() + Send + 'static) {
        self.input_poll = Some(Box::new(f));
    }

    pub fn set_input_state(&mut self, f: impl FnMut(u32, Device, u32, u32) -> i16 + Send + 'static) {
        self.input_state = Some(Box::new(f));
    }

    /// Name of the first callback still missing
    pub fn missing(&self) -> Option<&'static str> {
        if self.environment.is_none() {
            Some("environment")
        } else if self.video_refresh.is_none() {
            Some("video_refresh")
        } else if self.audio_sample.is_none() {
            Some("audio_sample")
        } else if self.audio_sample_batch.is_none() {
            Some("audio_sample_batch")
        } else if self.input_poll.is_none() {
            Some("input_poll")
        } else if self.input_state.is_none() {
            Some("input_state")
        } else {
            None
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_none()
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("environment", &self.environment.is_some())
            .field("video_refresh", &self.video_refresh.is_some())
            .field("audio_sample", &self.audio_sample.is_some())
            .field("audio_sample_batch", &self.audio_sample_batch.is_some())
            .field("input_poll", &self.input_poll.is_some())
            .field("input_state", &self.input_state.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_in_registration_order() {
        let mut callbacks = Callbacks::new();
        assert_eq!(callbacks.missing(), Some("environment"));

        callbacks.set_environment(|_| false);
        callbacks.set_video_refresh(|_| {});
        assert_eq!(callbacks.missing(), Some("audio_sample"));

        callbacks.set_audio_sample(|_, _| {});
        callbacks.set_audio_sample_batch(|data| data.len() / 2);
        callbacks.set_input_poll(|| {});
        callbacks.set_input_state(|_, _, _, _| 0);
        assert!(callbacks.is_complete());
    }

    #[test]
    fn test_frame_rows_respect_pitch() {
        // 2x2 frame of 2-byte pixels with 2 bytes of padding per row
        let data = [1u8, 2, 3, 4, 0xEE, 0xEE, 5, 6, 7, 8];
        let frame = VideoFrame {
            data: Some(&data),
            width: 2,
            height: 2,
            pitch: 6,
        };

        assert_eq!(frame.required_len(2), 10);
        assert_eq!(frame.row(0, 2), Some(&data[0..4]));
        assert_eq!(frame.row(1, 2), Some(&data[6..10]));
        assert_eq!(frame.row(2, 2), None);
    }

    #[test]
    fn test_dupe_frame_has_no_rows() {
        let frame = VideoFrame {
            data: None,
            width: 320,
            height: 240,
            pitch: 1280,
        };
        assert!(frame.is_dupe());
        assert_eq!(frame.row(0, 4), None);
    }
}
