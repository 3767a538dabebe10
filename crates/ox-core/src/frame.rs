//! Per-frame I/O capability
//!
//! A core only reaches the frontend's video, audio and input callbacks
//! through the [`FrameIo`] it is handed inside `run`. The capability records
//! what the core did so the host can check the frame rules afterwards.

use ox_input::Device;

use crate::callbacks::{Callbacks, VideoFrame};
use crate::environment::{EnvCommand, EnvironmentPort, Negotiated};
use crate::error::ContractViolation;

/// What happened during one `run` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub polls: u32,
    pub input_reads: u32,
    /// Input reads issued before the first poll of the frame
    pub reads_before_poll: u32,
    pub video_refreshes: u32,
    pub dupes: u32,
    /// Stereo frames accepted by the audio callbacks
    pub audio_frames: usize,
    pub violations: Vec<ContractViolation>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Synchronous access to the frontend during one frame
pub struct FrameIo<'a> {
    callbacks: &'a mut Callbacks,
    negotiated: &'a mut Negotiated,
    presented: &'a mut bool,
    trace: bool,
    report: FrameReport,
}

impl<'a> FrameIo<'a> {
    pub(crate) fn new(
        callbacks: &'a mut Callbacks,
        negotiated: &'a mut Negotiated,
        presented: &'a mut bool,
        trace: bool,
    ) -> Self {
        Self {
            callbacks,
            negotiated,
            presented,
            trace,
            report: FrameReport::default(),
        }
    }

    /// Environment access for mid-frame negotiation
    pub fn environment(&mut self) -> EnvironmentPort<'_> {
        EnvironmentPort::new(
            self.callbacks.environment.as_mut(),
            &mut *self.negotiated,
            self.trace,
        )
    }

    /// Send a single environment command
    pub fn env_call(&mut self, cmd: &mut EnvCommand<'_>) -> bool {
        self.environment().call(cmd)
    }

    /// Ask the frontend to sample its input devices
    pub fn poll_input(&mut self) {
        self.report.polls += 1;
        if let Some(poll) = self.callbacks.input_poll.as_mut() {
            poll();
        }
        if self.trace {
            tracing::trace!("input_poll #{}", self.report.polls);
        }
    }

    /// Read one input value from the last poll
    pub fn input_state(&mut self, port: u32, device: Device, index: u32, id: u32) -> i16 {
        self.report.input_reads += 1;
        if self.report.polls == 0 {
            self.report.reads_before_poll += 1;
        }

        let value = match self.callbacks.input_state.as_mut() {
            Some(state) => state(port, device, index, id),
            None => 0,
        };
        if self.trace {
            tracing::trace!("input_state({}, {}, {}, {}) = {}", port, device, index, id, value);
        }
        value
    }

    /// Present a frame, or `None` to repeat the previous one
    pub fn video_refresh(&mut self, data: Option<&[u8]>, width: u32, height: u32, pitch: usize) {
        self.report.video_refreshes += 1;
        let frame = VideoFrame {
            data,
            width,
            height,
            pitch,
        };

        let mut truncated = false;
        match data {
            None => {
                self.report.dupes += 1;
                if !*self.presented {
                    self.report.violations.push(ContractViolation::DupeWithoutFrame);
                }
                if !self.negotiated.can_dupe {
                    self.report.violations.push(ContractViolation::DupeNotAllowed);
                }
            }
            Some(bytes) => {
                let needed = frame.required_len(self.negotiated.pixel_format.bytes_per_pixel());
                if bytes.len() < needed {
                    self.report.violations.push(ContractViolation::ShortVideoFrame {
                        needed,
                        got: bytes.len(),
                    });
                    truncated = true;
                } else {
                    *self.presented = true;
                }
            }
        }

        // A truncated payload is never forwarded; the frontend still sees a
        // refresh so its pacing stays in step.
        let frame = if truncated {
            VideoFrame { data: None, ..frame }
        } else {
            frame
        };
        if self.trace {
            tracing::trace!(
                "video_refresh {}x{} pitch {} dupe={}{}",
                width,
                height,
                pitch,
                frame.is_dupe(),
                if truncated { " (short frame dropped)" } else { "" }
            );
        }
        if let Some(refresh) = self.callbacks.video_refresh.as_mut() {
            refresh(&frame);
        }
    }

    /// Push one stereo frame
    pub fn audio_sample(&mut self, left: i16, right: i16) {
        if let Some(sample) = self.callbacks.audio_sample.as_mut() {
            sample(left, right);
            self.report.audio_frames += 1;
        }
    }

    /// Push interleaved stereo samples; returns frames the frontend accepted
    pub fn audio_sample_batch(&mut self, data: &[i16]) -> usize {
        let offered = data.len() / 2;
        let accepted = match self.callbacks.audio_sample_batch.as_mut() {
            Some(batch) => batch(data).min(offered),
            None => 0,
        };
        if self.trace {
            tracing::trace!("audio_sample_batch {} frames, {} accepted", offered, accepted);
        }
        self.report.audio_frames += accepted;
        accepted
    }

    /// Close the frame and collect the report
    pub(crate) fn finish(mut self) -> FrameReport {
        if self.report.polls == 0 {
            self.report.violations.push(ContractViolation::InputNotPolled);
        }
        if self.report.reads_before_poll > 0 {
            self.report.violations.push(ContractViolation::InputReadBeforePoll {
                reads: self.report.reads_before_poll,
            });
        }
        if self.report.video_refreshes != 1 {
            self.report
                .violations
                .push(ContractViolation::VideoRefreshCount(self.report.video_refreshes));
        }
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelFormat;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn callbacks(log: &Log) -> Callbacks {
        let mut callbacks = Callbacks::new();
        callbacks.set_environment(|_| false);
        let l = log.clone();
        callbacks.set_video_refresh(move |frame| {
            l.lock().unwrap().push(format!("video dupe={}", frame.is_dupe()))
        });
        callbacks.set_audio_sample(|_, _| {});
        callbacks.set_audio_sample_batch(|data| (data.len() / 2).min(3));
        let l = log.clone();
        callbacks.set_input_poll(move || l.lock().unwrap().push("poll".to_string()));
        let l = log.clone();
        callbacks.set_input_state(move |port, _, _, id| {
            l.lock().unwrap().push(format!("state {} {}", port, id));
            1
        });
        callbacks
    }

    #[test]
    fn test_clean_frame() {
        let log = Log::default();
        let mut callbacks = callbacks(&log);
        let mut negotiated = Negotiated {
            pixel_format: PixelFormat::Xrgb8888,
            ..Default::default()
        };
        let mut presented = false;
        let mut io = FrameIo::new(&mut callbacks, &mut negotiated, &mut presented, false);

        io.poll_input();
        assert_eq!(io.input_state(0, Device::Joypad, 0, 8), 1);
        io.video_refresh(Some(&[0u8; 16]), 2, 2, 8);
        assert_eq!(io.audio_sample_batch(&[0i16; 20]), 3);
        let report = io.finish();

        assert!(report.is_clean(), "{:?}", report.violations);
        assert_eq!(report.audio_frames, 3);
        assert!(presented);
        assert_eq!(entries(&log), vec!["poll", "state 0 8", "video dupe=false"]);
    }

    #[test]
    fn test_missing_poll_and_refresh() {
        let log = Log::default();
        let mut callbacks = callbacks(&log);
        let mut negotiated = Negotiated::default();
        let mut presented = false;
        let mut io = FrameIo::new(&mut callbacks, &mut negotiated, &mut presented, false);

        io.input_state(0, Device::Joypad, 0, 0);
        let report = io.finish();

        assert!(report.violations.contains(&ContractViolation::InputNotPolled));
        assert!(report
            .violations
            .contains(&ContractViolation::InputReadBeforePoll { reads: 1 }));
        assert!(report.violations.contains(&ContractViolation::VideoRefreshCount(0)));
    }

    #[test]
    fn test_dupe_rules() {
        let log = Log::default();
        let mut callbacks = callbacks(&log);
        let mut negotiated = Negotiated::default();
        let mut presented = false;
        let mut io = FrameIo::new(&mut callbacks, &mut negotiated, &mut presented, false);

        io.poll_input();
        io.video_refresh(None, 2, 2, 4);
        let report = io.finish();

        assert_eq!(report.dupes, 1);
        assert!(report.violations.contains(&ContractViolation::DupeWithoutFrame));
        assert!(report.violations.contains(&ContractViolation::DupeNotAllowed));
    }

    #[test]
    fn test_short_frame_not_forwarded() {
        let log = Log::default();
        let mut callbacks = callbacks(&log);
        let mut negotiated = Negotiated::default();
        let mut presented = false;
        let mut io = FrameIo::new(&mut callbacks, &mut negotiated, &mut presented, false);

        io.poll_input();
        io.video_refresh(Some(&[0u8; 3]), 2, 2, 4);
        let report = io.finish();

        assert_eq!(
            report.violations,
            vec![ContractViolation::ShortVideoFrame { needed: 8, got: 3 }]
        );
        assert!(!presented);
        assert_eq!(entries(&log), vec!["poll", "video dupe=true"]);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_short_frame_is_traced() {
        let log = Log::default();
        let mut callbacks = callbacks(&log);
        let mut negotiated = Negotiated::default();
        let mut presented = false;

        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut io = FrameIo::new(&mut callbacks, &mut negotiated, &mut presented, true);
            io.poll_input();
            io.video_refresh(Some(&[0u8; 3]), 2, 2, 4);
            io.finish();
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("video_refresh 2x2 pitch 4 dupe=true (short frame dropped)"), "{}", output);
        assert_eq!(entries(&log), vec!["poll", "video dupe=true"]);
    }
}
