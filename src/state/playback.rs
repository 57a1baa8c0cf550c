//! Video playback state
//!
//! Cards and the lightbox each own one `Playback` per video presentation.
//! Card previews are muted and looped; the lightbox plays with sound and
//! shows controls. Frames come from a decoder thread and are pulled on
//! every tick.

use iced::widget::image::Handle;
use std::path::Path;
use std::time::Duration;

use crate::error::PlaybackError;
use crate::media::video::{StreamEvent, VideoStream};
use crate::state::data::PreviewImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug)]
pub struct Playback {
    status: PlaybackStatus,
    pub muted: bool,
    pub looping: bool,
    /// Show play/pause and mute controls
    pub controls: bool,
    position: Duration,
    /// First frame, shown while nothing is decoded
    poster: Option<Handle>,
    frame: Option<Handle>,
    stream: Option<VideoStream>,
}

impl Playback {
    fn new(muted: bool, looping: bool, controls: bool) -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            muted,
            looping,
            controls,
            position: Duration::ZERO,
            poster: None,
            frame: None,
            stream: None,
        }
    }

    /// Hover preview on a card
    pub fn preview() -> Self {
        Self::new(true, true, false)
    }

    /// Full playback in the lightbox
    pub fn full() -> Self {
        Self::new(false, false, true)
    }

    #[cfg(test)]
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// The decoded frame on screen, else the poster
    pub fn frame(&self) -> Option<&Handle> {
        self.frame.as_ref().or(self.poster.as_ref())
    }

    pub fn set_poster(&mut self, poster: Handle) {
        self.poster = Some(poster);
    }

    /// Start or resume playback of `source`.
    ///
    /// The first play opens a decoder, which fails without changing state
    /// when the asset is missing or cannot be decoded.
    pub fn play(&mut self, source: &Path) -> Result<(), PlaybackError> {
        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                let (stream, first) = VideoStream::open(source, self.looping)?;
                self.position = first.pts;
                self.frame = Some(to_handle(first.image));
                stream
            }
        };

        stream.play();
        self.stream = Some(stream);
        self.status = PlaybackStatus::Playing;
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
            if let Some(stream) = &self.stream {
                stream.pause();
            }
        }
    }

    /// Pointer left a card: back to the first frame, paused
    pub fn rewind_and_pause(&mut self) {
        self.pause();
        self.release();
    }

    /// Stop and clear
    pub fn stop(&mut self) {
        self.status = PlaybackStatus::Stopped;
        self.release();
    }

    /// Drop the decoder; the next play starts from the top
    fn release(&mut self) {
        self.stream = None;
        self.frame = None;
        self.position = Duration::ZERO;
    }

    /// Play/pause control
    pub fn toggle(&mut self, source: &Path) -> Result<(), PlaybackError> {
        if self.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play(source)
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Pull whatever the decoder produced since the last tick.
    ///
    /// Only the newest frame is kept. A stream that ended pauses on its
    /// last frame; one that failed stops.
    pub fn advance(&mut self) {
        if !self.is_playing() {
            return;
        }
        let Some(stream) = self.stream.as_mut() else {
            return;
        };

        let mut latest = None;
        let mut failed = false;
        while let Some(event) = stream.try_next() {
            match event {
                StreamEvent::Frame(frame) => latest = Some(frame),
                StreamEvent::Ended => self.status = PlaybackStatus::Paused,
                StreamEvent::Failed(reason) => {
                    log::warn!("Playback stopped: {reason}");
                    failed = true;
                }
            }
        }

        if let Some(frame) = latest {
            self.position = frame.pts;
            self.frame = Some(to_handle(frame.image));
        }
        if failed {
            self.stop();
        }
    }
}

fn to_handle(image: PreviewImage) -> Handle {
    Handle::from_rgba(image.width, image.height, image.rgba)
}

/// Format a position as `m:ss`
pub fn format_position(position: Duration) -> String {
    let secs = position.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
