//! Video decoding with FFmpeg
//!
//! Posters are decoded on whatever thread asks for them. Playback runs one
//! decoder thread per stream; it paces frames by their timestamps and hands
//! them to the UI through a small bounded channel, which the UI drains on
//! every tick.

use ffmpeg_next::format::context::Input;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::media::Type;
use ffmpeg_next::software::scaling::{Context as Scaler, Flags};
use ffmpeg_next::util::frame::video::Video as RawFrame;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::error::PlaybackError;
use crate::state::data::PreviewImage;

static FFMPEG_INIT: Once = Once::new();

/// Frames buffered between a decoder thread and the UI
const FRAME_BUFFER: usize = 2;

/// Frame rate assumed when a stream does not declare one
const FALLBACK_FPS: f64 = 25.0;

/// Initialize FFmpeg once per process, with warnings silenced
fn init_ffmpeg() -> Result<(), PlaybackError> {
    let mut result = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            result = Err(PlaybackError::Decoder(format!("FFmpeg initialization failed: {e}")));
            return;
        }

        // SAFETY: av_log_set_level only changes a global integer
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    result
}

/// A decoded frame ready for display
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub image: PreviewImage,
    /// Presentation time, from the start of the stream
    pub pts: Duration,
}

/// An open video stream decoding to RGBA
struct VideoSource {
    path: PathBuf,
    input: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: Scaler,
    stream_index: usize,
    /// Seconds per timestamp unit
    time_base: f64,
    frame_duration: Duration,
    decoded: u32,
    draining: bool,
}

impl VideoSource {
    fn open(path: &Path) -> Result<Self, PlaybackError> {
        if !path.exists() {
            return Err(PlaybackError::Missing(path.to_path_buf()));
        }
        init_ffmpeg()?;

        let input = ffmpeg_next::format::input(path)
            .map_err(|e| decode_error(path, format!("failed to open: {e}")))?;

        let (stream_index, time_base, fps, parameters) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or_else(|| decode_error(path, "no video stream found".to_string()))?;

            let tb = stream.time_base();
            let time_base = f64::from(tb.numerator()) / f64::from(tb.denominator().max(1));
            let rate = stream.avg_frame_rate();
            let fps = if rate.numerator() > 0 && rate.denominator() > 0 {
                f64::from(rate.numerator()) / f64::from(rate.denominator())
            } else {
                FALLBACK_FPS
            };
            (stream.index(), time_base, fps, stream.parameters())
        };

        let decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)
            .map_err(|e| decode_error(path, format!("failed to create codec context: {e}")))?
            .decoder()
            .video()
            .map_err(|e| decode_error(path, format!("failed to create video decoder: {e}")))?;

        let (width, height) = (decoder.width(), decoder.height());
        if width == 0 || height == 0 {
            return Err(decode_error(path, format!("invalid dimensions {width}x{height}")));
        }

        let scaler = Scaler::get(
            decoder.format(),
            width,
            height,
            Pixel::RGBA,
            width,
            height,
            Flags::BILINEAR,
        )
        .map_err(|e| decode_error(path, format!("failed to create scaler: {e}")))?;

        Ok(Self {
            path: path.to_path_buf(),
            input,
            decoder,
            scaler,
            stream_index,
            time_base,
            frame_duration: Duration::from_secs_f64(1.0 / fps),
            decoded: 0,
            draining: false,
        })
    }

    /// Decode the next frame, or `None` at the end of the stream
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, PlaybackError> {
        let mut decoded = RawFrame::empty();

        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.convert(&decoded).map(Some);
            }
            if self.draining {
                return Ok(None);
            }

            let index = self.stream_index;
            let packet = self
                .input
                .packets()
                .find_map(|(stream, packet)| (stream.index() == index).then_some(packet));

            match packet {
                Some(packet) => self
                    .decoder
                    .send_packet(&packet)
                    .map_err(|e| decode_error(&self.path, format!("bad packet: {e}")))?,
                None => {
                    self.decoder
                        .send_eof()
                        .map_err(|e| decode_error(&self.path, format!("failed to flush: {e}")))?;
                    self.draining = true;
                }
            }
        }
    }

    fn convert(&mut self, decoded: &RawFrame) -> Result<VideoFrame, PlaybackError> {
        let mut rgba = RawFrame::empty();
        self.scaler
            .run(decoded, &mut rgba)
            .map_err(|e| decode_error(&self.path, format!("failed to scale frame: {e}")))?;

        // Rows are padded to the stride
        let (width, height) = (rgba.width(), rgba.height());
        let row = width as usize * 4;
        let stride = rgba.stride(0);
        let data = rgba.data(0);
        let mut pixels = Vec::with_capacity(row * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            pixels.extend_from_slice(&data[start..start + row]);
        }

        let pts = match decoded.timestamp() {
            Some(ts) if ts >= 0 => Duration::from_secs_f64(ts as f64 * self.time_base),
            _ => self.frame_duration * self.decoded,
        };
        self.decoded += 1;

        Ok(VideoFrame {
            image: PreviewImage {
                width,
                height,
                rgba: pixels,
            },
            pts,
        })
    }
}

fn decode_error(path: &Path, reason: String) -> PlaybackError {
    PlaybackError::Decode {
        path: path.to_path_buf(),
        reason,
    }
}

/// Decode the first frame of a video, for card posters.
///
/// Fails when the file is missing or FFmpeg cannot decode it.
pub fn extract_poster(source: &Path) -> Result<VideoFrame, PlaybackError> {
    VideoSource::open(source)?
        .next_frame()?
        .ok_or_else(|| decode_error(source, "no decodable frame".to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Pause,
}

/// What a decoder thread reports back
#[derive(Debug)]
pub enum StreamEvent {
    Frame(VideoFrame),
    /// A non-looping stream played its last frame
    Ended,
    Failed(String),
}

/// Handle to a background decoder thread.
///
/// Dropping the handle stops the thread.
#[derive(Debug)]
pub struct VideoStream {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::Receiver<StreamEvent>,
}

impl VideoStream {
    /// Start a paused decoder for `source`.
    ///
    /// The first frame is decoded up front so an undecodable asset fails
    /// here rather than on the decoder thread. It is returned for display.
    pub fn open(source: &Path, looping: bool) -> Result<(Self, VideoFrame), PlaybackError> {
        let first = extract_poster(source)?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(FRAME_BUFFER);
        let path = source.to_path_buf();

        thread::Builder::new()
            .name("video-decoder".to_string())
            .spawn(move || decode_loop(path, looping, command_rx, event_tx))
            .map_err(|e| PlaybackError::Decoder(e.to_string()))?;

        Ok((
            Self {
                commands: command_tx,
                events: event_rx,
            },
            first,
        ))
    }

    pub fn play(&self) {
        self.send(Command::Play);
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::debug!("Video decoder already stopped, dropping {command:?}");
        }
    }

    /// Next pending event, without blocking
    pub fn try_next(&mut self) -> Option<StreamEvent> {
        self.events.try_recv().ok()
    }
}

/// Decoder thread body. Exits when either channel closes.
fn decode_loop(
    path: PathBuf,
    looping: bool,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::Sender<StreamEvent>,
) {
    let mut source = match VideoSource::open(&path) {
        Ok(source) => source,
        Err(err) => {
            let _ = events.blocking_send(StreamEvent::Failed(err.to_string()));
            return;
        }
    };

    let mut playing = false;
    let mut finished = false;
    // Wall-clock start and the pts it maps to
    let mut clock: Option<(Instant, Duration)> = None;

    loop {
        let command = if playing {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => return,
            }
        } else {
            match commands.blocking_recv() {
                Some(command) => Some(command),
                None => return,
            }
        };

        match command {
            Some(Command::Play) => {
                if finished {
                    match VideoSource::open(&path) {
                        Ok(reopened) => source = reopened,
                        Err(err) => {
                            let _ = events.blocking_send(StreamEvent::Failed(err.to_string()));
                            return;
                        }
                    }
                    finished = false;
                }
                playing = true;
                clock = None;
                continue;
            }
            Some(Command::Pause) => {
                playing = false;
                continue;
            }
            None => {}
        }

        match source.next_frame() {
            Ok(Some(frame)) => {
                let (started, origin) = *clock.get_or_insert((Instant::now(), frame.pts));
                let due = started + frame.pts.saturating_sub(origin);
                if let Some(wait) = due.checked_duration_since(Instant::now()) {
                    thread::sleep(wait);
                }
                if events.blocking_send(StreamEvent::Frame(frame)).is_err() {
                    return;
                }
            }
            Ok(None) if looping => match VideoSource::open(&path) {
                Ok(reopened) => {
                    source = reopened;
                    clock = None;
                }
                Err(err) => {
                    let _ = events.blocking_send(StreamEvent::Failed(err.to_string()));
                    return;
                }
            },
            Ok(None) => {
                playing = false;
                finished = true;
                if events.blocking_send(StreamEvent::Ended).is_err() {
                    return;
                }
            }
            Err(err) => {
                log::warn!("Decoding {} failed: {err}", path.display());
                let _ = events.blocking_send(StreamEvent::Failed(err.to_string()));
                return;
            }
        }
    }
}

/// Write a small YUV4MPEG2 clip (16x16, 10 fps) for tests
#[cfg(test)]
pub(crate) fn write_clip(path: &Path, frames: u8) {
    let mut bytes = b"YUV4MPEG2 W16 H16 F10:1 Ip A1:1 C420jpeg\n".to_vec();
    for n in 0..frames {
        bytes.extend_from_slice(b"FRAME\n");
        bytes.extend(std::iter::repeat(n.wrapping_mul(40)).take(16 * 16));
        bytes.extend(std::iter::repeat(128).take(2 * 8 * 8));
    }
    std::fs::write(path, bytes).unwrap();
}
