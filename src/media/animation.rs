//! Animated GIF decoding

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::error::PreviewError;
use crate::state::data::{AnimationFrame, PreviewImage};

/// Delays at or under this are treated as unset, the way browsers do
const MIN_DELAY: Duration = Duration::from_millis(10);
const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// Decode every frame of a GIF, composited, with its display delay
pub fn decode_frames(source: &Path) -> Result<Vec<AnimationFrame>, PreviewError> {
    let decode_error = |reason: String| PreviewError::Decode {
        path: source.display().to_string(),
        reason,
    };

    let file = File::open(source).map_err(|e| decode_error(e.to_string()))?;
    let decoder = GifDecoder::new(BufReader::new(file)).map_err(|e| decode_error(e.to_string()))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| decode_error(e.to_string()))?;

    if frames.is_empty() {
        return Err(decode_error("no frames".to_string()));
    }

    Ok(frames
        .into_iter()
        .map(|frame| {
            let delay = Duration::from(frame.delay());
            let buffer = frame.into_buffer();
            AnimationFrame {
                image: PreviewImage {
                    width: buffer.width(),
                    height: buffer.height(),
                    rgba: buffer.into_raw(),
                },
                delay: if delay <= MIN_DELAY { DEFAULT_DELAY } else { delay },
            }
        })
        .collect())
}

/// Write a GIF with one solid frame per color, `delay_ms` apart
#[cfg(test)]
pub(crate) fn write_gif(path: &Path, colors: &[[u8; 4]], delay_ms: u32) {
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Frame, Rgba, RgbaImage};

    let mut encoder = GifEncoder::new(File::create(path).unwrap());
    encoder.set_repeat(Repeat::Infinite).unwrap();
    encoder
        .encode_frames(colors.iter().map(|&color| {
            Frame::from_parts(
                RgbaImage::from_pixel(8, 8, Rgba(color)),
                0,
                0,
                Delay::from_numer_denom_ms(delay_ms, 1),
            )
        }))
        .unwrap();
}
