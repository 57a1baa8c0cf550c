//! Frame cycling for animated pictures

use iced::widget::image::Handle;
use std::time::Duration;

use super::data::AnimationFrame;

/// Decoded frames of a GIF and the one currently up.
///
/// Empty until the frames arrive from the preview worker; the view shows
/// the file itself in the meantime.
#[derive(Debug, Clone, Default)]
pub struct Animation {
    frames: Vec<(Handle, Duration)>,
    current: usize,
    elapsed: Duration,
}

impl Animation {
    pub fn new(frames: Vec<AnimationFrame>) -> Self {
        Self {
            frames: frames
                .into_iter()
                .map(|f| (Handle::from_rgba(f.image.width, f.image.height, f.image.rgba), f.delay))
                .collect(),
            current: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn frame(&self) -> Option<&Handle> {
        self.frames.get(self.current).map(|(handle, _)| handle)
    }

    #[cfg(test)]
    pub fn current(&self) -> usize {
        self.current
    }

    /// More than one frame to cycle through
    pub fn is_animating(&self) -> bool {
        self.frames.len() > 1
    }

    /// Move the clock forward, wrapping past the last frame
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.is_animating() {
            return;
        }

        self.elapsed += elapsed;
        while let Some(&(_, delay)) = self.frames.get(self.current) {
            if delay.is_zero() || self.elapsed < delay {
                break;
            }
            self.elapsed -= delay;
            self.current = (self.current + 1) % self.frames.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::PreviewImage;

    fn frames(delays_ms: &[u64]) -> Vec<AnimationFrame> {
        delays_ms
            .iter()
            .map(|&ms| AnimationFrame {
                image: PreviewImage {
                    width: 1,
                    height: 1,
                    rgba: vec![0, 0, 0, 255],
                },
                delay: Duration::from_millis(ms),
            })
            .collect()
    }

    #[test]
    fn test_advances_by_frame_delay_and_wraps() {
        let mut animation = Animation::new(frames(&[100, 50, 100]));
        assert_eq!(animation.current(), 0);

        animation.advance(Duration::from_millis(60));
        assert_eq!(animation.current(), 0);
        animation.advance(Duration::from_millis(60));
        assert_eq!(animation.current(), 1);

        // 20ms carried over, 50 for frame 1, 100 for frame 2
        animation.advance(Duration::from_millis(130));
        assert_eq!(animation.current(), 0);
    }

    #[test]
    fn test_single_frame_never_moves() {
        let mut animation = Animation::new(frames(&[100]));
        animation.advance(Duration::from_secs(5));
        assert_eq!(animation.current(), 0);
        assert!(!animation.is_animating());
        assert!(animation.frame().is_some());
    }

    #[test]
    fn test_empty_has_no_frame() {
        let mut animation = Animation::default();
        animation.advance(Duration::from_secs(1));
        assert!(animation.frame().is_none());
    }
}
