use std::fmt::{self, Display};

use crate::probe::{AspectRatio, Duration};

/// Frame size in pixels, formatted as `WIDTHxHEIGHT` for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Dimensions {
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Seek offset in seconds for the frame at the middle of the clip.
pub(crate) fn midpoint_seconds(duration: &Duration) -> f64 {
    let total = u64::from(duration.hours) * 3600
        + u64::from(duration.minutes) * 60
        + u64::from(duration.seconds);
    total as f64 / 2.0
}

/// Fit a frame of the given aspect ratio into a bounding box.
///
/// Landscape frames pin the width and shrink the height; everything else pins
/// the height and derives the width from the ratio. Degenerate ratios are
/// clamped so neither side ever reaches zero.
pub(crate) fn bounded_size(
    aspect_ratio: AspectRatio,
    max_width: u32,
    max_height: u32,
) -> Dimensions {
    let ratio = aspect_ratio.ratio();
    let (width, height) = if ratio > 1.0 {
        (max_width, (f64::from(max_height) / ratio).floor() as u32)
    } else {
        ((f64::from(max_width) / ratio).floor() as u32, max_height)
    };
    Dimensions {
        width: width.max(1),
        height: height.max(1),
    }
}
