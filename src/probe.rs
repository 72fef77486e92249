use std::sync::LazyLock;

use regex::Regex;

use crate::error::CapshotError;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duration: (\d+):(\d{2}):(\d{2})\.(\d+)").expect("invalid duration pattern")
});

static ASPECT_RATIO_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DAR (\d+):(\d+)").expect("invalid aspect ratio pattern"));

/// Clip length as reported in the probe banner, rounded up to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Duration {
    pub(crate) hours: u32,
    pub(crate) minutes: u32,
    pub(crate) seconds: u32,
}

/// Display aspect ratio of the video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AspectRatio {
    pub(crate) x: u32,
    pub(crate) y: u32,
}

impl AspectRatio {
    pub(crate) fn ratio(&self) -> f64 {
        f64::from(self.x) / f64::from(self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VideoMetadata {
    pub(crate) duration: Duration,
    pub(crate) aspect_ratio: AspectRatio,
}

/// Extract duration and aspect ratio from a probe report.
pub(crate) fn parse_metadata(report: &str) -> Result<VideoMetadata, CapshotError> {
    Ok(VideoMetadata {
        duration: parse_duration(report)?,
        aspect_ratio: parse_aspect_ratio(report)?,
    })
}

pub(crate) fn parse_duration(report: &str) -> Result<Duration, CapshotError> {
    let captures = DURATION_PATTERN
        .captures(report)
        .ok_or(CapshotError::MissingField("Duration"))?;
    let hours = captures[1].parse::<u32>()?;
    let minutes = captures[2].parse::<u32>()?;
    let mut seconds = captures[3].parse::<u32>()?;
    // Round the fractional part up without going through floats.
    if captures[4].bytes().any(|digit| digit != b'0') {
        seconds += 1;
    }
    Ok(Duration {
        hours,
        minutes,
        seconds,
    })
}

pub(crate) fn parse_aspect_ratio(report: &str) -> Result<AspectRatio, CapshotError> {
    let captures = ASPECT_RATIO_PATTERN
        .captures(report)
        .ok_or(CapshotError::MissingField("DAR"))?;
    let x = captures[1].parse::<u32>()?;
    let y = captures[2].parse::<u32>()?;
    if x == 0 || y == 0 {
        return Err(CapshotError::InvalidAspectRatio(format!("{x}:{y}")));
    }
    Ok(AspectRatio { x, y })
}
