use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::CapshotError;
use crate::geometry::{bounded_size, midpoint_seconds};
use crate::pipeline::{SizeProfile, THUMBNAIL_EXTENSION};
use crate::probe::{VideoMetadata, parse_metadata};
use crate::process::{RunOptions, run};

/// Probe a local video file and parse its metadata report.
pub(crate) async fn probe_video(
    config: &AppConfig,
    input: &Path,
) -> Result<VideoMetadata, CapshotError> {
    let input_arg = input.to_string_lossy();
    let output = run(&config.ffprobe_path, &[&input_arg], RunOptions::default()).await?;
    // The probe tool writes its report to stderr, not stdout.
    parse_metadata(&output.stderr)
}

/// Extract a single frame at the clip's midpoint, scaled for `profile`, into
/// `work_dir`.
pub(crate) async fn extract_frame(
    config: &AppConfig,
    metadata: &VideoMetadata,
    profile: &SizeProfile,
    input: &Path,
    work_dir: &Path,
) -> Result<PathBuf, CapshotError> {
    let output_file = work_dir.join(format!("{}{}", profile.label, THUMBNAIL_EXTENSION));
    let midpoint_arg = midpoint_seconds(&metadata.duration).to_string();
    let size_arg = bounded_size(metadata.aspect_ratio, profile.max_width, profile.max_height)
        .to_string();
    let input_arg = input.to_string_lossy();
    let output_arg = output_file.to_string_lossy();
    run(
        &config.ffmpeg_path,
        &[
            "-loglevel",
            "error",
            "-y",
            "-ss",
            &midpoint_arg,
            "-i",
            &input_arg,
            "-s",
            &size_arg,
            "-frames:v",
            "1",
            &output_arg,
        ],
        RunOptions {
            current_dir: Some(work_dir.to_path_buf()),
            ..RunOptions::default()
        },
    )
    .await?;
    Ok(output_file)
}
