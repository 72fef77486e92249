use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::error::CapshotError;
use crate::probe::VideoMetadata;
use crate::storage::ObjectStorage;
use crate::video::{extract_frame, probe_video};

pub(crate) const THUMBNAIL_EXTENSION: &str = ".jpg";
const MIME_TYPE: &str = "image";

/// A bounding box one thumbnail must fit into.
#[derive(Debug)]
pub(crate) struct SizeProfile {
    pub(crate) label: &'static str,
    pub(crate) max_width: u32,
    pub(crate) max_height: u32,
}

/// The thumbnails derived from every source video, in processing order.
pub(crate) const SIZE_PROFILES: [SizeProfile; 2] = [
    SizeProfile {
        label: "thumbnail-big",
        max_width: 400,
        max_height: 400,
    },
    SizeProfile {
        label: "thumbnail-small",
        max_width: 250,
        max_height: 250,
    },
];

/// One video to process, lifted out of a bucket notification record.
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub(crate) input_bucket: String,
    pub(crate) input_key: String,
    pub(crate) request_id: String,
}

/// Pipeline stage names as they appear in outcome records and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Stage {
    #[strum(serialize = "fetch")]
    Fetch,
    #[strum(serialize = "probe")]
    Probe,
    #[strum(serialize = "parse")]
    Parse,
    #[strum(serialize = "encode")]
    Encode,
    #[strum(serialize = "store")]
    Store,
}

#[derive(Debug, Serialize)]
pub(crate) struct StageFailure {
    pub(crate) stage: Stage,
    pub(crate) error: String,
}

impl StageFailure {
    fn new(stage: Stage, error: &CapshotError) -> Self {
        Self {
            stage,
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ThumbnailOutcome {
    pub(crate) profile: &'static str,
    pub(crate) output_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) failure: Option<StageFailure>,
}

/// Everything that happened while processing one job. Failures are recorded
/// here instead of bubbling out; the caller decides what to do with them.
#[derive(Debug, Serialize)]
pub(crate) struct JobOutcome {
    pub(crate) request_id: String,
    pub(crate) input_bucket: String,
    pub(crate) input_key: String,
    /// Set when the job died before any thumbnail could be attempted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) failure: Option<StageFailure>,
    pub(crate) thumbnails: Vec<ThumbnailOutcome>,
}

/// Process one job: fetch the source once, probe it once, then derive every
/// size profile from the same metadata. A failing profile never blocks the
/// remaining ones, and the source object is only ever read.
pub(crate) async fn run_job(
    config: &AppConfig,
    storage: &dyn ObjectStorage,
    job: &Job,
) -> JobOutcome {
    info!(
        request_id = %job.request_id,
        bucket = %job.input_bucket,
        key = %job.input_key,
        "processing video"
    );

    let work_dir = config.work_root.join(&job.request_id);
    let (failure, thumbnails) = match prepare_source(config, storage, job, &work_dir).await {
        Ok((input_file, metadata)) => {
            let thumbnails =
                process_profiles(config, storage, job, &metadata, &input_file, &work_dir).await;
            (None, thumbnails)
        }
        Err(failure) => {
            error!(
                request_id = %job.request_id,
                stage = %failure.stage,
                error = %failure.error,
                "job aborted"
            );
            (Some(failure), Vec::new())
        }
    };

    if let Err(err) = fs::remove_dir_all(&work_dir).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(
                request_id = %job.request_id,
                error = %err,
                "failed to clean up work directory"
            );
        }
    }

    JobOutcome {
        request_id: job.request_id.clone(),
        input_bucket: job.input_bucket.clone(),
        input_key: job.input_key.clone(),
        failure,
        thumbnails,
    }
}

async fn process_profiles(
    config: &AppConfig,
    storage: &dyn ObjectStorage,
    job: &Job,
    metadata: &VideoMetadata,
    input_file: &Path,
    work_dir: &Path,
) -> Vec<ThumbnailOutcome> {
    let mut thumbnails = Vec::with_capacity(SIZE_PROFILES.len());
    for profile in &SIZE_PROFILES {
        let outcome =
            process_profile(config, storage, job, profile, metadata, input_file, work_dir).await;
        thumbnails.push(outcome);
    }
    thumbnails
}

/// Materialize the source video in the scratch directory and probe it.
async fn prepare_source(
    config: &AppConfig,
    storage: &dyn ObjectStorage,
    job: &Job,
    work_dir: &Path,
) -> Result<(PathBuf, VideoMetadata), StageFailure> {
    fs::create_dir_all(work_dir)
        .await
        .map_err(|err| StageFailure::new(Stage::Fetch, &CapshotError::IO(err)))?;
    let input_file = work_dir.join(source_file_name(&job.input_key, &job.request_id));
    storage
        .fetch(&job.input_bucket, &job.input_key, &input_file)
        .await
        .map_err(|err| StageFailure::new(Stage::Fetch, &err))?;
    let metadata = probe_video(config, &input_file)
        .await
        .map_err(|err| StageFailure::new(probe_stage(&err), &err))?;
    Ok((input_file, metadata))
}

async fn process_profile(
    config: &AppConfig,
    storage: &dyn ObjectStorage,
    job: &Job,
    profile: &SizeProfile,
    metadata: &VideoMetadata,
    input_file: &Path,
    work_dir: &Path,
) -> ThumbnailOutcome {
    let output_key = output_key(&job.input_key, profile.label);
    let failure = match extract_frame(config, metadata, profile, input_file, work_dir).await {
        Ok(frame_file) => match storage
            .store(&config.output_bucket, &output_key, &frame_file, MIME_TYPE)
            .await
        {
            Ok(()) => None,
            Err(err) => Some(StageFailure::new(Stage::Store, &err)),
        },
        Err(err) => Some(StageFailure::new(Stage::Encode, &err)),
    };
    match &failure {
        None => info!(
            request_id = %job.request_id,
            profile = profile.label,
            key = %output_key,
            "thumbnail stored"
        ),
        Some(failure) => error!(
            request_id = %job.request_id,
            profile = profile.label,
            stage = %failure.stage,
            error = %failure.error,
            "thumbnail failed"
        ),
    }
    ThumbnailOutcome {
        profile: profile.label,
        output_key,
        failure,
    }
}

/// A probe run can fail running the tool or reading its report; the outcome
/// records which one it was.
fn probe_stage(error: &CapshotError) -> Stage {
    match error {
        CapshotError::MissingField(_)
        | CapshotError::InvalidAspectRatio(_)
        | CapshotError::IntConversion(_) => Stage::Parse,
        _ => Stage::Probe,
    }
}

/// Local file name for the fetched source: request id plus the key's original
/// extension, if it has one.
fn source_file_name(input_key: &str, request_id: &str) -> String {
    match key_extension(input_key) {
        Some(extension) => format!("{request_id}.{extension}"),
        None => request_id.to_string(),
    }
}

/// Extension of the key's final path segment.
fn key_extension(key: &str) -> Option<&str> {
    let name = key.rsplit('/').next().unwrap_or(key);
    Path::new(name).extension().and_then(|extension| extension.to_str())
}

/// Output key for a profile: the input key with its extension replaced by
/// `-{label}.jpg`, keeping any prefix path intact.
pub(crate) fn output_key(input_key: &str, label: &str) -> String {
    let stem_end = match key_extension(input_key) {
        Some(extension) => input_key.len() - extension.len() - 1,
        None => input_key.len(),
    };
    format!(
        "{}-{}{}",
        &input_key[..stem_end],
        label,
        THUMBNAIL_EXTENSION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_key_replaces_the_extension() {
        assert_eq!(
            output_key("clip.mp4", "thumbnail-big"),
            "clip-thumbnail-big.jpg"
        );
        assert_eq!(
            output_key("clip.mp4", "thumbnail-small"),
            "clip-thumbnail-small.jpg"
        );
    }

    #[test]
    fn output_key_keeps_prefix_paths() {
        assert_eq!(
            output_key("uploads/2024/clip.mov", "thumbnail-big"),
            "uploads/2024/clip-thumbnail-big.jpg"
        );
    }

    #[test]
    fn output_key_only_drops_the_last_extension() {
        assert_eq!(
            output_key("clip.backup.mp4", "thumbnail-small"),
            "clip.backup-thumbnail-small.jpg"
        );
    }

    #[test]
    fn output_key_appends_when_there_is_no_extension() {
        assert_eq!(output_key("clip", "thumbnail-big"), "clip-thumbnail-big.jpg");
    }

    #[test]
    fn output_key_ignores_dots_in_directories() {
        assert_eq!(
            output_key("v1.2/clip", "thumbnail-big"),
            "v1.2/clip-thumbnail-big.jpg"
        );
    }

    #[test]
    fn source_file_name_carries_the_extension() {
        assert_eq!(source_file_name("clip.mp4", "a1b2c3d4"), "a1b2c3d4.mp4");
        assert_eq!(source_file_name("uploads/clip.webm", "a1b2c3d4"), "a1b2c3d4.webm");
    }

    #[test]
    fn source_file_name_without_extension_is_the_request_id() {
        assert_eq!(source_file_name("clip", "a1b2c3d4"), "a1b2c3d4");
        assert_eq!(source_file_name(".hidden", "a1b2c3d4"), "a1b2c3d4");
    }

    #[test]
    fn parse_failures_map_to_the_parse_stage() {
        assert_eq!(
            probe_stage(&CapshotError::MissingField("Duration")),
            Stage::Parse
        );
        assert_eq!(
            probe_stage(&CapshotError::Process {
                command: "ffprobe".to_string(),
                status: "1".to_string(),
            }),
            Stage::Probe
        );
    }
}
