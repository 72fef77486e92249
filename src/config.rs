use std::env;
use std::path::PathBuf;

pub(crate) const BIND_ADDRESS_KEY: &str = "CAPSHOT_BIND";
pub(crate) const OUTPUT_BUCKET_KEY: &str = "CAPSHOT_OUTPUT_BUCKET";
pub(crate) const FFPROBE_PATH_KEY: &str = "CAPSHOT_FFPROBE";
pub(crate) const FFMPEG_PATH_KEY: &str = "CAPSHOT_FFMPEG";
pub(crate) const WORK_DIR_KEY: &str = "CAPSHOT_WORK_DIR";

/// Runtime configuration, read from the environment with workable defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub output_bucket: String,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    /// Directory that holds the per-job scratch directories.
    pub work_root: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var(BIND_ADDRESS_KEY).unwrap_or_else(|_| "0.0.0.0:3000".to_owned()),
            output_bucket: env::var(OUTPUT_BUCKET_KEY)
                .unwrap_or_else(|_| "video-post-process".to_owned()),
            ffprobe_path: env::var(FFPROBE_PATH_KEY).unwrap_or_else(|_| "ffprobe".to_owned()),
            ffmpeg_path: env::var(FFMPEG_PATH_KEY).unwrap_or_else(|_| "ffmpeg".to_owned()),
            work_root: env::var(WORK_DIR_KEY)
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
        }
    }
}
