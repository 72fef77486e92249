pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod event;
pub(crate) mod geometry;
pub(crate) mod pipeline;
pub(crate) mod probe;
pub(crate) mod process;
pub(crate) mod storage;
pub(crate) mod video;
pub(crate) mod views;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::fs;
use tower_http::trace::TraceLayer;

pub use crate::config::AppConfig;
pub use crate::error::CapshotError;
pub use crate::storage::{ObjectStorage, S3Storage};
use crate::views::{healthz, notify};

#[derive(Clone)]
pub(crate) struct AppState {
    config: Arc<AppConfig>,
    storage: Arc<dyn ObjectStorage>,
}

pub async fn get_router(
    config: AppConfig,
    storage: Arc<dyn ObjectStorage>,
) -> Result<Router, CapshotError> {
    fs::create_dir_all(&config.work_root).await?;
    let state = AppState {
        config: Arc::new(config),
        storage,
    };
    Ok(Router::new()
        .route("/notify", post(notify))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
