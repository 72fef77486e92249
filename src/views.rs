use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::info;

use crate::{
    AppState,
    event::Notification,
    pipeline::{JobOutcome, run_job},
};

// Notification view

#[derive(Serialize)]
pub(crate) struct NotifyResponse {
    pub(crate) jobs: Vec<JobOutcome>,
}

/// Accept a bucket notification and process every record in it. The response
/// is always 200 once the payload deserializes; per-job problems live in the
/// outcome records, not in the status code.
#[axum::debug_handler]
pub(crate) async fn notify(
    State(AppState { config, storage }): State<AppState>,
    Json(notification): Json<Notification>,
) -> impl IntoResponse {
    let mut jobs = Vec::new();
    for record in notification.records {
        info!(
            event = %record.event_name,
            time = ?record.event_time,
            size = ?record.s3.object.size,
            "received bucket notification"
        );
        let job = record.into_job();
        jobs.push(run_job(&config, storage.as_ref(), &job).await);
    }
    Json(NotifyResponse { jobs })
}

// Health view

pub(crate) async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
