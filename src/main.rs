use std::sync::Arc;

use capshot::{AppConfig, S3Storage, get_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capshot=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    let bind_address = config.bind_address.clone();
    let sdk_config = aws_config::load_from_env().await;
    let storage = Arc::new(S3Storage::new(aws_sdk_s3::Client::new(&sdk_config)));
    let app = get_router(config, storage)
        .await
        .expect("Unable to start router");
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("Unable to listen to port");
    tracing::info!("Listening on http://{bind_address}");
    axum::serve(listener, app).await.unwrap();
}
