use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use clap::Parser;
use tokio::net::TcpListener;

use nsfw_check::config::ServerConfig;
use nsfw_check::logging;
use nsfw_check::server::{self, AppState, CheckSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    logging::init(config.log_json);
    tracing::info!("Starting NSFW check server with config: {:?}", config);

    if !config.model_path.is_file() {
        tracing::warn!(
            model_path = %config.model_path.display(),
            "Model file not found; checks will fail open until it exists"
        );
    }

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = server::router(AppState::new(CheckSettings::from(&config)))
        .route("/metrics", get(|| async move { metric_handle.render() }))
        .layer(prometheus_layer);

    let listener = TcpListener::bind(&config.server_address()).await?;
    tracing::info!("Server running on http://{}", config.server_address());

    axum::serve(listener, app).await?;
    Ok(())
}
