use std::net::{IpAddr, SocketAddr};

use fairgroup_core::FairGroupConfig;
use tracing::info;

pub async fn run(
    config: FairGroupConfig,
    port: Option<u16>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let port = port.unwrap_or_else(|| config.port());
    let bind = bind.unwrap_or_else(|| config.bind().to_string());
    let ip: IpAddr = bind.parse()?;
    let addr = SocketAddr::from((ip, port));

    let range = config.grade_range();
    info!(
        min_grade = range.min,
        max_grade = range.max,
        max_rounds = config.max_rounds(),
        origins = ?config.allowed_origins(),
        "FairGroup daemon starting"
    );

    let router = fairgroup_api::build_router(&config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
        })
        .await?;

    info!("FairGroup daemon stopped");
    Ok(())
}
