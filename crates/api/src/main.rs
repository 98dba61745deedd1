use anyhow::Context;

use bazaar_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    bazaar_observability::init(config.log_format);

    tracing::info!(
        platform_fee = config.services.platform_fee.amount(),
        status_policy = ?config.services.status_policy,
        "starting bazaar api"
    );

    let app = bazaar_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
