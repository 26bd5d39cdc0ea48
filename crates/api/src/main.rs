use anyhow::Context;

use userdesk_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    userdesk_observability::init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();

    let app = userdesk_api::app::build_app_from_config(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
