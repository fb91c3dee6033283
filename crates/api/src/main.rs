use anyhow::Context;

use imfo_infra::{AppConfig, Collaborators};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    imfo_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let collaborators =
        Collaborators::from_config(&config).context("failed to build backend collaborators")?;
    tracing::info!(
        api_url = %config.api_url,
        collaborators = ?config.collaborators,
        "collaborators ready"
    );

    let services =
        imfo_api::app::services::AppServices::start(collaborators, config.session_idle_ttl);
    let app = imfo_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
