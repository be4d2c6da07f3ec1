use anyhow::Context;

use branches_infra::{config::Config, store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    branches_observability::init();

    let config = Config::from_env().context("invalid configuration")?;

    let connector = store::connect(&config)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "failed connecting to database"))
        .context("failed connecting to database")?;

    let app = branches_api::app::build_app(connector);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
