use std::env;

use anyhow::Result;
use boussole_api::{build_app_with_config, ApiConfig};
use boussole_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("boussole_api");

    let config = ApiConfig::from_env();
    let bind = env::var("BOUSSOLE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let lexicon = config
        .lexicon_path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());

    let app = build_app_with_config(config)?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, lexicon = %lexicon, "boussole search router started");

    axum::serve(listener, app).await?;
    Ok(())
}
