mod routes;
mod settings;
mod state;
mod upload;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::settings::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    init_tracing(&settings.logging.level);

    let state = AppState::new(&settings).context("Invalid calendar settings")?;
    state.uploads.ensure_dir().await?;

    let zone = state.calendar.zone();
    info!(
        tzid = zone.tzid(),
        uploads = %state.uploads.dir().display(),
        public_url = %settings.server.public_url(),
        "Starting talkcal-server"
    );

    let app = routes::app(state, settings.uploads.max_bytes);

    let addr = settings.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("talkcal-server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
