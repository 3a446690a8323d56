use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use collage::builder::CollageBuilder;
use collage::config::AppConfig;
use collage::covers::{CoverFetcher, Placeholder};
use collage::fetch::{HttpFetch, ImageCrateDecoder, ReqwestFetcher};
use collage::grid::{LabelFont, CELL_SIZE};
use collage::lastfm::LastFmClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables if .env exists
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let http: Arc<dyn HttpFetch> = Arc::new(
        ReqwestFetcher::new(config.fetch_timeout).context("Failed to build HTTP client")?,
    );

    let placeholder = match &config.placeholder_path {
        Some(path) => {
            tracing::info!("Loading placeholder cover from {}", path.display());
            Placeholder::from_file(path, CELL_SIZE)
                .with_context(|| format!("Failed to load placeholder {}", path.display()))?
        }
        None => Placeholder::generated(CELL_SIZE),
    };

    let lastfm = LastFmClient::new(config.lastfm_api_key.clone(), Arc::clone(&http))
        .with_api_url(config.lastfm_api_url.clone());
    let covers = CoverFetcher::new(http, Arc::new(ImageCrateDecoder), placeholder)
        .with_timeout(config.fetch_timeout)
        .with_max_concurrent(config.max_concurrent_fetches);

    let builder = CollageBuilder::new(lastfm, covers)
        .with_failure_policy(config.cover_failure_policy)
        .with_font(load_label_font(config.font_path.as_deref())?);

    let app = collage::api::create_router(Arc::new(builder));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_label_font(path: Option<&Path>) -> Result<LabelFont> {
    if let Some(path) = path {
        match LabelFont::from_file(path) {
            Ok(font) => {
                tracing::info!("Loaded label font {}", path.display());
                return Ok(font);
            }
            Err(e) => tracing::warn!("{}; falling back to the bundled label font", e),
        }
    }

    LabelFont::bundled().context("Bundled label font is unreadable")
}
