use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use photo_album::{
    album::PhotoAlbum,
    api::HttpPhotoApi,
    config::AlbumConfig,
    telemetry,
    web_pages,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_telemetry()?;

    let config = AlbumConfig::from_env()?;
    let api = HttpPhotoApi::new(&config)?;
    let album = Arc::new(PhotoAlbum::new(Arc::new(api), &config));
    let router = web_pages::router(album, &config.static_dir);

    let bind_address = config.bind_address();
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!(
        address = %bind_address,
        api = %config.api_base_url,
        bucket = %config.bucket,
        "photo album started"
    );

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
