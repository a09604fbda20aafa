use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::upstream::VideoPlatform;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub platform: Arc<dyn VideoPlatform>,
}

impl AppState {
    pub fn new(config: Config, platform: Arc<dyn VideoPlatform>) -> Self {
        Self {
            config: Arc::new(config),
            platform,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/api/video", get(crate::api::get_video))
        .route("/api/search", get(crate::api::search))
        .route("/api/comments", get(crate::api::get_comments))
        .route("/api/channel", get(crate::api::get_channel))
        .route("/api/channel-shorts", get(crate::api::get_channel_shorts))
        .route(
            "/api/channel-playlists",
            get(crate::api::get_channel_playlists),
        )
        .route("/api/playlist", get(crate::api::get_playlist))
        .route("/api/fvideo", get(crate::api::get_featured));

    let mut router = Router::new().merge(api_routes).fallback(fallback_handler);

    if let Some(ref appdir) = state.config.appdir {
        // Unknown paths get the single page app's index so client-side routes work.
        let index = PathBuf::from(appdir).join("index.html");
        router = router.fallback_service(ServeDir::new(appdir).fallback(ServeFile::new(index)));
    }

    router
        .layer(axum::middleware::from_fn(crate::middleware::add_cors_headers))
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback_handler() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}
