use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::{handlers, request_context, state::AppState, upload};

/// Extra headroom over the per-file cap for multipart framing and form
/// fields.
const BODY_LIMIT_OVERHEAD: u64 = 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(state.upload_dir());
    let body_limit = (state.max_upload_bytes() + BODY_LIMIT_OVERHEAD) as usize;

    Router::new()
        .route(
            "/api/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route(
            "/api/articles/:id",
            get(handlers::get_article).put(handlers::update_article),
        )
        .route("/api/articles/:id/interact", post(handlers::article_interaction))
        .route("/api/upload", post(upload::upload_files))
        .nest_service("/static/uploads", uploads)
        .with_state(state)
        .layer(middleware::from_fn(request_context::request_context_middleware))
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
}
