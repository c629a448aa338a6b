mod handlers;
mod listing;
mod request_context;
mod routes;
mod state;
#[cfg(test)]
mod test_support;
mod upload;

use std::env;

use anyhow::Result;

const DEFAULT_MAX_UPLOAD_MB: u64 = 16;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "./data/articles".to_string());
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./data/uploads".to_string());
    let max_upload_mb = env::var("MAX_UPLOAD_MB")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

    tracing::info!("Starting Pressroom backend server");
    tracing::info!("Data directory: {}", data_dir);
    tracing::info!("Upload directory: {}", upload_dir);

    let app_state =
        state::AppState::new(&data_dir, &upload_dir, max_upload_mb * 1024 * 1024).await?;
    tracing::info!("Loaded {} articles", app_state.article_count().await);

    let app = routes::create_router(app_state);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
    let addr = format!("{}:{}", bind_addr, port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
