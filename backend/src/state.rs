use std::path::{Path, PathBuf};

use anyhow::Result;
use pressroom_shared::ArticleStore;

/// Shared application state handed to every handler. The store handle is
/// injected here rather than reached through any global accessor.
#[derive(Clone)]
pub struct AppState {
    store: ArticleStore,
    upload_dir: PathBuf,
    max_upload_bytes: u64,
}

impl AppState {
    pub async fn new(data_dir: &str, upload_dir: &str, max_upload_bytes: u64) -> Result<Self> {
        let store = ArticleStore::open(data_dir).await?;
        tokio::fs::create_dir_all(upload_dir).await?;

        Ok(Self {
            store,
            upload_dir: PathBuf::from(upload_dir),
            max_upload_bytes,
        })
    }

    /// State over an already-open store, for tests.
    #[cfg(test)]
    pub fn with_store(store: ArticleStore, upload_dir: PathBuf, max_upload_bytes: u64) -> Self {
        Self {
            store,
            upload_dir,
            max_upload_bytes,
        }
    }

    pub fn store(&self) -> &ArticleStore {
        &self.store
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub async fn article_count(&self) -> usize {
        self.store.len().await
    }
}
