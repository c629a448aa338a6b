//! Document store for articles: one JSON document per article under a data
//! directory, loaded into memory at open and rewritten on mutation.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    article::Article,
    query::{Predicate, SortSpec},
};

/// Tags and topics facets are truncated to this many values.
pub const FACET_VALUE_LIMIT: usize = 20;

/// Slug used when a title produces an empty slug.
const FALLBACK_SLUG: &str = "article";

/// Grouped count for one facet value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub name: String,
    pub count: u64,
}

/// Grouped counts over the filtered subset, for filter UI affordances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetSummary {
    pub categories: Vec<FacetCount>,
    pub tags: Vec<FacetCount>,
    pub topics: Vec<FacetCount>,
    pub authors: Vec<FacetCount>,
}

/// Article document store. Clones share the same in-memory set; the handle
/// is injected into handlers through the application state.
#[derive(Clone)]
pub struct ArticleStore {
    root: PathBuf,
    articles: Arc<RwLock<HashMap<String, Article>>>,
}

impl ArticleStore {
    /// Open a store rooted at `root`, loading every `*.json` document.
    /// Unreadable documents are skipped with a warning rather than failing
    /// the whole startup.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to create data dir {}", root.display()))?;

        let mut articles = HashMap::new();
        let mut entries = tokio::fs::read_dir(&root)
            .await
            .with_context(|| format!("failed to read data dir {}", root.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match load_document(&path).await {
                Ok(article) => {
                    articles.insert(article.id.clone(), article);
                },
                Err(err) => {
                    tracing::warn!("skipping unreadable document {}: {err:#}", path.display());
                },
            }
        }

        Ok(Self {
            root,
            articles: Arc::new(RwLock::new(articles)),
        })
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }

    /// Insert a new article. The slug must be unique; run the base slug
    /// through [`ArticleStore::ensure_unique_slug`] first. The uniqueness
    /// check and the insert happen under one write lock, so concurrent
    /// inserts of the same slug cannot both succeed.
    pub async fn insert(&self, article: Article) -> Result<Article> {
        let mut articles = self.articles.write().await;
        if articles.values().any(|existing| existing.slug == article.slug) {
            bail!("slug already in use: {}", article.slug);
        }
        self.persist(&article).await?;
        articles.insert(article.id.clone(), article.clone());
        Ok(article)
    }

    pub async fn get(&self, id: &str) -> Option<Article> {
        self.articles.read().await.get(id).cloned()
    }

    pub async fn get_by_slug(&self, slug: &str) -> Option<Article> {
        self.articles
            .read()
            .await
            .values()
            .find(|article| article.slug == slug)
            .cloned()
    }

    pub async fn slug_exists(&self, slug: &str) -> bool {
        self.articles.read().await.values().any(|article| article.slug == slug)
    }

    /// Resolve a base slug to a free one by suffixing an incrementing
    /// counter: `hello-world`, `hello-world-1`, `hello-world-2`, ...
    pub async fn ensure_unique_slug(&self, base_slug: &str) -> String {
        let base = if base_slug.is_empty() { FALLBACK_SLUG } else { base_slug };
        if !self.slug_exists(base).await {
            return base.to_string();
        }
        let mut counter = 1u64;
        loop {
            let candidate = format!("{base}-{counter}");
            if !self.slug_exists(&candidate).await {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Apply `mutate` to the stored article and persist the result. Returns
    /// `Ok(None)` when the id is unknown.
    pub async fn update<F>(&self, id: &str, mutate: F) -> Result<Option<Article>>
    where
        F: FnOnce(&mut Article),
    {
        let updated = {
            let mut articles = self.articles.write().await;
            let Some(article) = articles.get_mut(id) else {
                return Ok(None);
            };
            mutate(article);
            article.clone()
        };
        self.persist(&updated).await?;
        Ok(Some(updated))
    }

    /// Count articles matching the predicate.
    pub async fn count(&self, predicate: &Predicate) -> usize {
        self.articles
            .read()
            .await
            .values()
            .filter(|article| predicate.matches(article))
            .count()
    }

    /// Fetch the matching slice: filter, sort, then skip/limit.
    pub async fn find(
        &self,
        predicate: &Predicate,
        sort: &SortSpec,
        offset: u64,
        limit: u64,
    ) -> Vec<Article> {
        let mut matched: Vec<Article> = self
            .articles
            .read()
            .await
            .values()
            .filter(|article| predicate.matches(article))
            .cloned()
            .collect();
        matched.sort_by(|a, b| sort.compare(a, b).then_with(|| a.id.cmp(&b.id)));
        matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect()
    }

    /// Grouped category/tag/topic/author counts over the same filtered
    /// subset as the listing, in one pass. Counts are ordered descending
    /// (name ascending on ties); tags and topics keep the top
    /// [`FACET_VALUE_LIMIT`] values.
    pub async fn facets(&self, predicate: &Predicate) -> FacetSummary {
        let mut categories: HashMap<String, u64> = HashMap::new();
        let mut tags: HashMap<String, u64> = HashMap::new();
        let mut topics: HashMap<String, u64> = HashMap::new();
        let mut authors: HashMap<String, u64> = HashMap::new();

        for article in self.articles.read().await.values() {
            if !predicate.matches(article) {
                continue;
            }
            *categories.entry(article.category.clone()).or_insert(0) += 1;
            *authors.entry(article.author.clone()).or_insert(0) += 1;
            for tag in &article.tags {
                *tags.entry(tag.clone()).or_insert(0) += 1;
            }
            for topic in &article.topics {
                *topics.entry(topic.clone()).or_insert(0) += 1;
            }
        }

        FacetSummary {
            categories: into_facet_counts(categories, usize::MAX),
            tags: into_facet_counts(tags, FACET_VALUE_LIMIT),
            topics: into_facet_counts(topics, FACET_VALUE_LIMIT),
            authors: into_facet_counts(authors, usize::MAX),
        }
    }

    async fn persist(&self, article: &Article) -> Result<()> {
        let path = self.document_path(&article.id);
        let json = serde_json::to_string_pretty(article)
            .with_context(|| format!("failed to serialize article {}", article.id))?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write document {}", path.display()))?;
        Ok(())
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

async fn load_document(path: &Path) -> Result<Article> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}

fn into_facet_counts(counts: HashMap<String, u64>, keep: usize) -> Vec<FacetCount> {
    let mut facet: Vec<FacetCount> = counts
        .into_iter()
        .map(|(name, count)| FacetCount { name, count })
        .collect();
    facet.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    facet.truncate(keep);
    facet
}
