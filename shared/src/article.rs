//! Article document model and its client-facing projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_PUBLISHED: &str = "published";
pub const STATUS_ARCHIVED: &str = "archived";

pub const VALID_STATUSES: &[&str] =
    &[STATUS_DRAFT, STATUS_SCHEDULED, STATUS_PUBLISHED, STATUS_ARCHIVED];

pub const VALID_CATEGORIES: &[&str] = &[
    "Technology",
    "AI & Machine Learning",
    "Future Trends",
    "Digital Transformation",
    "Innovation",
    "Research",
    "Opinion",
    "Tutorial",
    "Case Study",
    "News",
];

pub const DEFAULT_AUTHOR: &str = "Pressroom Editorial";
pub const DEFAULT_PRIORITY: &str = "medium";

/// One share event, kept for internal analytics only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareEvent {
    pub user_id: Option<String>,
    pub platform: String,
    pub timestamp: DateTime<Utc>,
}

/// Reference to an uploaded file attached to an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub id: String,
    pub original_name: String,
    pub filename: String,
    pub url: String,
    pub file_size: u64,
    pub human_size: String,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Persisted article document.
///
/// `date` is a `YYYY-MM-DD` string; zero-padded ISO dates order correctly
/// under plain string comparison, which the range filter and date sort rely
/// on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub slug: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: String,
    pub topics: Vec<String>,
    pub tags: Vec<String>,
    pub date: String,
    pub reading_time: String,
    pub status: String,
    pub is_featured: bool,
    pub seo_keywords: Vec<String>,
    pub word_count: u32,
    pub priority: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub scheduled_date: Option<String>,
    pub published_date: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub unique_viewers: Vec<String>,
    #[serde(default)]
    pub share_history: Vec<ShareEvent>,
    #[serde(default)]
    pub last_interaction: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nested engagement counters exposed on every serialized article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionCounts {
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

/// Client-facing article representation.
///
/// Everything persisted except internal-only fields (`liked_by`,
/// `unique_viewers`, `share_history`, `last_interaction`); raw counters are
/// folded into the nested `interactions` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub slug: String,
    pub excerpt: String,
    pub cover_image: Option<String>,
    pub category: String,
    pub topics: Vec<String>,
    pub tags: Vec<String>,
    pub date: String,
    pub reading_time: String,
    pub status: String,
    pub is_featured: bool,
    pub seo_keywords: Vec<String>,
    pub word_count: u32,
    pub priority: String,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub scheduled_date: Option<String>,
    pub published_date: Option<String>,
    pub attachments: Vec<AttachmentRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub interactions: InteractionCounts,
}

impl From<&Article> for ArticleView {
    fn from(a: &Article) -> Self {
        ArticleView {
            id: a.id.clone(),
            title: a.title.clone(),
            content: a.content.clone(),
            author: a.author.clone(),
            slug: a.slug.clone(),
            excerpt: a.excerpt.clone(),
            cover_image: a.cover_image.clone(),
            category: a.category.clone(),
            topics: a.topics.clone(),
            tags: a.tags.clone(),
            date: a.date.clone(),
            reading_time: a.reading_time.clone(),
            status: a.status.clone(),
            is_featured: a.is_featured,
            seo_keywords: a.seo_keywords.clone(),
            word_count: a.word_count,
            priority: a.priority.clone(),
            assignee: a.assignee.clone(),
            due_date: a.due_date.clone(),
            scheduled_date: a.scheduled_date.clone(),
            published_date: a.published_date.clone(),
            attachments: a.attachments.clone(),
            created_at: a.created_at,
            updated_at: a.updated_at,
            interactions: InteractionCounts {
                views: a.view_count,
                likes: a.likes,
                shares: a.shares,
                comments: a.comments_count,
            },
        }
    }
}

impl From<Article> for ArticleView {
    fn from(a: Article) -> Self {
        ArticleView::from(&a)
    }
}

/// Minimal published article for tests.
#[cfg(test)]
pub(crate) fn sample_article(id: &str, slug: &str) -> Article {
    let now = Utc::now();
    Article {
        id: id.to_string(),
        title: "Sample".to_string(),
        content: "body".to_string(),
        author: DEFAULT_AUTHOR.to_string(),
        slug: slug.to_string(),
        excerpt: "body".to_string(),
        cover_image: None,
        category: "Technology".to_string(),
        topics: vec![],
        tags: vec![],
        date: "2025-06-01".to_string(),
        reading_time: "1 min read".to_string(),
        status: STATUS_PUBLISHED.to_string(),
        is_featured: false,
        seo_keywords: vec![],
        word_count: 1,
        priority: DEFAULT_PRIORITY.to_string(),
        assignee: None,
        due_date: None,
        scheduled_date: None,
        published_date: None,
        attachments: vec![],
        view_count: 0,
        likes: 0,
        shares: 0,
        comments_count: 0,
        liked_by: vec![],
        unique_viewers: vec![],
        share_history: vec![],
        last_interaction: None,
        created_at: now,
        updated_at: now,
    }
}
