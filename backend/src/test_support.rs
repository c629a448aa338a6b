//! Builders shared across the backend's test modules.

use chrono::Utc;
use pressroom_shared::{Article, DEFAULT_AUTHOR, DEFAULT_PRIORITY, STATUS_PUBLISHED};

/// Minimal published article with the given id and slug.
pub fn published_article(id: &str, slug: &str) -> Article {
    let now = Utc::now();
    Article {
        id: id.to_string(),
        title: format!("Article {id}"),
        content: "Body text for a test article.".to_string(),
        author: DEFAULT_AUTHOR.to_string(),
        slug: slug.to_string(),
        excerpt: "Body text for a test article.".to_string(),
        cover_image: None,
        category: "Technology".to_string(),
        topics: vec![],
        tags: vec![],
        date: "2025-06-01".to_string(),
        reading_time: "1 min read".to_string(),
        status: STATUS_PUBLISHED.to_string(),
        is_featured: false,
        seo_keywords: vec![],
        word_count: 6,
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
