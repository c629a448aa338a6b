use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pressroom_shared::{
    text, Article, ArticleView, InteractionCounts, ShareEvent, DEFAULT_AUTHOR, DEFAULT_PRIORITY,
    STATUS_DRAFT, VALID_CATEGORIES, VALID_STATUSES,
};

use crate::{
    listing::{resolve_listing, run_listing, ListingParams, ListingResponse, ValidationError},
    state::AppState,
};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MIN_CONTENT_LENGTH: usize = 100;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub code: u16,
}

#[derive(Debug, Serialize)]
pub struct ValidationFailure {
    pub error: String,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Serialize)]
pub struct CreateArticleResponse {
    pub success: bool,
    pub article: ArticleView,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateArticleResponse {
    pub success: bool,
    pub article: ArticleView,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    pub success: bool,
    pub interaction: String,
    pub counts: InteractionCounts,
}

/// GET /api/articles — filtered, sorted, paginated listing with facets.
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ListingResponse>, Response> {
    let request = resolve_listing(params).map_err(validation_failure)?;
    Ok(Json(run_listing(state.store(), &request).await))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub topics: Vec<String>,
    pub tags: Vec<String>,
    pub seo_keywords: Vec<String>,
    pub date: Option<String>,
    pub reading_time: Option<String>,
    pub status: Option<String>,
    pub scheduled_date: Option<String>,
    pub published_date: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub is_featured: bool,
}

/// POST /api/articles — validate, derive slug/excerpt/reading time, insert.
pub async fn create_article(
    State(state): State<AppState>,
    Json(request): Json<CreateArticleRequest>,
) -> Result<(StatusCode, Json<CreateArticleResponse>), Response> {
    let errors = validate_create(&request);
    if !errors.is_empty() {
        return Err(validation_failure(errors));
    }

    let title = request.title.clone().unwrap_or_default();
    let content = request.content.clone().unwrap_or_default();
    let now = Utc::now();

    let slug = state
        .store()
        .ensure_unique_slug(&text::generate_slug(&title))
        .await;
    let excerpt = request
        .excerpt
        .clone()
        .filter(|excerpt| !excerpt.trim().is_empty())
        .unwrap_or_else(|| text::generate_excerpt(&content, text::EXCERPT_MAX_LENGTH));
    let reading_time = request
        .reading_time
        .clone()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| text::reading_time(&content));

    let article = Article {
        id: Uuid::new_v4().to_string(),
        word_count: text::count_words(&content),
        title,
        content,
        author: request.author.clone().unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        slug,
        excerpt,
        cover_image: request.cover_image.clone(),
        category: request.category.clone().unwrap_or_default(),
        topics: request.topics.clone(),
        tags: text::normalize_tags(&request.tags),
        date: request
            .date
            .clone()
            .unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
        reading_time,
        status: request.status.clone().unwrap_or_else(|| STATUS_DRAFT.to_string()),
        is_featured: request.is_featured,
        seo_keywords: request.seo_keywords.clone(),
        priority: request.priority.clone().unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        assignee: request.assignee.clone(),
        due_date: request.due_date.clone(),
        scheduled_date: request.scheduled_date.clone(),
        published_date: request.published_date.clone(),
        attachments: Vec::new(),
        view_count: 0,
        likes: 0,
        shares: 0,
        comments_count: 0,
        liked_by: Vec::new(),
        unique_viewers: Vec::new(),
        share_history: Vec::new(),
        last_interaction: None,
        created_at: now,
        updated_at: now,
    };

    let stored = state
        .store()
        .insert(article)
        .await
        .map_err(|e| internal_error("Failed to create article", e))?;
    tracing::info!(id = %stored.id, slug = %stored.slug, "article created");

    Ok((
        StatusCode::CREATED,
        Json(CreateArticleResponse {
            success: true,
            article: ArticleView::from(&stored),
            message: "Article created successfully".to_string(),
        }),
    ))
}

/// GET /api/articles/:id — lookup by slug first, then by id.
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
) -> Result<Json<ArticleView>, Response> {
    let article = match state.store().get_by_slug(&slug_or_id).await {
        Some(article) => Some(article),
        None => state.store().get(&slug_or_id).await,
    };
    match article {
        Some(article) => Ok(Json(ArticleView::from(&article))),
        None => Err(not_found("Article not found")),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub excerpt: Option<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub topics: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub seo_keywords: Option<Vec<String>>,
    pub date: Option<String>,
    pub reading_time: Option<String>,
    pub status: Option<String>,
    pub scheduled_date: Option<String>,
    pub published_date: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due_date: Option<String>,
    pub is_featured: Option<bool>,
}

/// PUT /api/articles/:id — provided fields replace stored ones; the slug is
/// stable across updates.
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateArticleRequest>,
) -> Result<Json<UpdateArticleResponse>, Response> {
    let errors = validate_update(&request);
    if !errors.is_empty() {
        return Err(validation_failure(errors));
    }

    let now = Utc::now();
    let updated = state
        .store()
        .update(&id, |article| apply_update(article, &request, now))
        .await
        .map_err(|e| internal_error("Failed to update article", e))?;

    match updated {
        Some(article) => Ok(Json(UpdateArticleResponse {
            success: true,
            article: ArticleView::from(&article),
        })),
        None => Err(not_found("Article not found")),
    }
}

/// Recognized engagement interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    View,
    Like,
    Unlike,
    Share,
}

impl InteractionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(Self::View),
            "like" => Some(Self::Like),
            "unlike" => Some(Self::Unlike),
            "share" => Some(Self::Share),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Like => "like",
            Self::Unlike => "unlike",
            Self::Share => "share",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: Option<String>,
    pub platform: Option<String>,
}

/// POST /api/articles/:id/interact — record a view/like/unlike/share and
/// return the updated counters.
pub async fn article_interaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<InteractionRequest>,
) -> Result<Json<InteractionResponse>, Response> {
    let Some(kind) = InteractionKind::parse(&request.kind) else {
        return Err(bad_request("Invalid interaction type"));
    };

    let now = Utc::now();
    let updated = state
        .store()
        .update(&id, |article| {
            apply_interaction(
                article,
                kind,
                request.user_id.as_deref(),
                request.platform.as_deref(),
                now,
            );
        })
        .await
        .map_err(|e| internal_error("Failed to process interaction", e))?;

    match updated {
        Some(article) => Ok(Json(InteractionResponse {
            success: true,
            interaction: kind.as_str().to_string(),
            counts: InteractionCounts {
                views: article.view_count,
                likes: article.likes,
                shares: article.shares,
                comments: article.comments_count,
            },
        })),
        None => Err(not_found("Article not found")),
    }
}

fn validate_create(request: &CreateArticleRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match request.title.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError::new("title", "Title is required")),
        Some(title) if title.chars().count() > MAX_TITLE_LENGTH => {
            errors.push(ValidationError::new(
                "title",
                format!("Title must be at most {MAX_TITLE_LENGTH} characters"),
            ));
        },
        Some(_) => {},
    }

    match request.content.as_deref() {
        None | Some("") => errors.push(ValidationError::new("content", "Content is required")),
        Some(content) if content.chars().count() < MIN_CONTENT_LENGTH => {
            errors.push(ValidationError::new(
                "content",
                format!("Content must be at least {MIN_CONTENT_LENGTH} characters"),
            ));
        },
        Some(_) => {},
    }

    if let Some(category) = request.category.as_deref() {
        if !VALID_CATEGORIES.contains(&category) {
            errors.push(ValidationError::new(
                "category",
                format!("Invalid category. Valid options: {}", VALID_CATEGORIES.join(", ")),
            ));
        }
    } else {
        errors.push(ValidationError::new("category", "Category is required"));
    }

    if let Some(status) = request.status.as_deref() {
        if !VALID_STATUSES.contains(&status) {
            errors.push(ValidationError::new(
                "status",
                format!("Invalid status. Valid options: {}", VALID_STATUSES.join(", ")),
            ));
        }
    }

    errors
}

fn validate_update(request: &UpdateArticleRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(title) = request.title.as_deref() {
        if title.trim().is_empty() {
            errors.push(ValidationError::new("title", "Title must not be empty"));
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.push(ValidationError::new(
                "title",
                format!("Title must be at most {MAX_TITLE_LENGTH} characters"),
            ));
        }
    }

    if let Some(content) = request.content.as_deref() {
        if content.chars().count() < MIN_CONTENT_LENGTH {
            errors.push(ValidationError::new(
                "content",
                format!("Content must be at least {MIN_CONTENT_LENGTH} characters"),
            ));
        }
    }

    if let Some(category) = request.category.as_deref() {
        if !VALID_CATEGORIES.contains(&category) {
            errors.push(ValidationError::new(
                "category",
                format!("Invalid category. Valid options: {}", VALID_CATEGORIES.join(", ")),
            ));
        }
    }

    if let Some(status) = request.status.as_deref() {
        if !VALID_STATUSES.contains(&status) {
            errors.push(ValidationError::new(
                "status",
                format!("Invalid status. Valid options: {}", VALID_STATUSES.join(", ")),
            ));
        }
    }

    errors
}

fn apply_update(article: &mut Article, request: &UpdateArticleRequest, now: DateTime<Utc>) {
    if let Some(title) = &request.title {
        article.title = title.clone();
    }
    if let Some(content) = &request.content {
        article.content = content.clone();
        article.word_count = text::count_words(content);
        if request.reading_time.is_none() {
            article.reading_time = text::reading_time(content);
        }
    }
    if let Some(reading_time) = &request.reading_time {
        article.reading_time = reading_time.clone();
    }
    if let Some(author) = &request.author {
        article.author = author.clone();
    }
    if let Some(excerpt) = &request.excerpt {
        article.excerpt = excerpt.clone();
    }
    if let Some(cover_image) = &request.cover_image {
        article.cover_image = Some(cover_image.clone());
    }
    if let Some(category) = &request.category {
        article.category = category.clone();
    }
    if let Some(topics) = &request.topics {
        article.topics = topics.clone();
    }
    if let Some(tags) = &request.tags {
        article.tags = text::normalize_tags(tags);
    }
    if let Some(seo_keywords) = &request.seo_keywords {
        article.seo_keywords = seo_keywords.clone();
    }
    if let Some(date) = &request.date {
        article.date = date.clone();
    }
    if let Some(status) = &request.status {
        article.status = status.clone();
    }
    if let Some(scheduled_date) = &request.scheduled_date {
        article.scheduled_date = Some(scheduled_date.clone());
    }
    if let Some(published_date) = &request.published_date {
        article.published_date = Some(published_date.clone());
    }
    if let Some(priority) = &request.priority {
        article.priority = priority.clone();
    }
    if let Some(assignee) = &request.assignee {
        article.assignee = Some(assignee.clone());
    }
    if let Some(due_date) = &request.due_date {
        article.due_date = Some(due_date.clone());
    }
    if let Some(is_featured) = request.is_featured {
        article.is_featured = is_featured;
    }
    article.updated_at = now;
}

fn apply_interaction(
    article: &mut Article,
    kind: InteractionKind,
    user_id: Option<&str>,
    platform: Option<&str>,
    now: DateTime<Utc>,
) {
    match kind {
        InteractionKind::View => {
            article.view_count += 1;
            if let Some(user_id) = user_id {
                add_to_set(&mut article.unique_viewers, user_id);
            }
        },
        InteractionKind::Like => {
            article.likes += 1;
            if let Some(user_id) = user_id {
                add_to_set(&mut article.liked_by, user_id);
            }
        },
        InteractionKind::Unlike => {
            // Counters never go below zero.
            article.likes = article.likes.saturating_sub(1);
            if let Some(user_id) = user_id {
                article.liked_by.retain(|liker| liker != user_id);
            }
        },
        InteractionKind::Share => {
            article.shares += 1;
            article.share_history.push(ShareEvent {
                user_id: user_id.map(ToOwned::to_owned),
                platform: platform.unwrap_or("unknown").to_string(),
                timestamp: now,
            });
        },
    }
    article.last_interaction = Some(now);
}

fn add_to_set(set: &mut Vec<String>, value: &str) {
    if !set.iter().any(|existing| existing == value) {
        set.push(value.to_string());
    }
}

fn validation_failure(errors: Vec<ValidationError>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ValidationFailure {
            error: "Validation failed".to_string(),
            errors,
        }),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
            code: 400,
        }),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.to_string(),
            details: None,
            code: 404,
        }),
    )
        .into_response()
}

fn internal_error(message: &str, err: impl std::fmt::Display) -> Response {
    tracing::error!("{}: {}", message, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
            details: Some(err.to_string()),
            code: 500,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::Json,
    };
    use chrono::Utc;
    use pressroom_shared::ArticleStore;

    use super::{
        apply_interaction, article_interaction, create_article, get_article, update_article,
        validate_create, CreateArticleRequest, InteractionKind, InteractionRequest,
        UpdateArticleRequest,
    };
    use crate::{state::AppState, test_support::published_article};

    fn long_content() -> String {
        "All work and no play makes for a dull article. ".repeat(10)
    }

    async fn test_state() -> Result<(tempfile::TempDir, AppState)> {
        let dir = tempfile::tempdir()?;
        let store = ArticleStore::open(dir.path().join("articles")).await?;
        let state = AppState::with_store(store, dir.path().join("uploads"), 16 * 1024 * 1024);
        Ok((dir, state))
    }

    fn valid_create_request(title: &str) -> CreateArticleRequest {
        CreateArticleRequest {
            title: Some(title.to_string()),
            content: Some(long_content()),
            category: Some("Technology".to_string()),
            ..CreateArticleRequest::default()
        }
    }

    #[test]
    fn create_validation_reports_field_errors() {
        let empty = CreateArticleRequest::default();
        let errors = validate_create(&empty);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "content", "category"]);

        let bad = CreateArticleRequest {
            title: Some("x".repeat(201)),
            content: Some("too short".to_string()),
            category: Some("Gossip".to_string()),
            status: Some("pending".to_string()),
            ..CreateArticleRequest::default()
        };
        let errors = validate_create(&bad);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["title", "content", "category", "status"]);
    }

    #[tokio::test]
    async fn create_derives_slug_excerpt_and_reading_time() -> Result<()> {
        let (_dir, state) = test_state().await?;
        let request = CreateArticleRequest {
            tags: vec!["AI".to_string(), " ai ".to_string(), "ML".to_string()],
            ..valid_create_request("Hello World")
        };

        let (status, Json(response)) =
            create_article(State(state.clone()), Json(request)).await.expect("created");
        assert_eq!(status, StatusCode::CREATED);
        assert!(response.success);

        let article = response.article;
        assert_eq!(article.slug, "hello-world");
        assert_eq!(article.status, "draft");
        assert_eq!(article.tags, ["ai", "ml"]);
        assert_eq!(article.reading_time, "1 min read");
        assert!(article.excerpt.len() <= 163);
        assert_eq!(article.interactions.views, 0);
        assert!(article.word_count > 0);
        Ok(())
    }

    #[tokio::test]
    async fn create_resolves_slug_collisions_with_counter() -> Result<()> {
        let (_dir, state) = test_state().await?;

        for expected in ["hello-world", "hello-world-1", "hello-world-2"] {
            let (_, Json(response)) =
                create_article(State(state.clone()), Json(valid_create_request("Hello World")))
                    .await
                    .expect("created");
            assert_eq!(response.article.slug, expected);
        }
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload_with_400() -> Result<()> {
        let (_dir, state) = test_state().await?;
        let response = create_article(State(state), Json(CreateArticleRequest::default()))
            .await
            .expect_err("must fail validation");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn get_article_finds_by_slug_and_by_id() -> Result<()> {
        let (_dir, state) = test_state().await?;
        state.store().insert(published_article("a-1", "my-post")).await?;

        let Json(by_slug) = get_article(State(state.clone()), Path("my-post".to_string()))
            .await
            .expect("found by slug");
        assert_eq!(by_slug.id, "a-1");

        let Json(by_id) = get_article(State(state.clone()), Path("a-1".to_string()))
            .await
            .expect("found by id");
        assert_eq!(by_id.slug, "my-post");

        let missing = get_article(State(state), Path("nope".to_string()))
            .await
            .expect_err("missing");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_fields_and_recomputes_derived_values() -> Result<()> {
        let (_dir, state) = test_state().await?;
        state.store().insert(published_article("a-1", "my-post")).await?;

        let request = UpdateArticleRequest {
            content: Some("word ".repeat(400)),
            tags: Some(vec!["Rust".to_string(), "rust".to_string()]),
            status: Some("archived".to_string()),
            ..UpdateArticleRequest::default()
        };
        let Json(response) =
            update_article(State(state.clone()), Path("a-1".to_string()), Json(request))
                .await
                .expect("updated");

        let article = response.article;
        assert_eq!(article.slug, "my-post");
        assert_eq!(article.status, "archived");
        assert_eq!(article.tags, ["rust"]);
        assert_eq!(article.word_count, 400);
        assert_eq!(article.reading_time, "2 min read");

        let missing = update_article(
            State(state),
            Path("nope".to_string()),
            Json(UpdateArticleRequest::default()),
        )
        .await
        .expect_err("missing");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[test]
    fn unlike_saturates_at_zero() {
        let mut article = published_article("a-1", "a-1");
        apply_interaction(&mut article, InteractionKind::Unlike, None, None, Utc::now());
        assert_eq!(article.likes, 0);

        apply_interaction(&mut article, InteractionKind::Like, Some("u-1"), None, Utc::now());
        assert_eq!(article.likes, 1);
        assert_eq!(article.liked_by, ["u-1"]);

        apply_interaction(&mut article, InteractionKind::Unlike, Some("u-1"), None, Utc::now());
        assert_eq!(article.likes, 0);
        assert!(article.liked_by.is_empty());
    }

    #[test]
    fn repeat_views_count_but_viewers_dedup() {
        let mut article = published_article("a-1", "a-1");
        for _ in 0..3 {
            apply_interaction(&mut article, InteractionKind::View, Some("u-1"), None, Utc::now());
        }
        assert_eq!(article.view_count, 3);
        assert_eq!(article.unique_viewers, ["u-1"]);
        assert!(article.last_interaction.is_some());
    }

    #[test]
    fn share_records_platform_history() {
        let mut article = published_article("a-1", "a-1");
        apply_interaction(
            &mut article,
            InteractionKind::Share,
            Some("u-1"),
            Some("mastodon"),
            Utc::now(),
        );
        apply_interaction(&mut article, InteractionKind::Share, None, None, Utc::now());
        assert_eq!(article.shares, 2);
        assert_eq!(article.share_history.len(), 2);
        assert_eq!(article.share_history[0].platform, "mastodon");
        assert_eq!(article.share_history[1].platform, "unknown");
    }

    #[tokio::test]
    async fn interaction_endpoint_returns_updated_counts() -> Result<()> {
        let (_dir, state) = test_state().await?;
        state.store().insert(published_article("a-1", "a-1")).await?;

        let Json(response) = article_interaction(
            State(state.clone()),
            Path("a-1".to_string()),
            Json(InteractionRequest {
                kind: "like".to_string(),
                user_id: Some("u-1".to_string()),
                platform: None,
            }),
        )
        .await
        .expect("liked");
        assert_eq!(response.interaction, "like");
        assert_eq!(response.counts.likes, 1);

        let invalid = article_interaction(
            State(state.clone()),
            Path("a-1".to_string()),
            Json(InteractionRequest {
                kind: "boost".to_string(),
                user_id: None,
                platform: None,
            }),
        )
        .await
        .expect_err("invalid type");
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let missing = article_interaction(
            State(state),
            Path("nope".to_string()),
            Json(InteractionRequest {
                kind: "view".to_string(),
                user_id: None,
                platform: None,
            }),
        )
        .await
        .expect_err("missing article");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        Ok(())
    }
}
