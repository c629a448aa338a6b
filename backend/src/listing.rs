//! Article listing: raw query parameters are resolved into one validated
//! request, then the orchestrator composes predicate, count, sort,
//! pagination, fetch, serialization and facets into a single envelope.

use serde::{Deserialize, Serialize};

use pressroom_shared::{
    ArticleFilters, ArticleStore, ArticleView, FacetSummary, Pagination, SortSpec,
    STATUS_PUBLISHED,
};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 12;
/// Upper bound on the page size so one request cannot page the whole
/// collection.
pub const MAX_PAGE_SIZE: u64 = 100;

const DEFAULT_SORT_BY: &str = "date";
const DEFAULT_SORT_ORDER: &str = "desc";

/// Raw listing query parameters. `tags` and `topics` accept repeated keys
/// (`?tags=ai&tags=ml`), which is why the handler extracts this with
/// `axum_extra`'s `Query`.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub featured: Option<bool>,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Fully-resolved listing request: every default applied, page and limit
/// validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRequest {
    pub filters: ArticleFilters,
    pub sort: SortSpec,
    pub page: u64,
    pub limit: u64,
}

/// Apply defaults and validate. `page` and `limit` below 1 are rejected
/// rather than clamped; `limit` is capped at [`MAX_PAGE_SIZE`].
pub fn resolve_listing(params: ListingParams) -> Result<ListingRequest, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let page = params.page.unwrap_or(DEFAULT_PAGE as i64);
    if page < 1 {
        errors.push(ValidationError::new("page", "page must be a positive integer"));
    }

    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE as i64);
    if limit < 1 {
        errors.push(ValidationError::new("limit", "limit must be a positive integer"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let sort = SortSpec::resolve(
        params.sort_by.as_deref().unwrap_or(DEFAULT_SORT_BY),
        params.sort_order.as_deref().unwrap_or(DEFAULT_SORT_ORDER),
    );

    let filters = ArticleFilters {
        search: params.search,
        category: params.category,
        tags: params.tags,
        topics: params.topics,
        author: params.author,
        status: params
            .status
            .filter(|status| !status.is_empty())
            .unwrap_or_else(|| STATUS_PUBLISHED.to_string()),
        date_from: params.date_from,
        date_to: params.date_to,
        featured: params.featured.unwrap_or(false),
    };

    Ok(ListingRequest {
        filters,
        sort,
        page: page as u64,
        limit: (limit as u64).min(MAX_PAGE_SIZE),
    })
}

/// Listing response envelope.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub success: bool,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub articles: Vec<ArticleView>,
    pub filters: FacetSummary,
}

/// Single-pass orchestration: build the predicate once, count, resolve
/// pagination from the count, fetch the sorted page, serialize, then
/// compute facets over the same predicate.
pub async fn run_listing(store: &ArticleStore, request: &ListingRequest) -> ListingResponse {
    let predicate = request.filters.to_predicate();

    let total = store.count(&predicate).await as u64;
    let pagination = Pagination::resolve(request.page, request.limit, total);

    let articles = store
        .find(&predicate, &request.sort, pagination.offset(), pagination.limit)
        .await;
    let articles: Vec<ArticleView> = articles.iter().map(ArticleView::from).collect();

    let filters = store.facets(&predicate).await;

    ListingResponse {
        success: true,
        total,
        page: pagination.page,
        limit: pagination.limit,
        total_pages: pagination.total_pages,
        has_next: pagination.has_next,
        has_prev: pagination.has_prev,
        articles,
        filters,
    }
}
