//! Shared domain types for the Pressroom content backend: the article
//! document model, the typed listing query (predicate, sort, pagination),
//! the document store and pure text helpers.

pub mod article;
pub mod article_store;
pub mod query;
pub mod text;

pub use article::{
    Article, ArticleView, AttachmentRef, InteractionCounts, ShareEvent, DEFAULT_AUTHOR,
    DEFAULT_PRIORITY, STATUS_ARCHIVED, STATUS_DRAFT, STATUS_PUBLISHED, STATUS_SCHEDULED,
    VALID_CATEGORIES, VALID_STATUSES,
};
pub use article_store::{ArticleStore, FacetCount, FacetSummary, FACET_VALUE_LIMIT};
pub use query::{
    ArticleFilters, Clause, EqField, Pagination, Predicate, SetField, SortField, SortSpec,
    STATUS_ALL,
};
