//! Typed listing query: filter predicate, sort resolution, pagination math.
//!
//! The predicate is a conjunction of typed clauses rather than a loose
//! operator document; the store evaluates it in-process over its article
//! set.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::article::{Article, STATUS_PUBLISHED};

/// Fields usable in an exact-equality clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqField {
    Status,
    Category,
    Author,
}

/// Multi-valued fields usable in a set-membership clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetField {
    Tags,
    Topics,
}

/// One filter clause. Clauses combine conjunctively within a [`Predicate`];
/// only the text-search clause and the membership clauses are internally
/// disjunctive.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Exact equality on a scalar field.
    Eq(EqField, String),
    /// Article matches if any of the given values is present on the field.
    AnyOf(SetField, Vec<String>),
    /// Inclusive `YYYY-MM-DD` range on the article date; either bound may
    /// be open.
    DateBetween {
        from: Option<String>,
        to: Option<String>,
    },
    /// Case-insensitive substring match over title, excerpt, content, tags
    /// and SEO keywords.
    TextSearch(String),
    /// Featured articles only.
    FeaturedOnly,
}

impl Clause {
    fn matches(&self, article: &Article) -> bool {
        match self {
            Clause::Eq(field, value) => {
                let actual = match field {
                    EqField::Status => &article.status,
                    EqField::Category => &article.category,
                    EqField::Author => &article.author,
                };
                actual == value
            },
            Clause::AnyOf(field, values) => {
                let actual = match field {
                    SetField::Tags => &article.tags,
                    SetField::Topics => &article.topics,
                };
                values.iter().any(|value| actual.contains(value))
            },
            Clause::DateBetween { from, to } => {
                if let Some(from) = from {
                    if article.date.as_str() < from.as_str() {
                        return false;
                    }
                }
                if let Some(to) = to {
                    if article.date.as_str() > to.as_str() {
                        return false;
                    }
                }
                true
            },
            Clause::TextSearch(needle) => {
                let needle = needle.to_lowercase();
                article.title.to_lowercase().contains(&needle)
                    || article.excerpt.to_lowercase().contains(&needle)
                    || article.content.to_lowercase().contains(&needle)
                    || article.tags.iter().any(|t| t.to_lowercase().contains(&needle))
                    || article.seo_keywords.iter().any(|k| k.to_lowercase().contains(&needle))
            },
            Clause::FeaturedOnly => article.is_featured,
        }
    }
}

/// Conjunction of filter clauses; an empty predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn matches(&self, article: &Article) -> bool {
        self.clauses.iter().all(|clause| clause.matches(article))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

/// Status filter value that disables the status clause entirely.
pub const STATUS_ALL: &str = "all";

/// Parsed listing filters, after defaulting. `status` defaults to
/// `published`; [`STATUS_ALL`] means no status clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub topics: Vec<String>,
    pub author: Option<String>,
    pub status: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub featured: bool,
}

impl Default for ArticleFilters {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            tags: Vec::new(),
            topics: Vec::new(),
            author: None,
            status: STATUS_PUBLISHED.to_string(),
            date_from: None,
            date_to: None,
            featured: false,
        }
    }
}

impl ArticleFilters {
    /// Build the predicate for these filters.
    pub fn to_predicate(&self) -> Predicate {
        let mut clauses = Vec::new();

        if self.status != STATUS_ALL {
            clauses.push(Clause::Eq(EqField::Status, self.status.clone()));
        }

        if let Some(search) = self.search.as_deref() {
            let search = search.trim();
            if !search.is_empty() {
                clauses.push(Clause::TextSearch(search.to_string()));
            }
        }

        if let Some(category) = &self.category {
            clauses.push(Clause::Eq(EqField::Category, category.clone()));
        }

        if let Some(author) = &self.author {
            clauses.push(Clause::Eq(EqField::Author, author.clone()));
        }

        if !self.tags.is_empty() {
            clauses.push(Clause::AnyOf(SetField::Tags, self.tags.clone()));
        }

        if !self.topics.is_empty() {
            clauses.push(Clause::AnyOf(SetField::Topics, self.topics.clone()));
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            clauses.push(Clause::DateBetween {
                from: self.date_from.clone(),
                to: self.date_to.clone(),
            });
        }

        if self.featured {
            clauses.push(Clause::FeaturedOnly);
        }

        Predicate { clauses }
    }
}

/// Concrete sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    Date,
    Views,
    Likes,
    Title,
    Updated,
}

/// Resolved (field, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub ascending: bool,
}

impl SortSpec {
    /// Map a requested sort key and order onto a concrete spec. Unknown
    /// keys fall back to (date, descending) regardless of the requested
    /// order.
    pub fn resolve(sort_by: &str, sort_order: &str) -> SortSpec {
        let ascending = sort_order.eq_ignore_ascii_case("asc");
        let field = match sort_by {
            "date" => SortField::Date,
            "views" => SortField::Views,
            "likes" => SortField::Likes,
            "title" => SortField::Title,
            "updated" => SortField::Updated,
            _ => {
                return SortSpec {
                    field: SortField::Date,
                    ascending: false,
                }
            },
        };
        SortSpec { field, ascending }
    }

    /// Ordering between two articles under this spec.
    pub fn compare(&self, a: &Article, b: &Article) -> Ordering {
        let forward = match self.field {
            SortField::Date => a.date.cmp(&b.date),
            SortField::Views => a.view_count.cmp(&b.view_count),
            SortField::Likes => a.likes.cmp(&b.likes),
            SortField::Title => a.title.cmp(&b.title),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
        };
        if self.ascending {
            forward
        } else {
            forward.reverse()
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            field: SortField::Date,
            ascending: false,
        }
    }
}

/// Pagination metadata derived from a 1-indexed page, a page size and the
/// total match count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// `page` and `limit` must already be validated as positive.
    pub fn resolve(page: u64, limit: u64, total: u64) -> Pagination {
        let total_pages = total.div_ceil(limit);
        Pagination {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Number of records to skip before the requested page. Saturates for
    /// page numbers far past the collection, which the fetch then resolves
    /// to an empty page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
