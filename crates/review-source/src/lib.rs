//! Where review batches come from: the store-facing collaborator and its pagination loop.

pub mod error;
pub mod http;
pub mod memory;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use review_core::{AppInfo, RawReview};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use error::{Result, SourceError};
pub use http::HttpReviewSource;
pub use memory::MemorySource;

/// Largest page the provider hands out in one call
pub const MAX_PAGE_SIZE: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale { pub lang: String, pub country: String }

impl Default for Locale {
    fn default() -> Self { Self { lang: "en".into(), country: "in".into() } }
}

/// Provider sort orders, numbered the way the store API numbers them
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Relevance,
    #[default]
    Newest,
    Rating,
}

impl SortMode {
    pub fn code(self) -> u8 {
        match self {
            SortMode::Relevance => 1,
            SortMode::Newest => 2,
            SortMode::Rating => 3,
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "relevance" | "helpfulness" => Ok(SortMode::Relevance),
            "2" | "newest" => Ok(SortMode::Newest),
            "3" | "rating" => Ok(SortMode::Rating),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.code()) }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageRequest {
    pub app_id: String,
    pub locale: Locale,
    pub sort: SortMode,
    pub page_size: usize,
    pub continuation_token: Option<String>,
    /// Provider-side star filter (1..=5)
    pub rating: Option<u8>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    #[serde(default, alias = "data")]
    pub reviews: Vec<RawReview>,
    #[serde(default, alias = "nextPaginationToken")]
    pub next_token: Option<String>,
}

/// External review provider. Futures are `Send` so sources can back HTTP handlers.
pub trait ReviewSource: Send + Sync {
    fn fetch_app(&self, app_id: &str, locale: &Locale) -> impl Future<Output = Result<AppInfo>> + Send;

    fn fetch_reviews_page(&self, req: &PageRequest) -> impl Future<Output = Result<ReviewPage>> + Send;
}

/// What to pull for one analysis run
#[derive(Clone, Debug)]
pub struct FetchQuery {
    pub app_id: String,
    pub locale: Locale,
    pub sort: SortMode,
    pub max_count: usize,
    pub page_size: usize,
    pub rating: Option<u8>,
}

impl FetchQuery {
    pub fn new(app_id: impl Into<String>, max_count: usize) -> Self {
        Self {
            app_id: app_id.into(),
            locale: Locale::default(),
            sort: SortMode::default(),
            max_count,
            page_size: MAX_PAGE_SIZE,
            rating: None,
        }
    }
}

/// Page through the source until `max_count` reviews are in hand, a page comes back
/// empty, or the provider stops handing out continuation tokens.
pub async fn fetch_reviews<S: ReviewSource>(source: &S, query: &FetchQuery) -> Result<Vec<RawReview>> {
    let start = std::time::Instant::now();
    let page_size = query.page_size.clamp(1, MAX_PAGE_SIZE);
    let mut all: Vec<RawReview> = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;

    while all.len() < query.max_count {
        let req = PageRequest {
            app_id: query.app_id.clone(),
            locale: query.locale.clone(),
            sort: query.sort,
            page_size: page_size.min(query.max_count - all.len()),
            continuation_token: token.take(),
            rating: query.rating,
        };
        let page = source.fetch_reviews_page(&req).await?;
        pages += 1;
        debug!(app_id = %query.app_id, page = pages, size = page.reviews.len(), "fetched review page");

        if page.reviews.is_empty() {
            break;
        }
        all.extend(page.reviews);
        match page.next_token {
            Some(t) => token = Some(t),
            None => break,
        }
    }
    all.truncate(query.max_count);

    info!(
        "Review fetch completed - app={}, pages={}, reviews={}, duration={:.2}s",
        query.app_id,
        pages,
        all.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(all)
}

/// Metadata is optional: on failure log it and fall back to a placeholder.
pub async fn fetch_app_or_placeholder<S: ReviewSource>(source: &S, app_id: &str, locale: &Locale) -> AppInfo {
    match source.fetch_app(app_id, locale).await {
        Ok(info) => info,
        Err(e) => {
            warn!("App metadata unavailable for {}: {}", app_id, e);
            AppInfo::placeholder(app_id)
        }
    }
}
