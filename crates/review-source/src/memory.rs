use std::path::Path;

use review_core::{AppInfo, RawReview};
use serde::Deserialize;

use crate::{Locale, PageRequest, Result, ReviewPage, ReviewSource, SourceError};

/// Serves a fixed batch in pages; the continuation token is the next offset.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    app: Option<AppInfo>,
    reviews: Vec<RawReview>,
    failure: Option<Failure>,
}

/// Error every page request answers with, once primed
#[derive(Clone, Debug)]
enum Failure {
    Unavailable(String),
    AppNotFound,
    RateLimited,
}

/// On-disk dump: either `{"app": {...}, "reviews": [...]}` or a bare review array
#[derive(Deserialize)]
#[serde(untagged)]
enum Dump {
    Bare(Vec<RawReview>),
    Full {
        #[serde(default)]
        app: Option<AppInfo>,
        #[serde(alias = "data")]
        reviews: Vec<RawReview>,
    },
}

impl MemorySource {
    pub fn new(reviews: Vec<RawReview>) -> Self { Self { reviews, ..Default::default() } }

    pub fn with_app(mut self, app: AppInfo) -> Self {
        self.app = Some(app);
        self
    }

    /// Every page request fails with `message`
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(Failure::Unavailable(message.into()));
        self
    }

    /// Every page request reports the app as unknown
    pub fn app_not_found(mut self) -> Self {
        self.failure = Some(Failure::AppNotFound);
        self
    }

    /// Every page request hits the provider's rate limit
    pub fn rate_limited(mut self) -> Self {
        self.failure = Some(Failure::RateLimited);
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(match serde_json::from_str::<Dump>(s)? {
            Dump::Bare(reviews) => Self::new(reviews),
            Dump::Full { app, reviews } => Self { app, reviews, failure: None },
        })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize { self.reviews.len() }
    pub fn is_empty(&self) -> bool { self.reviews.is_empty() }
}

impl ReviewSource for MemorySource {
    async fn fetch_app(&self, app_id: &str, _locale: &Locale) -> Result<AppInfo> {
        self.app.clone().ok_or_else(|| SourceError::AppNotFound(app_id.to_string()))
    }

    async fn fetch_reviews_page(&self, req: &PageRequest) -> Result<ReviewPage> {
        if let Some(failure) = &self.failure {
            return Err(match failure {
                Failure::Unavailable(msg) => SourceError::Unavailable(msg.clone()),
                Failure::AppNotFound => SourceError::AppNotFound(req.app_id.clone()),
                Failure::RateLimited => SourceError::RateLimited,
            });
        }
        let offset = match &req.continuation_token {
            Some(t) => t.parse::<usize>().map_err(|_| SourceError::InvalidToken(t.clone()))?,
            None => 0,
        };
        let matching: Vec<&RawReview> = self
            .reviews
            .iter()
            .filter(|r| req.rating.map_or(true, |stars| r.score == stars as i64))
            .collect();

        let end = (offset + req.page_size).min(matching.len());
        let reviews = matching.get(offset..end).unwrap_or_default().iter().map(|r| (*r).clone()).collect();
        let next_token = (end < matching.len()).then(|| end.to_string());
        Ok(ReviewPage { reviews, next_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortMode;

    fn page_req(token: Option<&str>, page_size: usize, rating: Option<u8>) -> PageRequest {
        PageRequest {
            app_id: "app".into(),
            locale: Locale::default(),
            sort: SortMode::Newest,
            page_size,
            continuation_token: token.map(str::to_string),
            rating,
        }
    }

    #[tokio::test]
    async fn test_pages_and_tokens() {
        let src = MemorySource::from_json_str(r#"[{"score":1},{"score":2},{"score":3}]"#).unwrap();
        let first = src.fetch_reviews_page(&page_req(None, 2, None)).await.unwrap();
        assert_eq!(first.reviews.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));
        let second = src.fetch_reviews_page(&page_req(Some("2"), 2, None)).await.unwrap();
        assert_eq!(second.reviews.len(), 1);
        assert!(second.next_token.is_none());
    }

    #[tokio::test]
    async fn test_rating_filter_and_bad_token() {
        let src = MemorySource::from_json_str(
            r#"{"app": {"title": "Example"}, "reviews": [{"score":5},{"score":1},{"score":5}]}"#,
        )
        .unwrap();
        let page = src.fetch_reviews_page(&page_req(None, 10, Some(5))).await.unwrap();
        assert_eq!(page.reviews.len(), 2);
        assert!(matches!(
            src.fetch_reviews_page(&page_req(Some("abc"), 10, None)).await,
            Err(SourceError::InvalidToken(_))
        ));
        let info = src.fetch_app("app", &Locale::default()).await.unwrap();
        assert_eq!(info.title.as_deref(), Some("Example"));
    }

    #[tokio::test]
    async fn test_primed_failures() {
        let src = MemorySource::new(vec![RawReview::default()]).app_not_found();
        assert!(matches!(
            src.fetch_reviews_page(&page_req(None, 10, None)).await,
            Err(SourceError::AppNotFound(id)) if id == "app"
        ));
        let src = MemorySource::new(vec![RawReview::default()]).rate_limited();
        assert!(matches!(src.fetch_reviews_page(&page_req(None, 10, None)).await, Err(SourceError::RateLimited)));
        let src = MemorySource::new(vec![]).failing("down");
        assert!(matches!(src.fetch_reviews_page(&page_req(None, 10, None)).await, Err(SourceError::Unavailable(m)) if m == "down"));
    }

    #[tokio::test]
    async fn test_offset_past_end_is_empty() {
        let src = MemorySource::new(vec![RawReview::default()]);
        let page = src.fetch_reviews_page(&page_req(Some("5"), 10, None)).await.unwrap();
        assert!(page.reviews.is_empty());
        assert!(page.next_token.is_none());
    }
}
