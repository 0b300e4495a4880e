use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use review_core::AppInfo;
use tracing::debug;

use crate::{Locale, PageRequest, Result, ReviewPage, ReviewSource, SourceError};

/// Client for a store-scraper HTTP endpoint exposing
/// `GET /apps/{id}` and `GET /apps/{id}/reviews`.
#[derive(Clone, Debug)]
pub struct HttpReviewSource {
    client: Client,
    endpoint: Url,
}

impl HttpReviewSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(client, endpoint)
    }

    pub fn with_client(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| SourceError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(SourceError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self { client, endpoint })
    }

    /// Endpoint path + `segments`, each percent-encoded as a single path segment.
    fn url_with(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn app_url(&self, app_id: &str) -> Url { self.url_with(&["apps", app_id]) }

    pub fn reviews_url(&self, app_id: &str) -> Url { self.url_with(&["apps", app_id, "reviews"]) }
}

pub(crate) fn locale_params(locale: &Locale) -> Vec<(&'static str, String)> {
    vec![("lang", locale.lang.clone()), ("country", locale.country.clone())]
}

pub(crate) fn page_params(req: &PageRequest) -> Vec<(&'static str, String)> {
    let mut params = locale_params(&req.locale);
    params.push(("sort", req.sort.code().to_string()));
    params.push(("num", req.page_size.to_string()));
    if let Some(token) = &req.continuation_token {
        params.push(("token", token.clone()));
    }
    if let Some(stars) = req.rating.filter(|s| (1..=5).contains(s)) {
        params.push(("rating", stars.to_string()));
    }
    params
}

fn check_status(resp: Response, app_id: &str, url: &str) -> Result<Response> {
    match resp.status() {
        s if s.is_success() => Ok(resp),
        StatusCode::NOT_FOUND => Err(SourceError::AppNotFound(app_id.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(SourceError::RateLimited),
        s => Err(SourceError::Status { status: s.as_u16(), url: url.to_string() }),
    }
}

impl ReviewSource for HttpReviewSource {
    async fn fetch_app(&self, app_id: &str, locale: &Locale) -> Result<AppInfo> {
        let url = self.app_url(app_id);
        debug!("Fetching app metadata - url={}", url);
        let resp = self.client.get(url.clone()).query(&locale_params(locale)).send().await?;
        let info: AppInfo = check_status(resp, app_id, url.as_str())?.json().await?;
        Ok(info)
    }

    async fn fetch_reviews_page(&self, req: &PageRequest) -> Result<ReviewPage> {
        let url = self.reviews_url(&req.app_id);
        debug!(
            "Fetching review page - url={}, num={}, has_token={}",
            url,
            req.page_size,
            req.continuation_token.is_some()
        );
        let resp = self.client.get(url.clone()).query(&page_params(req)).send().await?;
        let page: ReviewPage = check_status(resp, &req.app_id, url.as_str())?.json().await?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortMode;

    #[test]
    fn test_urls_trim_trailing_slash() {
        let src = HttpReviewSource::with_client(Client::new(), "http://localhost:3000/").unwrap();
        assert_eq!(src.app_url("com.example").as_str(), "http://localhost:3000/apps/com.example");
        assert_eq!(src.reviews_url("com.example").as_str(), "http://localhost:3000/apps/com.example/reviews");

        let nested = HttpReviewSource::with_client(Client::new(), "http://scraper:3000/play/").unwrap();
        assert_eq!(nested.app_url("com.example").as_str(), "http://scraper:3000/play/apps/com.example");
    }

    #[test]
    fn test_app_id_stays_one_path_segment() {
        let src = HttpReviewSource::with_client(Client::new(), "http://scraper:3000").unwrap();
        let url = src.reviews_url("x/../../admin?drop=1#");
        assert_eq!(url.host_str(), Some("scraper"));
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], "apps");
        assert_eq!(segments[2], "reviews");
        assert!(segments[1].starts_with("x%2F..%2F..%2Fadmin%3F"));
        assert!(segments[1].ends_with("%23"));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            HttpReviewSource::with_client(Client::new(), "not a url"),
            Err(SourceError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            HttpReviewSource::with_client(Client::new(), "mailto:ops@example.com"),
            Err(SourceError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_page_params() {
        let req = PageRequest {
            app_id: "com.example".into(),
            locale: Locale::default(),
            sort: SortMode::Rating,
            page_size: 150,
            continuation_token: Some("tok".into()),
            rating: Some(9),
        };
        let params = page_params(&req);
        assert!(params.contains(&("sort", "3".to_string())));
        assert!(params.contains(&("num", "150".to_string())));
        assert!(params.contains(&("token", "tok".to_string())));
        assert!(params.contains(&("lang", "en".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "rating"));
    }
}
