//! Review batch -> analytics summary.

pub mod summary;
pub mod themes;

use chrono::{DateTime, Utc};
use period_stats::{build_period_breakdown, PeriodBreakdown, DEFAULT_WINDOWS};
use review_core::{AppInfo, OverallSentiment, Review};
use serde::{Deserialize, Serialize};
use text_features::{
    count_keywords, extract_phrases, KeywordClassifier, KeywordCount, PhraseCount, PhraseOptions, SentenceClassifier,
    ThemeDetector, Tokenizer, GOOD_KEYWORDS, ISSUE_KEYWORDS, KEYWORD_TOP_N,
};

pub use summary::{good_summary, issue_summary, summarize_themes, ThemeSummary, Verdict};
pub use themes::{build_theme_insights, ThemeBreakdown, ThemeCounts};

pub const ISSUE_STARS: &[u8] = &[1, 2];
pub const GOOD_STARS: &[u8] = &[4, 5];

fn default_top_n() -> usize { 10 }
fn default_min_support() -> usize { 1 }
fn default_windows() -> Vec<u32> { DEFAULT_WINDOWS.to_vec() }
fn default_min_token_len() -> usize { 3 }
fn default_min_unigram_len() -> usize { 5 }

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOptions {
    #[serde(default = "default_top_n", alias = "ratingFilterTopN")]
    pub top_n: usize,
    #[serde(default = "default_min_support")]
    pub min_phrase_support: usize,
    #[serde(default = "default_windows")]
    pub window_sizes_days: Vec<u32>,
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    #[serde(default = "default_min_unigram_len")]
    pub min_unigram_len: usize,
    /// End of every trailing window; the current time when unset
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            min_phrase_support: default_min_support(),
            window_sizes_days: default_windows(),
            min_token_len: default_min_token_len(),
            min_unigram_len: default_min_unigram_len(),
            now: None,
        }
    }
}

impl AnalyzeOptions {
    fn phrase_options(&self) -> PhraseOptions {
        PhraseOptions {
            top_n: self.top_n,
            min_support: self.min_phrase_support,
            min_unigram_len: self.min_unigram_len,
            ..PhraseOptions::default()
        }
    }
}

#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub app_id: String,
    pub app_name: String,
    pub app_icon: Option<String>,
    pub app_rating: Option<f64>,
    pub total_reviews: Option<u64>,
    pub analysed: usize,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub sentiment: OverallSentiment,
    pub insights: ThemeSummary,
    pub theme_breakdown: ThemeBreakdown,
    pub top_issues: Vec<PhraseCount>,
    pub top_good: Vec<PhraseCount>,
    /// Fixed complaint labels over 1-2 star reviews
    pub issue_keywords: Vec<KeywordCount>,
    /// Fixed praise labels over 4-5 star reviews
    pub good_keywords: Vec<KeywordCount>,
    pub issue_summary: String,
    pub good_summary: String,
    pub period_breakdown: PeriodBreakdown,
    pub reviews: Vec<Review>,
}

/// Keep only reviews with the given star rating; 0 keeps everything.
pub fn filter_by_rating(reviews: Vec<Review>, rating: u8) -> Vec<Review> {
    match rating {
        1..=5 => reviews.into_iter().filter(|r| r.score == rating).collect(),
        _ => reviews,
    }
}

/// Analyze with the built-in keyword classifier and theme table.
pub fn analyze(app_id: &str, app: &AppInfo, reviews: Vec<Review>, opts: &AnalyzeOptions) -> AnalysisResult {
    analyze_with(app_id, app, reviews, opts, &KeywordClassifier::default(), &ThemeDetector::default())
}

pub fn analyze_with<C>(
    app_id: &str,
    app: &AppInfo,
    reviews: Vec<Review>,
    opts: &AnalyzeOptions,
    classifier: &C,
    detector: &ThemeDetector<'_>,
) -> AnalysisResult
where
    C: SentenceClassifier + ?Sized,
{
    let now = opts.now.unwrap_or_else(Utc::now);
    let total = reviews.len();
    let positive = reviews.iter().filter(|r| r.is_positive()).count();
    let negative = reviews.iter().filter(|r| r.is_negative()).count();

    let tokenizer = Tokenizer::new().with_min_token_len(opts.min_token_len);
    let phrase_opts = opts.phrase_options();
    let top_issues = extract_phrases(&reviews, ISSUE_STARS, &tokenizer, &phrase_opts);
    let top_good = extract_phrases(&reviews, GOOD_STARS, &tokenizer, &phrase_opts);
    let issue_keywords = count_keywords(&reviews, ISSUE_STARS, ISSUE_KEYWORDS, KEYWORD_TOP_N);
    let good_keywords = count_keywords(&reviews, GOOD_STARS, GOOD_KEYWORDS, KEYWORD_TOP_N);

    let theme_breakdown = build_theme_insights(&reviews, classifier, detector);
    let insights = summarize_themes(&theme_breakdown);
    let period_breakdown = build_period_breakdown(&reviews, &opts.window_sizes_days, now);

    tracing::info!(
        app_id,
        analysed = total,
        positive,
        negative,
        themes = theme_breakdown.len(),
        windows = period_breakdown.len(),
        "analysis complete"
    );

    AnalysisResult {
        app_id: app_id.to_string(),
        app_name: app.title.clone().unwrap_or_else(|| app_id.to_string()),
        app_icon: app.icon.clone(),
        app_rating: app.score,
        total_reviews: app.ratings_count,
        analysed: total,
        positive,
        negative,
        neutral: total - positive - negative,
        sentiment: OverallSentiment::from_counts(positive, total),
        insights,
        issue_summary: issue_summary(&top_issues),
        good_summary: good_summary(&top_good),
        theme_breakdown,
        top_issues,
        top_good,
        issue_keywords,
        good_keywords,
        period_breakdown,
        reviews,
    }
}
