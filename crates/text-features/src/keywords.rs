use review_core::Review;
use serde::Serialize;

use crate::themes::ThemeDetector;

/// How many keyword labels a report keeps
pub const KEYWORD_TOP_N: usize = 8;

/// Complaint labels, matched against 1-2 star reviews
pub const ISSUE_KEYWORDS: &[(&str, &[&str])] = &[
    ("App crashes / freezes", &["crash", "freeze", "frozen", "hang", "stuck", "not opening", "force close", "black screen"]),
    ("Login / OTP problems", &["otp", "login", "sign in", "can't log", "logout", "logged out", "verify"]),
    ("Payment failures", &["payment", "failed", "deducted", "charged", "refund", "money", "transaction"]),
    ("Slow / laggy", &["slow", "lag", "lagging", "loading", "takes forever", "buffer"]),
    ("Order / delivery issues", &["order", "deliver", "late", "delayed", "wrong product", "return"]),
    ("Customer support", &["support", "customer care", "no response", "ignored", "useless", "not helpful"]),
    ("Bugs / errors", &["bug", "error", "glitch", "broken", "not working", "doesn't work"]),
    ("Too many ads", &["ad", "ads", "advertisement", "popup", "spam", "notification"]),
    ("Poor UI / UX", &["confusing", "complicated", "bad design", "ugly", "layout"]),
];

/// Praise labels, matched against 4-5 star reviews
pub const GOOD_KEYWORDS: &[(&str, &[&str])] = &[
    ("Easy to use", &["easy", "simple", "smooth", "user friendly", "intuitive", "clean"]),
    ("Fast & reliable", &["fast", "quick", "instant", "reliable", "stable", "works great"]),
    ("Good offers / cashback", &["cashback", "offer", "discount", "reward", "deal", "savings"]),
    ("Great customer support", &["support", "helpful", "resolved", "quick response", "great service"]),
    ("Seamless payments", &["seamless", "easy payment", "quick pay", "smooth transaction"]),
    ("Trustworthy / secure", &["safe", "secure", "trust", "genuine", "authentic"]),
    ("Value for money", &["value", "worth", "affordable", "cheap", "cost effective"]),
    ("Overall love it", &["love", "amazing", "excellent", "fantastic", "best app", "perfect"]),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeywordCount { pub label: String, pub count: usize }

/// Number of reviews (score in `stars`) matching each label of `bank`, most frequent
/// first. Ties keep bank order; labels with no match are left out.
pub fn count_keywords<'a, I>(reviews: I, stars: &[u8], bank: &[(&str, &[&str])], top_n: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a Review>,
{
    let detector = ThemeDetector::new(bank);
    let mut counts: Vec<KeywordCount> =
        detector.theme_names().map(|label| KeywordCount { label: label.to_string(), count: 0 }).collect();

    for r in reviews.into_iter().filter(|r| stars.contains(&r.score)) {
        for label in detector.detect(&r.text) {
            if let Some(entry) = counts.iter_mut().find(|c| c.label == label) {
                entry.count += 1;
            }
        }
    }

    counts.retain(|c| c.count > 0);
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    counts
}
