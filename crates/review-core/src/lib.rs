use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Timestamp as the provider sends it: a date string or epoch milliseconds.
/// Any other JSON lands in `Other` so one bad date never rejects the page.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
    Other(Value),
}

/// One review exactly as the provider returns it. Every field except the score may be missing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: i64,
    #[serde(default, alias = "text")]
    pub content: Option<String>,
    #[serde(default, alias = "date")]
    pub at: Option<RawTimestamp>,
    #[serde(default, alias = "thumbsUp", deserialize_with = "lenient_count")]
    pub thumbs_up_count: Option<u64>,
    #[serde(default, alias = "version")]
    pub review_created_version: Option<String>,
    #[serde(default, alias = "replyText")]
    pub reply_content: Option<String>,
    #[serde(default, alias = "replyDate")]
    pub replied_at: Option<RawTimestamp>,
}

/// Normalized review; the unit every analytics stage works on.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_name: String,
    pub score: u8,
    pub text: String,
    #[serde(serialize_with = "iso_or_null")]
    pub date: Option<DateTime<Utc>>,
    pub thumbs_up: u64,
    pub version: String,
    pub reply_text: String,
    #[serde(serialize_with = "iso_or_empty")]
    pub reply_date: Option<DateTime<Utc>>,
}

impl Review {
    /// Minimal constructor, mostly for callers that build batches by hand.
    pub fn new(score: u8, text: impl Into<String>, date: Option<DateTime<Utc>>) -> Self {
        Self {
            user_name: "Anonymous".into(),
            score: clamp_score(score as i64),
            text: text.into(),
            date,
            thumbs_up: 0,
            version: String::new(),
            reply_text: String::new(),
            reply_date: None,
        }
    }

    pub fn with_thumbs_up(mut self, thumbs_up: u64) -> Self {
        self.thumbs_up = thumbs_up;
        self
    }

    pub fn from_raw(raw: RawReview) -> Self {
        let score = clamp_score(raw.score);
        if score as i64 != raw.score {
            tracing::debug!(raw = raw.score, clamped = score, "review score out of range");
        }
        let date = raw.at.as_ref().and_then(parse_timestamp);
        if raw.at.is_some() && date.is_none() {
            tracing::debug!(at = ?raw.at, "unparsable review date, excluded from windows");
        }
        Self {
            user_name: raw
                .user_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Anonymous".into()),
            score,
            text: raw.content.unwrap_or_default(),
            date,
            thumbs_up: raw.thumbs_up_count.unwrap_or(0),
            version: raw.review_created_version.unwrap_or_default(),
            reply_text: raw.reply_content.unwrap_or_default(),
            reply_date: raw.replied_at.as_ref().and_then(parse_timestamp),
        }
    }

    /// Weight of this review in theme aggregation: helpful votes, at least one.
    pub fn weight(&self) -> u64 { self.thumbs_up.max(1) }

    pub fn is_positive(&self) -> bool { self.score >= 4 }
    pub fn is_negative(&self) -> bool { self.score <= 2 }
}

pub fn normalize_batch(raw: Vec<RawReview>) -> Vec<Review> {
    raw.into_iter().map(Review::from_raw).collect()
}

pub fn clamp_score(score: i64) -> u8 {
    score.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u8
}

/// Parse provider timestamps: RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` or epoch millis.
/// Anything else yields `None`.
pub fn parse_timestamp(ts: &RawTimestamp) -> Option<DateTime<Utc>> {
    match ts {
        RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
        RawTimestamp::FractionalMillis(ms) if ms.is_finite() && ms.abs() < i64::MAX as f64 => {
            Utc.timestamp_millis_opt(ms.round() as i64).single()
        }
        RawTimestamp::FractionalMillis(_) | RawTimestamp::Other(_) => None,
        RawTimestamp::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt.and_utc());
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
            }
            s.parse::<i64>().ok().and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        }
    }
}

/// Integer, float (rounded) or numeric string; null and anything else read as 0,
/// which clamps to the lowest score.
fn lenient_score<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let n = match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    };
    Ok(n.unwrap_or(0))
}

fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

fn iso_or_null<S: Serializer>(d: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(dt) => s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => s.serialize_none(),
    }
}

fn iso_or_empty<S: Serializer>(d: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(dt) => s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => s.serialize_str(""),
    }
}

/// App metadata from the store listing
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub score: Option<f64>,
    #[serde(alias = "reviews")]
    pub ratings_count: Option<u64>,
}

impl AppInfo {
    /// Stand-in used when the metadata fetch fails: the id doubles as the title.
    pub fn placeholder(app_id: &str) -> Self {
        Self { title: Some(app_id.to_string()), ..Default::default() }
    }
}

/// Polarity of a single sentence
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment { Positive, Negative, Neutral }

/// Polarity of a whole batch
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallSentiment { Positive, Negative, Mixed }

impl OverallSentiment {
    /// Share of 4-5 star reviews: > 0.6 positive, < 0.4 negative, otherwise mixed.
    /// An empty batch is mixed.
    pub fn from_counts(positive: usize, total: usize) -> Self {
        if total == 0 {
            return Self::Mixed;
        }
        let ratio = positive as f64 / total as f64;
        if ratio > 0.6 {
            Self::Positive
        } else if ratio < 0.4 {
            Self::Negative
        } else {
            Self::Mixed
        }
    }
}
