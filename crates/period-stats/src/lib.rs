use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use review_core::{Review, MAX_SCORE, MIN_SCORE};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Trailing windows, in days, tried from shortest to longest
pub const DEFAULT_WINDOWS: &[u32] = &[7, 30, 60, 90, 120, 180, 270, 365];

/// A window may reach this many days past the oldest review and still be reported
const GRACE_DAYS: i64 = 7;
const DAY_MS: f64 = 86_400_000.0;

/// Rating statistics for one window, or for the whole batch when `days` is `None`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStat {
    pub window_label: String,
    pub days: Option<u32>,
    pub date_range: String,
    pub total: usize,
    pub avg: f64,
    pub star_counts: BTreeMap<u8, usize>,
}

/// Window stats in computation order; serializes as a label-keyed JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeriodBreakdown(pub Vec<PeriodStat>);

impl PeriodBreakdown {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn iter(&self) -> impl Iterator<Item = &PeriodStat> { self.0.iter() }

    pub fn get(&self, label: &str) -> Option<&PeriodStat> {
        self.0.iter().find(|p| p.window_label == label)
    }
}

impl Serialize for PeriodBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for stat in &self.0 {
            map.serialize_entry(&stat.window_label, stat)?;
        }
        map.end()
    }
}

pub fn window_label(days: u32) -> String { format!("Last {} Days", days) }

pub fn all_fetched_label(count: usize) -> String { format!("All Fetched ({} reviews)", count) }

/// e.g. `9 Oct 2026 → 19 Oct 2026`
pub fn format_date_range(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    format!("{} → {}", from.format("%-d %b %Y"), to.format("%-d %b %Y"))
}

fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }

fn summarize<'a, I>(window_label: String, days: Option<u32>, date_range: String, reviews: I) -> PeriodStat
where
    I: IntoIterator<Item = &'a Review>,
{
    let mut star_counts: BTreeMap<u8, usize> = (MIN_SCORE..=MAX_SCORE).map(|s| (s, 0)).collect();
    let mut total = 0usize;
    let mut sum = 0u64;
    for r in reviews {
        *star_counts.entry(r.score).or_default() += 1;
        total += 1;
        sum += r.score as u64;
    }
    let avg = if total == 0 { 0.0 } else { round2(sum as f64 / total as f64) };
    PeriodStat { window_label, days, date_range, total, avg, star_counts }
}

/// Bucket `reviews` into trailing windows ending at `now`, plus one "all fetched" entry.
///
/// Windows longer than the data span (plus a week of grace) are skipped, as are windows
/// with no reviews in them. Undated reviews never land in a window but do count towards
/// the "all fetched" entry. An empty batch gives an empty breakdown.
pub fn build_period_breakdown(reviews: &[Review], windows: &[u32], now: DateTime<Utc>) -> PeriodBreakdown {
    if reviews.is_empty() {
        return PeriodBreakdown::default();
    }

    let oldest = reviews.iter().filter_map(|r| r.date).min();
    let undated = reviews.iter().filter(|r| r.date.is_none()).count();
    if undated > 0 {
        tracing::debug!(undated, "reviews without a usable date skipped for windows");
    }

    let mut out = Vec::new();
    if let Some(oldest) = oldest {
        let span_days = ((now - oldest).num_milliseconds() as f64 / DAY_MS).ceil() as i64;
        let mut sizes = windows.to_vec();
        sizes.sort_unstable();
        sizes.dedup();

        for days in sizes.into_iter().filter(|d| (*d as i64) <= span_days + GRACE_DAYS) {
            let Some(cutoff) = now.checked_sub_signed(Duration::days(days as i64)) else {
                tracing::debug!(days, "window start out of range, skipped");
                continue;
            };
            let subset: Vec<&Review> = reviews
                .iter()
                .filter(|r| r.date.is_some_and(|d| d >= cutoff))
                .collect();
            if subset.is_empty() {
                continue;
            }
            out.push(summarize(window_label(days), Some(days), format_date_range(cutoff, now), subset));
        }
    }

    out.push(summarize(
        all_fetched_label(reviews.len()),
        None,
        format_date_range(oldest.unwrap_or(now), now),
        reviews,
    ));
    PeriodBreakdown(out)
}
