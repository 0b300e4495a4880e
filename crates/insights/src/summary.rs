use serde::Serialize;
use text_features::PhraseCount;

use crate::themes::{ThemeBreakdown, ThemeCounts};

const MAX_LISTED: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSummary {
    pub what_users_like: Vec<String>,
    pub what_users_want_improved: Vec<String>,
    pub summary_text: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict { Like, Concern }

/// Strict majority decides; a tie (including 0/0) is neither.
pub fn verdict(c: ThemeCounts) -> Option<Verdict> {
    if c.positive > c.negative {
        Some(Verdict::Like)
    } else if c.negative > c.positive {
        Some(Verdict::Concern)
    } else {
        None
    }
}

/// "a", "a and b", "a, b and c"
pub fn join_human(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => one.to_string(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

pub fn summarize_themes(themes: &ThemeBreakdown) -> ThemeSummary {
    let mut likes = Vec::new();
    let mut improve = Vec::new();
    for (name, counts) in themes.iter() {
        match verdict(counts) {
            Some(Verdict::Like) => likes.push(name),
            Some(Verdict::Concern) => improve.push(name),
            None => {}
        }
    }

    let top_likes = join_human(&likes[..likes.len().min(2)]);
    let top_improve = join_human(&improve[..improve.len().min(2)]);
    let summary_text = format!(
        "Users appreciate {}, but face issues with {}.",
        if top_likes.is_empty() { "some aspects" } else { top_likes.as_str() },
        if top_improve.is_empty() { "certain areas" } else { top_improve.as_str() },
    );

    ThemeSummary {
        what_users_like: likes.iter().take(MAX_LISTED).map(|s| s.to_string()).collect(),
        what_users_want_improved: improve.iter().take(MAX_LISTED).map(|s| s.to_string()).collect(),
        summary_text,
    }
}

fn phrase_sentence(phrases: &[PhraseCount], lead: &str, fallback: &str) -> String {
    let top: Vec<&str> = phrases.iter().take(3).map(|p| p.phrase.as_str()).collect();
    if top.is_empty() {
        fallback.to_string()
    } else {
        format!("{} {}.", lead, join_human(&top))
    }
}

pub fn issue_summary(top_issues: &[PhraseCount]) -> String {
    phrase_sentence(top_issues, "Top reported issues:", "No recurring issues found.")
}

pub fn good_summary(top_good: &[PhraseCount]) -> String {
    phrase_sentence(top_good, "Users frequently mention:", "No recurring praise found.")
}
