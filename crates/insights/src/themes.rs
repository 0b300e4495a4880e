use std::collections::HashMap;

use review_core::{Review, Sentiment};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use text_features::{classify_sentences, SentenceClassifier, ThemeDetector};

/// Weighted sentence counts for one theme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ThemeCounts { pub positive: u64, pub negative: u64 }

impl ThemeCounts {
    fn add(&mut self, sentiment: Sentiment, weight: u64) {
        match sentiment {
            Sentiment::Positive => self.positive += weight,
            Sentiment::Negative => self.negative += weight,
            Sentiment::Neutral => {}
        }
    }
}

/// Per-theme counts in theme table order; serializes as a name-keyed JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThemeBreakdown(pub Vec<(String, ThemeCounts)>);

impl ThemeBreakdown {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }

    pub fn get(&self, theme: &str) -> Option<ThemeCounts> {
        self.0.iter().find(|(name, _)| name == theme).map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ThemeCounts)> {
        self.0.iter().map(|(name, c)| (name.as_str(), *c))
    }
}

impl Serialize for ThemeBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, counts) in &self.0 {
            map.serialize_entry(name, counts)?;
        }
        map.end()
    }
}

/// For every non-neutral sentence and every theme it mentions, add the review's weight
/// (helpful votes, minimum one) to that theme's positive or negative counter.
pub fn build_theme_insights<C>(reviews: &[Review], classifier: &C, detector: &ThemeDetector<'_>) -> ThemeBreakdown
where
    C: SentenceClassifier + ?Sized,
{
    let mut acc: HashMap<&str, ThemeCounts> = HashMap::new();
    for r in reviews.iter().filter(|r| !r.text.is_empty()) {
        let weight = r.weight();
        for (sentence, sentiment) in classify_sentences(&r.text, classifier) {
            if sentiment == Sentiment::Neutral {
                continue;
            }
            for theme in detector.detect(sentence) {
                acc.entry(theme).or_default().add(sentiment, weight);
            }
        }
    }

    ThemeBreakdown(
        detector
            .theme_names()
            .filter_map(|name| acc.get(name).map(|c| (name.to_string(), *c)))
            .collect(),
    )
}
