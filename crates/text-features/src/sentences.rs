use review_core::Sentiment;

pub const POSITIVE_HINTS: &[&str] = &["easy", "fast", "smooth", "helpful", "love", "great", "excellent"];
pub const NEGATIVE_HINTS: &[&str] = &["not", "fail", "error", "issue", "problem", "slow", "crash", "bug"];

/// Fragments this short (in chars) carry too little signal to classify
const MIN_SENTENCE_CHARS: usize = 20;

/// Anything that can put a polarity on one sentence.
pub trait SentenceClassifier {
    fn classify(&self, sentence: &str) -> Sentiment;
}

impl<F> SentenceClassifier for F
where
    F: Fn(&str) -> Sentiment,
{
    fn classify(&self, sentence: &str) -> Sentiment { self(sentence) }
}

/// Substring keyword matcher. Negative hints win over positive ones.
#[derive(Debug, Clone, Copy)]
pub struct KeywordClassifier {
    positive: &'static [&'static str],
    negative: &'static [&'static str],
}

impl Default for KeywordClassifier {
    fn default() -> Self { Self { positive: POSITIVE_HINTS, negative: NEGATIVE_HINTS } }
}

impl KeywordClassifier {
    pub fn new(positive: &'static [&'static str], negative: &'static [&'static str]) -> Self {
        Self { positive, negative }
    }
}

impl SentenceClassifier for KeywordClassifier {
    fn classify(&self, sentence: &str) -> Sentiment {
        let s = sentence.to_lowercase();
        if self.negative.iter().any(|w| s.contains(w)) {
            Sentiment::Negative
        } else if self.positive.iter().any(|w| s.contains(w)) {
            Sentiment::Positive
        } else {
            Sentiment::Neutral
        }
    }
}

/// Split on `.`, `!` and `?`, trim, and keep fragments longer than 20 chars.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

pub fn classify_sentences<'t, C>(text: &'t str, classifier: &C) -> Vec<(&'t str, Sentiment)>
where
    C: SentenceClassifier + ?Sized,
{
    split_sentences(text).into_iter().map(|s| (s, classifier.classify(s))).collect()
}
