use std::collections::HashMap;

use review_core::Review;
use serde::Serialize;

use crate::tokenizer::Tokenizer;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhraseCount { pub phrase: String, pub count: usize }

#[derive(Clone, Copy, Debug)]
pub struct PhraseOptions {
    pub top_n: usize,
    /// Phrases seen fewer times than this are dropped before ranking
    pub min_support: usize,
    /// Single words must be strictly longer than this to be counted
    pub min_unigram_len: usize,
    /// Longest n-gram counted (1..=3)
    pub max_ngram: usize,
}

impl Default for PhraseOptions {
    fn default() -> Self { Self { top_n: 10, min_support: 1, min_unigram_len: 5, max_ngram: 3 } }
}

/// Count unigrams, bigrams and trigrams over reviews whose score is in `stars`,
/// then rank by count (descending) and phrase (ascending).
pub fn extract_phrases<'a, I>(reviews: I, stars: &[u8], tokenizer: &Tokenizer, opts: &PhraseOptions) -> Vec<PhraseCount>
where
    I: IntoIterator<Item = &'a Review>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in reviews.into_iter().filter(|r| stars.contains(&r.score)) {
        let tokens = tokenizer.tokenize(&r.text);
        for t in tokens.iter().filter(|t| t.len() > opts.min_unigram_len) {
            *counts.entry(t.clone()).or_default() += 1;
        }
        for n in 2..=opts.max_ngram.min(3) {
            for window in tokens.windows(n) {
                *counts.entry(window.join(" ")).or_default() += 1;
            }
        }
    }

    let min_support = opts.min_support.max(1);
    let mut ranked: Vec<PhraseCount> = counts
        .into_iter()
        .filter(|(_, c)| *c >= min_support)
        .map(|(phrase, count)| PhraseCount { phrase, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phrase.cmp(&b.phrase)));
    ranked.truncate(opts.top_n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(score: u8, text: &str) -> Review { Review::new(score, text, None) }

    fn phrases(reviews: &[Review], stars: &[u8], opts: PhraseOptions) -> Vec<PhraseCount> {
        extract_phrases(reviews, stars, &Tokenizer::new(), &opts)
    }

    #[test]
    fn test_counts_unigrams_bigrams_trigrams() {
        let batch = [review(1, "Payment failed, terrible experience, please fix the payment issue")];
        let out = phrases(&batch, &[1, 2], PhraseOptions { top_n: 50, ..Default::default() });
        assert_eq!(out[0], PhraseCount { phrase: "payment".into(), count: 2 });
        let names: Vec<_> = out.iter().map(|p| p.phrase.as_str()).collect();
        assert!(names.contains(&"payment issue"));
        assert!(names.contains(&"payment failed terrible"));
        // "issue" is five letters, below the unigram cutoff
        assert!(!names.contains(&"issue"));
    }

    #[test]
    fn test_star_filter() {
        let batch = [review(5, "smooth checkout experience"), review(1, "broken checkout experience")];
        let out = phrases(&batch, &[4, 5], PhraseOptions::default());
        assert!(out.iter().all(|p| !p.phrase.contains("broken")));
        assert!(out.iter().any(|p| p.phrase == "smooth checkout"));
    }

    #[test]
    fn test_ties_break_lexicographically() {
        let batch = [review(1, "zebra crossing"), review(1, "apple orchard")];
        let out = phrases(&batch, &[1], PhraseOptions { min_unigram_len: 100, ..Default::default() });
        assert_eq!(
            out.iter().map(|p| p.phrase.as_str()).collect::<Vec<_>>(),
            vec!["apple orchard", "zebra crossing"]
        );
    }

    #[test]
    fn test_min_support_and_top_n() {
        let batch = [
            review(2, "login keeps failing"),
            review(2, "login keeps failing again"),
            review(2, "random words here"),
        ];
        let out = phrases(&batch, &[2], PhraseOptions { top_n: 3, min_support: 2, ..Default::default() });
        assert!(out.len() <= 3);
        assert!(out.iter().all(|p| p.count >= 2));
        assert!(out.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(out[0].phrase, "failing");
    }

    #[test]
    fn test_empty_batch() {
        assert!(phrases(&[], &[1, 2], PhraseOptions::default()).is_empty());
    }
}
