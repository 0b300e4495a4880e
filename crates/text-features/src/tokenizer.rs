use std::collections::HashSet;
use std::sync::LazyLock;

/// Words too common in store reviews to say anything about the app
const STOPWORDS_LIST: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
    "is", "it", "its", "this", "that", "was", "are", "be", "been", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "not", "no", "so", "if",
    "i", "my", "me", "we", "you", "your", "they", "them", "app", "use", "get", "just",
    "also", "very", "good", "great", "nice", "bad", "even", "still", "after", "before",
    "when", "than", "more", "all", "some", "one", "time", "way", "make", "now", "new",
    "well", "really", "much", "many", "like", "please", "thank", "thanks",
];

static STOPWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS_LIST.iter().copied().collect());

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Lowercase, letters-only tokenizer. Token order is kept so n-grams stay adjacent.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    /// Tokens must be strictly longer than this
    min_token_len: usize,
}

impl Default for Tokenizer {
    fn default() -> Self { Self { min_token_len: 3 } }
}

impl Tokenizer {
    pub fn new() -> Self { Self::default() }

    pub fn with_min_token_len(mut self, len: usize) -> Self {
        self.min_token_len = len;
        self
    }

    /// Lowercase `text` and blank out everything that is not `a-z` or whitespace.
    pub fn normalize(text: &str) -> String {
        text.to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_lowercase() || c.is_whitespace() { c } else { ' ' })
            .collect()
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        Self::normalize(text)
            .split_whitespace()
            .filter(|t| t.len() > self.min_token_len && !is_stopword(t))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_punctuation_and_stopwords() {
        let t = Tokenizer::new();
        assert_eq!(
            t.tokenize("Payment failed, terrible experience, please fix the payment issue"),
            vec!["payment", "failed", "terrible", "experience", "payment", "issue"]
        );
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        let t = Tokenizer::new();
        assert_eq!(t.tokenize("UPI fix now ok wallet"), vec!["wallet"]);
        assert_eq!(
            Tokenizer::new().with_min_token_len(2).tokenize("upi fix ok wallet"),
            vec!["upi", "fix", "wallet"]
        );
    }

    #[test]
    fn test_digits_and_accents_split_words() {
        let t = Tokenizer::new();
        assert_eq!(t.tokenize("version2update café-crashes"), vec!["version", "update", "crashes"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(Tokenizer::new().tokenize("").is_empty());
        assert!(Tokenizer::new().tokenize("  ...!!! ").is_empty());
    }

    #[test]
    fn test_idempotent_on_normalized_text() {
        let t = Tokenizer::new();
        let text = "smooth checkout flow loads quickly";
        let tokens = t.tokenize(text);
        assert_eq!(tokens, text.split(' ').collect::<Vec<_>>());
        assert_eq!(t.tokenize(&tokens.join(" ")), tokens);
    }
}
