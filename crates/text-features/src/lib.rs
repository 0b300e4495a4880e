//! Text side of review analytics: tokenizing, phrase counting, sentence polarity and themes.

pub mod keywords;
pub mod phrases;
pub mod sentences;
pub mod themes;
pub mod tokenizer;

pub use keywords::{count_keywords, KeywordCount, GOOD_KEYWORDS, ISSUE_KEYWORDS, KEYWORD_TOP_N};
pub use phrases::{extract_phrases, PhraseCount, PhraseOptions};
pub use sentences::{classify_sentences, split_sentences, KeywordClassifier, SentenceClassifier};
pub use themes::{ThemeDetector, DEFAULT_THEMES};
pub use tokenizer::{is_stopword, Tokenizer};
