use lazy_static::lazy_static;
use regex::Regex;

use crate::config::VectorizerConfig;

lazy_static! {
    /// Runs of two or more word characters; single characters are dropped.
    static ref TOKEN_PATTERN: Regex = Regex::new(r"\b\w\w+\b").unwrap();
}

/// Splits text into the terms counted by the vectorizer.
///
/// Tokens are extracted with [`TOKEN_PATTERN`] after optional lowercasing and
/// then expanded into word n-grams joined by a single space, smallest size
/// first.
pub(crate) fn analyze(text: &str, config: &VectorizerConfig) -> Vec<String> {
    let text = if config.lowercase {
        text.to_lowercase()
    } else {
        text.to_string()
    };

    let tokens: Vec<&str> = TOKEN_PATTERN.find_iter(&text).map(|m| m.as_str()).collect();

    let (min_n, max_n) = config.ngram_range;
    if min_n == 1 && max_n == 1 {
        return tokens.into_iter().map(str::to_string).collect();
    }

    let mut terms = Vec::new();
    for n in min_n..=max_n.min(tokens.len()) {
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}
