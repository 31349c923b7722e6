//! Keyword spans
//!
//! Article keywords are matched case-insensitively on word boundaries and every
//! token a match overlaps is tagged with the keyword as the article spells it.
//! Multi-word keywords therefore tag the whitespace between their words too.

use crate::registry::Token;
use regex::Regex;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct KeywordMatcher {
    patterns: Vec<(String, Regex)>,
}

impl KeywordMatcher {
    pub fn new(keywords: &[String]) -> Self {
        let patterns = keywords
            .iter()
            .map(|keyword| keyword.trim())
            .filter(|keyword| !keyword.is_empty())
            .filter_map(|keyword| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
                match Regex::new(&pattern) {
                    Ok(regex) => Some((keyword.to_string(), regex)),
                    Err(err) => {
                        warn!(keyword, error = %err, "ignoring keyword");
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Tag the tokens of `text` overlapped by a keyword. Earlier keywords win.
    pub fn mark(&self, text: &str, tokens: &mut [Token]) {
        for (keyword, regex) in &self.patterns {
            for found in regex.find_iter(text) {
                let start = text[..found.start()].chars().count();
                let end = start + found.as_str().chars().count();
                for token in tokens
                    .iter_mut()
                    .filter(|token| token.start < end && start < token.end())
                {
                    if token.keyword.is_none() {
                        token.keyword = Some(keyword.clone());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tokenize;

    fn marked(keywords: &[&str], text: &str) -> Vec<(String, Option<String>)> {
        let matcher = KeywordMatcher::new(&keywords.iter().map(|k| k.to_string()).collect::<Vec<_>>());
        let mut tokens = tokenize(text);
        matcher.mark(text, &mut tokens);
        tokens
            .into_iter()
            .filter(|token| token.keyword.is_some())
            .map(|token| (token.text, token.keyword))
            .collect()
    }

    #[test]
    fn test_case_insensitive_match() {
        assert_eq!(
            marked(&["rust"], "RUST and Rust."),
            vec![
                ("RUST".to_string(), Some("rust".to_string())),
                ("Rust".to_string(), Some("rust".to_string()))
            ]
        );
    }

    #[test]
    fn test_special_characters_are_literal() {
        let texts: Vec<String> = marked(&["node.js"], "Try node.js now.")
            .into_iter()
            .map(|(text, _)| text)
            .collect();
        assert_eq!(texts, vec!["node", ".", "js"]);
        assert!(marked(&["node.js"], "Try nodexjs now.").is_empty());
    }

    #[test]
    fn test_blank_keywords_are_ignored() {
        assert!(KeywordMatcher::new(&["  ".to_string()]).is_empty());
    }
}
