//! Document renderer
//!
//! Turns an [`Article`] (ranked sentences grouped in paragraphs, plus the
//! article keywords) into a [`SentenceRegistry`]. Rendering is the only place
//! sentences are created; every call builds a fresh registry with ids assigned
//! in document order.
//!
//! Sentence text is normalised before tokenizing: whitespace runs collapse to
//! a single space and the ends are trimmed. Stored range offsets refer to this
//! normalised text.

pub mod keywords;

use crate::error::DocumentError;
use crate::registry::{tokenize, Rank, Sentence, SentenceId, SentenceRegistry};
use keywords::KeywordMatcher;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Source article with rank metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Document URL, the key annotations are stored under
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub sentences: Vec<RankedSentence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSentence {
    pub text: String,
    pub rank: Rank,
}

impl Article {
    pub fn from_json(input: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_yaml(input: &str) -> Result<Self, DocumentError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Load an article, picking the format from the file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = fs::read_to_string(path)?;
        match extension.as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            other => Err(DocumentError::UnknownFormat(other.to_string())),
        }
    }

    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.sentences.len()).sum()
    }
}

/// Collapse whitespace runs to single spaces and trim the ends
pub fn normalize_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Build the registry for an article
pub fn render(article: &Article) -> SentenceRegistry {
    let matcher = KeywordMatcher::new(&article.keywords);
    let mut sentences = Vec::with_capacity(article.sentence_count());

    for (paragraph, source) in article.paragraphs.iter().enumerate() {
        for sentence in &source.sentences {
            let text = normalize_text(&sentence.text);
            let mut tokens = tokenize(&text);
            matcher.mark(&text, &mut tokens);
            sentences.push(Sentence::new(
                SentenceId(sentences.len()),
                paragraph,
                sentence.rank,
                tokens,
            ));
        }
    }

    SentenceRegistry::new(sentences)
}

/// Visible sentences as plain text, one line per paragraph.
///
/// Starred sentences are prefixed with `*`.
pub fn visible_text(registry: &SentenceRegistry) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current: Option<(usize, Vec<String>)> = None;

    for sentence in registry.iter().filter(|s| s.is_visible()) {
        let text = if sentence.flags.starred {
            format!("*{}", sentence.text())
        } else {
            sentence.text()
        };
        match current.as_mut() {
            Some((paragraph, parts)) if *paragraph == sentence.paragraph => parts.push(text),
            _ => {
                if let Some((_, parts)) = current.take() {
                    lines.push(parts.join(" "));
                }
                current = Some((sentence.paragraph, vec![text]));
            }
        }
    }
    if let Some((_, parts)) = current {
        lines.push(parts.join(" "));
    }
    lines.join("\n")
}
