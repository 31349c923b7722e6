//! Sentence tokens
//!
//! A sentence's content is an ordered list of tokens: words, whitespace runs and
//! punctuation runs. Every character offset stored in a range is relative to the
//! concatenation of these token texts, never to the article markup, so the
//! token list is what keeps stored annotations valid across re-renders.
//!
//! Tokens are produced by a logos lexer; keyword marking happens afterwards in
//! the document renderer.

use logos::Logos;
use serde::{Deserialize, Serialize};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[\w']+")]
    Word,

    #[regex(r"\s+")]
    Whitespace,

    // Anything that is neither a word character nor whitespace
    #[regex(r"[^\w'\s]+")]
    Punctuation,
}

/// Classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Word,
    Whitespace,
    Punctuation,
}

/// The smallest addressable unit of sentence text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Character offset of the token within its sentence
    pub start: usize,
    /// Length in characters
    pub len: usize,
    /// Keyword this token belongs to, when it is part of a keyword span
    pub keyword: Option<String>,
}

impl Token {
    /// Character offset one past the last character of the token
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    pub fn is_keyword(&self) -> bool {
        self.keyword.is_some()
    }

    /// Check if a character offset falls inside this token
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end()
    }
}

/// Split sentence text into tokens with character offsets
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut lexer = RawToken::lexer(text);
    let mut tokens = Vec::new();
    let mut offset = 0;

    while let Some(result) = lexer.next() {
        let slice = lexer.slice();
        let kind = match result {
            Ok(RawToken::Word) => TokenKind::Word,
            Ok(RawToken::Whitespace) => TokenKind::Whitespace,
            Ok(RawToken::Punctuation) | Err(()) => TokenKind::Punctuation,
        };
        let len = slice.chars().count();
        tokens.push(Token {
            kind,
            text: slice.to_string(),
            start: offset,
            len,
            keyword: None,
        });
        offset += len;
    }

    tokens
}
