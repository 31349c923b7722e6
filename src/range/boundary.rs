//! Serialized range boundaries
//!
//! A stored range is two boundaries joined by a comma:
//!
//!     <range>    = <boundary> "," <boundary>
//!     <boundary> = <sentence> "/" <child> ":" <offset>
//!
//! `sentence` is the sentence identifier, `child` the index of a token in the
//! sentence's token list and `offset` a character offset inside that token.
//! Anchoring to tokens rather than raw sentence offsets keeps each boundary
//! locatable in the rendered tree on its own. This exact shape is what
//! previously stored annotations use.

use crate::error::RangeError;
use crate::registry::SentenceId;
use chumsky::prelude::*;
use std::fmt;

/// One end of a stored range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub sentence: SentenceId,
    pub child: usize,
    pub offset: usize,
}

impl Boundary {
    pub fn new(sentence: SentenceId, child: usize, offset: usize) -> Self {
        Self {
            sentence,
            child,
            offset,
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.sentence, self.child, self.offset)
    }
}

type ParserError = Simple<char>;

fn number() -> impl Parser<char, usize, Error = ParserError> + Clone {
    text::int(10).try_map(|digits: String, span| {
        digits
            .parse::<usize>()
            .map_err(|err| Simple::custom(span, err.to_string()))
    })
}

fn boundary() -> impl Parser<char, Boundary, Error = ParserError> + Clone {
    number()
        .then_ignore(just('/'))
        .then(number())
        .then_ignore(just(':'))
        .then(number())
        .map(|((sentence, child), offset)| Boundary::new(SentenceId(sentence), child, offset))
}

fn range_boundaries() -> impl Parser<char, (Boundary, Boundary), Error = ParserError> {
    boundary()
        .padded()
        .then_ignore(just(','))
        .then(boundary().padded())
        .then_ignore(end())
}

/// Parse a serialized `start,end` pair
pub fn parse(input: &str) -> Result<(Boundary, Boundary), RangeError> {
    range_boundaries().parse(input).map_err(|errors| {
        let reason = errors
            .iter()
            .map(|error| error.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        RangeError::Malformed {
            input: input.to_string(),
            reason,
        }
    })
}

/// Format a `start,end` pair
pub fn format(start: &Boundary, end: &Boundary) -> String {
    format!("{},{}", start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_pair() {
        let (start, end) = parse("3/2:0,5/4:3").unwrap();
        assert_eq!(start, Boundary::new(SentenceId(3), 2, 0));
        assert_eq!(end, Boundary::new(SentenceId(5), 4, 3));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        let (start, end) = parse(" 0/0:1 , 0/0:4 ").unwrap();
        assert_eq!(start.offset, 1);
        assert_eq!(end.offset, 4);
    }

    #[test]
    fn test_display_matches_parse() {
        let start = Boundary::new(SentenceId(12), 0, 7);
        let end = Boundary::new(SentenceId(13), 9, 1);
        assert_eq!(format(&start, &end), "12/0:7,13/9:1");
        assert_eq!(parse(&format(&start, &end)).unwrap(), (start, end));
    }

    #[rstest]
    #[case("")]
    #[case("3/2:0")]
    #[case("3/2:0,")]
    #[case("3/2,4/1:0")]
    #[case("-1/0:0,2/0:0")]
    #[case("a/0:0,1/0:0")]
    #[case("1/0:0,1/0:2,1/0:3")]
    #[case("99999999999999999999999/0:0,1/0:0")]
    fn test_malformed_input(#[case] input: &str) {
        match parse(input) {
            Err(RangeError::Malformed { input: reported, .. }) => assert_eq!(reported, input),
            other => panic!("expected malformed error for {:?}, got {:?}", input, other),
        }
    }
}
