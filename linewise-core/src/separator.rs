//! Separator scanning over the decoded accumulator
//!
//! A separator is either a fixed literal or a regular expression whose match
//! length varies per occurrence. Both are located through [`Separator::find`].

use crate::error::{LineError, Result};
use regex::Regex;

/// Location of a separator match inside the accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locus {
    /// Byte offset where the separator starts
    pub index: usize,
    /// Byte length of the matched separator
    pub len: usize,
}

impl Locus {
    /// Byte offset just past the separator
    pub fn end(&self) -> usize {
        self.index + self.len
    }
}

/// Line separator specification
#[derive(Debug, Clone)]
pub enum Separator {
    /// Fixed character sequence
    Literal(String),
    /// Regular expression; the match length is determined per match
    Pattern(Regex),
}

impl Separator {
    /// Single `\n`
    pub fn newline() -> Self {
        Separator::Literal("\n".to_string())
    }

    /// `\r\n`, `\r` or `\n`
    pub fn universal_newline() -> Self {
        Separator::Pattern(Regex::new(r"\r\n|\r|\n").expect("static newline pattern is valid"))
    }

    /// Create a literal separator. Empty literals are rejected.
    pub fn literal(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(LineError::InvalidSeparator(
                "literal separator must not be empty".into(),
            ));
        }
        Ok(Separator::Literal(text))
    }

    /// Compile a pattern separator.
    ///
    /// Patterns that can match the empty string would produce an endless run
    /// of empty lines and are rejected.
    pub fn pattern(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        if regex.is_match("") {
            return Err(LineError::InvalidSeparator(format!(
                "pattern '{pattern}' matches the empty string"
            )));
        }
        Ok(Separator::Pattern(regex))
    }

    /// True for [`Separator::Pattern`]
    pub fn is_pattern(&self) -> bool {
        matches!(self, Separator::Pattern(_))
    }

    /// Find the first separator in `text`.
    ///
    /// Literal scans start at `from`, which must lie on a char boundary;
    /// pattern scans always start at 0. A pattern match ending exactly at the
    /// end of `text` could still grow once more input arrives, so it only
    /// counts when `at_eof` is set.
    pub fn find(&self, text: &str, from: usize, at_eof: bool) -> Option<Locus> {
        match self {
            Separator::Literal(literal) => text.get(from..)?.find(literal.as_str()).map(|i| Locus {
                index: from + i,
                len: literal.len(),
            }),
            Separator::Pattern(regex) => {
                let found = regex.find_iter(text).find(|m| !m.is_empty())?;
                if found.end() == text.len() && !at_eof {
                    return None;
                }
                Some(Locus {
                    index: found.start(),
                    len: found.len(),
                })
            }
        }
    }

    /// Offset from which the next scan of `text` may resume after an
    /// unsuccessful [`find`](Self::find).
    ///
    /// A literal can only straddle the last `len - 1` bytes, so everything
    /// before them is skipped. Patterns always rescan from the start.
    pub fn resume_offset(&self, text: &str) -> usize {
        match self {
            Separator::Literal(literal) => {
                let mut at = text.len().saturating_sub(literal.len() - 1);
                while !text.is_char_boundary(at) {
                    at -= 1;
                }
                at
            }
            Separator::Pattern(_) => 0,
        }
    }
}

impl std::fmt::Display for Separator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Separator::Literal(literal) => write!(f, "{literal:?}"),
            Separator::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_first_occurrence() {
        let sep = Separator::literal("\n").unwrap();
        assert_eq!(sep.find("a\nb\n", 0, false), Some(Locus { index: 1, len: 1 }));
        assert_eq!(sep.find("abc", 0, false), None);
    }

    #[test]
    fn test_literal_at_end_is_accepted() {
        let sep = Separator::literal("\r\n").unwrap();
        assert_eq!(sep.find("ab\r\n", 0, false), Some(Locus { index: 2, len: 2 }));
    }

    #[test]
    fn test_literal_resume_keeps_partial_match() {
        let sep = Separator::literal("\r\n").unwrap();
        let text = "ab\r";
        let from = sep.resume_offset(text);
        assert_eq!(from, 2);
        let grown = "ab\r\ncd";
        assert_eq!(sep.find(grown, from, false), Some(Locus { index: 2, len: 2 }));
    }

    #[test]
    fn test_resume_offset_respects_char_boundary() {
        let sep = Separator::literal("--").unwrap();
        // 'é' is two bytes; len - 1 = 1 would land inside it
        let text = "aé";
        let from = sep.resume_offset(text);
        assert!(text.is_char_boundary(from));
        assert_eq!(from, 1);
    }

    #[test]
    fn test_pattern_trailing_match_is_ambiguous() {
        let sep = Separator::universal_newline();
        // "\r" could become "\r\n" with the next chunk
        assert_eq!(sep.find("x\r", 0, false), None);
        assert_eq!(sep.find("x\r", 0, true), Some(Locus { index: 1, len: 1 }));
        assert_eq!(sep.find("x\r\ny", 0, false), Some(Locus { index: 1, len: 2 }));
    }

    #[test]
    fn test_pattern_match_length_varies() {
        let sep = Separator::pattern(r"\r\n|\n").unwrap();
        assert_eq!(sep.find("x\ny", 0, false), Some(Locus { index: 1, len: 1 }));
        assert_eq!(sep.find("x\r\ny", 0, false), Some(Locus { index: 1, len: 2 }));
    }

    #[test]
    fn test_rejects_empty_separators() {
        assert!(Separator::literal("").is_err());
        assert!(Separator::pattern(r"\n*").is_err());
        assert!(matches!(
            Separator::pattern("("),
            Err(LineError::Pattern(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Separator::newline().to_string(), "\"\\n\"");
        assert_eq!(Separator::universal_newline().to_string(), r"/\r\n|\r|\n/");
    }
}
