use std::fmt;

use serde::Serialize;

/// Position of a fragment in the source text.
///
/// `line` and `column` are 1-based and count characters, `start`/`end` are
/// byte offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            line: 1,
            column: 1,
            start: 0,
            end: 0,
        }
    }
}

impl Span {
    /// Empty span sitting right after `text`, assuming `text` starts here.
    pub fn advance(&self, text: &str) -> Span {
        let mut line = self.line;
        let mut column = self.column;
        for ch in text.chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        let offset = self.start + text.len();
        Span {
            line,
            column,
            start: offset,
            end: offset,
        }
    }

    /// Span covering `text`, starting here.
    pub fn covering(&self, text: &str) -> Span {
        Span {
            end: self.start + text.len(),
            ..*self
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_over_lines() {
        let span = Span::default().advance("ab\n\tcd");
        assert_eq!(span.line, 2);
        assert_eq!(span.column, 4);
        assert_eq!(span.start, 6);
        assert_eq!(span.end, 6);
    }

    #[test]
    fn test_covering_keeps_origin() {
        let span = Span::default().advance("x\n").covering("rule:");
        assert_eq!(span.to_string(), "line 2, column 1");
        assert_eq!((span.start, span.end), (2, 7));
    }
}
