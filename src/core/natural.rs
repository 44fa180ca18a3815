//! Natural ordering for image file names.
//!
//! `img2.png` sorts before `img10.png`; letters compare case-insensitively.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

static DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").unwrap_or_else(|e| panic!("Invalid digits regex: {e}")));

/// One run of a natural sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Chunk {
    /// A run of digits, compared by value.
    Number(u64),
    /// Any other run, lowercased.
    Text(String),
}

/// Split a name into alternating text and number chunks.
#[must_use]
pub fn natural_key(name: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut last = 0;

    for m in DIGITS.find_iter(name) {
        if m.start() > last {
            chunks.push(Chunk::Text(name[last..m.start()].to_lowercase()));
        }
        // Digit runs too long for u64 fall back to text comparison.
        chunks.push(
            m.as_str()
                .parse()
                .map_or_else(|_| Chunk::Text(m.as_str().to_string()), Chunk::Number),
        );
        last = m.end();
    }

    if last < name.len() {
        chunks.push(Chunk::Text(name[last..].to_lowercase()));
    }

    chunks
}

/// Compare two names in natural order, falling back to byte order on ties.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_key_chunks() {
        assert_eq!(
            natural_key("Scan12b.PNG"),
            vec![
                Chunk::Text("scan".to_string()),
                Chunk::Number(12),
                Chunk::Text("b.png".to_string()),
            ]
        );
        assert_eq!(natural_key("42"), vec![Chunk::Number(42)]);
        assert!(natural_key("").is_empty());
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let mut names = vec!["img10.png", "img2.png", "img1.png", "IMG3.png"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["img1.png", "img2.png", "IMG3.png", "img10.png"]);
    }

    #[test]
    fn test_leading_zeros_tie_break() {
        assert_eq!(natural_cmp("a01.png", "a1.png"), "a01.png".cmp("a1.png"));
        assert_eq!(natural_cmp("a1.png", "a1.png"), Ordering::Equal);
    }

    #[test]
    fn test_huge_digit_run_does_not_panic() {
        let key = natural_key("x99999999999999999999999.png");
        assert!(matches!(key[1], Chunk::Text(_)));
    }
}
