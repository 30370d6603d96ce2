//! Inbound text normalization and grapheme segmentation.
//!
//! Contract:
//! - Every string entering the body (typed, composed, pasted) passes through
//!   `normalize_input`: NFC composition, CRLF and lone CR converted to LF.
//! - Deletion steps over whole grapheme clusters; offsets here are character
//!   (Unicode scalar) offsets, matching body positions.
//! - Does not log content.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// NFC-normalize and unify line endings to `\n`.
pub fn normalize_input(input: &str) -> String {
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    unified.nfc().collect()
}

/// Character length of every grapheme cluster in `text`, in order.
pub fn cluster_lengths(text: &str) -> Vec<usize> {
    text.graphemes(true).map(|g| g.chars().count()).collect()
}

/// Character offset of the cluster boundary before `at` (0 stays 0).
pub fn prev_boundary(text: &str, at: usize) -> usize {
    let mut pos = 0;
    for len in cluster_lengths(text) {
        if pos + len >= at {
            return pos;
        }
        pos += len;
    }
    pos
}

/// Character offset of the cluster boundary after `at`, clamped to the text length.
pub fn next_boundary(text: &str, at: usize) -> usize {
    let mut pos = 0;
    for len in cluster_lengths(text) {
        pos += len;
        if pos > at {
            return pos;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nfc_equivalence() {
        let decomposed = "e\u{0301}";
        let composed = "\u{00E9}";
        assert_eq!(normalize_input(decomposed), composed);
    }

    #[test]
    fn line_endings_unified() {
        assert_eq!(normalize_input("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn boundaries_step_over_clusters() {
        // family emoji is one cluster of seven scalars
        let s = "a\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{200D}\u{1F466}b";
        assert_eq!(cluster_lengths(s), vec![1, 7, 1]);
        assert_eq!(next_boundary(s, 1), 8);
        assert_eq!(prev_boundary(s, 8), 1);
        assert_eq!(prev_boundary(s, 9), 8);
        assert_eq!(next_boundary(s, 8), 9);
        assert_eq!(next_boundary(s, 9), 9);
        assert_eq!(prev_boundary(s, 0), 0);
    }

    #[test]
    fn combining_mark_stays_with_base() {
        let s = "xe\u{0301}";
        assert_eq!(next_boundary(s, 1), 3);
        assert_eq!(prev_boundary(s, 3), 1);
    }
}
