//! Raw subtitle cleanup.
//!
//! Subtitle tracks arrive as VTT with timestamps, positioning tags, and the
//! heavy line repetition YouTube's rolling auto-captions produce. This module
//! reduces them to deduplicated plain text.

use crate::error::Result;
use regex::Regex;
use std::collections::HashSet;

/// Trait for raw-text cleanup implementations.
pub trait Sanitizer: Send + Sync {
    /// Turn raw noisy text into deduplicated plain text.
    fn sanitize(&self, raw: &str) -> Result<String>;
}

/// Minimum line length to keep; anything shorter is cue noise.
const MIN_LINE_CHARS: usize = 3;

/// Regex-based sanitizer for VTT-style subtitle text.
pub struct RegexSanitizer {
    timestamp_re: Regex,
    tag_re: Regex,
}

impl RegexSanitizer {
    pub fn new() -> Self {
        // Cue lines (00:00:00.000 --> 00:00:02.000, plus positioning)
        let timestamp_re = Regex::new(r"(?m)^.*-->.*$").expect("Invalid regex");
        // Inline tags: <c.v1>, <00:00:01.000>, etc.
        let tag_re = Regex::new(r"<[^>]*>").expect("Invalid regex");

        Self {
            timestamp_re,
            tag_re,
        }
    }
}

impl Default for RegexSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for RegexSanitizer {
    fn sanitize(&self, raw: &str) -> Result<String> {
        let text = raw.replace("WEBVTT", "");
        let text = self.timestamp_re.replace_all(&text, "");
        let text = self.tag_re.replace_all(&text, "");

        // Auto-captions repeat lines as they scroll; keep first occurrences
        // only, in order.
        let mut seen = HashSet::new();
        let mut clean_lines = Vec::new();

        for line in text.lines() {
            let line = line.trim();

            if line.chars().count() < MIN_LINE_CHARS {
                continue;
            }

            if seen.insert(line.to_string()) {
                clean_lines.push(line);
            }
        }

        Ok(clean_lines.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_webvtt_header_and_timestamps() {
        let raw = "WEBVTT\n\n00:00:00.000 --> 00:00:02.500 align:start position:0%\nhello there everyone\n";
        let clean = RegexSanitizer::new().sanitize(raw).unwrap();
        assert_eq!(clean, "hello there everyone");
        assert!(!clean.contains("-->"));
    }

    #[test]
    fn test_removes_inline_tags() {
        let raw = "today<00:00:01.280><c> we</c><00:00:01.600><c> cover</c> incident response";
        let clean = RegexSanitizer::new().sanitize(raw).unwrap();
        assert_eq!(clean, "today we cover incident response");
    }

    #[test]
    fn test_deduplicates_repeated_lines_keeping_first() {
        let raw = "first topic\nsecond topic\nfirst topic\nsecond topic\nthird topic";
        let clean = RegexSanitizer::new().sanitize(raw).unwrap();
        assert_eq!(clean, "first topic second topic third topic");
    }

    #[test]
    fn test_no_adjacent_duplicate_lines_survive() {
        let raw = "rolling caption line\nrolling caption line\nrolling caption line\nnext line";
        let clean = RegexSanitizer::new().sanitize(raw).unwrap();
        assert_eq!(clean.matches("rolling caption line").count(), 1);
    }

    #[test]
    fn test_drops_short_noise_lines() {
        let raw = "1\n \nok\nactual subtitle content here";
        let clean = RegexSanitizer::new().sanitize(raw).unwrap();
        assert_eq!(clean, "actual subtitle content here");
    }

    #[test]
    fn test_full_vtt_cue_block() {
        let raw = "WEBVTT\nKind: captions\nLanguage: en\n\n00:00:00.240 --> 00:00:03.120\nwelcome to the deep dive\n\n00:00:03.120 --> 00:00:05.600\nwelcome to the deep dive\ntoday we look at caching";
        let clean = RegexSanitizer::new().sanitize(raw).unwrap();
        assert_eq!(
            clean,
            "Kind: captions Language: en welcome to the deep dive today we look at caching"
        );
    }
}
