//! The informativeness filter.
//!
//! Transcription engines emit a steady trickle of filler — "Thank you.",
//! lone punctuation, throat-clearing noises transcribed as "um" — that
//! would otherwise dominate stored transcripts. A segment survives the
//! filter iff its text contains at least one word character and its
//! normalized form (lowercased, terminal punctuation stripped) is not in
//! the closed filler set below.
//!
//! The predicate is deterministic and pure; [`DEFAULT_FILLERS`] is the
//! per-deployment contract and changing it changes what gets stored.

use std::collections::HashSet;

/// The closed set of filler phrases, matched against normalized text.
pub const DEFAULT_FILLERS: &[&str] = &[
    "thank you",
    "thanks",
    "okay",
    "ok",
    "you",
    "yeah",
    "hmm",
    "mhm",
    "uh",
    "um",
    "bye",
];

pub struct SegmentFilter {
    fillers: HashSet<&'static str>,
}

impl SegmentFilter {
    pub fn new() -> Self {
        Self {
            fillers: DEFAULT_FILLERS.iter().copied().collect(),
        }
    }

    /// Whether a segment's text is worth storing.
    pub fn is_informative(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        if !trimmed.chars().any(char::is_alphanumeric) {
            return false;
        }
        !self.fillers.contains(normalize(trimmed).as_str())
    }
}

impl Default for SegmentFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase and strip terminal punctuation so "Thank you." and
/// "thank you" hit the same filler entry.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .trim_end_matches(['.', ',', '!', '?'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_speech_passes() {
        let filter = SegmentFilter::new();
        assert!(filter.is_informative("Hello world"));
        assert!(filter.is_informative("Let's move to the next agenda item."));
        assert!(filter.is_informative("42"));
    }

    #[test]
    fn fillers_are_dropped_case_and_punctuation_insensitive() {
        let filter = SegmentFilter::new();
        assert!(!filter.is_informative("Thank you."));
        assert!(!filter.is_informative("thank you"));
        assert!(!filter.is_informative("THANK YOU!"));
        assert!(!filter.is_informative("Okay."));
        assert!(!filter.is_informative("um"));
    }

    #[test]
    fn empty_and_punctuation_only_are_dropped() {
        let filter = SegmentFilter::new();
        assert!(!filter.is_informative(""));
        assert!(!filter.is_informative("   "));
        assert!(!filter.is_informative("."));
        assert!(!filter.is_informative("...!?"));
    }

    #[test]
    fn filler_prefix_of_real_speech_passes() {
        let filter = SegmentFilter::new();
        assert!(filter.is_informative("Okay, let's begin with the roadmap"));
        assert!(filter.is_informative("Thank you all for joining today"));
    }
}
