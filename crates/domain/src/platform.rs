//! Conferencing platforms and the meeting-URL canonicalizer.
//!
//! The canonicalizer is pure: it extracts the platform's own identifier for
//! a meeting from a full meeting URL, or rejects the URL. Rules are a closed
//! set per platform:
//! - `google_meet`: `https://meet.google.com/abc-defg-hij` (3-4-3 letters)
//! - `zoom`:        `https://zoom.us/j/<9-11 digits>` (subdomains allowed)
//! - `teams`:       `https://teams.microsoft.com/l/meetup-join/<segment>`

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    GoogleMeet,
    Zoom,
    Teams,
}

impl Platform {
    /// Wire/storage tag, also used in Redis keys and container names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GoogleMeet => "google_meet",
            Platform::Zoom => "zoom",
            Platform::Teams => "teams",
        }
    }

    /// Extract the platform-specific meeting identifier from a full meeting
    /// URL. Returns `None` when the URL does not match this platform's
    /// expected shape.
    ///
    /// Two spellings that normalize to the same native id (scheme variants,
    /// query strings, trailing slashes) collide on the same identifier;
    /// different native ids stay distinct.
    pub fn extract_native_id(&self, meeting_url: &str) -> Option<String> {
        let re = match self {
            Platform::GoogleMeet => google_meet_re(),
            Platform::Zoom => zoom_re(),
            Platform::Teams => teams_re(),
        };
        re.captures(meeting_url.trim())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google_meet" => Ok(Platform::GoogleMeet),
            "zoom" => Ok(Platform::Zoom),
            "teams" => Ok(Platform::Teams),
            other => Err(crate::Error::Validation(format!(
                "unknown platform '{other}'"
            ))),
        }
    }
}

// ── Per-platform URL shapes ─────────────────────────────────────────

fn google_meet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://meet\.google\.com/([a-z]{3}-[a-z]{4}-[a-z]{3})(?:[/?#].*)?$")
            .expect("google_meet url pattern")
    })
}

fn zoom_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://(?:[a-z0-9-]+\.)?zoom\.us/j/(\d{9,11})(?:[/?#].*)?$")
            .expect("zoom url pattern")
    })
}

fn teams_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https?://teams\.microsoft\.com/l/meetup-join/([A-Za-z0-9%_.~-]+)(?:[/?#].*)?$")
            .expect("teams url pattern")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_meet_happy_path() {
        let id = Platform::GoogleMeet
            .extract_native_id("https://meet.google.com/abc-defg-hij")
            .unwrap();
        assert_eq!(id, "abc-defg-hij");
    }

    #[test]
    fn google_meet_spelling_variants_collide() {
        let a = Platform::GoogleMeet
            .extract_native_id("http://meet.google.com/abc-defg-hij")
            .unwrap();
        let b = Platform::GoogleMeet
            .extract_native_id("https://meet.google.com/abc-defg-hij?authuser=0")
            .unwrap();
        let c = Platform::GoogleMeet
            .extract_native_id("https://meet.google.com/abc-defg-hij/")
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn google_meet_rejects_wrong_shape() {
        assert!(Platform::GoogleMeet
            .extract_native_id("https://meet.google.com/abcdefghij")
            .is_none());
        assert!(Platform::GoogleMeet
            .extract_native_id("https://meet.google.com/ABC-DEFG-HIJ")
            .is_none());
        assert!(Platform::GoogleMeet
            .extract_native_id("https://zoom.us/j/123456789")
            .is_none());
        assert!(Platform::GoogleMeet.extract_native_id("not a url").is_none());
    }

    #[test]
    fn zoom_extracts_numeric_id() {
        let id = Platform::Zoom
            .extract_native_id("https://zoom.us/j/1234567890?pwd=abc")
            .unwrap();
        assert_eq!(id, "1234567890");
        let id = Platform::Zoom
            .extract_native_id("https://us02web.zoom.us/j/98765432109")
            .unwrap();
        assert_eq!(id, "98765432109");
    }

    #[test]
    fn zoom_rejects_short_ids() {
        assert!(Platform::Zoom
            .extract_native_id("https://zoom.us/j/12345")
            .is_none());
    }

    #[test]
    fn teams_extracts_meetup_segment() {
        let id = Platform::Teams
            .extract_native_id(
                "https://teams.microsoft.com/l/meetup-join/19%3ameeting_abc123%40thread.v2",
            )
            .unwrap();
        assert_eq!(id, "19%3ameeting_abc123%40thread.v2");
    }

    #[test]
    fn platform_round_trips_through_str() {
        for p in [Platform::GoogleMeet, Platform::Zoom, Platform::Teams] {
            assert_eq!(p.as_str().parse::<Platform>().unwrap(), p);
        }
        assert!("webex".parse::<Platform>().is_err());
    }
}
