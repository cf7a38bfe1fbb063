//! The canonical meeting key: `(platform, native_meeting_id, api_token)`.
//!
//! This triple is the cluster-wide identity of an orchestrator target. The
//! token is part of the key on purpose — two tenants racing on the same
//! native meeting id must never collide on the same lock. Stringification
//! is `platform:native_id:token`; the delimiter must not appear in any
//! component, which `new` enforces.

use std::fmt;

use crate::platform::Platform;
use crate::{Error, Result};

pub const KEY_DELIMITER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeetingKey {
    pub platform: Platform,
    pub native_id: String,
    pub token: String,
}

impl MeetingKey {
    pub fn new(platform: Platform, native_id: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let native_id = native_id.into();
        let token = token.into();
        if native_id.is_empty() || token.is_empty() {
            return Err(Error::Validation(
                "meeting key components must be non-empty".into(),
            ));
        }
        if native_id.contains(KEY_DELIMITER) || token.contains(KEY_DELIMITER) {
            return Err(Error::Validation(format!(
                "meeting key components must not contain '{KEY_DELIMITER}'"
            )));
        }
        Ok(Self {
            platform,
            native_id,
            token,
        })
    }

    /// Canonicalize a full meeting URL into a key for `platform` + `token`.
    pub fn from_url(platform: Platform, meeting_url: &str, token: &str) -> Result<Self> {
        let native_id = platform.extract_native_id(meeting_url).ok_or_else(|| {
            Error::Validation(format!(
                "could not extract a {platform} meeting id from '{meeting_url}'"
            ))
        })?;
        Self::new(platform, native_id, token)
    }
}

impl fmt::Display for MeetingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.platform, self.native_id, self.token
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_colon_joined_triple() {
        let key = MeetingKey::new(Platform::GoogleMeet, "abc-defg-hij", "tok123").unwrap();
        assert_eq!(key.to_string(), "google_meet:abc-defg-hij:tok123");
    }

    #[test]
    fn same_url_different_tokens_are_distinct() {
        let url = "https://meet.google.com/abc-defg-hij";
        let k1 = MeetingKey::from_url(Platform::GoogleMeet, url, "tenant-a").unwrap();
        let k2 = MeetingKey::from_url(Platform::GoogleMeet, url, "tenant-b").unwrap();
        assert_ne!(k1, k2);
        assert_eq!(k1.native_id, k2.native_id);
    }

    #[test]
    fn url_spellings_normalize_to_one_key() {
        let k1 = MeetingKey::from_url(
            Platform::GoogleMeet,
            "https://meet.google.com/abc-defg-hij",
            "t",
        )
        .unwrap();
        let k2 = MeetingKey::from_url(
            Platform::GoogleMeet,
            "http://meet.google.com/abc-defg-hij?hs=122",
            "t",
        )
        .unwrap();
        assert_eq!(k1, k2);
    }

    #[test]
    fn rejects_delimiter_in_components() {
        assert!(MeetingKey::new(Platform::Zoom, "123:456", "tok").is_err());
        assert!(MeetingKey::new(Platform::Zoom, "123456789", "to:k").is_err());
        assert!(MeetingKey::new(Platform::Zoom, "", "tok").is_err());
    }

    #[test]
    fn malformed_url_is_a_validation_error() {
        let err =
            MeetingKey::from_url(Platform::GoogleMeet, "https://example.com/nope", "t").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
