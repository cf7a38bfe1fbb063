//! Redis key layout.
//!
//! - `lock:<platform>:<native_id>:<token>` — triple lock, TTL-backed.
//! - `map:<platform>:<native_id>:<token>`  — live container mapping, no TTL.
//! - `seg:<meeting_id>:<start>:<end>`      — segment dedup / partial cache;
//!   timestamps are fixed to three decimals so every replica derives the
//!   same key for the same interval.

use sr_domain::MeetingKey;

pub fn lock_key(key: &MeetingKey) -> String {
    format!("lock:{key}")
}

pub fn map_key(key: &MeetingKey) -> String {
    format!("map:{key}")
}

pub fn segment_key(meeting_id: i64, start_time: f64, end_time: f64) -> String {
    format!("seg:{meeting_id}:{start_time:.3}:{end_time:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_domain::Platform;

    fn key() -> MeetingKey {
        MeetingKey::new(Platform::GoogleMeet, "abc-defg-hij", "tokK").unwrap()
    }

    #[test]
    fn lock_and_map_share_the_triple_suffix() {
        assert_eq!(lock_key(&key()), "lock:google_meet:abc-defg-hij:tokK");
        assert_eq!(map_key(&key()), "map:google_meet:abc-defg-hij:tokK");
    }

    #[test]
    fn segment_key_uses_three_decimals() {
        assert_eq!(segment_key(7, 1.0, 1.2), "seg:7:1.000:1.200");
        assert_eq!(segment_key(7, 0.5, 2.25), "seg:7:0.500:2.250");
    }

    #[test]
    fn segment_key_is_stable_across_float_noise() {
        // Sub-millisecond noise lands on the same key within the window.
        assert_eq!(segment_key(1, 0.0, 1.2001), segment_key(1, 0.0, 1.2004));
    }
}
