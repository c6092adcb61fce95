//! Encoding of a cached feed as a comma-joined list of post ids.
//!
//! The payload is ordered most-recent-first with strict insertion order:
//! no dedup, no eviction, no length cap.

use tracing::warn;

use crate::error::{FeedError, FeedResult};

/// Separator between post ids inside a feed payload.
pub const FEED_DELIMITER: char = ',';

/// Joins ids most-recent-first. An empty slice encodes to the empty string.
pub fn encode(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Strict decoder: any token that is not an integer fails the whole read.
pub fn decode(payload: &str) -> FeedResult<Vec<i64>> {
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    payload
        .split(FEED_DELIMITER)
        .map(|token| {
            token.parse::<i64>().map_err(|_| {
                FeedError::MalformedPayload(format!("feed entry {:?} is not a post id", token))
            })
        })
        .collect()
}

/// Lenient decoder for the read path: drops tokens that do not parse so one
/// corrupt entry cannot take down a whole page.
pub fn decode_lossy(payload: &str) -> Vec<i64> {
    if payload.is_empty() {
        return Vec::new();
    }
    payload
        .split(FEED_DELIMITER)
        .filter_map(|token| match token.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(token, "Dropping unparseable feed entry");
                None
            }
        })
        .collect()
}

/// Puts `post_id` at the head of the feed payload.
pub fn prepend(payload: &str, post_id: i64) -> String {
    if payload.is_empty() {
        post_id.to_string()
    } else {
        format!("{}{}{}", post_id, FEED_DELIMITER, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_into_empty_payload() {
        assert_eq!(prepend("", 7), "7");
    }

    #[test]
    fn prepend_puts_newest_first() {
        assert_eq!(prepend("7", 3), "3,7");
        assert_eq!(prepend("3,7", 9), "9,3,7");
    }

    #[test]
    fn decode_ordered_ids() {
        assert_eq!(decode("3,7").unwrap(), vec![3, 7]);
    }

    #[test]
    fn empty_payload_round_trips() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn encode_decode_round_trip() {
        let ids = vec![5, 4, 3, 2, 1];
        assert_eq!(decode(&encode(&ids)).unwrap(), ids);
    }

    #[test]
    fn strict_decode_rejects_garbage() {
        let err = decode("3,junk,7").unwrap_err();
        assert!(matches!(err, FeedError::MalformedPayload(_)));
    }

    #[test]
    fn lossy_decode_drops_garbage() {
        assert_eq!(decode_lossy("3,junk,7"), vec![3, 7]);
        assert_eq!(decode_lossy(""), Vec::<i64>::new());
    }
}
