//! Queue admission control.
//!
//! Rules, in order: duplicate song (everyone), short and long rate limits
//! (everyone but the room owner), then queue capacity (everyone).

use crate::domain::entities::QueueEntry;
use crate::domain::value_objects::{AdmissionPolicy, RejectionReason};

/// Check a new add against the room's recent adds.
///
/// `recent` must hold every entry of the room created within
/// `policy.lookback_secs()` of `now`; older entries are ignored.
pub fn check_recent_adds(
    policy: &AdmissionPolicy,
    now: i64,
    room_id: &str,
    submitter_id: &str,
    video_id: &str,
    recent: &[QueueEntry],
) -> Result<(), RejectionReason> {
    let in_room = || recent.iter().filter(|e| e.room_id == room_id);

    let duplicate_since = now - policy.duplicate_window_secs;
    if in_room().any(|e| e.video_id == video_id && e.created_at >= duplicate_since) {
        return Err(RejectionReason::DuplicateSong);
    }

    // Room owners are exempt from rate limits
    if submitter_id == room_id {
        return Ok(());
    }

    let adds_since = |window_secs: i64| {
        let since = now - window_secs;
        in_room()
            .filter(|e| e.added_by == submitter_id && e.created_at >= since)
            .count() as u32
    };

    if adds_since(policy.short_limit.window_secs) >= policy.short_limit.max_adds {
        return Err(RejectionReason::RateLimitShort);
    }

    if adds_since(policy.long_limit.window_secs) >= policy.long_limit.max_adds {
        return Err(RejectionReason::RateLimitLong);
    }

    Ok(())
}

/// Check the room still has room for one more unplayed entry
pub fn check_queue_capacity(
    policy: &AdmissionPolicy,
    unplayed_count: u32,
) -> Result<(), RejectionReason> {
    if unplayed_count >= policy.max_queue_len {
        return Err(RejectionReason::QueueFull);
    }
    Ok(())
}
