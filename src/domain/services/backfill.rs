//! Full recomputation of a room's derived analytics rows from raw entries and votes.
//!
//! `last_updated` of a recomputed row is the latest raw timestamp that fed it,
//! so recomputing unchanged data yields identical rows.

use std::collections::BTreeMap;

use crate::domain::entities::{QueueEntry, RoomSongTrending, RoomVote, UserRoomStats};

/// Stats rows for every participant (submitter or voter) of the room, ordered by user id
pub fn compute_user_stats(
    room_id: &str,
    entries: &[QueueEntry],
    votes: &[RoomVote],
) -> Vec<UserRoomStats> {
    let mut rows: BTreeMap<&str, UserRoomStats> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.room_id == room_id) {
        touch(&mut rows, room_id, &entry.added_by, entry.created_at).total_added += 1;
    }

    for vote in votes {
        touch(&mut rows, room_id, &vote.voter_id, vote.created_at).total_likes_given += 1;
        touch(&mut rows, room_id, &vote.owner_id, vote.created_at).total_likes_got += 1;
    }

    rows.into_values().collect()
}

fn touch<'a, 'r>(
    rows: &'r mut BTreeMap<&'a str, UserRoomStats>,
    room_id: &str,
    user_id: &'a str,
    at: i64,
) -> &'r mut UserRoomStats {
    let row = rows
        .entry(user_id)
        .or_insert_with(|| UserRoomStats::empty(user_id, room_id, at));
    row.last_updated = row.last_updated.max(at);
    row
}

#[derive(Default)]
struct SongCounters {
    upvotes: i64,
    plays: i64,
    last_seen: i64,
}

impl SongCounters {
    fn seen(&mut self, at: i64) {
        self.last_seen = self.last_seen.max(at);
    }
}

/// Trending rows per song, ordered by video id. Songs with a zero score are omitted.
///
/// Upvotes count every existing vote on any entry of the song; plays count
/// entries of the song played at or after `play_window_start`.
pub fn compute_trending(
    room_id: &str,
    entries: &[QueueEntry],
    votes: &[RoomVote],
    play_window_start: i64,
) -> Vec<RoomSongTrending> {
    let mut counters: BTreeMap<&str, SongCounters> = BTreeMap::new();

    for entry in entries.iter().filter(|e| e.room_id == room_id) {
        let song = counters.entry(entry.video_id.as_str()).or_default();
        song.seen(entry.created_at);
        if let Some(played_at) = entry.played_at {
            song.seen(played_at);
            if played_at >= play_window_start {
                song.plays += 1;
            }
        }
    }

    for vote in votes {
        let song = counters.entry(vote.video_id.as_str()).or_default();
        song.seen(vote.created_at);
        song.upvotes += 1;
    }

    counters
        .into_iter()
        .map(|(video_id, song)| {
            RoomSongTrending::new(room_id, video_id, song.upvotes, song.plays, song.last_seen)
        })
        .filter(|row| row.trending_score > 0)
        .collect()
}
