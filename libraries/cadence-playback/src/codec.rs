//! State codec
//!
//! Converts [`PlaybackState`] to and from the flat [`PlaybackSnapshot`]
//! records. Everything is keyed by content hash, because catalog ids change
//! between scans.
//!
//! Decoding never fails: anything that no longer resolves against the
//! catalog is dropped or narrowed, and the result is always a consistent
//! state.

use crate::error::Result;
use crate::queue::PlayQueue;
use crate::types::PlaybackState;
use cadence_core::{
    Catalog, EntityHash, LoopMode, PlaybackMode, PlaybackSnapshot, PlaybackStore, QueueItemRecord,
    Scope, SongId, StateRecord, SNAPSHOT_VERSION, UNSET_HASH,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Song and album hash of a catalog song
pub(crate) fn song_hashes(catalog: &Catalog, id: SongId) -> Option<(EntityHash, EntityHash)> {
    let song = catalog.song(id)?;
    let album = catalog.album_of(song)?;
    Some((song.hash(), album.hash()))
}

/// Flatten `state` into snapshot records
///
/// Priority items come first; `sequence_id` numbers all items in order.
pub fn encode(state: &PlaybackState, catalog: &Catalog) -> PlaybackSnapshot {
    let song_hash = state
        .current_song
        .and_then(|id| catalog.song(id))
        .map_or(UNSET_HASH, |song| song.hash());
    let parent_hash = catalog.scope_hash(state.scope).unwrap_or(UNSET_HASH);

    let priority = state.queue.priority().iter().map(|&id| (id, true));
    let primary = state.queue.primary().iter().map(|&id| (id, false));
    let items = priority
        .chain(primary)
        .filter_map(|(id, is_priority)| {
            song_hashes(catalog, id).map(|hashes| (hashes, is_priority))
        })
        .enumerate()
        .map(
            |(sequence, ((song_hash, album_hash), is_priority_queue_item))| QueueItemRecord {
                sequence_id: sequence as i64,
                song_hash,
                album_hash,
                is_priority_queue_item,
            },
        )
        .collect();

    PlaybackSnapshot {
        version: SNAPSHOT_VERSION,
        state: StateRecord {
            song_hash,
            position_ms: i64::try_from(state.position_ms).unwrap_or(i64::MAX),
            parent_hash,
            index: i32::try_from(state.queue.index()).unwrap_or(i32::MAX),
            mode: state.mode.code(),
            is_shuffling: state.is_shuffling,
            loop_mode: state.loop_mode.code(),
            in_priority_queue: state.in_priority_queue,
        },
        items,
    }
}

/// Rebuild playback state from a snapshot
///
/// The result is paused, marked restored, and only refers to songs present
/// in `catalog`.
pub fn decode(snapshot: &PlaybackSnapshot, catalog: &Catalog) -> PlaybackState {
    if snapshot.version > SNAPSHOT_VERSION {
        warn!(
            "Snapshot version {} is newer than {}, restoring what is understood",
            snapshot.version, SNAPSHOT_VERSION
        );
    }
    let record = &snapshot.state;

    // Unknown codes fall back to AllSongs / None
    let mode = PlaybackMode::from_code(record.mode);
    let loop_mode = LoopMode::from_code(record.loop_mode);

    let mut scope = if record.parent_hash == UNSET_HASH {
        None
    } else {
        catalog.find_scope_by_hash(mode, record.parent_hash)
    };
    if scope.is_none() && record.parent_hash != UNSET_HASH && mode != PlaybackMode::AllSongs {
        debug!("Parent {} not in catalog for {:?}", record.parent_hash, mode);
    }

    let mut items: Vec<&QueueItemRecord> = snapshot.items.iter().collect();
    items.sort_by_key(|item| item.sequence_id);

    // The n-th item with a given hash pair takes the n-th kept duplicate
    let mut primary = Vec::new();
    let mut priority = Vec::new();
    let mut seen: HashMap<(bool, EntityHash, EntityHash), usize> = HashMap::new();
    let mut dropped = 0usize;
    for item in items {
        let candidates = catalog.songs_by_hash(item.song_hash, item.album_hash);
        if candidates.is_empty() {
            dropped += 1;
            continue;
        }
        let occurrence = seen
            .entry((item.is_priority_queue_item, item.song_hash, item.album_hash))
            .or_default();
        let id = candidates[*occurrence % candidates.len()];
        *occurrence += 1;
        if item.is_priority_queue_item {
            priority.push(id);
        } else {
            primary.push(id);
        }
    }
    if dropped > 0 {
        info!("Dropped {} queue items that no longer resolve", dropped);
    }

    let stored_index = usize::try_from(record.index).unwrap_or(0);
    let has_song_hash =
        |id: SongId| catalog.song(id).is_some_and(|song| song.hash() == record.song_hash);

    // Prefer the song at the stored index, then any queued song, then another
    // album's song with the same hash
    let current_song = if record.song_hash == UNSET_HASH {
        None
    } else {
        primary
            .get(stored_index)
            .filter(|&&id| !record.in_priority_queue && has_song_hash(id))
            .or_else(|| primary.iter().chain(priority.iter()).find(|&&id| has_song_hash(id)))
            .copied()
            .or_else(|| catalog.find_song_by_song_hash(record.song_hash).map(|song| song.id))
    };
    if current_song.is_none() && record.song_hash != UNSET_HASH {
        info!("Current song {} not in catalog", record.song_hash);
    }

    let index = match current_song {
        Some(id) if !record.in_priority_queue && primary.get(stored_index) != Some(&id) => {
            primary.iter().position(|&song| song == id).unwrap_or(stored_index)
        }
        _ => stored_index,
    };

    // Scope hash no longer matches but the songs do: derive it from the queue
    if current_song.is_some() && scope.is_none() && mode != PlaybackMode::AllSongs {
        let anchor = primary.first().copied().or(current_song);
        if let Some(song) = anchor.and_then(|id| catalog.song(id)) {
            let recovered = catalog.scope_of(song, mode);
            if recovered != Scope::AllSongs {
                info!("Recovered {:?} from the restored queue", recovered);
                scope = Some(recovered);
            }
        }
    }

    let position_ms = current_song
        .and_then(|id| catalog.song(id))
        .map_or(0, |song| {
            u64::try_from(record.position_ms)
                .unwrap_or(0)
                .min(song.duration_ms)
        });

    PlaybackState {
        current_song,
        position_ms,
        scope: scope.unwrap_or_default(),
        mode,
        queue: PlayQueue::from_parts(primary, priority, index),
        is_playing: false,
        is_shuffling: record.is_shuffling,
        in_priority_queue: record.in_priority_queue,
        loop_mode,
        has_played: false,
        is_restored: true,
    }
}

/// Save `snapshot` on a background task
pub async fn save_in_background(
    store: Arc<dyn PlaybackStore>,
    snapshot: PlaybackSnapshot,
) -> Result<()> {
    tokio::spawn(async move { store.save_snapshot(&snapshot).await }).await??;
    Ok(())
}

/// Load the stored snapshot on a background task
pub async fn load_in_background(store: Arc<dyn PlaybackStore>) -> Result<Option<PlaybackSnapshot>> {
    let snapshot = tokio::spawn(async move { store.load_snapshot().await }).await??;
    Ok(snapshot)
}
