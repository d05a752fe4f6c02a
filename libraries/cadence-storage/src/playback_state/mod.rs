//! Playback state snapshot persistence
//!
//! One `playback_state` row plus the ordered `playback_queue_items` rows.
//! Every save replaces both tables inside a single transaction, so a reader
//! never sees a state row paired with another save's queue.

use crate::error::{Result, StorageError};
use cadence_core::{PlaybackSnapshot, QueueItemRecord, StateRecord};
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Replace the stored snapshot
pub async fn save(pool: &SqlitePool, snapshot: &PlaybackSnapshot) -> Result<()> {
    let state = &snapshot.state;
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO playback_state
         (id, version, song_hash, position_ms, parent_hash, queue_index,
          mode, is_shuffling, loop_mode, in_priority_queue, updated_at)
         VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(id)
         DO UPDATE SET
            version = excluded.version,
            song_hash = excluded.song_hash,
            position_ms = excluded.position_ms,
            parent_hash = excluded.parent_hash,
            queue_index = excluded.queue_index,
            mode = excluded.mode,
            is_shuffling = excluded.is_shuffling,
            loop_mode = excluded.loop_mode,
            in_priority_queue = excluded.in_priority_queue,
            updated_at = excluded.updated_at",
    )
    .bind(i64::from(snapshot.version))
    .bind(state.song_hash)
    .bind(state.position_ms)
    .bind(state.parent_hash)
    .bind(state.index)
    .bind(state.mode)
    .bind(state.is_shuffling)
    .bind(state.loop_mode)
    .bind(state.in_priority_queue)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM playback_queue_items")
        .execute(&mut *tx)
        .await?;

    for item in &snapshot.items {
        sqlx::query(
            "INSERT INTO playback_queue_items
             (sequence_id, song_hash, album_hash, is_priority_queue_item)
             VALUES (?, ?, ?, ?)",
        )
        .bind(item.sequence_id)
        .bind(item.song_hash)
        .bind(item.album_hash)
        .bind(item.is_priority_queue_item)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!("Saved playback state with {} queue items", snapshot.items.len());
    Ok(())
}

/// Load the stored snapshot
///
/// Returns `None` if nothing was saved yet. Queue items come back in
/// `sequence_id` order.
pub async fn load(pool: &SqlitePool) -> Result<Option<PlaybackSnapshot>> {
    let Some(row) = sqlx::query(
        "SELECT version, song_hash, position_ms, parent_hash, queue_index,
                mode, is_shuffling, loop_mode, in_priority_queue
         FROM playback_state WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let version: i64 = row.try_get("version")?;
    let version = u32::try_from(version)
        .map_err(|_| StorageError::corrupt("playback_state", format!("version {version}")))?;

    let state = StateRecord {
        song_hash: row.try_get("song_hash")?,
        position_ms: row.try_get("position_ms")?,
        parent_hash: row.try_get("parent_hash")?,
        index: row.try_get("queue_index")?,
        mode: row.try_get("mode")?,
        is_shuffling: row.try_get("is_shuffling")?,
        loop_mode: row.try_get("loop_mode")?,
        in_priority_queue: row.try_get("in_priority_queue")?,
    };

    let items = sqlx::query(
        "SELECT sequence_id, song_hash, album_hash, is_priority_queue_item
         FROM playback_queue_items
         ORDER BY sequence_id",
    )
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|row| -> Result<QueueItemRecord> {
        Ok(QueueItemRecord {
            sequence_id: row.try_get("sequence_id")?,
            song_hash: row.try_get("song_hash")?,
            album_hash: row.try_get("album_hash")?,
            is_priority_queue_item: row.try_get("is_priority_queue_item")?,
        })
    })
    .collect::<Result<Vec<_>>>()?;

    Ok(Some(PlaybackSnapshot {
        version,
        state,
        items,
    }))
}

/// Remove the stored snapshot
pub async fn clear(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM playback_queue_items")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM playback_state")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
