//! Playback state persistence tests


use cadence_core::{PlaybackSnapshot, QueueItemRecord, StateRecord, UNSET_HASH};
use cadence_storage::playback_state;
use test_helpers::{snapshot, TestDb};

#[tokio::test]
async fn test_load_without_save_returns_none() {
    let db = TestDb::new().await;
    assert_eq!(playback_state::load(db.pool()).await.unwrap(), None);
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let db = TestDb::new().await;
    let saved = snapshot(&[(7, 70), (8, 80)], &[(1, 10), (2, 10), (3, 30)]);

    playback_state::save(db.pool(), &saved).await.unwrap();
    let loaded = playback_state::load(db.pool()).await.unwrap().unwrap();

    assert_eq!(loaded, saved);
}

#[tokio::test]
async fn test_save_replaces_previous_snapshot() {
    let db = TestDb::new().await;
    playback_state::save(db.pool(), &snapshot(&[(7, 70)], &[(1, 10), (2, 10), (3, 30)]))
        .await
        .unwrap();

    let second = snapshot(&[], &[(5, 50)]);
    playback_state::save(db.pool(), &second).await.unwrap();

    let loaded = playback_state::load(db.pool()).await.unwrap().unwrap();
    assert_eq!(loaded.items.len(), 1);
    assert_eq!(loaded, second);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playback_state")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_sentinels_survive_storage() {
    let db = TestDb::new().await;
    let empty = PlaybackSnapshot::default();
    assert_eq!(empty.state.song_hash, UNSET_HASH);

    playback_state::save(db.pool(), &empty).await.unwrap();
    let loaded = playback_state::load(db.pool()).await.unwrap().unwrap();

    assert_eq!(loaded.state.song_hash, UNSET_HASH);
    assert_eq!(loaded.state.parent_hash, UNSET_HASH);
    assert!(loaded.items.is_empty());
}

#[tokio::test]
async fn test_items_come_back_in_sequence_order() {
    let db = TestDb::new().await;
    let mut saved = snapshot(&[], &[]);
    saved.items = vec![
        QueueItemRecord {
            sequence_id: 9,
            song_hash: 3,
            album_hash: 30,
            is_priority_queue_item: false,
        },
        QueueItemRecord {
            sequence_id: 2,
            song_hash: 1,
            album_hash: 10,
            is_priority_queue_item: true,
        },
    ];

    playback_state::save(db.pool(), &saved).await.unwrap();
    let loaded = playback_state::load(db.pool()).await.unwrap().unwrap();

    let order: Vec<i64> = loaded.items.iter().map(|item| item.sequence_id).collect();
    assert_eq!(order, vec![2, 9]);
    assert!(loaded.items[0].is_priority_queue_item);
}

#[tokio::test]
async fn test_extreme_values_survive_storage() {
    let db = TestDb::new().await;
    let mut saved = snapshot(&[(i32::MAX, i32::MIN + 1)], &[]);
    saved.state = StateRecord {
        song_hash: i32::MAX,
        position_ms: i64::MAX,
        parent_hash: i32::MIN + 1,
        index: i32::MAX,
        mode: -1,
        is_shuffling: false,
        loop_mode: 99,
        in_priority_queue: true,
    };

    playback_state::save(db.pool(), &saved).await.unwrap();
    assert_eq!(playback_state::load(db.pool()).await.unwrap(), Some(saved));
}

#[tokio::test]
async fn test_clear_removes_everything() {
    let db = TestDb::new().await;
    playback_state::save(db.pool(), &snapshot(&[(7, 70)], &[(1, 10)]))
        .await
        .unwrap();

    playback_state::clear(db.pool()).await.unwrap();
    assert_eq!(playback_state::load(db.pool()).await.unwrap(), None);

    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playback_queue_items")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(items, 0);
}

#[tokio::test]
async fn test_snapshot_survives_reopening_the_file() {
    let db = TestDb::new().await;
    let saved = snapshot(&[], &[(1, 10), (2, 20)]);
    playback_state::save(db.pool(), &saved).await.unwrap();
    db.pool().close().await;

    let reopened = cadence_storage::create_pool(&db.url).await.unwrap();
    cadence_storage::run_migrations(&reopened).await.unwrap();
    assert_eq!(playback_state::load(&reopened).await.unwrap(), Some(saved));
}
