//! Property-based tests for the queue engine
//!
//! Uses proptest to verify invariants across many random catalogs and
//! operation sequences.

use cadence_core::{
    Catalog, DuplicatePolicy, LoopMode, MediaRecord, PlaybackMode, PlaybackSettings, Scope,
};
use cadence_playback::{QueueEngine, QueueKind, RecordingSink};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

// ===== Helpers =====

fn arbitrary_record() -> impl Strategy<Value = (String, u32, u64, usize, Option<usize>)> {
    (
        "[A-Za-z]{1,12}",                    // title
        1u32..20,                            // track
        1_000u64..600_000,                   // duration
        0usize..4,                           // album
        proptest::option::of(0usize..3),     // genre
    )
}

fn arbitrary_catalog() -> impl Strategy<Value = Arc<Catalog>> {
    catalog_from(arbitrary_record(), DuplicatePolicy::Collapse)
}

/// Few distinct titles and tracks, every duplicate kept
fn duplicate_heavy_catalog() -> impl Strategy<Value = Arc<Catalog>> {
    let record = ("[AB]", 1u32..3, 1_000u64..600_000, 0usize..2, proptest::option::of(0usize..3));
    catalog_from(record, DuplicatePolicy::KeepAll)
}

fn catalog_from(
    record: impl Strategy<Value = (String, u32, u64, usize, Option<usize>)>,
    policy: DuplicatePolicy,
) -> impl Strategy<Value = Arc<Catalog>> {
    prop::collection::vec(record, 1..30).prop_map(move |rows| {
        let albums = ["North", "South", "East", "West"];
        let genres = ["Rock", "Jazz", "Folk"];
        let records = rows
            .into_iter()
            .zip(1i64..)
            .map(|((title, track, duration_ms, album, genre), id)| MediaRecord {
                id,
                title,
                track,
                duration_ms,
                album: albums[album].to_string(),
                artist: if album % 2 == 0 { "Even" } else { "Odd" }.to_string(),
                year: 1990 + album as u32,
                genre: genre.map(|g| genres[g].to_string()),
            });
        Arc::new(Catalog::build(records, policy))
    })
}

fn arbitrary_mode() -> impl Strategy<Value = PlaybackMode> {
    prop_oneof![
        Just(PlaybackMode::AllSongs),
        Just(PlaybackMode::InGenre),
        Just(PlaybackMode::InArtist),
        Just(PlaybackMode::InAlbum),
    ]
}

fn arbitrary_loop() -> impl Strategy<Value = LoopMode> {
    prop_oneof![Just(LoopMode::None), Just(LoopMode::All), Just(LoopMode::Track)]
}

#[derive(Debug, Clone)]
enum Op {
    Advance,
    Retreat,
    TrackEnded,
    Remove(usize),
    Move(usize, usize),
    Insert(usize),
    Prioritize(usize),
    Shuffle(bool, bool),
    Position(u64),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Advance),
        2 => Just(Op::Retreat),
        1 => Just(Op::TrackEnded),
        1 => (0usize..40).prop_map(Op::Remove),
        1 => (0usize..40, 0usize..40).prop_map(|(from, to)| Op::Move(from, to)),
        1 => (0usize..40).prop_map(Op::Insert),
        1 => (0usize..40).prop_map(Op::Prioritize),
        1 => (any::<bool>(), any::<bool>()).prop_map(|(on, keep)| Op::Shuffle(on, keep)),
        1 => (0u64..10_000).prop_map(Op::Position),
    ]
}

fn engine(catalog: Arc<Catalog>, seed: u64) -> QueueEngine {
    QueueEngine::new(catalog, PlaybackSettings::default(), Box::new(RecordingSink::new()))
        .with_seed(seed)
}

fn apply(engine: &mut QueueEngine, op: &Op) {
    let song_count = engine.catalog().songs().len();
    match *op {
        Op::Advance => engine.advance(),
        Op::Retreat => engine.retreat(),
        Op::TrackEnded => engine.on_track_ended(),
        Op::Remove(at) => {
            engine.remove_at(QueueKind::Primary, at);
        }
        Op::Move(from, to) => {
            engine.move_item(QueueKind::Primary, from, to);
        }
        Op::Insert(at) => {
            let id = engine.catalog().songs()[at % song_count].id;
            engine.insert_at(QueueKind::Primary, at, id);
        }
        Op::Prioritize(n) => {
            let id = engine.catalog().songs()[n % song_count].id;
            engine.add_to_priority_queue(id);
        }
        Op::Shuffle(on, keep) => engine.set_shuffling(on, keep),
        Op::Position(ms) => {
            engine.set_position(Duration::from_millis(ms));
        }
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: the index stays inside the primary queue
    #[test]
    fn index_stays_in_bounds(
        catalog in arbitrary_catalog(),
        start in 0usize..30,
        mode in arbitrary_mode(),
        loop_mode in arbitrary_loop(),
        ops in prop::collection::vec(arbitrary_op(), 1..60),
        seed in any::<u64>(),
    ) {
        let song = catalog.songs()[start % catalog.songs().len()].id;
        let mut engine = engine(catalog, seed);
        prop_assert!(engine.play_song(song, mode));
        engine.set_loop_mode(loop_mode);

        for op in &ops {
            apply(&mut engine, op);
            let state = engine.state();
            if state.queue().is_empty() {
                prop_assert_eq!(state.index(), 0);
            } else {
                prop_assert!(state.index() < state.queue().len());
            }
        }
    }

    /// Property: advance always takes the head of a non-empty priority queue
    #[test]
    fn priority_queue_takes_precedence(
        catalog in arbitrary_catalog(),
        picks in prop::collection::vec(0usize..30, 1..8),
        seed in any::<u64>(),
    ) {
        let songs: Vec<_> = catalog.songs().iter().map(|s| s.id).collect();
        let mut engine = engine(Arc::clone(&catalog), seed);
        engine.play_scope(Scope::AllSongs, false);
        let ids: Vec<_> = picks.iter().map(|&p| songs[p % songs.len()]).collect();
        engine.add_songs_to_priority_queue(&ids);

        for expected in ids {
            let before = engine.state().priority_queue().len();
            engine.advance();
            prop_assert_eq!(engine.state().current_song(), Some(expected));
            prop_assert!(engine.state().in_priority_queue());
            prop_assert_eq!(engine.state().priority_queue().len(), before - 1);
        }
    }

    /// Property: shuffling while keeping the song puts it at the front,
    /// also when it is playing from the priority queue
    #[test]
    fn shuffle_pins_current_song(
        catalog in arbitrary_catalog(),
        start in 0usize..30,
        queued in proptest::option::of(0usize..30),
        mode in arbitrary_mode(),
        seed in any::<u64>(),
    ) {
        let songs: Vec<_> = catalog.songs().iter().map(|s| s.id).collect();
        let mut engine = engine(catalog, seed);
        engine.play_song(songs[start % songs.len()], mode);
        if let Some(n) = queued {
            engine.add_to_priority_queue(songs[n % songs.len()]);
            engine.advance();
        }
        let song = engine.state().current_song().unwrap();

        engine.set_shuffling(true, true);
        let queue = engine.state().queue().to_vec();
        prop_assert_eq!(queue[0], song);
        prop_assert_eq!(engine.state().index(), 0);
        prop_assert_eq!(engine.state().current_song(), Some(song));
        prop_assert!(!engine.state().in_priority_queue());

        // Next plays the second queued song, nothing is skipped
        engine.advance();
        if queue.len() > 1 {
            prop_assert_eq!(engine.state().current_song(), Some(queue[1]));
        } else {
            prop_assert_eq!(engine.state().index(), 0);
        }
    }

    /// Property: shuffle then unshuffle gives back the sorted queue
    #[test]
    fn unshuffle_restores_order(
        catalog in arbitrary_catalog(),
        start in 0usize..30,
        mode in arbitrary_mode(),
        seed in any::<u64>(),
    ) {
        let song = catalog.songs()[start % catalog.songs().len()].id;
        let mut engine = engine(catalog, seed);
        engine.play_song(song, mode);
        let ordered = engine.state().queue().to_vec();

        engine.set_shuffling(true, true);
        let shuffled: HashSet<_> = engine.state().queue().iter().copied().collect();
        prop_assert_eq!(shuffled, ordered.iter().copied().collect::<HashSet<_>>());

        engine.set_shuffling(false, true);
        prop_assert_eq!(engine.state().queue(), ordered.as_slice());
        prop_assert_eq!(engine.state().current_song(), Some(song));
        prop_assert_eq!(engine.state().queue()[engine.state().index()], song);
    }

    /// Property: restore(snapshot(state)) reproduces the state
    #[test]
    fn snapshot_round_trip(
        catalog in arbitrary_catalog(),
        start in 0usize..30,
        mode in arbitrary_mode(),
        loop_mode in arbitrary_loop(),
        shuffled in any::<bool>(),
        steps in 0usize..10,
        picks in prop::collection::vec(0usize..30, 1..6),
        seed in any::<u64>(),
    ) {
        let songs: Vec<_> = catalog.songs().iter().map(|s| s.id).collect();
        let song = songs[start % songs.len()];
        let mut engine = engine(Arc::clone(&catalog), seed);
        engine.play_song(song, mode);
        engine.set_shuffling(shuffled, true);
        engine.set_loop_mode(loop_mode);
        for _ in 0..steps {
            engine.advance();
        }
        let ids: Vec<_> = picks.iter().map(|&p| songs[p % songs.len()]).collect();
        engine.add_songs_to_priority_queue(&ids);
        if steps % 2 == 1 {
            engine.advance();
        }

        let snapshot = engine.snapshot();
        let mut restored = self::engine(catalog, seed);
        restored.restore(&snapshot);

        let (before, after) = (engine.state(), restored.state());
        prop_assert_eq!(after.current_song(), before.current_song());
        prop_assert_eq!(after.index(), before.index());
        prop_assert_eq!(after.queue(), before.queue());
        prop_assert_eq!(after.priority_queue(), before.priority_queue());
        prop_assert_eq!(after.mode(), before.mode());
        prop_assert_eq!(after.scope(), before.scope());
        prop_assert_eq!(after.loop_mode(), before.loop_mode());
        prop_assert_eq!(after.is_shuffling(), before.is_shuffling());
        prop_assert_eq!(after.in_priority_queue(), before.in_priority_queue());
        prop_assert!(after.is_restored());
        prop_assert!(!after.is_playing());
    }

    #[test]
    fn kept_duplicates_round_trip(
        catalog in duplicate_heavy_catalog(),
        start in 0usize..30,
        mode in arbitrary_mode(),
        steps in 0usize..10,
        picks in prop::collection::vec(0usize..30, 0..4),
    ) {
        let songs: Vec<_> = catalog.songs().iter().map(|s| s.id).collect();
        let mut engine = engine(Arc::clone(&catalog), 0);
        engine.play_song(songs[start % songs.len()], mode);
        for _ in 0..steps {
            engine.advance();
        }
        let ids: Vec<_> = picks.iter().map(|&p| songs[p % songs.len()]).collect();
        engine.add_songs_to_priority_queue(&ids);

        let mut restored = self::engine(Arc::clone(&catalog), 0);
        restored.restore(&engine.snapshot());

        // Unshuffled queues come back id for id, duplicates included
        let (before, after) = (engine.state(), restored.state());
        prop_assert_eq!(after.queue(), before.queue());
        prop_assert_eq!(after.index(), before.index());
        prop_assert_eq!(after.current_song(), before.current_song());
        let distinct: HashSet<_> = after.queue().iter().collect();
        prop_assert_eq!(distinct.len(), after.queue().len());
    }
}
