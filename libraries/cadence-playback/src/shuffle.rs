//! Queue randomization
//!
//! Fisher-Yates over song ids, with an optional pinned song that is moved to
//! the front afterwards.

use cadence_core::SongId;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `songs` in place
///
/// When `pinned` is in the list it ends up at index 0 and the rest keep their
/// shuffled order. Returns whether the pin was applied.
pub fn shuffle_pinned<R: Rng + ?Sized>(
    songs: &mut Vec<SongId>,
    pinned: Option<SongId>,
    rng: &mut R,
) -> bool {
    songs.shuffle(rng);

    let Some(pos) = pinned.and_then(|id| songs.iter().position(|&song| song == id)) else {
        return false;
    };
    let id = songs.remove(pos);
    songs.insert(0, id);
    true
}
