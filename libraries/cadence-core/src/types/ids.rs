/// Identity types for library entities
///
/// Catalog-assigned ids are only valid for one scan of the media index.
/// Content hashes survive rescans and are what gets persisted.
use sha2::{Digest, Sha256};

/// Song identifier (assigned by the media index)
pub type SongId = i64;

/// Album identifier (assigned at catalog build time)
pub type AlbumId = i64;

/// Artist identifier (assigned at catalog build time)
pub type ArtistId = i64;

/// Genre identifier (assigned at catalog build time)
pub type GenreId = i64;

/// Durable content hash of an entity
pub type EntityHash = i32;

/// Persisted stand-in for "no song" / "no parent"
///
/// Never produced by [`content_hash`].
pub const UNSET_HASH: EntityHash = i32::MIN;

/// Unit separator between hashed fields, so ("ab", "c") and ("a", "bc") differ
const FIELD_SEPARATOR: u8 = 0x1f;

/// Compute a durable hash over an entity's identifying fields
///
/// Uses the first four bytes of a SHA-256 digest, so the value is identical
/// across processes, platforms and toolchain versions.
pub fn content_hash(fields: &[&str]) -> EntityHash {
    let mut hasher = Sha256::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            hasher.update([FIELD_SEPARATOR]);
        }
        hasher.update(field.as_bytes());
    }
    let digest = hasher.finalize();
    let hash = i32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);

    if hash == UNSET_HASH {
        UNSET_HASH + 1
    } else {
        hash
    }
}
