//! Canonical ordering of object ids on the wire.

use gix_hash::ObjectId;

/// Convert `ids` to their lowercase hexadecimal form and sort them lexicographically.
///
/// Duplicates are kept, so each input produces exactly one line.
pub fn sorted_hex<'a>(ids: impl IntoIterator<Item = &'a ObjectId>) -> Vec<String> {
    let mut out: Vec<_> = ids.into_iter().map(ToString::to_string).collect();
    out.sort_unstable();
    out
}
