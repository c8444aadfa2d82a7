//! Sequential record-ID allocation.
//!
//! Record IDs are strings of the form `PREFIX_NNNN` (e.g. `EVT_0012`): a
//! category prefix, an underscore, and a zero-padded sequence number.
//! Allocation is a pure function over the caller's registry of existing IDs.
//!
//! # Algorithm Summary
//!
//! 1. Keep only registry entries that start with the prefix immediately
//!    followed by the separator
//! 2. Parse the first separator-delimited token after the prefix as a
//!    base-10 sequence number, ignoring entries that do not parse
//! 3. Allocate `max + 1`, or 1 when no parseable entry exists
//!
//! The allocator never mutates or persists anything: callers must append
//! the returned ID to their registry before allocating again, and callers
//! sharing a registry must serialize that read-compute-append themselves.

/// Separator between the prefix and the sequence number.
pub const ID_SEPARATOR: char = '_';

/// Returns the next available record ID under `prefix`.
///
/// `existing_ids` is the full registry of IDs currently in use, across all
/// prefixes, well-formed or not. Entries under other prefixes and entries
/// whose sequence segment does not parse are ignored. The result is
/// `prefix` + `_` + the smallest unused sequence number above the current
/// maximum, zero-padded to four digits (wider values render unpadded).
///
/// This operation is total: every input yields a well-formed ID.
pub fn next_record_id<'a, I>(prefix: &str, existing_ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let next = existing_ids
        .into_iter()
        .filter_map(|id| sequence_number(prefix, id))
        .max()
        .map_or(1, |max| max.saturating_add(1));

    format!("{prefix}{ID_SEPARATOR}{next:04}")
}

/// Parses the sequence number of `id` under `prefix`.
///
/// Returns `None` for entries of other prefixes, a bare prefix with no
/// separator, or a non-numeric sequence segment. Only the first
/// separator-delimited token after the prefix is considered, so
/// `EVT_0001_extra` parses as 1; existing datasets contain such entries
/// and they must keep counting.
fn sequence_number(prefix: &str, id: &str) -> Option<u64> {
    let rest = id.strip_prefix(prefix)?.strip_prefix(ID_SEPARATOR)?;
    let token = rest.split(ID_SEPARATOR).next()?;
    token.parse().ok()
}
