//! Memoization of parse outcomes keyed by input position and
//! non-terminal.
//!
//! Caching is pluggable and optional: a parser without one is slower
//! but behaves identically. The first lookup for a `(position,
//! non-terminal)` pair seeds the slot as a failure, so a revisit of the
//! same pair while the first visit is still in flight fails instead of
//! recursing forever. This is what turns indirect left recursion into
//! an ordinary mismatch.

use crate::grammar::NtId;
use crate::text::TextPosition;
use crate::value::Value;

/// What the cache knows about a `(position, non-terminal)` pair.
pub enum CacheOutcome {
    /// Never queried before. The slot is now seeded as a failure until
    /// [`ParseCache::store`] overwrites it.
    FirstVisit,
    /// Known not to parse here.
    Fail,
    /// Known to parse here, with the memoized result and the position
    /// parsing continued from.
    Success(Value, TextPosition),
}

/// A memo of parse outcomes. Implementations may evict between parses
/// but must keep a slot stable while its non-terminal is in flight.
pub trait ParseCache {
    fn lookup(&mut self, offset: usize, nt: NtId) -> CacheOutcome;

    fn store(&mut self, offset: usize, nt: NtId, value: Value, next: TextPosition);
}

#[derive(Clone)]
enum Memo {
    Fail,
    Success(Value, TextPosition),
}

/// The brute-force reference cache: one bucket list per input
/// position, keyed by non-terminal.
pub struct DenseCache {
    slots: Vec<Vec<(NtId, Memo)>>,
}

impl DenseCache {
    /// A cache for an input of `input_len` bytes. One extra slot
    /// serves lookups at the end-of-input position.
    pub fn new(input_len: usize) -> Self {
        DenseCache {
            slots: vec![Vec::new(); input_len + 1],
        }
    }

    fn bucket(&mut self, offset: usize) -> &mut Vec<(NtId, Memo)> {
        let clamped = offset.min(self.slots.len() - 1);
        &mut self.slots[clamped]
    }
}

impl ParseCache for DenseCache {
    fn lookup(&mut self, offset: usize, nt: NtId) -> CacheOutcome {
        let bucket = self.bucket(offset);
        match bucket.iter().find(|(id, _)| *id == nt) {
            Some((_, Memo::Fail)) => CacheOutcome::Fail,
            Some((_, Memo::Success(value, next))) => CacheOutcome::Success(value.clone(), *next),
            None => {
                bucket.push((nt, Memo::Fail));
                CacheOutcome::FirstVisit
            }
        }
    }

    fn store(&mut self, offset: usize, nt: NtId, value: Value, next: TextPosition) {
        let bucket = self.bucket(offset);
        match bucket.iter_mut().find(|(id, _)| *id == nt) {
            Some((_, memo)) => *memo = Memo::Success(value, next),
            None => bucket.push((nt, Memo::Success(value, next))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_visit_seeds_failure() {
        let mut cache = DenseCache::new(4);
        let nt = NtId(0);
        assert!(matches!(cache.lookup(1, nt), CacheOutcome::FirstVisit));
        assert!(matches!(cache.lookup(1, nt), CacheOutcome::Fail));
    }

    #[test]
    fn store_overwrites_the_seed() {
        let mut cache = DenseCache::new(4);
        let nt = NtId(3);
        assert!(matches!(cache.lookup(2, nt), CacheOutcome::FirstVisit));
        let next = TextPosition {
            offset: 4,
            line: 1,
            column: 5,
        };
        cache.store(2, nt, Value::none(), next);
        match cache.lookup(2, nt) {
            CacheOutcome::Success(value, pos) => {
                assert!(value.is_none());
                assert_eq!(pos, next);
            }
            _ => panic!("expected a memoized success"),
        }
    }

    #[test]
    fn positions_do_not_interfere() {
        let mut cache = DenseCache::new(4);
        let nt = NtId(0);
        assert!(matches!(cache.lookup(0, nt), CacheOutcome::FirstVisit));
        assert!(matches!(cache.lookup(1, nt), CacheOutcome::FirstVisit));
        assert!(matches!(cache.lookup(0, NtId(1)), CacheOutcome::FirstVisit));
    }

    #[test]
    fn end_of_input_lookups_are_clamped() {
        let mut cache = DenseCache::new(0);
        assert!(matches!(cache.lookup(0, NtId(0)), CacheOutcome::FirstVisit));
        assert!(matches!(cache.lookup(9, NtId(0)), CacheOutcome::Fail));
    }
}
