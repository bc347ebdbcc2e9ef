//! Memoization of exact operation results.
//!
//! The computed table is direct-mapped: each slot remembers the most
//! recent result whose key hashed to it, newer entries evict older ones.
//!
//! The table only ever holds *exact* results. A result computed under an
//! exhausted node budget is shaped by that budget and would corrupt any
//! later computation that finds it, so [`OpCache::insert`] takes the
//! reduced flag and drops such results centrally rather than trusting
//! every call site to remember the rule. On the lookup side the caller
//! still owes its own budget for a hit: the cached diagram is exact, not
//! free.

use std::cell::Cell;

use crate::reference::Ref;
use crate::utils::MyHash;

pub struct OpCache<K> {
    slots: Vec<Option<(K, Ref)>>,
    mask: usize,
    lookups: Cell<usize>,
    hits: Cell<usize>,
}

impl<K> OpCache<K> {
    /// An operation cache with `2^bits` slots.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bits should be in the range 0..=31");
        let size = 1usize << bits;
        Self {
            slots: std::iter::repeat_with(|| None).take(size).collect(),
            mask: size - 1,
            lookups: Cell::new(0),
            hits: Cell::new(0),
        }
    }

    /// Lookups answered from the table so far.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    /// Total lookups so far.
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }
}

impl<K> OpCache<K>
where
    K: MyHash + Eq,
{
    fn slot(&self, key: &K) -> usize {
        key.hash() as usize & self.mask
    }

    /// The memoized exact result for `key`, if it survived eviction.
    pub fn get(&self, key: &K) -> Option<Ref> {
        self.lookups.set(self.lookups.get() + 1);
        match &self.slots[self.slot(key)] {
            Some((stored, result)) if stored == key => {
                self.hits.set(self.hits.get() + 1);
                Some(*result)
            }
            _ => None,
        }
    }

    /// Memoize a result, evicting whatever occupied its slot.
    ///
    /// A result computed under an exhausted budget (`reduced` set) is
    /// dropped, not stored: it stands for the budget that produced it,
    /// not for the operation.
    pub fn insert(&mut self, key: K, result: Ref, reduced: bool) {
        if reduced {
            return;
        }
        let slot = self.slot(&key);
        self.slots[slot] = Some((key, result));
    }
}
