//! Model counting and witness extraction over partial functions.

use std::collections::HashMap;

use num_bigint::{BigUint, ToBigUint};

use crate::bdd::Bdd;
use crate::reference::Ref;

/// How the `2^n` total assignments split between the three truth values.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TruthCounts {
    pub ones: BigUint,
    pub zeros: BigUint,
    pub unknowns: BigUint,
}

impl Bdd {
    /// A conjunction of literals leading to a definite 1, if any.
    ///
    /// Branches ending in ⊥ are not witnesses and are skipped.
    pub fn one_sat(&self, f: Ref) -> Option<Vec<i32>> {
        self._one_sat(f, vec![])
    }

    fn _one_sat(&self, f: Ref, path: Vec<i32>) -> Option<Vec<i32>> {
        if self.is_zero(f) || self.is_unknown(f) {
            return None;
        }
        if self.is_one(f) {
            return Some(path);
        }

        let v = self.variable(f.index()).id() as i32;
        let (low, high) = self.cofactors(f);

        let mut path_high = path.clone();
        path_high.push(v);
        if let Some(res) = self._one_sat(high, path_high) {
            return Some(res);
        }

        let mut path_low = path;
        path_low.push(-v);
        self._one_sat(low, path_low)
    }

    /// Count how many of the `2^num_vars` assignments lead to 1, 0 and ⊥.
    pub fn counts(&self, f: Ref, num_vars: usize) -> TruthCounts {
        let mut cache = HashMap::new();
        let two = 2.to_biguint().unwrap();
        let max = two.pow(num_vars as u32);
        let (ones, unknowns) = self._counts(f, &max, &mut cache);
        let zeros = &max - &ones - &unknowns;
        TruthCounts { ones, zeros, unknowns }
    }

    /// Number of assignments on which `f` is a definite 1.
    pub fn sat_count(&self, f: Ref, num_vars: usize) -> BigUint {
        self.counts(f, num_vars).ones
    }

    /// Number of assignments on which `f` is ⊥.
    pub fn unknown_count(&self, f: Ref, num_vars: usize) -> BigUint {
        self.counts(f, num_vars).unknowns
    }

    fn _counts(
        &self,
        f: Ref,
        max: &BigUint,
        cache: &mut HashMap<Ref, (BigUint, BigUint)>,
    ) -> (BigUint, BigUint) {
        if self.is_zero(f) {
            return (BigUint::ZERO, BigUint::ZERO);
        }
        if self.is_one(f) {
            return (max.clone(), BigUint::ZERO);
        }
        if self.is_unknown(f) {
            return (BigUint::ZERO, max.clone());
        }

        if let Some(res) = cache.get(&f) {
            return res.clone();
        }

        // Count through the stored children; the node halves the space.
        let low = self.low(f.index());
        let high = self.high(f.index());

        let (ones_low, unknowns_low) = self._counts(low, max, cache);
        let (ones_high, unknowns_high) = self._counts(high, max, cache);

        let ones: BigUint = (ones_low + ones_high) >> 1;
        let unknowns: BigUint = (unknowns_low + unknowns_high) >> 1;

        // A complemented edge swaps ones and zeros; the unknowns stay.
        let res = if f.is_negated() {
            (max - &ones - &unknowns, unknowns)
        } else {
            (ones, unknowns)
        };

        cache.insert(f, res.clone());
        res
    }
}
