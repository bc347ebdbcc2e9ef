//! Budgeted approximation of an existing diagram.
//!
//! [`Bdd::reduce_by_node_limit`] walks a three-valued BDD and rewrites
//! whole subtrees to ⊥ once a budget of distinct rebuilt nodes is spent.
//! The result refines the input in the three-valued order: wherever the
//! input is 0 or 1 the result is either the same value or ⊥, never the
//! opposite value.
//!
//! Billing is per distinct node and per top-level call: a shared node
//! costs one unit no matter how many paths reach it. The set of billed
//! node indices doubles as the visited set and dies with the call, so no
//! marks ever leak out of an operation.

use std::collections::HashSet;

use log::debug;

use crate::bdd::Bdd;
use crate::heuristics::TraverseHeuristic;
use crate::reference::Ref;

impl Bdd {
    /// Approximate `f` using at most `limit` rebuilt nodes.
    ///
    /// The heuristic decides which cofactor each recursion step explores
    /// first; the remaining budget flows into the second branch. Returns
    /// the approximated edge and a flag telling whether any ⊥ was
    /// introduced by budget exhaustion.
    ///
    /// # Examples
    ///
    /// ```
    /// use tbdd_rs::bdd::Bdd;
    /// use tbdd_rs::heuristics::TraverseHeuristic;
    ///
    /// let bdd = Bdd::new();
    /// let f = bdd.mk_cube([1, 2]);
    ///
    /// // A zero budget folds everything to ⊥.
    /// let (r, reduced) = bdd.reduce_by_node_limit(f, &TraverseHeuristic::GreedyOneStep, 0);
    /// assert_eq!(r, bdd.unknown());
    /// assert!(reduced);
    ///
    /// // An ample budget is the identity.
    /// let (r, reduced) = bdd.reduce_by_node_limit(f, &TraverseHeuristic::GreedyOneStep, 1024);
    /// assert_eq!(r, f);
    /// assert!(!reduced);
    /// ```
    pub fn reduce_by_node_limit(
        &self,
        f: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
    ) -> (Ref, bool) {
        debug!("reduce_by_node_limit(f = {}, limit = {})", f, limit);
        let mut billed = HashSet::new();
        let mut consumed = 0;
        let mut reduced = false;
        let r = self.reduce_by_node_limit_rec(f, heuristic, limit, &mut consumed, &mut reduced, &mut billed);
        debug!(
            "reduce_by_node_limit(f = {}, limit = {}) -> {} (consumed = {}, reduced = {})",
            f, limit, r, consumed, reduced
        );
        (r, reduced)
    }

    /// Recursive step shared with the budgeted apply operations, which
    /// thread their own billing state through here so that identity
    /// rewrites (`f ∧ 1`, a cache hit) still honor the caller's budget.
    pub(crate) fn reduce_by_node_limit_rec(
        &self,
        f: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
        consumed: &mut u32,
        reduced: &mut bool,
        billed: &mut HashSet<u32>,
    ) -> Ref {
        if self.is_constant(f) {
            return f;
        }
        // Already billed on this top-level call: shared structure is free.
        if billed.contains(&f.index()) {
            return f;
        }
        if limit == 0 {
            *reduced = true;
            return self.unknown();
        }

        let v = self.variable(f.index());
        let (low, high) = self.cofactors(f);

        let decision = heuristic.choose(self, f, None, None);
        let mut here = 0u32;

        let (t, e) = if decision < 0 {
            // Then branch first.
            let mut c = 0;
            let t = self.reduce_by_node_limit_rec(high, heuristic, limit - 1, &mut c, reduced, billed);
            here += c;
            c = 0;
            let e = self.reduce_by_node_limit_rec(
                low,
                heuristic,
                (limit - 1).saturating_sub(here),
                &mut c,
                reduced,
                billed,
            );
            here += c;
            (t, e)
        } else {
            // Else branch first.
            let mut c = 0;
            let e = self.reduce_by_node_limit_rec(low, heuristic, limit - 1, &mut c, reduced, billed);
            here += c;
            c = 0;
            let t = self.reduce_by_node_limit_rec(
                high,
                heuristic,
                (limit - 1).saturating_sub(here),
                &mut c,
                reduced,
                billed,
            );
            here += c;
            (t, e)
        };

        let r = if t == e {
            t
        } else {
            let r = self.mk_node(v, e, t);
            if billed.insert(r.index()) {
                here += 1;
            }
            r
        };

        *consumed += here;
        r
    }
}
