//! Budgeted apply operations over three-valued diagrams.
//!
//! The three primitives ([`and_reduced`][Bdd::and_reduced],
//! [`xor_reduced`][Bdd::xor_reduced], [`ite_reduced`][Bdd::ite_reduced])
//! are classical Shannon-expansion applies that carry a node budget. Each
//! recursion step cofactors the operands at the shallowest variable,
//! explores the cofactor chosen by the traversal heuristic first, and
//! hands the leftover budget to the other side. The budget pays for
//! *result* nodes: when combining the two sub-results would bill a node
//! past the budget, the combine is abandoned and ⊥ is returned instead,
//! with the reduced flag set.
//!
//! Identity rewrites (`f ∧ 1`, `f ⊕ 0`, a memo-cache hit) do not bypass
//! the budget: the surviving operand is itself pushed through the node
//! limit reducer with whatever budget remains.
//!
//! Results are memoized through [`OpCache`][crate::cache::OpCache],
//! which itself refuses anything computed with the reduced flag set:
//! approximations depend on the budget and would corrupt later exact
//! computations.
//!
//! The derived operations are complement compositions:
//! `or(f,g) = ¬and(¬f,¬g)`, `nand = ¬and`, `nor = and(¬f,¬g)`,
//! `xnor = ¬xor`, where every complement routes through
//! [`apply_not`][Bdd::apply_not] so that ⊥ stays ⊥.

use std::collections::HashSet;

use log::debug;

use crate::bdd::Bdd;
use crate::heuristics::TraverseHeuristic;
use crate::reference::Ref;
use crate::types::Var;

/// A budget that cannot be exhausted: with saturating budget arithmetic,
/// passing `u32::MAX` makes every reduced operation exact.
pub const NO_NODE_LIMIT: u32 = u32::MAX;

/// Fixed traversal order for the exact wrappers, where the recursion
/// order cannot affect the result and consulting the PRNG would be waste.
const EXACT_ORDER: TraverseHeuristic = TraverseHeuristic::Exact;

impl Bdd {
    /// Three-valued conjunction of `f` and `g` using at most `limit`
    /// rebuilt nodes. Returns the result and a flag telling whether any ⊥
    /// was introduced by budget exhaustion.
    pub fn and_reduced(
        &self,
        f: Ref,
        g: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
    ) -> (Ref, bool) {
        debug!("and_reduced(f = {}, g = {}, limit = {})", f, g, limit);
        let mut billed = HashSet::new();
        let mut consumed = 0;
        let mut reduced = false;
        let r = self.and_reduced_rec(f, g, heuristic, limit, &mut consumed, &mut reduced, &mut billed);
        (r, reduced)
    }

    /// Three-valued exclusive-or with a node budget.
    pub fn xor_reduced(
        &self,
        f: Ref,
        g: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
    ) -> (Ref, bool) {
        debug!("xor_reduced(f = {}, g = {}, limit = {})", f, g, limit);
        let mut billed = HashSet::new();
        let mut consumed = 0;
        let mut reduced = false;
        let r = self.xor_reduced_rec(f, g, heuristic, limit, &mut consumed, &mut reduced, &mut billed);
        (r, reduced)
    }

    /// Three-valued if-then-else with a node budget.
    pub fn ite_reduced(
        &self,
        f: Ref,
        g: Ref,
        h: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
    ) -> (Ref, bool) {
        debug!("ite_reduced(f = {}, g = {}, h = {}, limit = {})", f, g, h, limit);
        let mut billed = HashSet::new();
        let mut consumed = 0;
        let mut reduced = false;
        let r = self.ite_reduced_rec(f, g, h, heuristic, limit, &mut consumed, &mut reduced, &mut billed);
        (r, reduced)
    }

    /// `or(f, g) = ¬and(¬f, ¬g)`, with a node budget.
    pub fn or_reduced(
        &self,
        f: Ref,
        g: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
    ) -> (Ref, bool) {
        let (r, reduced) = self.and_reduced(self.apply_not(f), self.apply_not(g), heuristic, limit);
        (self.apply_not(r), reduced)
    }

    /// `nand(f, g) = ¬and(f, g)`, with a node budget.
    pub fn nand_reduced(
        &self,
        f: Ref,
        g: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
    ) -> (Ref, bool) {
        let (r, reduced) = self.and_reduced(f, g, heuristic, limit);
        (self.apply_not(r), reduced)
    }

    /// `nor(f, g) = and(¬f, ¬g)`, with a node budget.
    pub fn nor_reduced(
        &self,
        f: Ref,
        g: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
    ) -> (Ref, bool) {
        self.and_reduced(self.apply_not(f), self.apply_not(g), heuristic, limit)
    }

    /// `xnor(f, g) = ¬xor(f, g)`, with a node budget.
    pub fn xnor_reduced(
        &self,
        f: Ref,
        g: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
    ) -> (Ref, bool) {
        let (r, reduced) = self.xor_reduced(f, g, heuristic, limit);
        (self.apply_not(r), reduced)
    }

    /// Exact conjunction.
    pub fn apply_and(&self, f: Ref, g: Ref) -> Ref {
        self.and_reduced(f, g, &EXACT_ORDER, NO_NODE_LIMIT).0
    }

    /// Exact disjunction.
    pub fn apply_or(&self, f: Ref, g: Ref) -> Ref {
        self.or_reduced(f, g, &EXACT_ORDER, NO_NODE_LIMIT).0
    }

    /// Exact exclusive-or.
    pub fn apply_xor(&self, f: Ref, g: Ref) -> Ref {
        self.xor_reduced(f, g, &EXACT_ORDER, NO_NODE_LIMIT).0
    }

    /// Exact equivalence.
    pub fn apply_eq(&self, f: Ref, g: Ref) -> Ref {
        self.xnor_reduced(f, g, &EXACT_ORDER, NO_NODE_LIMIT).0
    }

    /// Exact implication `f → g`.
    pub fn apply_imply(&self, f: Ref, g: Ref) -> Ref {
        self.apply_not(self.and_reduced(f, self.apply_not(g), &EXACT_ORDER, NO_NODE_LIMIT).0)
    }

    /// Exact if-then-else.
    pub fn apply_ite(&self, f: Ref, g: Ref, h: Ref) -> Ref {
        self.ite_reduced(f, g, h, &EXACT_ORDER, NO_NODE_LIMIT).0
    }

    /// Turn every 0 of `f` into ⊥: `or(f, ⊥)`.
    pub fn forget_zeros(&self, f: Ref) -> Ref {
        self.apply_or(f, self.unknown())
    }

    /// Turn every 1 of `f` into ⊥: `and(f, ⊥)`.
    pub fn forget_ones(&self, f: Ref) -> Ref {
        self.apply_and(f, self.unknown())
    }

    /// Merge an under- and an overapproximation into a single partial
    /// function: 1 where `under` is 1, 0 where `over` is 0, ⊥ in between.
    pub fn merge_interval(&self, under: Ref, over: Ref) -> Ref {
        let tmp = self.apply_or(under, self.unknown());
        self.apply_and(tmp, over)
    }

    /// The shallowest decision variable among the non-constant operands.
    fn top_variable(&self, operands: &[Ref]) -> Var {
        let mut top = u32::MAX;
        for &operand in operands {
            if !self.is_constant(operand) {
                top = top.min(self.variable(operand.index()).id());
            }
        }
        debug_assert_ne!(top, u32::MAX, "at least one operand must be non-constant");
        Var::new(top)
    }

    fn and_reduced_rec(
        &self,
        f: Ref,
        g: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
        consumed: &mut u32,
        reduced: &mut bool,
        billed: &mut HashSet<u32>,
    ) -> Ref {
        // Terminal rules, first match wins. Identity cases still honor
        // the budget by routing the surviving operand through the
        // reducer.
        if f == g {
            return self.reduce_by_node_limit_rec(f, heuristic, limit, consumed, reduced, billed);
        }
        if f == -g {
            return self.zero();
        }
        if self.is_one(f) {
            return self.reduce_by_node_limit_rec(g, heuristic, limit, consumed, reduced, billed);
        }
        if self.is_one(g) {
            return self.reduce_by_node_limit_rec(f, heuristic, limit, consumed, reduced, billed);
        }
        if self.is_zero(f) || self.is_zero(g) {
            return self.zero();
        }

        // Normalize the commutative pair by edge identity.
        let (f, g) = if f.raw() <= g.raw() { (f, g) } else { (g, f) };

        let hit = self.and_cache.borrow().get(&(f, g));
        if let Some(r) = hit {
            // A cache hit is not a free ride: the caller's budget must
            // still be honored.
            return self.reduce_by_node_limit_rec(r, heuristic, limit, consumed, reduced, billed);
        }

        let m = self.top_variable(&[f, g]);
        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);

        let decision = heuristic.choose(self, f, Some(g), None);
        let mut here = 0u32;
        let mut sub_reduced = false;

        let (t, e) = if decision < 0 {
            let mut c = 0;
            let t = self.and_reduced_rec(
                f1,
                g1,
                heuristic,
                limit.saturating_sub(1),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            c = 0;
            let e = self.and_reduced_rec(
                f0,
                g0,
                heuristic,
                limit.saturating_sub(1).saturating_sub(here),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            (t, e)
        } else {
            let mut c = 0;
            let e = self.and_reduced_rec(
                f0,
                g0,
                heuristic,
                limit.saturating_sub(1),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            c = 0;
            let t = self.and_reduced_rec(
                f1,
                g1,
                heuristic,
                limit.saturating_sub(1).saturating_sub(here),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            (t, e)
        };

        let r = if t == e {
            t
        } else {
            let node = self.mk_node(m, e, t);
            if !billed.contains(&node.index()) {
                if here >= limit {
                    // The combined node would be billed past the budget.
                    debug!("and_reduced: budget exhausted at {}", m);
                    *consumed += here;
                    *reduced = true;
                    return self.unknown();
                }
                billed.insert(node.index());
                here += 1;
            }
            node
        };

        *consumed += here;
        *reduced |= sub_reduced;
        self.and_cache.borrow_mut().insert((f, g), r, sub_reduced);
        r
    }

    fn xor_reduced_rec(
        &self,
        f: Ref,
        g: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
        consumed: &mut u32,
        reduced: &mut bool,
        billed: &mut HashSet<u32>,
    ) -> Ref {
        // An unknown operand wins before the identity rules: two edges to
        // ⊥ may stand for different unknown subfunctions, so x ⊕ x = 0
        // must not fire on them.
        if self.is_unknown(f) || self.is_unknown(g) {
            return self.unknown();
        }
        if f == g {
            return self.zero();
        }
        if f == -g {
            return self.one();
        }
        if self.is_zero(f) {
            return self.reduce_by_node_limit_rec(g, heuristic, limit, consumed, reduced, billed);
        }
        if self.is_zero(g) {
            return self.reduce_by_node_limit_rec(f, heuristic, limit, consumed, reduced, billed);
        }
        if self.is_one(f) {
            let ng = self.apply_not(g);
            return self.reduce_by_node_limit_rec(ng, heuristic, limit, consumed, reduced, billed);
        }
        if self.is_one(g) {
            let nf = self.apply_not(f);
            return self.reduce_by_node_limit_rec(nf, heuristic, limit, consumed, reduced, billed);
        }

        let (f, g) = if f.raw() <= g.raw() { (f, g) } else { (g, f) };

        let hit = self.xor_cache.borrow().get(&(f, g));
        if let Some(r) = hit {
            return self.reduce_by_node_limit_rec(r, heuristic, limit, consumed, reduced, billed);
        }

        let m = self.top_variable(&[f, g]);
        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);

        let decision = heuristic.choose(self, f, Some(g), None);
        let mut here = 0u32;
        let mut sub_reduced = false;

        let (t, e) = if decision < 0 {
            let mut c = 0;
            let t = self.xor_reduced_rec(
                f1,
                g1,
                heuristic,
                limit.saturating_sub(1),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            c = 0;
            let e = self.xor_reduced_rec(
                f0,
                g0,
                heuristic,
                limit.saturating_sub(1).saturating_sub(here),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            (t, e)
        } else {
            let mut c = 0;
            let e = self.xor_reduced_rec(
                f0,
                g0,
                heuristic,
                limit.saturating_sub(1),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            c = 0;
            let t = self.xor_reduced_rec(
                f1,
                g1,
                heuristic,
                limit.saturating_sub(1).saturating_sub(here),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            (t, e)
        };

        let r = if t == e {
            t
        } else {
            let node = self.mk_node(m, e, t);
            if !billed.contains(&node.index()) {
                if here >= limit {
                    debug!("xor_reduced: budget exhausted at {}", m);
                    *consumed += here;
                    *reduced = true;
                    return self.unknown();
                }
                billed.insert(node.index());
                here += 1;
            }
            node
        };

        *consumed += here;
        *reduced |= sub_reduced;
        self.xor_cache.borrow_mut().insert((f, g), r, sub_reduced);
        r
    }

    fn ite_reduced_rec(
        &self,
        f: Ref,
        g: Ref,
        h: Ref,
        heuristic: &TraverseHeuristic,
        limit: u32,
        consumed: &mut u32,
        reduced: &mut bool,
        billed: &mut HashSet<u32>,
    ) -> Ref {
        let unknown = self.unknown();

        if self.is_one(f) {
            return self.reduce_by_node_limit_rec(g, heuristic, limit, consumed, reduced, billed);
        }
        if self.is_zero(f) {
            return self.reduce_by_node_limit_rec(h, heuristic, limit, consumed, reduced, billed);
        }
        if g == h {
            return self.reduce_by_node_limit_rec(g, heuristic, limit, consumed, reduced, billed);
        }
        // Unknown saturation: two unknown operands, or an unknown
        // condition over complementary branches, cannot be resolved.
        let unknowns =
            (f == unknown) as u32 + (g == unknown) as u32 + (h == unknown) as u32;
        if unknowns >= 2 {
            return unknown;
        }
        if f == unknown && g == -h {
            return unknown;
        }
        if self.is_one(g) && self.is_zero(h) {
            return self.reduce_by_node_limit_rec(f, heuristic, limit, consumed, reduced, billed);
        }
        if self.is_zero(g) && self.is_one(h) {
            let r = self.reduce_by_node_limit_rec(f, heuristic, limit, consumed, reduced, billed);
            return self.apply_not(r);
        }
        if h == -g {
            // ite(F, G, ~G) = F xnor G
            return self.xor_reduced_rec(f, h, heuristic, limit, consumed, reduced, billed);
        }
        if g == f {
            // ite(F, F, H) = F or H
            let nf = self.apply_not(f);
            let nh = self.apply_not(h);
            let r = self.and_reduced_rec(nf, nh, heuristic, limit, consumed, reduced, billed);
            return self.apply_not(r);
        }
        if g == -f {
            // ite(F, ~F, H) = ~F and H
            return self.and_reduced_rec(-f, h, heuristic, limit, consumed, reduced, billed);
        }

        // Canonicalize the input polarity: regular F, then regular G,
        // remembering a final complement.
        let (mut f, mut g, mut h) = (f, g, h);
        let mut complemented = false;
        if f.is_negated() {
            // ite(~F, G, H) = ite(F, H, G)
            f = -f;
            std::mem::swap(&mut g, &mut h);
        }
        if g.is_negated() {
            // ite(F, ~G, H) = ~ite(F, G, ~H)
            complemented = true;
            g = -g;
            h = self.apply_not(h);
        }

        let hit = self.ite_cache.borrow().get(&(f, g, h));
        if let Some(r) = hit {
            let r = self.reduce_by_node_limit_rec(r, heuristic, limit, consumed, reduced, billed);
            return if complemented { self.apply_not(r) } else { r };
        }

        let m = self.top_variable(&[f, g, h]);
        let (f0, f1) = self.top_cofactors(f, m);
        let (g0, g1) = self.top_cofactors(g, m);
        let (h0, h1) = self.top_cofactors(h, m);

        let decision = heuristic.choose(self, f, Some(g), Some(h));
        let mut here = 0u32;
        let mut sub_reduced = false;

        let (t, e) = if decision < 0 {
            let mut c = 0;
            let t = self.ite_reduced_rec(
                f1,
                g1,
                h1,
                heuristic,
                limit.saturating_sub(1),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            c = 0;
            let e = self.ite_reduced_rec(
                f0,
                g0,
                h0,
                heuristic,
                limit.saturating_sub(1).saturating_sub(here),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            (t, e)
        } else {
            let mut c = 0;
            let e = self.ite_reduced_rec(
                f0,
                g0,
                h0,
                heuristic,
                limit.saturating_sub(1),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            c = 0;
            let t = self.ite_reduced_rec(
                f1,
                g1,
                h1,
                heuristic,
                limit.saturating_sub(1).saturating_sub(here),
                &mut c,
                &mut sub_reduced,
                billed,
            );
            here += c;
            (t, e)
        };

        let r = if t == e {
            t
        } else {
            let node = self.mk_node(m, e, t);
            if !billed.contains(&node.index()) {
                if here >= limit {
                    debug!("ite_reduced: budget exhausted at {}", m);
                    *consumed += here;
                    *reduced = true;
                    // The final complement is immaterial: ⊥ is its own
                    // complement.
                    return unknown;
                }
                billed.insert(node.index());
                here += 1;
            }
            node
        };

        *consumed += here;
        *reduced |= sub_reduced;
        self.ite_cache.borrow_mut().insert((f, g, h), r, sub_reduced);
        if complemented {
            self.apply_not(r)
        } else {
            r
        }
    }
}
