//! The BDD manager and the three-valued node model.
//!
//! All diagrams live in one shared, hash-consed DAG owned by the [`Bdd`]
//! manager. Edges are [`Ref`] handles with a complement bit; there are
//! three terminals:
//!
//! - `one()`: the constant 1 (node 1),
//! - `zero()`: the constant 0, stored as the complement edge to 1,
//! - `unknown()`: the constant ⊥, a distinct terminal that is its own
//!   complement and is never reached through a complemented edge.
//!
//! # Canonical form
//!
//! Every internal node satisfies:
//!
//! 1. `(variable, low, high)` triples are unique (hash-consing),
//! 2. `low != high` (no useless splits),
//! 3. the `high` edge is never complemented,
//! 4. when `high` is ⊥, the `low` edge is not complemented either;
//!    the complement moves to the incoming edge instead.
//!
//! Rules 3 and 4 together push all polarity up into incoming edges while
//! granting ⊥ the "own complement" property, so every three-valued
//! function keeps a single representation.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::Debug;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cache::OpCache;
use crate::node::Node;
use crate::reference::Ref;
use crate::subtable::{Subtable, DEFAULT_BUCKET_BITS};
use crate::types::Var;

const ONE_INDEX: u32 = 1;
const UNKNOWN_INDEX: u32 = 2;

/// Default number of cache bits (2^16 slots per operation cache).
const DEFAULT_CACHE_BITS: usize = 16;

/// Tuning knobs for the [`Bdd`] manager.
#[derive(Debug, Clone)]
pub struct BddConfig {
    bucket_bits: usize,
    cache_bits: usize,
    seed: u64,
}

impl Default for BddConfig {
    fn default() -> Self {
        Self {
            bucket_bits: DEFAULT_BUCKET_BITS,
            cache_bits: DEFAULT_CACHE_BITS,
            seed: 1,
        }
    }
}

impl BddConfig {
    /// Subtable bucket count per variable, as a power of two.
    pub fn with_bucket_bits(mut self, bits: usize) -> Self {
        self.bucket_bits = bits;
        self
    }

    /// Operation cache size, as a power of two.
    pub fn with_cache_bits(mut self, bits: usize) -> Self {
        self.cache_bits = bits;
        self
    }

    /// Seed for the manager PRNG used by the randomized traversal
    /// heuristics. Fixing the seed makes every operation deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// The BDD manager: shared node storage, unique subtables, operation
/// caches and the PRNG backing randomized traversal.
///
/// All methods take `&self`; internal state uses interior mutability, so a
/// manager can be threaded through computations without `mut` plumbing.
pub struct Bdd {
    nodes: RefCell<Vec<Node>>,
    subtables: RefCell<Vec<Subtable>>,
    bucket_bits: usize,
    pub(crate) and_cache: RefCell<OpCache<(Ref, Ref)>>,
    pub(crate) xor_cache: RefCell<OpCache<(Ref, Ref)>>,
    pub(crate) ite_cache: RefCell<OpCache<(Ref, Ref, Ref)>>,
    rng: RefCell<ChaCha8Rng>,
}

impl Bdd {
    pub fn new() -> Self {
        Self::with_config(BddConfig::default())
    }

    pub fn with_config(config: BddConfig) -> Self {
        // Index 0 is a storage sentinel and never referenced.
        let nodes = vec![
            Node::terminal(ONE_INDEX),
            Node::terminal(ONE_INDEX),
            Node::terminal(UNKNOWN_INDEX),
        ];
        Self {
            nodes: RefCell::new(nodes),
            subtables: RefCell::new(Vec::new()),
            bucket_bits: config.bucket_bits,
            and_cache: RefCell::new(OpCache::new(config.cache_bits)),
            xor_cache: RefCell::new(OpCache::new(config.cache_bits)),
            ite_cache: RefCell::new(OpCache::new(config.cache_bits)),
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(config.seed)),
        }
    }
}

impl Default for Bdd {
    fn default() -> Self {
        Bdd::new()
    }
}

impl Debug for Bdd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bdd")
            .field("num_nodes", &self.num_nodes())
            .field("num_vars", &self.num_vars())
            .finish()
    }
}

impl Bdd {
    /// The constant 1.
    pub fn one(&self) -> Ref {
        Ref::positive(ONE_INDEX)
    }

    /// The constant 0, the complement edge to 1.
    pub fn zero(&self) -> Ref {
        Ref::negative(ONE_INDEX)
    }

    /// The constant ⊥.
    pub fn unknown(&self) -> Ref {
        Ref::positive(UNKNOWN_INDEX)
    }

    pub fn is_one(&self, f: Ref) -> bool {
        f == self.one()
    }

    pub fn is_zero(&self, f: Ref) -> bool {
        f == self.zero()
    }

    pub fn is_unknown(&self, f: Ref) -> bool {
        f == self.unknown()
    }

    pub fn is_constant(&self, f: Ref) -> bool {
        f.index() == ONE_INDEX || f.index() == UNKNOWN_INDEX
    }

    /// Negation. ⊥ is its own complement: every complement in the engine
    /// must pass through here rather than bare `-` so that a negated edge
    /// to ⊥ never comes into existence.
    pub fn apply_not(&self, f: Ref) -> Ref {
        if self.is_unknown(f) {
            f
        } else {
            -f
        }
    }

    /// The stored node at `index`.
    pub(crate) fn node(&self, index: u32) -> Node {
        self.nodes.borrow()[index as usize]
    }

    /// The decision variable of the node at `index`
    /// ([`Var::TERMINAL`] for terminals).
    pub fn variable(&self, index: u32) -> Var {
        self.node(index).variable
    }

    /// The stored low child of the node at `index` (no polarity applied).
    pub fn low(&self, index: u32) -> Ref {
        self.node(index).low
    }

    /// The stored high child of the node at `index` (no polarity applied).
    pub fn high(&self, index: u32) -> Ref {
        self.node(index).high
    }

    /// Variable id of a node, with terminals pushed below everything.
    pub(crate) fn level_or_bottom(&self, index: u32) -> u32 {
        let v = self.variable(index);
        if v.is_terminal() {
            u32::MAX
        } else {
            v.id()
        }
    }

    /// The `(low, high)` cofactors of a non-constant edge, with the edge
    /// polarity pushed into the children. A ⊥ child absorbs the
    /// complement.
    pub fn cofactors(&self, f: Ref) -> (Ref, Ref) {
        debug_assert!(!self.is_constant(f));
        let node = self.node(f.index());
        if f.is_negated() {
            (self.apply_not(node.low), self.apply_not(node.high))
        } else {
            (node.low, node.high)
        }
    }

    /// Cofactors of `f` with respect to variable `v`, which must not be
    /// deeper than `f`'s top variable. Returns `(f, f)` if `f` does not
    /// depend on `v` at the top.
    pub fn top_cofactors(&self, f: Ref, v: Var) -> (Ref, Ref) {
        if self.is_constant(f) || v < self.variable(f.index()) {
            return (f, f);
        }
        debug_assert_eq!(v, self.variable(f.index()));
        self.cofactors(f)
    }

    /// Number of variables known to the manager.
    pub fn num_vars(&self) -> usize {
        self.subtables.borrow().len()
    }

    /// Number of nodes in the storage, terminals included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len() - 1
    }

    /// A pseudorandom `u32` from the manager PRNG.
    pub(crate) fn random(&self) -> u32 {
        self.rng.borrow_mut().random()
    }

    fn ensure_var(&self, v: Var) {
        let mut subtables = self.subtables.borrow_mut();
        while (subtables.len() as u32) < v.id() {
            let var = Var::new(subtables.len() as u32 + 1);
            subtables.push(Subtable::with_bucket_bits(var, self.bucket_bits));
        }
    }

    /// Unique-table lookup/insertion; the canonical-form work is done by
    /// [`mk_node`][Self::mk_node] before this point.
    fn intern(&self, v: Var, low: Ref, high: Ref) -> Ref {
        debug_assert!(!high.is_negated());
        self.ensure_var(v);
        let mut subtables = self.subtables.borrow_mut();
        let subtable = &mut subtables[(v.id() - 1) as usize];
        let mut nodes = self.nodes.borrow_mut();
        if let Some(index) = subtable.find(low, high, &nodes) {
            return Ref::positive(index);
        }
        let index = nodes.len() as u32;
        nodes.push(Node::new(v, low, high));
        subtable.insert(low, high, index, &mut nodes);
        debug!("mk: created node @{} = ({}, {}, {})", index, v, low, high);
        Ref::positive(index)
    }

    /// Build (or find) the node `(v, low, high)` in canonical form.
    ///
    /// | case | produced node | incoming edge |
    /// |---|---|---|
    /// | `low == high` | none, `low` returned | unchanged |
    /// | `high` complemented | `(v, ¬low unless ⊥, ¬high)` | complemented |
    /// | `high == ⊥`, `low` complemented | `(v, ¬low, ⊥)` | complemented |
    /// | otherwise | `(v, low, high)` | unchanged |
    ///
    /// Children must be constants or nodes on deeper variables.
    pub fn mk_node(&self, v: Var, low: Ref, high: Ref) -> Ref {
        assert!(!v.is_terminal(), "Terminal marker cannot label a decision node");
        debug_assert!(self.is_constant(low) || self.variable(low.index()) > v);
        debug_assert!(self.is_constant(high) || self.variable(high.index()) > v);
        debug_assert!(!(low.is_negated() && low.index() == UNKNOWN_INDEX));
        debug_assert!(!(high.is_negated() && high.index() == UNKNOWN_INDEX));

        if low == high {
            return low;
        }
        if high.is_negated() {
            -self.intern(v, self.apply_not(low), -high)
        } else if high == self.unknown() && low.is_negated() {
            -self.intern(v, -low, high)
        } else {
            self.intern(v, low, high)
        }
    }

    /// The positive literal of variable `v`.
    pub fn mk_var(&self, v: u32) -> Ref {
        self.mk_node(Var::new(v), self.zero(), self.one())
    }

    /// Is `f` (up to polarity) the projection function of a single
    /// variable?
    pub fn is_var_node(&self, f: Ref) -> bool {
        if self.is_constant(f) {
            return false;
        }
        let node = self.node(f.index());
        node.low == self.zero() && node.high == self.one()
    }

    /// Conjunction of literals; positive `i` stands for `x_i`, negative
    /// for `¬x_i`.
    pub fn mk_cube(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut lits: Vec<i32> = literals.into_iter().collect();
        lits.sort_by_key(|lit| std::cmp::Reverse(lit.unsigned_abs()));
        let mut res = self.one();
        for lit in lits {
            assert_ne!(lit, 0, "Literals are non-zero");
            let v = Var::new(lit.unsigned_abs());
            res = if lit > 0 {
                self.mk_node(v, self.zero(), res)
            } else {
                self.mk_node(v, res, self.zero())
            };
        }
        res
    }

    /// Disjunction of literals.
    pub fn mk_clause(&self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut lits: Vec<i32> = literals.into_iter().collect();
        lits.sort_by_key(|lit| std::cmp::Reverse(lit.unsigned_abs()));
        let mut res = self.zero();
        for lit in lits {
            assert_ne!(lit, 0, "Literals are non-zero");
            let v = Var::new(lit.unsigned_abs());
            res = if lit > 0 {
                self.mk_node(v, res, self.one())
            } else {
                self.mk_node(v, self.one(), res)
            };
        }
        res
    }

    /// Indices of all nodes reachable from the given roots, terminals
    /// included.
    pub fn descendants(&self, roots: impl IntoIterator<Item = Ref>) -> HashSet<u32> {
        let mut visited = HashSet::new();
        let mut stack: Vec<u32> = roots.into_iter().map(|r| r.index()).collect();
        while let Some(index) = stack.pop() {
            if !visited.insert(index) {
                continue;
            }
            let node = self.node(index);
            if !node.variable.is_terminal() {
                stack.push(node.low.index());
                stack.push(node.high.index());
            }
        }
        visited
    }

    /// Number of internal (non-terminal) nodes reachable from `f`.
    pub fn size(&self, f: Ref) -> usize {
        self.descendants([f])
            .into_iter()
            .filter(|&index| !self.variable(index).is_terminal())
            .count()
    }

    /// A nested textual rendering `(var, high-branch, low-branch)`,
    /// useful in tests and logs.
    pub fn to_bracket_string(&self, f: Ref) -> String {
        if self.is_zero(f) {
            return format!("{}:(0)", f);
        } else if self.is_one(f) {
            return format!("{}:(1)", f);
        } else if self.is_unknown(f) {
            return format!("{}:(U)", f);
        }

        let v = self.variable(f.index());
        let (low, high) = self.cofactors(f);
        format!(
            "{}:({}, {}, {})",
            f,
            v,
            self.to_bracket_string(high),
            self.to_bracket_string(low)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals() {
        let bdd = Bdd::new();
        assert_eq!(bdd.zero(), -bdd.one());
        assert_ne!(bdd.unknown(), bdd.one());
        assert_ne!(bdd.unknown(), bdd.zero());
        assert!(bdd.is_constant(bdd.one()));
        assert!(bdd.is_constant(bdd.zero()));
        assert!(bdd.is_constant(bdd.unknown()));
    }

    #[test]
    fn test_unknown_is_its_own_complement() {
        let bdd = Bdd::new();
        assert_eq!(bdd.apply_not(bdd.unknown()), bdd.unknown());
        assert_eq!(bdd.apply_not(bdd.one()), bdd.zero());
        assert_eq!(bdd.apply_not(bdd.zero()), bdd.one());
    }

    #[test]
    fn test_mk_node_collapses_equal_children() {
        let bdd = Bdd::new();
        assert_eq!(bdd.mk_node(Var::new(1), bdd.one(), bdd.one()), bdd.one());
        assert_eq!(
            bdd.mk_node(Var::new(1), bdd.unknown(), bdd.unknown()),
            bdd.unknown()
        );
    }

    #[test]
    fn test_mk_node_restores_canonicity() {
        let bdd = Bdd::new();
        let x = bdd.mk_var(1);
        assert!(!x.is_negated());
        // (x1, high=0, low=1) is the complement of the literal.
        assert_eq!(bdd.mk_node(Var::new(1), bdd.one(), bdd.zero()), -x);
        // High edges of stored nodes are regular.
        assert!(!bdd.high(x.index()).is_negated());
    }

    #[test]
    fn test_mk_node_unknown_canonical_form() {
        let bdd = Bdd::new();
        let v = Var::new(1);
        // (v, low=0, high=⊥) swaps to the complement of (v, low=1, high=⊥).
        let a = bdd.mk_node(v, bdd.zero(), bdd.unknown());
        let b = bdd.mk_node(v, bdd.one(), bdd.unknown());
        assert!(!b.is_negated());
        assert_eq!(a, -b);
        // The stored low edge is regular in both cases.
        assert!(!bdd.low(a.index()).is_negated());
    }

    #[test]
    fn test_mk_node_hash_consing() {
        let bdd = Bdd::new();
        let x3 = bdd.mk_var(3);
        let f = bdd.mk_node(Var::new(2), bdd.zero(), x3);
        let g = bdd.mk_node(Var::new(2), bdd.zero(), x3);
        assert_eq!(f, g);
    }

    #[test]
    fn test_cofactors_through_complement() {
        let bdd = Bdd::new();
        let b = bdd.mk_node(Var::new(1), bdd.one(), bdd.unknown());
        // Negation flips the low cofactor but ⊥ stays ⊥.
        assert_eq!(bdd.cofactors(b), (bdd.one(), bdd.unknown()));
        assert_eq!(bdd.cofactors(-b), (bdd.zero(), bdd.unknown()));
    }

    #[test]
    fn test_top_cofactors_shallower_var() {
        let bdd = Bdd::new();
        let x2 = bdd.mk_var(2);
        assert_eq!(bdd.top_cofactors(x2, Var::new(1)), (x2, x2));
        assert_eq!(bdd.top_cofactors(x2, Var::new(2)), (bdd.zero(), bdd.one()));
    }

    #[test]
    fn test_is_var_node() {
        let bdd = Bdd::new();
        let x = bdd.mk_var(5);
        assert!(bdd.is_var_node(x));
        assert!(bdd.is_var_node(-x));
        assert!(!bdd.is_var_node(bdd.one()));
        assert!(!bdd.is_var_node(bdd.unknown()));
        let f = bdd.mk_cube([1, 2]);
        assert!(!bdd.is_var_node(f));
    }

    #[test]
    fn test_mk_cube_structure() {
        let bdd = Bdd::new();
        let f = bdd.mk_cube([1, -2]);
        assert_eq!(bdd.variable(f.index()), Var::new(1));
        assert_eq!(bdd.size(f), 2);
        let g = bdd.mk_clause([1, 2]);
        assert_eq!(bdd.size(g), 2);
    }

    #[test]
    fn test_size_counts_shared_nodes_once() {
        let bdd = Bdd::new();
        let x3 = bdd.mk_var(3);
        let a = bdd.mk_node(Var::new(2), bdd.zero(), x3);
        let b = bdd.mk_node(Var::new(2), x3, bdd.one());
        let f = bdd.mk_node(Var::new(1), a, b);
        // x3 is shared between both branches.
        assert_eq!(bdd.size(f), 4);
    }
}
