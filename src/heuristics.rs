//! Traversal-order heuristics for the budgeted operations.
//!
//! A heuristic inspects up to three operand edges that meet at a common
//! top variable and decides which cofactor the recursion should explore
//! first. When the node budget runs out mid-computation, whatever has not
//! been explored yet collapses to ⊥, so exploring the cheaper side first
//! leaves more budget for the side that actually needs it.
//!
//! Dispatch is a tagged enum with a `Custom` escape hatch carrying a plain
//! function pointer.

use crate::bdd::Bdd;
use crate::reference::Ref;

/// Signature of a user-supplied traversal policy. A negative return value
/// explores the then (high) cofactor first, non-negative the else (low)
/// cofactor first.
pub type TraverseFn = fn(&Bdd, Ref, Option<Ref>, Option<Ref>) -> i32;

/// Policy choosing the recursion order of the budgeted operations.
#[derive(Debug, Copy, Clone)]
pub enum TraverseHeuristic {
    /// Fixed then-first order. The choice of the exact operators, where
    /// traversal order cannot affect the result and consulting the PRNG
    /// would be wasted work.
    Exact,
    /// A fair coin from the manager PRNG.
    Random,
    /// Looks one Shannon step ahead: prefers the side where more operands
    /// hit a terminal cofactor, then the side whose cofactors sit deeper
    /// in the order.
    GreedyOneStep,
    /// Like [`GreedyOneStep`][Self::GreedyOneStep], but scores the
    /// grandchildren of each cofactor; a terminal cofactor counts as a
    /// whole terminal subtree (weight 8).
    GreedyTwoStep,
    /// A user-supplied policy.
    Custom(TraverseFn),
}

impl TraverseHeuristic {
    /// Decide which cofactor to recurse into first. At least one operand
    /// must be non-constant.
    ///
    /// Returns a negative number for the then (high) branch, a
    /// non-negative number for the else (low) branch.
    pub fn choose(&self, bdd: &Bdd, f: Ref, g: Option<Ref>, h: Option<Ref>) -> i32 {
        match self {
            TraverseHeuristic::Exact => -1,
            TraverseHeuristic::Random => coin(bdd),
            TraverseHeuristic::GreedyOneStep => greedy(bdd, f, g, h, tally_one_step),
            TraverseHeuristic::GreedyTwoStep => greedy(bdd, f, g, h, tally_two_step),
            TraverseHeuristic::Custom(traverse) => traverse(bdd, f, g, h),
        }
    }
}

fn coin(bdd: &Bdd) -> i32 {
    if bdd.random() % 2 == 1 {
        -1
    } else {
        1
    }
}

/// Accumulated evidence for the two sides of the split.
#[derive(Default)]
struct Tally {
    tconst: u32,
    econst: u32,
    tscore: u32,
    escore: u32,
}

fn greedy(
    bdd: &Bdd,
    f: Ref,
    g: Option<Ref>,
    h: Option<Ref>,
    tally_op: fn(&Bdd, Ref, &mut Tally),
) -> i32 {
    let operands = [Some(f), g, h];
    let top = operands
        .iter()
        .flatten()
        .map(|r| bdd.level_or_bottom(r.index()))
        .min()
        .expect("at least one operand");
    debug_assert_ne!(top, u32::MAX, "at least one operand must be non-constant");

    let mut tally = Tally::default();
    for operand in operands.into_iter().flatten() {
        if bdd.level_or_bottom(operand.index()) == top {
            tally_op(bdd, operand, &mut tally);
        }
    }

    if tally.tconst > tally.econst || (tally.tconst == tally.econst && tally.tscore > tally.escore)
    {
        -1
    } else if tally.tconst < tally.econst
        || (tally.tconst == tally.econst && tally.tscore < tally.escore)
    {
        1
    } else {
        coin(bdd)
    }
}

fn tally_one_step(bdd: &Bdd, operand: Ref, tally: &mut Tally) {
    let node = bdd.node(operand.index());
    let t = node.high;
    let e = node.low.regular();

    if bdd.is_constant(t) {
        tally.tconst += 1;
    } else {
        tally.tscore += bdd.variable(t.index()).id();
    }
    if bdd.is_constant(e) {
        tally.econst += 1;
    } else {
        tally.escore += bdd.variable(e.index()).id();
    }
}

fn tally_two_step(bdd: &Bdd, operand: Ref, tally: &mut Tally) {
    let node = bdd.node(operand.index());
    let t = node.high;
    let e = node.low.regular();

    if bdd.is_constant(t) {
        tally.tconst += 8;
    } else {
        let tn = bdd.node(t.index());
        count_node_score(bdd, tn.high, &mut tally.tconst, &mut tally.tscore);
        count_node_score(bdd, tn.low, &mut tally.tconst, &mut tally.tscore);
    }
    if bdd.is_constant(e) {
        tally.econst += 8;
    } else {
        let en = bdd.node(e.index());
        count_node_score(bdd, en.high, &mut tally.econst, &mut tally.escore);
        count_node_score(bdd, en.low, &mut tally.econst, &mut tally.escore);
    }
}

fn count_node_score(bdd: &Bdd, f: Ref, con: &mut u32, score: &mut u32) {
    let f = f.regular();
    if bdd.is_constant(f) {
        *con += 1;
    } else {
        *score += bdd.variable(f.index()).id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdd::Bdd;
    use crate::types::Var;

    #[test]
    fn test_custom_is_called() {
        let bdd = Bdd::new();
        let x = bdd.mk_var(1);
        let heuristic = TraverseHeuristic::Custom(|_, _, _, _| -7);
        assert_eq!(heuristic.choose(&bdd, x, None, None), -7);
    }

    #[test]
    fn test_random_is_a_sign() {
        let bdd = Bdd::new();
        let x = bdd.mk_var(1);
        for _ in 0..16 {
            let d = TraverseHeuristic::Random.choose(&bdd, x, None, None);
            assert!(d == -1 || d == 1);
        }
    }

    #[test]
    fn test_one_step_prefers_terminal_side() {
        let bdd = Bdd::new();
        let x3 = bdd.mk_var(3);
        // Then-cofactor is a terminal, else-cofactor is not.
        let f = bdd.mk_node(Var::new(1), x3, bdd.one());
        assert!(TraverseHeuristic::GreedyOneStep.choose(&bdd, f, None, None) < 0);
        // Mirrored.
        let g = bdd.mk_node(Var::new(1), bdd.one(), x3);
        assert!(TraverseHeuristic::GreedyOneStep.choose(&bdd, g, None, None) >= 0);
    }

    #[test]
    fn test_one_step_breaks_ties_on_deeper_variable() {
        let bdd = Bdd::new();
        let x2 = bdd.mk_var(2);
        let x3 = bdd.mk_var(3);
        // Both cofactors non-terminal; then side sits deeper (x3 > x2).
        let f = bdd.mk_node(Var::new(1), x2, x3);
        assert!(TraverseHeuristic::GreedyOneStep.choose(&bdd, f, None, None) < 0);
        let g = bdd.mk_node(Var::new(1), x3, x2);
        assert!(TraverseHeuristic::GreedyOneStep.choose(&bdd, g, None, None) >= 0);
    }

    #[test]
    fn test_one_step_only_counts_top_operands() {
        let bdd = Bdd::new();
        let x3 = bdd.mk_var(3);
        let f = bdd.mk_node(Var::new(1), x3, bdd.one());
        // g is deeper than f's top variable, so only f is tallied.
        let g = bdd.mk_node(Var::new(2), bdd.one(), x3);
        assert!(TraverseHeuristic::GreedyOneStep.choose(&bdd, f, Some(g), None) < 0);
    }

    #[test]
    fn test_two_step_terminal_bonus() {
        let bdd = Bdd::new();
        let deep = bdd.mk_cube([2, 3]);
        // Then side is a whole terminal subtree (bonus 8), else side two
        // grandchildren.
        let f = bdd.mk_node(Var::new(1), deep, bdd.one());
        assert!(TraverseHeuristic::GreedyTwoStep.choose(&bdd, f, None, None) < 0);
        let g = bdd.mk_node(Var::new(1), bdd.one(), deep);
        assert!(TraverseHeuristic::GreedyTwoStep.choose(&bdd, g, None, None) >= 0);
    }
}
