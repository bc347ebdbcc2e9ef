//! End-to-end tests for the three-valued engine: the partial-function
//! helpers, the budgeted operations, and randomized comparisons against a
//! reference evaluator.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use tbdd_rs::bdd::Bdd;
use tbdd_rs::heuristics::TraverseHeuristic;
use tbdd_rs::reference::Ref;
use tbdd_rs::trilean::Trilean;

const THEN_FIRST: TraverseHeuristic = TraverseHeuristic::Custom(|_, _, _, _| -1);

/// All `2^n` assignments over `n` variables.
fn assignments(num_vars: u32) -> impl Iterator<Item = Vec<bool>> {
    (0..1u32 << num_vars).map(move |bits| (0..num_vars).map(|i| bits & (1 << i) != 0).collect())
}

/// A random Boolean (⊥-free) function built from literals and binary ops.
fn random_function(bdd: &Bdd, rng: &mut ChaCha8Rng, num_vars: u32, num_ops: usize) -> Ref {
    let mut nodes: Vec<Ref> = (1..=num_vars)
        .map(|v| {
            let x = bdd.mk_var(v);
            if rng.random_bool(0.5) {
                x
            } else {
                -x
            }
        })
        .collect();
    for _ in 0..num_ops {
        let i = rng.random_range(0..nodes.len());
        let j = rng.random_range(0..nodes.len());
        let a = nodes[i];
        let b = nodes[j];
        nodes[i] = match rng.random_range(0..3) {
            0 => bdd.apply_and(a, b),
            1 => bdd.apply_or(a, b),
            _ => bdd.apply_xor(a, b),
        };
    }
    nodes[0]
}

/// A random partial function: `f` where `mask` holds, ⊥ elsewhere.
fn random_partial_function(bdd: &Bdd, rng: &mut ChaCha8Rng, vars: &[u32]) -> Ref {
    let lits: Vec<Ref> = vars
        .iter()
        .map(|&v| {
            let x = bdd.mk_var(v);
            if rng.random_bool(0.5) {
                x
            } else {
                -x
            }
        })
        .collect();
    let f = bdd.apply_xor(lits[0], lits[1]);
    let mask = bdd.apply_or(lits[0], lits[2 % lits.len()]);
    bdd.merge_interval(bdd.apply_and(f, mask), bdd.apply_or(f, bdd.apply_not(mask)))
}

#[test]
fn forget_zeros_of_a_variable() {
    let bdd = Bdd::new();
    let f = bdd.forget_zeros(bdd.mk_var(1));
    assert_eq!(bdd.evaluate(f, &[false]), Trilean::Unknown);
    assert_eq!(bdd.evaluate(f, &[true]), Trilean::True);
}

#[test]
fn forget_ones_of_a_conjunction() {
    let bdd = Bdd::new();
    let f = bdd.forget_ones(bdd.apply_and(bdd.mk_var(1), bdd.mk_var(2)));
    let expected = [
        Trilean::False,
        Trilean::False,
        Trilean::False,
        Trilean::Unknown,
    ];
    for (bits, assignment) in assignments(2).enumerate() {
        // Truth-table order (x1, x2).
        let index = ((bits & 1) << 1) | (bits >> 1);
        assert_eq!(bdd.evaluate(f, &assignment), expected[index]);
    }
}

#[test]
fn merge_interval_recovers_both_ends() {
    let bdd = Bdd::new();
    let under = bdd.apply_and(bdd.mk_var(1), bdd.mk_var(2));
    let over = bdd.apply_or(bdd.mk_var(1), bdd.mk_var(2));
    let merged = bdd.merge_interval(under, over);
    for assignment in assignments(2) {
        let u = bdd.evaluate(under, &assignment);
        let o = bdd.evaluate(over, &assignment);
        let m = bdd.evaluate(merged, &assignment);
        match (u, o) {
            (Trilean::True, _) => assert_eq!(m, Trilean::True),
            (_, Trilean::False) => assert_eq!(m, Trilean::False),
            _ => assert_eq!(m, Trilean::Unknown),
        }
    }
}

#[test]
fn zero_budget_reduction_is_unknown() {
    let bdd = Bdd::new();
    let f = bdd.apply_and(bdd.mk_var(1), bdd.mk_var(2));
    let (r, reduced) = bdd.reduce_by_node_limit(f, &TraverseHeuristic::GreedyOneStep, 0);
    assert_eq!(r, bdd.unknown());
    assert!(reduced);
}

#[test]
fn reduction_refines_and_respects_the_budget() {
    let mut rng = ChaCha8Rng::seed_from_u64(20250802);
    for seed in 0..8 {
        let bdd = Bdd::new();
        let f = random_function(&bdd, &mut rng, 5, 12 + seed);
        let before = bdd.descendants([f]);
        for heuristic in [
            THEN_FIRST,
            TraverseHeuristic::Random,
            TraverseHeuristic::GreedyOneStep,
            TraverseHeuristic::GreedyTwoStep,
        ] {
            for limit in [0, 1, 2, 3, 5, 8, 1024] {
                let (r, reduced) = bdd.reduce_by_node_limit(f, &heuristic, limit);
                // Budget bound on nodes that are new structure.
                let fresh = bdd
                    .descendants([r])
                    .into_iter()
                    .filter(|index| !before.contains(index))
                    .count();
                assert!(fresh <= limit as usize);
                // Refinement: wherever the result is defined it agrees.
                for assignment in assignments(5) {
                    let rv = bdd.evaluate(r, &assignment);
                    if rv != Trilean::Unknown {
                        assert_eq!(rv, bdd.evaluate(f, &assignment));
                    }
                }
                if !reduced {
                    assert_eq!(r, f);
                }
            }
        }
    }
}

#[test]
fn ample_budget_apply_matches_reference_semantics() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for _ in 0..8 {
        let bdd = Bdd::new();
        let f = random_function(&bdd, &mut rng, 5, 14);
        let g = random_function(&bdd, &mut rng, 5, 14);
        let h = random_function(&bdd, &mut rng, 5, 14);

        let (and, r1) = bdd.and_reduced(f, g, &TraverseHeuristic::Random, 4096);
        let (or, r2) = bdd.or_reduced(f, g, &TraverseHeuristic::GreedyOneStep, 4096);
        let (xor, r3) = bdd.xor_reduced(f, g, &TraverseHeuristic::GreedyTwoStep, 4096);
        let (ite, r4) = bdd.ite_reduced(f, g, h, &TraverseHeuristic::Random, 4096);
        assert!(!r1 && !r2 && !r3 && !r4);

        for assignment in assignments(5) {
            let fv = bdd.evaluate(f, &assignment);
            let gv = bdd.evaluate(g, &assignment);
            let hv = bdd.evaluate(h, &assignment);
            assert_eq!(bdd.evaluate(and, &assignment), fv.and(gv));
            assert_eq!(bdd.evaluate(or, &assignment), fv.or(gv));
            assert_eq!(bdd.evaluate(xor, &assignment), fv.xor(gv));
            assert_eq!(bdd.evaluate(ite, &assignment), fv.ite(gv, hv));
        }
    }
}

#[test]
fn apply_on_partial_functions_with_disjoint_support() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..8 {
        let bdd = Bdd::new();
        let f = random_partial_function(&bdd, &mut rng, &[1, 2, 3]);
        let g = random_partial_function(&bdd, &mut rng, &[4, 5, 6]);

        let and = bdd.apply_and(f, g);
        let or = bdd.apply_or(f, g);
        let xor = bdd.apply_xor(f, g);

        for assignment in assignments(6) {
            let fv = bdd.evaluate(f, &assignment);
            let gv = bdd.evaluate(g, &assignment);
            assert_eq!(bdd.evaluate(and, &assignment), fv.and(gv));
            assert_eq!(bdd.evaluate(or, &assignment), fv.or(gv));
            assert_eq!(bdd.evaluate(xor, &assignment), fv.xor(gv));
        }
    }
}

#[test]
fn budgeted_apply_refines_the_exact_result() {
    let mut rng = ChaCha8Rng::seed_from_u64(1717);
    for _ in 0..8 {
        let bdd = Bdd::new();
        let f = random_function(&bdd, &mut rng, 5, 12);
        let g = random_function(&bdd, &mut rng, 5, 12);
        let exact = bdd.apply_and(f, g);
        for limit in [0, 1, 2, 4, 7] {
            let (r, _) = bdd.and_reduced(f, g, &TraverseHeuristic::GreedyOneStep, limit);
            for assignment in assignments(5) {
                let rv = bdd.evaluate(r, &assignment);
                if rv != Trilean::Unknown {
                    assert_eq!(rv, bdd.evaluate(exact, &assignment));
                }
            }
        }
    }
}

#[test]
fn commutativity_under_a_deterministic_heuristic() {
    for limit in [0, 1, 3, 1024] {
        // Fresh managers with identical construction so that even the
        // cache state matches on both sides.
        let results: Vec<String> = [false, true]
            .into_iter()
            .map(|swap| {
                let bdd = Bdd::new();
                let f = bdd.mk_cube([1, -3, 4]);
                let g = bdd.apply_xor(bdd.mk_var(2), bdd.mk_var(4));
                let (a, b) = if swap { (g, f) } else { (f, g) };
                let (r, _) = bdd.and_reduced(a, b, &THEN_FIRST, limit);
                bdd.to_bracket_string(r)
            })
            .collect();
        assert_eq!(results[0], results[1], "limit {}", limit);
    }
}

#[test]
fn canonicity_invariants_hold_after_a_workload() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let bdd = Bdd::new();
    let f = random_function(&bdd, &mut rng, 5, 20);
    let g = random_partial_function(&bdd, &mut rng, &[1, 2, 3]);
    let _ = bdd.apply_and(f, g);
    let _ = bdd.reduce_by_node_limit(f, &TraverseHeuristic::GreedyTwoStep, 3);
    let _ = bdd.reduce_by_valuation(f, bdd.mk_cube([1, -2]));

    let mut seen = std::collections::HashSet::new();
    for index in 3..=(bdd.num_nodes() as u32) {
        let variable = bdd.variable(index);
        assert!(!variable.is_terminal());
        let low = bdd.low(index);
        let high = bdd.high(index);
        // No useless splits.
        assert_ne!(low, high);
        // The high edge is regular, and a ⊥ high child forces a regular
        // low edge.
        assert!(!high.is_negated());
        if bdd.is_unknown(high) {
            assert!(!low.is_negated());
        }
        // No complemented edge to ⊥ anywhere.
        assert!(!(low.is_negated() && bdd.is_unknown(-low)));
        // Children sit strictly deeper.
        for child in [low, high] {
            assert!(bdd.is_constant(child) || bdd.variable(child.index()) > variable);
        }
        // Hash-consing: every (var, low, high) triple is unique.
        assert!(seen.insert((variable, low, high)));
    }
}

#[test]
fn valuation_semantics_on_cubes() {
    let mut rng = ChaCha8Rng::seed_from_u64(55);
    for _ in 0..8 {
        let bdd = Bdd::new();
        // Parity depends on every variable along every path, so the
        // valuation is interrogated before the function collapses.
        let mut f = bdd.mk_var(1);
        for v in 2..=4 {
            f = bdd.apply_xor(f, bdd.mk_var(v));
        }
        let filtered: Vec<i32> = (1..=4).filter(|_| rng.random_bool(0.6)).collect();
        let lits: Vec<i32> = filtered
            .into_iter()
            .map(|v| if rng.random_bool(0.5) { v } else { -v })
            .collect();
        let val = bdd.mk_cube(lits.clone());
        let r = bdd.reduce_by_valuation(f, val);
        for assignment in assignments(4) {
            let in_domain = lits
                .iter()
                .all(|&lit| assignment[(lit.unsigned_abs() - 1) as usize] == (lit > 0));
            if in_domain {
                assert_eq!(bdd.evaluate(r, &assignment), bdd.evaluate(f, &assignment));
            } else {
                assert_eq!(bdd.evaluate(r, &assignment), Trilean::Unknown);
            }
        }
    }
}

#[test]
fn valuation_of_unknown_forgets_everything() {
    let bdd = Bdd::new();
    let f = bdd.apply_xor(bdd.mk_var(1), bdd.mk_var(2));
    assert_eq!(bdd.reduce_by_valuation(f, bdd.unknown()), bdd.unknown());
}

#[test]
fn forget_round_trips() {
    let mut rng = ChaCha8Rng::seed_from_u64(23);
    for _ in 0..4 {
        let bdd = Bdd::new();
        let f = random_function(&bdd, &mut rng, 4, 10);
        let fz = bdd.forget_zeros(f);
        assert_eq!(bdd.forget_zeros(fz), fz);
        let fo = bdd.forget_ones(f);
        assert_eq!(bdd.forget_ones(fo), fo);
        // Merging the forgotten halves recovers a refinement sandwich.
        let merged = bdd.merge_interval(f, f);
        assert_eq!(merged, f);
    }
}

#[test]
fn reduced_flag_reports_approximation_not_input_unknowns() {
    let bdd = Bdd::new();
    let x = bdd.mk_var(1);
    // Inputs containing ⊥ do not set the flag by themselves.
    let partial = bdd.forget_zeros(x);
    let (r, reduced) = bdd.and_reduced(partial, bdd.mk_var(2), &THEN_FIRST, 1024);
    assert!(!reduced);
    assert_ne!(r, bdd.unknown());
    // Budget exhaustion does.
    let (_, reduced) = bdd.and_reduced(partial, bdd.mk_var(2), &THEN_FIRST, 0);
    assert!(reduced);
}
