//! Restriction of a partial function by a partial truth assignment.
//!
//! The valuation is itself a three-valued BDD: where it is 1 the
//! assignment is in domain and the function passes through, where it is 0
//! the assignment is out of domain and the result is ⊥, and where it is ⊥
//! the variable is forgotten altogether.
//!
//! Besides the plain Shannon co-descent, the restrictor performs
//! on-the-fly forgetting: when the valuation is a lone literal whose
//! variable surfaces as the top of a recursive result, a split that
//! merely duplicates the in-domain cofactor of its sibling is deleted and
//! the out-of-domain branch is raised to ⊥ at the literal's variable.

use log::debug;

use crate::bdd::Bdd;
use crate::reference::Ref;

impl Bdd {
    /// Restrict `bdd` by the partial assignment `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tbdd_rs::bdd::Bdd;
    /// use tbdd_rs::trilean::Trilean;
    ///
    /// let bdd = Bdd::new();
    /// let f = bdd.mk_cube([1, 2]);
    /// // Constrain x1 to be true.
    /// let r = bdd.reduce_by_valuation(f, bdd.mk_var(1));
    /// assert_eq!(bdd.evaluate(r, &[true, true]), Trilean::True);
    /// assert_eq!(bdd.evaluate(r, &[true, false]), Trilean::False);
    /// // Outside the valuation's domain nothing is known.
    /// assert_eq!(bdd.evaluate(r, &[false, true]), Trilean::Unknown);
    /// ```
    pub fn reduce_by_valuation(&self, bdd: Ref, val: Ref) -> Ref {
        if self.is_one(val) {
            return bdd;
        }
        if self.is_zero(val) || self.is_unknown(val) {
            // Out of domain, or every variable forgotten.
            return self.unknown();
        }
        if self.is_constant(bdd) {
            return bdd;
        }

        let bvar = self.variable(bdd.index());
        let vvar = self.variable(val.index());
        let mut index = bvar.min(vvar);

        if bvar > vvar && self.is_var_node(val) {
            // The valuation constrains a variable absent from `bdd`.
            return bdd;
        }

        let (bt, be) = if bvar <= vvar {
            let (low, high) = self.cofactors(bdd);
            (high, low)
        } else {
            (bdd, bdd)
        };
        let (vt, ve) = if bvar >= vvar {
            let (low, high) = self.cofactors(val);
            (high, low)
        } else {
            (val, val)
        };

        let mut t = self.reduce_by_valuation(bt, vt);
        let mut e = self.reduce_by_valuation(be, ve);

        if t == e {
            return t;
        }

        if bvar < vvar && self.is_var_node(val) {
            // On-the-fly forgetting. The matches are pointer equalities
            // against the stored children of the regular forms: "the
            // in-domain child of one branch is exactly the other branch".
            let v = vvar;
            if !val.is_negated() {
                if self.variable(t.index()) == v {
                    let tt = self.high(t.index());
                    if (!t.is_negated() && tt == e) || (t.is_negated() && tt == -e) {
                        debug!("reduce_by_valuation: forgetting {} in then branch", v);
                        t = e;
                        e = self.unknown();
                        index = v;
                    }
                } else if self.variable(e.index()) == v {
                    let et = self.high(e.index());
                    if (!e.is_negated() && et == t) || (e.is_negated() && et == -t) {
                        debug!("reduce_by_valuation: forgetting {} in else branch", v);
                        e = self.unknown();
                        index = v;
                    }
                }
            } else if self.variable(t.index()) == v {
                let te = self.low(t.index());
                if (!t.is_negated() && te == e) || (t.is_negated() && te == -e) {
                    debug!("reduce_by_valuation: forgetting {} in then branch", v);
                    t = self.unknown();
                    index = v;
                }
            } else if self.variable(e.index()) == v {
                let ee = self.low(e.index());
                if (!e.is_negated() && ee == t) || (e.is_negated() && ee == -t) {
                    debug!("reduce_by_valuation: forgetting {} in else branch", v);
                    e = t;
                    t = self.unknown();
                    index = v;
                }
            }
        }

        self.mk_node(index, e, t)
    }
}
