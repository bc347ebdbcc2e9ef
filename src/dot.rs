//! Graphviz export.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::bdd::Bdd;
use crate::reference::Ref;

/// Graphviz ids and labels of the three terminal boxes.
const TERMINALS: [(&str, &str); 3] = [("t0", "0"), ("t1", "1"), ("tU", "U")];

impl Bdd {
    /// The dot id an edge resolves to: one of the terminal boxes, or a
    /// decision node. Polarity on a terminal edge is folded into the box
    /// (`¬1` resolves to `t0`, and ⊥ has no polarity to fold).
    fn dot_target(&self, f: Ref) -> String {
        if self.is_zero(f) {
            "t0".into()
        } else if self.is_one(f) {
            "t1".into()
        } else if self.is_unknown(f) {
            "tU".into()
        } else {
            format!("n{}", f.index())
        }
    }

    /// Render the diagrams rooted at `roots` as a Graphviz `graph`.
    ///
    /// All three terminals are squares. Solid edges are high branches,
    /// dashed edges low branches; a dotted low edge marks a complemented
    /// branch into shared structure. Complemented roots are dashed.
    pub fn to_dot(&self, roots: &[Ref]) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "graph {{")?;
        writeln!(dot, "node [shape=circle, fixedsize=true];")?;

        writeln!(dot, "{{ rank=sink")?;
        for (id, label) in TERMINALS {
            writeln!(dot, "{} [shape=square, label=\"{}\"];", id, label)?;
        }
        writeln!(dot, "}}")?;

        // Decision nodes, one rank per variable.
        let mut levels = BTreeMap::<u32, Vec<u32>>::new();
        for index in self.descendants(roots.iter().copied()) {
            let variable = self.variable(index);
            if !variable.is_terminal() {
                levels.entry(variable.id()).or_default().push(index);
            }
        }
        for (var, indices) in &levels {
            writeln!(dot, "{{ rank=same")?;
            for &index in indices {
                writeln!(dot, "n{} [label=\"x{}\"];", index, var)?;
            }
            writeln!(dot, "}}")?;
        }

        // Branches, top of the order first.
        for indices in levels.values() {
            for &index in indices {
                let high = self.high(index);
                debug_assert!(!high.is_negated());
                writeln!(dot, "n{} -- {};", index, self.dot_target(high))?;

                let low = self.low(index);
                let style = if low.is_negated() && !self.is_zero(low) {
                    "dotted"
                } else {
                    "dashed"
                };
                writeln!(dot, "n{} -- {} [style={}];", index, self.dot_target(low), style)?;
            }
        }

        writeln!(dot, "{{ rank=source")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} [shape=rect, label=\"{}\"];", i, root)?;
        }
        writeln!(dot, "}}")?;
        for (i, &root) in roots.iter().enumerate() {
            if root.is_negated() && !self.is_zero(root) {
                writeln!(dot, "r{} -- {} [style=dashed];", i, self.dot_target(root))?;
            } else {
                writeln!(dot, "r{} -- {};", i, self.dot_target(root))?;
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
