use crate::reference::Ref;

/// [Szudzik pairing function][szudzik-pairing].
///
/// ```text
/// (a, b) -> if (a<b) then (b^2 + a) else (a^2 + a + b)
/// ```
///
/// [szudzik-pairing]: http://szudzik.com/ElegantPairing.pdf
pub fn pairing_szudzik(a: u64, b: u64) -> u64 {
    if a < b {
        // b * b + a
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        // a * a + a + b
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

/// [Pairing function][pairing] for two `u64` values.
///
/// [pairing]: https://en.wikipedia.org/wiki/Pairing_function
pub fn pairing2(a: u64, b: u64) -> u64 {
    pairing_szudzik(a, b)
}

/// Pairing function for three `u64` values.
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing2(pairing2(a, b), c)
}

/// A cheap structural hash used by the unique subtables and the operation
/// caches. Not a general-purpose hasher: keys are small tuples of edges.
pub trait MyHash {
    fn hash(&self) -> u64;
}

impl MyHash for Ref {
    fn hash(&self) -> u64 {
        self.raw() as u64
    }
}

impl MyHash for (Ref, Ref) {
    fn hash(&self) -> u64 {
        pairing2(self.0.raw() as u64, self.1.raw() as u64)
    }
}

impl MyHash for (Ref, Ref, Ref) {
    fn hash(&self) -> u64 {
        pairing3(self.0.raw() as u64, self.1.raw() as u64, self.2.raw() as u64)
    }
}
