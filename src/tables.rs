// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Precomputed prime tables and smooth factorizations.
//!
//! The tables are built once at startup and shared read-only by every
//! engine invocation, including parallel workers:
//! - P[i] is the i-th prime (P[0] = 1 by convention),
//! - PI[x] = pi(x) for all x up to the table bound,
//! - for every P-smooth m up to the cofactor bound, M[m] is the offset
//!   of the factorization of m inside the arena F.
//!
//! Factorizations are zero-terminated lists of packed prime powers in
//! strictly descending order of prime index, concatenated in F. Offset
//! 0 is reserved so that M[m] = 0 can mean "not smooth"; M[1] points
//! to an empty list. The layout is inherited from the factor-base
//! tables used by the sieve code: one flat vector per concern, offsets
//! instead of pointers.

use std::fmt;

use crate::{params, primecount, sieve, Error};

/// A packed prime power: 24 bits of prime index, 8 bits of exponent.
/// Index 1 is the prime 2, which always sorts last in a factorization.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Pp(u32);

impl Pp {
    /// The list terminator, also stored at the reserved offset 0.
    pub const END: Pp = Pp(0);

    #[inline]
    pub fn new(pi: u32, e: u32) -> Pp {
        debug_assert!(pi > 0 && pi < 1 << 24 && e > 0 && e < 256);
        Pp(pi | (e << 24))
    }

    #[inline]
    pub fn pi(self) -> usize {
        (self.0 & 0x00ff_ffff) as usize
    }

    #[inline]
    pub fn e(self) -> i64 {
        (self.0 >> 24) as i64
    }
}

impl fmt::Debug for Pp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}^{}", self.pi(), self.e())
    }
}

pub struct Tables {
    maxp: i64,
    maxpi: usize,
    maxm: i64,
    p: Vec<u32>,
    pi: Vec<u32>,
    m: Vec<u32>,
    f: Vec<Pp>,
}

impl Tables {
    /// Build the prime tables for primes up to `maxp` and the smooth
    /// factorization index for cofactors up to `maxm`.
    pub fn new(maxp: i64, maxm: i64) -> Result<Tables, Error> {
        let mut maxm = maxm;
        if maxm & 1 == 0 {
            maxm += 1;
        }
        if maxp > params::MAXP || maxm > params::MAXM {
            return Err(Error::Resource(format!(
                "tables for maxp={maxp}, maxm={maxm} exceed the supported limits"
            )));
        }
        assert!(maxm < maxp * maxp);

        let ps = sieve::primes_up_to(maxp);
        let maxpi = ps.len();
        if maxpi as i64 > params::MAXPI {
            return Err(Error::Resource(format!(
                "pi({maxp}) = {maxpi} does not fit in a 24-bit prime index"
            )));
        }
        let mut p = Vec::with_capacity(maxpi + 1);
        p.push(1u32);
        p.extend_from_slice(&ps);

        let mut pi = vec![0u32; (maxp + 1) as usize];
        for (k, &pr) in ps.iter().enumerate() {
            pi[pr as usize] = (k + 1) as u32;
        }
        for x in 1..pi.len() {
            if pi[x] == 0 {
                pi[x] = pi[x - 1];
            }
        }

        // M[q] temporarily holds the index of the largest prime
        // dividing q; the arena construction below replaces it by the
        // offset of the factorization of q, or zero.
        let mut m = vec![0u32; (maxm + 1) as usize];
        for i in 1..=maxpi {
            let pr = p[i] as usize;
            let mut q = pr;
            while q <= maxm as usize {
                m[q] = i as u32;
                q += pr;
            }
        }

        let mut f: Vec<Pp> = Vec::with_capacity((4 * maxm as usize).max(1 << 10));
        f.push(Pp::END); // offset 0 reserved

        // Odd m first: peel off the largest prime factor repeatedly.
        // Quotients are always smaller than the m being processed, so
        // their M entries still hold prime indices.
        let mut mm = maxm;
        while mm > 1 {
            let rec = f.len();
            let mut q = mm as usize;
            let mut top = 0u32;
            let mut e = 0u32;
            while m[q] != 0 {
                let i = m[q];
                if i == top {
                    e += 1;
                } else {
                    if top != 0 {
                        f.push(Pp::new(top, e));
                    }
                    top = i;
                    e = 1;
                }
                q /= p[i as usize] as usize;
            }
            if q != 1 {
                // a prime factor above maxp is left
                f.truncate(rec);
                m[mm as usize] = 0;
            } else {
                if top != 0 {
                    f.push(Pp::new(top, e));
                }
                f.push(Pp::END);
                m[mm as usize] = rec as u32;
            }
            mm -= 2;
        }

        m[1] = f.len() as u32;
        f.push(Pp::END);

        // Even m: copy the record of the odd part and append the power
        // of 2 (prime index 1) before the terminator.
        let mut mm = maxm - 1;
        while mm > 1 {
            let e2 = mm.trailing_zeros();
            let q = (mm >> e2) as usize;
            if m[q] == 0 {
                m[mm as usize] = 0;
            } else {
                let rec = f.len();
                let mut g = m[q] as usize;
                while f[g] != Pp::END {
                    let x = f[g];
                    f.push(x);
                    g += 1;
                }
                f.push(Pp::new(1, e2));
                f.push(Pp::END);
                m[mm as usize] = rec as u32;
            }
            mm -= 2;
        }

        assert!(f.len() < u32::MAX as usize);
        f.shrink_to_fit();
        Ok(Tables {
            maxp,
            maxpi,
            maxm,
            p,
            pi,
            m,
            f,
        })
    }

    #[inline]
    pub fn maxp(&self) -> i64 {
        self.maxp
    }

    #[inline]
    pub fn maxpi(&self) -> usize {
        self.maxpi
    }

    #[inline]
    pub fn maxm(&self) -> i64 {
        self.maxm
    }

    /// The i-th prime (1 for i = 0).
    #[inline]
    pub fn prime(&self, i: usize) -> i64 {
        self.p[i] as i64
    }

    /// pi(x) for x within the table bound.
    #[inline]
    pub fn pi_small(&self, x: i64) -> usize {
        self.pi[x as usize] as usize
    }

    /// pi(x) over the whole supported range.
    pub fn pi(&self, x: i64) -> i64 {
        if x <= self.maxp {
            self.pi[x as usize] as i64
        } else {
            primecount::prime_pi(x)
        }
    }

    /// Index of the largest prime dividing m, or 0 if m is not smooth.
    #[inline]
    pub fn top_pi(&self, m: i64) -> usize {
        self.f[self.m[m as usize] as usize].pi()
    }

    /// The factorization record of a smooth m, without its terminator.
    /// Not-smooth m (and m = 1) yield an empty record.
    pub fn factorization(&self, m: i64) -> &[Pp] {
        let off = self.m[m as usize] as usize;
        let mut end = off;
        while self.f[end] != Pp::END {
            end += 1;
        }
        &self.f[off..end]
    }

    /// Number of packed prime powers in the arena, for memory reports.
    pub fn arena_len(&self) -> usize {
        self.f.len()
    }

    /// Memory held by the tables, in bytes.
    pub fn memory_bytes(&self) -> usize {
        4 * (self.p.len() + self.pi.len() + self.m.len() + self.f.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(tb: &Tables, f: &[Pp]) -> i64 {
        let mut x = 1i64;
        for pp in f {
            for _ in 0..pp.e() {
                x *= tb.prime(pp.pi());
            }
        }
        x
    }

    fn smooth(mut m: i64, bound: i64) -> bool {
        let mut p = 2;
        while p <= bound && m > 1 {
            while m % p == 0 {
                m /= p;
            }
            p += 1;
        }
        m == 1
    }

    #[test]
    fn test_pp_packing() {
        let pp = Pp::new(123456, 37);
        assert_eq!(pp.pi(), 123456);
        assert_eq!(pp.e(), 37);
        assert_eq!(Pp::END.pi(), 0);
    }

    #[test]
    fn test_pi_table() {
        let tb = Tables::new(1000, 10_001).unwrap();
        assert_eq!(tb.prime(1), 2);
        assert_eq!(tb.prime(25), 97);
        assert_eq!(tb.pi_small(2), 1);
        assert_eq!(tb.pi_small(100), 25);
        assert_eq!(tb.pi_small(1000), 168);
        // dispatch above the table bound
        assert_eq!(tb.pi(1000), 168);
        assert_eq!(tb.pi(1_000_000), 78498);
    }

    #[test]
    fn test_factorizations() {
        let bound = 200;
        let tb = Tables::new(bound, 20_000).unwrap();
        assert!(tb.factorization(1).is_empty());
        for m in 2..=tb.maxm() {
            let f = tb.factorization(m);
            if f.is_empty() {
                assert!(!smooth(m, bound), "m={m} should have a record");
                continue;
            }
            assert!(smooth(m, bound), "m={m} should not have a record");
            assert_eq!(product(&tb, f), m, "m={m}");
            for w in f.windows(2) {
                assert!(w[0].pi() > w[1].pi(), "m={m} not in descending order");
            }
            for pp in f {
                assert!(pp.e() >= 1);
            }
            assert_eq!(tb.top_pi(m), f[0].pi());
        }
    }

    #[test]
    fn test_even_maxm_is_rounded_up() {
        let tb = Tables::new(150, 10_000).unwrap();
        assert_eq!(tb.maxm(), 10_001);
    }
}
