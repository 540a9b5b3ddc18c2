// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Factorization certificates.
//!
//! The engine can record its output as a list of factor descriptors
//! (n, m, f, p, q, c): there are c primes in the interval (p, q], each
//! contributing n identical factors m*p', and f is the factorization
//! of the cofactor m. When p + 1 = q the descriptor is a single prime
//! with multiplicity n.
//!
//! The verifier replays a log against a fresh exponent vector and
//! checks every invariant independently of the engine. Logs can also
//! be dumped to a text file, one `n,m,p,q` line per descriptor, and
//! read back for offline checking.

use std::io::{self, BufRead, Write};

use crate::arith::{fac_s, isqrt};
use crate::tables::{Pp, Tables};
use crate::{Error, Preferences, Verbosity};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacItem {
    pub n: i64,
    pub m: i64,
    pub f: Vec<Pp>,
    pub p: i64,
    pub q: i64,
    pub c: i64,
}

pub struct FacLog {
    pub n: i64,
    pub t: i64,
    items: Vec<FacItem>,
}

impl FacLog {
    pub fn new(n: i64, t: i64) -> FacLog {
        FacLog {
            n,
            t,
            items: Vec::with_capacity(1024),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[FacItem] {
        &self.items
    }

    /// Record n factors m*p' for each of the c primes p' in (p, q].
    pub fn extend(&mut self, n: i64, m: i64, f: &[Pp], p: i64, q: i64, c: i64, prefs: &Preferences) {
        assert!(m * (p + 1) >= self.t);
        if prefs.verbose(Verbosity::Debug) {
            if p + 1 == q {
                eprintln!("factor: ({m}*{q})^{n}");
            } else {
                eprintln!("factor: ({m}*p)^{n} for p in ({p},{q}]");
            }
        }
        self.items.push(FacItem {
            n,
            m,
            f: f.to_vec(),
            p,
            q,
            c,
        });
    }

    /// Record the factor m*p with multiplicity n, for a single prime p.
    pub fn extend_mp(&mut self, n: i64, m: i64, f: &[Pp], p: i64, prefs: &Preferences) {
        self.extend(n, m, f, p - 1, p, 1, prefs);
    }

    /// Record the factor m*p^2 with multiplicity n, where p is the
    /// i-th prime and f is the factorization of m (coprime to p).
    pub fn extend_mp2(
        &mut self,
        tb: &Tables,
        n: i64,
        m: i64,
        f: &[Pp],
        i: usize,
        prefs: &Preferences,
    ) {
        debug_assert!(f.first().map_or(0, |pp| pp.pi()) < i);
        let mut h = Vec::with_capacity(f.len() + 1);
        h.push(Pp::new(i as u32, 1));
        h.extend_from_slice(f);
        let p = tb.prime(i);
        self.extend_mp(n, m * p, &h, p, prefs);
    }

    /// Record the composite factor q with multiplicity n, where c is
    /// the full factorization of q. The largest prime of q plays the
    /// role of p and the rest is the cofactor.
    pub fn extend_m(&mut self, tb: &Tables, n: i64, q: i64, c: &[Pp], prefs: &Preferences) {
        let top = c[0];
        let p = tb.prime(top.pi());
        let mut f = Vec::with_capacity(c.len());
        if top.e() > 1 {
            f.push(Pp::new(top.pi() as u32, top.e() as u32 - 1));
        }
        f.extend_from_slice(&c[1..]);
        self.extend_mp(n, q / p, &f, p, prefs);
    }

    /// Replay the log against a fresh exponent vector and check that
    /// no valuation of N! is overdrawn. Returns the number of factors
    /// accounted for.
    pub fn verify(&self, tb: &Tables, prefs: &Preferences) -> i64 {
        let (n, t) = (self.n, self.t);
        let sqrtn = isqrt(n);
        let s = fac_s(t);
        let maxpi = tb.pi_small(s - 1);
        let maxp = tb.prime(maxpi);
        let mut e = vec![0i64; maxpi + 1];
        for i in 1..=maxpi {
            let p = tb.prime(i);
            let mut q = p;
            loop {
                e[i] += n / q;
                if q > n / p {
                    break;
                }
                q *= p;
            }
        }
        let mut cnt = 0i64;
        let mut lastp = 0i64;
        let mut lastpi;
        let mut nextpi = 0i64;
        for r in &self.items {
            assert!(r.n > 0 && r.p < r.q && r.q <= n);
            assert!(r.m * (r.p + 1) >= t);
            if r.q <= maxp {
                // all primes of the interval are in the tables
                let mut x = 0i64;
                for idx in tb.pi_small(r.p) + 1..=tb.pi_small(r.q) {
                    e[idx] -= r.n;
                    x += r.n;
                }
                for pp in &r.f {
                    e[pp.pi()] -= x * pp.e();
                }
                cnt += x;
            } else {
                lastpi = if r.p == lastp && nextpi != 0 {
                    nextpi
                } else {
                    tb.pi(r.p)
                };
                nextpi = tb.pi(r.q);
                assert!(r.p + 1 > maxp);
                if r.q <= sqrtn {
                    assert!(n / r.q + n / (r.q * r.q) == r.n);
                    assert!(n / (r.p + 1) + n / ((r.p + 1) * (r.p + 1)) == r.n);
                } else {
                    assert!(n / (r.p + 1) == r.n && n / r.q == r.n);
                }
                let x = r.n * (nextpi - lastpi);
                for pp in tb.factorization(r.m) {
                    e[pp.pi()] -= x * pp.e();
                }
                cnt += x;
            }
            lastp = r.q;
        }
        for idx in 1..=maxpi {
            assert!(e[idx] >= 0, "valuation of prime {} overdrawn", tb.prime(idx));
        }
        if prefs.verbose(Verbosity::Info) {
            eprintln!("Verified factorization of {n}! into {cnt} factors >= {t}");
        }
        cnt
    }

    /// Write the log in the dump format, one descriptor per line.
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for r in &self.items {
            writeln!(w, "{},{},{},{}", r.n, r.m, r.p, r.q)?;
        }
        Ok(())
    }

    /// Read a dump back into a log suitable for `verify`. Cofactor
    /// factorizations are rebuilt by trial division over the tables;
    /// prime counts are not stored in dumps, so the c fields are left
    /// at zero (the verifier recounts them anyway).
    pub fn read_dump<R: BufRead>(tb: &Tables, n: i64, t: i64, r: R) -> Result<FacLog, Error> {
        let mut log = FacLog::new(n, t);
        for line in r.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != 4 {
                return Err(Error::Domain(format!("invalid dump line {line:?}")));
            }
            let parse = |s: &str| {
                s.trim()
                    .parse::<i64>()
                    .map_err(|_| Error::Domain(format!("invalid dump line {line:?}")))
            };
            let (nn, m, p, q) = (
                parse(fields[0])?,
                parse(fields[1])?,
                parse(fields[2])?,
                parse(fields[3])?,
            );
            let f = factor_over_tables(tb, m)?;
            log.items.push(FacItem {
                n: nn,
                m,
                f,
                p,
                q,
                c: 0,
            });
        }
        Ok(log)
    }
}

/// Factorization of m in descending order of prime index. Every
/// cofactor recorded by the engine is smooth over the table primes,
/// even when m itself exceeds the smooth index bound.
fn factor_over_tables(tb: &Tables, m: i64) -> Result<Vec<Pp>, Error> {
    let mut f: Vec<Pp> = Vec::new();
    let mut q = m;
    let mut i = 1usize;
    while q > 1 {
        if i > tb.maxpi() || tb.prime(i) * tb.prime(i) > q {
            // the remainder is prime
            if q > tb.maxp() {
                return Err(Error::Domain(format!(
                    "cofactor {m} is not smooth over the tables"
                )));
            }
            f.push(Pp::new(tb.pi_small(q) as u32, 1));
            break;
        }
        let p = tb.prime(i);
        let mut e = 0u32;
        while q % p == 0 {
            q /= p;
            e += 1;
        }
        if e > 0 {
            f.push(Pp::new(i as u32, e));
        }
        i += 1;
    }
    f.reverse();
    Ok(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_over_tables() {
        let tb = Tables::new(150, 10_000).unwrap();
        // 9240 = 2^3 * 3 * 5 * 7 * 11
        let f = factor_over_tables(&tb, 9240).unwrap();
        let names: Vec<(i64, i64)> = f.iter().map(|pp| (tb.prime(pp.pi()), pp.e())).collect();
        assert_eq!(names, vec![(11, 1), (7, 1), (5, 1), (3, 1), (2, 3)]);
        // a number with a prime factor beyond the tables
        assert!(factor_over_tables(&tb, 2 * 151).is_err());
        // larger than maxm but still smooth over the table primes
        let f = factor_over_tables(&tb, 97 * 89 * 83).unwrap();
        assert_eq!(f.len(), 3);
        assert_eq!(tb.prime(f[0].pi()), 97);
    }
}
