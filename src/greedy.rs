// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The greedy factorization engine.
//!
//! `tfac(N, t)` builds factors of N! that are all >= t and returns how
//! many it found; a return value >= N proves t(N) >= t. The engine
//! works on the exponent vector E[i] = v_{p_i}(N!) for primes below
//! s = fac_s(t) and proceeds in two phases.
//!
//! Large primes p in [s, N] are used exactly v_p(N!) times with the
//! minimal cofactor m = ceil(t/p), which is always admissible in this
//! range. Three regimes keep this cheap: for p <= sqrt(N) primes are
//! enumerated one by one; past sqrt(N) the pairs (m, n) change only at
//! rare breakpoints, so runs of primes are enumerated and the update
//! is batched; once m falls below the cutoff mid = t^u, the engine
//! iterates over m instead and counts primes in each breakpoint
//! interval with two pi() evaluations. Primes in [t, N] need no
//! cofactor and contribute via three pi() differences (n = 3, 2, 1).
//!
//! The remaining small primes are then assembled into factors using
//! the table of smooth cofactors, either by the standard greedy walk
//! (descending p, ascending m, factors m*p) or by the fast variant
//! which additionally uses p^2 cofactors and finally packs leftovers
//! into composite factors below 5*ceil(t/4).
//!
//! In feasibility mode the engine stops after the large-prime phase
//! and returns count plus an upper bound on anything a small-prime
//! phase could still produce; this is used to prune exhaustive
//! searches.

use std::time::Instant;

use crate::arith::{cdiv, fac_s, isqrt};
use crate::fac::FacLog;
use crate::sieve::PrimeIter;
use crate::tables::{Pp, Tables};
use crate::{params, Preferences, Verbosity};

/// min(cap, v_m(P^E)) where f is the factorization of m: how many
/// copies of m still divide the residual.
#[inline]
fn fcnt(e: &[i64], mut cap: i64, f: &[Pp]) -> i64 {
    for pp in f {
        cap = cap.min(e[pp.pi()] / pp.e());
    }
    cap
}

/// v_{p_i * m}(P^E) where f is the factorization of m. The top prime
/// of f may be p_i itself, in which case its exponent counts once more.
#[inline]
fn fcnti(e: &[i64], i: usize, f: &[Pp]) -> i64 {
    debug_assert!(f.first().map_or(0, |pp| pp.pi()) <= i);
    let mut cap = match f.first() {
        Some(pp) if pp.pi() == i => e[i] / (pp.e() + 1),
        _ => e[i],
    };
    for pp in f {
        cap = cap.min(e[pp.pi()] / pp.e());
    }
    cap
}

/// Number of factors >= t of N! found by the greedy construction.
///
/// With `feasible` set, only the large-prime phase runs and the result
/// is an upper bound for the full construction instead (at this t or
/// any larger one).
pub fn tfac(
    tb: &Tables,
    n: i64,
    t: i64,
    feasible: bool,
    prefs: &Preferences,
    mut log: Option<&mut FacLog>,
) -> i64 {
    assert!(n >= 10 && n < params::MAXN && 4 * t > n && 2 * t < n);
    let start = Instant::now();
    if prefs.verbose(Verbosity::Verbose) {
        eprintln!(
            "tfac({n},{t}) {}{}",
            if prefs.fast { "fast" } else { "greedy" },
            if feasible { " feasibility test" } else { "" }
        );
    }
    let sqrtn = isqrt(n);
    let s = fac_s(t);
    assert!(s <= tb.maxp());
    let maxpi = tb.pi_small(s - 1);

    // E[i] = v_{p_i}(N!) for all primes below s.
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

    // Candidate cofactors, ascending: every m < s, then the smooth m
    // whose largest prime is compatible with some usable p.
    if !prefs.fast {
        assert!(t <= tb.maxm() + 1);
    }
    let maxm = if prefs.fast {
        (t as f64).powf(0.625) as i64
    } else {
        t - 1
    };
    assert!(maxm <= tb.maxm());
    let mut ms: Vec<u32> = Vec::with_capacity(s as usize);
    for m in 0..s {
        ms.push(m as u32);
    }
    for m in s..=maxm {
        let top = tb.top_pi(m);
        let cap = if prefs.fast { tb.pi_small(t / m) } else { maxpi };
        if top != 0 && top <= cap {
            ms.push(m as u32);
        }
    }
    let numm = ms.len() - 1;
    let maxm = ms[numm] as i64;

    let mut m = cdiv(t, s);
    assert!(m <= maxm && ms[m as usize] as i64 == m);

    // Crossover between sieving primes and counting them; any value
    // gives the same count.
    let mid = ((t as f64).powf(prefs.cutoff) as i64).min((t - 1) / sqrtn);
    debug_assert!(mid >= 1);
    if prefs.verbose(Verbosity::Debug) {
        eprintln!(
            "N={n}, t={t}, sqrt(N)={sqrtn}, s={s}, maxpi={maxpi}, maxm={maxm}, numm={numm}, mid={mid} ({:.6}s)",
            start.elapsed().as_secs_f64()
        );
    }

    let mut cnt: i64 = 0;
    let mut ps = PrimeIter::new(s);
    let mut p = ps.next_prime();

    // Primes in [s, sqrt(N)]: n changes at every step, just enumerate.
    while p <= sqrtn {
        while (m - 1) * p >= t {
            m -= 1;
        }
        let np = n / p + n / (p * p);
        for pp in tb.factorization(m) {
            e[pp.pi()] -= np * pp.e();
        }
        cnt += np;
        if let Some(v) = log.as_deref_mut() {
            v.extend_mp(np, m, tb.factorization(m), p, prefs);
        }
        p = ps.next_prime();
    }
    if prefs.verbose(Verbosity::Debug) {
        eprintln!(
            "cnt={cnt} for p in [s,sqrt(N)], m={m} ({:.6}s)",
            start.elapsed().as_secs_f64()
        );
    }

    // Primes in (sqrt(N), (t-1)/mid]: both m and n move rarely, so
    // enumerate runs of primes sharing (m, n) and batch the updates.
    let mut pmmax = (t - 1) / (m - 1);
    debug_assert!(p > pmmax || m == cdiv(t, p));
    let mut np = n / (sqrtn + 1);
    let mut pnmax = n / np;
    let plmmax = (t - 1) / mid;
    let mut pmin = p - 1;
    while p <= plmmax {
        while p > pmmax {
            m -= 1;
            pmmax = (t - 1) / (m - 1);
        }
        while p > pnmax {
            np -= 1;
            pnmax = n / np;
        }
        let pmax = pmmax.min(pnmax);
        debug_assert!(p <= pmax);
        let mut c = 1i64;
        loop {
            p = ps.next_prime();
            if p > pmax {
                break;
            }
            c += 1;
        }
        for pp in tb.factorization(m) {
            e[pp.pi()] -= c * np * pp.e();
        }
        cnt += c * np;
        if let Some(v) = log.as_deref_mut() {
            v.extend(np, m, tb.factorization(m), pmin, pmax, c, prefs);
            pmin = p - 1;
        }
    }
    let mut lastpi = tb.pi(plmmax);
    let mut pmin = plmmax;
    if prefs.verbose(Verbosity::Debug) {
        eprintln!(
            "cnt={cnt} for {} p >= s with m < mid ({:.6}s)",
            lastpi - maxpi as i64,
            start.elapsed().as_secs_f64()
        );
    }

    // Primes in (plmmax, t-1]: iterate over m and count primes in each
    // (m, n) interval by differencing pi().
    let mut m = mid;
    while m > 1 {
        let p0 = cdiv(t, m);
        let pmax = (t - 1) / (m - 1);
        let mut np = n / p0;
        let mut pnmax = (n / np).min(pmax);
        while pmin < pmax {
            let nextpi = tb.pi(pnmax);
            let c = nextpi - lastpi;
            cnt += c * np;
            for pp in tb.factorization(m) {
                e[pp.pi()] -= c * np * pp.e();
            }
            if let Some(v) = log.as_deref_mut() {
                v.extend(np, m, tb.factorization(m), pmin, pnmax, c, prefs);
            }
            pmin = pnmax;
            np -= 1;
            pnmax = (n / np).min(pmax);
            lastpi = nextpi;
        }
        m -= 1;
    }
    assert!(lastpi == tb.pi(t - 1));
    if prefs.verbose(Verbosity::Debug) {
        eprintln!(
            "cnt={cnt} for {} p in [s,t) ({:.6}s)",
            lastpi - maxpi as i64,
            start.elapsed().as_secs_f64()
        );
    }

    // Primes in [t, N] need no cofactor: n = 3, 2, 1 per block.
    if 3 * t <= n {
        let nextpi = tb.pi(n / 3);
        cnt += 3 * (nextpi - lastpi);
        if let Some(v) = log.as_deref_mut() {
            v.extend(3, 1, &[], t - 1, n / 3, nextpi - lastpi, prefs);
        }
        lastpi = nextpi;
    }
    let nextpi = tb.pi(n / 2);
    cnt += 2 * (nextpi - lastpi);
    if let Some(v) = log.as_deref_mut() {
        v.extend(2, 1, &[], (t - 1).max(n / 3), n / 2, nextpi - lastpi, prefs);
    }
    lastpi = nextpi;
    let nextpi = tb.pi(n);
    cnt += nextpi - lastpi;
    if let Some(v) = log.as_deref_mut() {
        v.extend(1, 1, &[], n / 2, n, nextpi - lastpi, prefs);
    }
    if prefs.verbose(Verbosity::Debug) {
        eprintln!(
            "cnt={cnt} for {} p in [s,N] ({:.6}s)",
            nextpi - maxpi as i64,
            start.elapsed().as_secs_f64()
        );
    }

    // The minimal cofactor must never overdraw a valuation.
    for i in 1..=maxpi {
        assert!(e[i] >= 0, "valuation of prime {} overdrawn", tb.prime(i));
    }

    if feasible {
        // Every further factor is at least t, so the bit mass of the
        // residual bounds the count. Round the numerator up and the
        // denominator down so the result stays an upper bound.
        let eps = 1e-16f64;
        let mut ebits = 0f64;
        for i in 1..=maxpi {
            ebits += e[i] as f64 * ((tb.prime(i) as f64) + eps).ln();
        }
        return cnt + (ebits / (((t - 1) as f64) - eps).ln()).floor() as i64;
    }

    cnt += if !prefs.fast {
        small_standard(tb, t, s, maxpi, &mut e, &ms, prefs, log.as_deref_mut())
    } else {
        small_fast(tb, t, s, maxpi, maxm, &mut e, &ms, prefs, log.as_deref_mut(), start)
    };

    // Whatever is left must multiply to less than t, otherwise the
    // small-prime phase missed a factor.
    let mut top = maxpi;
    while top > 0 && e[top] == 0 {
        top -= 1;
    }
    let mut q: i128 = 1;
    for i in 1..=top {
        assert!(e[i] >= 0);
        for _ in 0..e[i] {
            q *= tb.prime(i) as i128;
            assert!(q < t as i128);
        }
    }
    if prefs.verbose(Verbosity::Verbose) {
        eprintln!(
            "{cnt} factors >= {t} with remainder {q} ({:.6}s)",
            start.elapsed().as_secs_f64()
        );
    }
    cnt
}

/// Run tfac and, when the preferences ask for it, record a certificate
/// and verify it.
pub fn tfac_verified(tb: &Tables, n: i64, t: i64, prefs: &Preferences) -> i64 {
    if prefs.verify {
        let mut log = FacLog::new(n, t);
        let cnt = tfac(tb, n, t, false, prefs, Some(&mut log));
        log.verify(tb, prefs);
        cnt
    } else {
        tfac(tb, n, t, false, prefs, None)
    }
}

/// Standard greedy small-prime phase: descending primes p_i, ascending
/// cofactors m, factors m*p_i where m is p_i-smooth. Returns the count
/// of factors produced.
#[allow(clippy::too_many_arguments)]
fn small_standard(
    tb: &Tables,
    t: i64,
    s: i64,
    maxpi: usize,
    e: &mut [i64],
    ms: &[u32],
    prefs: &Preferences,
    mut log: Option<&mut FacLog>,
) -> i64 {
    let numm = ms.len() - 1;
    let mut cnt = 0i64;
    let mut pcnt: i64 = e[1..=maxpi].iter().sum();
    let mut i = maxpi;
    let mut j = cdiv(t, s) as usize;
    while i > 0 {
        let p = tb.prime(i);
        // skip cofactors that are too small or not p_i-smooth
        while j <= numm {
            let mj = ms[j] as i64;
            if p * mj < t || tb.top_pi(mj) > i {
                j += 1;
            } else {
                break;
            }
        }
        if j > numm {
            break;
        }
        let mj = ms[j] as i64;
        let f = tb.factorization(mj);
        let x = fcnti(e, i, f);
        if x == 0 {
            if pcnt < 40 {
                // under 40 primes left with multiplicity: stop once
                // their product cannot reach t anymore
                let mut q: i64 = 1;
                let mut ii = i;
                while ii > 0 && q < t {
                    let mut k = 0;
                    while k < e[ii] && q < t {
                        q *= tb.prime(ii);
                        k += 1;
                    }
                    ii -= 1;
                }
                if q < t {
                    break;
                }
            }
            j += 1;
            continue;
        }
        cnt += x;
        e[i] -= x;
        pcnt -= x;
        for pp in f {
            e[pp.pi()] -= x * pp.e();
            pcnt -= x * pp.e();
        }
        if let Some(v) = log.as_deref_mut() {
            v.extend_mp(x, mj, f, p, prefs);
        }
        while i > 0 && e[i] == 0 {
            i -= 1;
        }
    }
    cnt
}

/// Append the i-th prime to a factorization being assembled in
/// descending order.
fn push_prime(c: &mut Vec<Pp>, i: usize) {
    match c.last_mut() {
        Some(last) if last.pi() == i => *last = Pp::new(i as u32, last.e() as u32 + 1),
        _ => c.push(Pp::new(i as u32, 1)),
    }
}

/// Fast greedy small-prime phase. Cofactors are required to be
/// (p-1)-smooth so that their exponents never interact with p, and
/// they are bounded by t^(5/8): when p gets too small for a single
/// cofactor, leftovers are packed into composite factors.
#[allow(clippy::too_many_arguments)]
fn small_fast(
    tb: &Tables,
    t: i64,
    s: i64,
    maxpi: usize,
    maxm: i64,
    e: &mut [i64],
    ms: &[u32],
    prefs: &Preferences,
    mut log: Option<&mut FacLog>,
    start: Instant,
) -> i64 {
    let numm = ms.len() - 1;
    let mut cnt = 0i64;

    // First pass: primes large enough that maxm * p >= t, so a single
    // cofactor can complete a factor.
    let pimin = (tb.pi(cdiv(t, maxm)) + 1) as usize;
    let mut j = cdiv(t, s) as usize;
    let mut i = maxpi;
    while i >= pimin {
        let p = tb.prime(i);
        while j <= numm {
            let mj = ms[j] as i64;
            if p * mj < t || tb.top_pi(mj) >= i {
                j += 1;
            } else {
                break;
            }
        }
        if j > numm {
            break;
        }
        let fm = ms[j] as i64;
        let mut x = fcnt(e, e[i], tb.factorization(fm));
        if x < e[i] {
            // m alone cannot clear p from the residual: consume pairs
            // of p with the factor m2 * p^2
            let m2 = cdiv(t, p * p);
            let g = tb.factorization(m2);
            let x2 = fcnt(e, e[i] / 2, g);
            if x2 > 0 {
                if let Some(v) = log.as_deref_mut() {
                    v.extend_mp2(tb, x2, m2, g, i, prefs);
                }
                cnt += x2;
                e[i] -= 2 * x2;
                for pp in g {
                    e[pp.pi()] -= x2 * pp.e();
                }
            }
            x = fcnt(e, e[i], tb.factorization(fm));
        }
        if x > 0 {
            let f = tb.factorization(fm);
            if let Some(v) = log.as_deref_mut() {
                v.extend_mp(x, fm, f, p, prefs);
            }
            cnt += x;
            e[i] -= x;
            for pp in f {
                e[pp.pi()] -= x * pp.e();
            }
        }
        if e[i] > 0 {
            // some larger cofactor may match the residual better
            let mut best = 0i64;
            let mut bestm = 0i64;
            for k in j + 1..=numm {
                let y = fcnt(e, e[i], tb.factorization(ms[k] as i64));
                if y > best {
                    best = y;
                    bestm = ms[k] as i64;
                    if best == e[i] {
                        break;
                    }
                }
            }
            if best > 0 {
                let f = tb.factorization(bestm);
                if let Some(v) = log.as_deref_mut() {
                    v.extend_mp(best, bestm, f, p, prefs);
                }
                cnt += best;
                e[i] -= best;
                for pp in f {
                    e[pp.pi()] -= best * pp.e();
                }
            }
            if e[i] > 0 {
                // same with p^2, starting above its minimal cofactor
                let m0 = cdiv(t, p * p) + 1;
                debug_assert!(ms[m0 as usize] as i64 == m0);
                let mut best = 0i64;
                let mut bestm = 0i64;
                for k in m0 as usize..=numm {
                    let y = fcnt(e, e[i] / 2, tb.factorization(ms[k] as i64));
                    if y > best {
                        best = y;
                        bestm = ms[k] as i64;
                        if best == e[i] {
                            break;
                        }
                    }
                }
                if best > 0 {
                    let g = tb.factorization(bestm);
                    if let Some(v) = log.as_deref_mut() {
                        v.extend_mp2(tb, best, bestm, g, i, prefs);
                    }
                    cnt += best;
                    e[i] -= 2 * best;
                    for pp in g {
                        e[pp.pi()] -= best * pp.e();
                    }
                }
                // E[i] may stay positive here, usually at most 1
            }
        }
        i -= 1;
    }
    if prefs.verbose(Verbosity::Debug) {
        eprintln!(
            "cnt={cnt} after initial pass of p in (t/maxm,s) ({:.6}s)",
            start.elapsed().as_secs_f64()
        );
    }

    // Second pass: use up what is left, mostly primes below t^(3/8),
    // by assembling products until they reach [t, 5*ceil(t/4)).
    let good = 5 * cdiv(t, 4);
    let mut c: Vec<Pp> = Vec::with_capacity(16);
    let mut top = maxpi;
    loop {
        while top > 0 && e[top] == 0 {
            top -= 1;
        }
        if top == 0 {
            break;
        }
        let mut i = top;
        let mut q = tb.prime(i);
        c.clear();
        c.push(Pp::new(i as u32, 1));
        e[i] -= 1;
        while i > 0 && e[i] == 0 {
            i -= 1;
        }
        if i == 0 {
            break;
        }
        while i > 0 && (q as i128) * (tb.prime(i) as i128) < good as i128 {
            q *= tb.prime(i);
            e[i] -= 1;
            push_prime(&mut c, i);
            while i > 0 && e[i] == 0 {
                i -= 1;
            }
        }
        if i == 0 && q < t {
            break;
        }
        let mut x = 1 + fcnt(e, e[c[0].pi()] / c[0].e(), &c[1..]);
        if q < t {
            debug_assert!(q > s);
            // look for a cofactor below the smallest prime of q that
            // fills the gap
            let minp = tb.prime(c.last().unwrap().pi());
            let mut best = 0i64;
            let mut bestm = 0i64;
            let mut mm = cdiv(t, q);
            while mm < minp {
                let y = fcnt(e, x, tb.factorization(mm));
                if y > best {
                    best = y;
                    bestm = mm;
                }
                if y == x {
                    break;
                }
                mm += 1;
            }
            if best > 0 {
                for pp in tb.factorization(bestm) {
                    e[pp.pi()] -= pp.e();
                    c.push(*pp);
                }
                q *= bestm;
                x = best;
            } else {
                // no cofactor: take the next smaller prime instead
                if i == 0 {
                    break;
                }
                q *= tb.prime(i);
                e[i] -= 1;
                push_prime(&mut c, i);
                x = 1 + fcnt(e, e[c[0].pi()] / c[0].e(), &c[1..]);
                debug_assert!(x >= 1);
            }
            assert!(q >= t);
        }
        if let Some(v) = log.as_deref_mut() {
            v.extend_m(tb, x, q, &c, prefs);
        }
        cnt += x;
        let x1 = x - 1;
        for pp in c.iter() {
            e[pp.pi()] -= x1 * pp.e();
        }
        c.clear();
        top = i;
    }
    // Put back the partial product we may have abandoned, so that the
    // reported remainder is a true divisor of what is left.
    for pp in c.iter() {
        e[pp.pi()] += pp.e();
    }
    cnt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_for(maxn: i64, fast: bool) -> Tables {
        let maxt = 2 * maxn / 5;
        let maxp = fac_s(maxt);
        let maxm = if fast {
            (maxt as f64).powf(5.0 / 8.0) as i64
        } else {
            maxt - 1
        };
        Tables::new(maxp, maxm).unwrap()
    }

    fn prefs(fast: bool) -> Preferences {
        Preferences {
            verbosity: Verbosity::Silent,
            fast,
            ..Preferences::default()
        }
    }

    #[test]
    fn test_fcnt() {
        // residual 2^10 * 3^4 * 5^2 with p1=2, p2=3, p3=5
        let e = vec![0i64, 10, 4, 2];
        // m = 12 = 3 * 2^2
        let f = vec![Pp::new(2, 1), Pp::new(1, 2)];
        assert_eq!(fcnt(&e, 100, &f), 4);
        assert_eq!(fcnt(&e, 3, &f), 3);
        assert_eq!(fcnt(&e, 100, &[]), 100);
        // merged extra prime 3: v_{3*12}
        assert_eq!(fcnti(&e, 2, &f), 2);
        // extra prime 5 with m = 12
        assert_eq!(fcnti(&e, 3, &f), 2);
    }

    #[test]
    fn test_smallest_n_with_third_ratio() {
        // t(41006) >= 13669 = ceil(41006/3): the smallest N where the
        // fast greedy reaches the N/3 ratio.
        let tb = setup_for(41006, true);
        let cnt = tfac(&tb, 41006, 13669, false, &prefs(true), None);
        assert!(cnt >= 41006, "cnt={cnt}");
    }

    #[test]
    fn test_known_obstruction() {
        let tb = setup_for(43632, true);
        let cnt = tfac(&tb, 43632, 14545, false, &prefs(true), None);
        assert!(cnt >= 43632, "cnt={cnt}");
        // N = 43631 is the known obstruction: the same construction
        // falls short at t = ceil(N/3) + 1.
        let cnt = tfac(&tb, 43631, 14544, false, &prefs(true), None);
        assert!(cnt < 43631, "cnt={cnt}");
    }

    #[test]
    fn test_standard_surplus() {
        // Historical run: standard greedy at N = 3*10^5, t = 10^5
        // yields exactly 372 extra factors.
        let tb = setup_for(300_000, false);
        let cnt = tfac(&tb, 300_000, 100_000, false, &prefs(false), None);
        assert_eq!(cnt - 300_000, 372);
    }

    #[test]
    fn test_monotone_in_t() {
        let tb = setup_for(20_000, true);
        let p = prefs(true);
        let mut last = i64::MAX;
        for t in [6000, 6500, 7000, 7500, 7900] {
            let cnt = tfac(&tb, 20_000, t, false, &p, None);
            assert!(cnt <= last, "tfac not monotone at t={t}");
            last = cnt;
        }
    }

    #[test]
    fn test_idempotent() {
        let tb = setup_for(20_000, true);
        let p = prefs(true);
        let a = tfac(&tb, 20_000, 6700, false, &p, None);
        let b = tfac(&tb, 20_000, 6700, false, &p, None);
        assert_eq!(a, b);
        let mut la = FacLog::new(20_000, 6700);
        let mut lb = FacLog::new(20_000, 6700);
        tfac(&tb, 20_000, 6700, false, &p, Some(&mut la));
        tfac(&tb, 20_000, 6700, false, &p, Some(&mut lb));
        assert_eq!(la.items(), lb.items());
    }

    #[test]
    fn test_cutoff_invariance() {
        let tb = setup_for(41006, true);
        let mut last = None;
        for cutoff in [0.2, 0.225, 0.25, 0.275, 0.3] {
            let p = Preferences {
                cutoff,
                ..prefs(true)
            };
            let cnt = tfac(&tb, 41006, 13669, false, &p, None);
            if let Some(prev) = last {
                assert_eq!(cnt, prev, "cutoff {cutoff} changed the count");
            }
            last = Some(cnt);
        }
    }

    #[test]
    fn test_feasible_bounds_all_continuations() {
        let tb = setup_for(20_000, true);
        let p = prefs(true);
        for t in [6000, 6700, 7400] {
            let ub = tfac(&tb, 20_000, t, true, &p, None);
            for t2 in [t, t + 200] {
                let cnt = tfac(&tb, 20_000, t2, false, &p, None);
                assert!(ub >= cnt, "feasible bound {ub} below count {cnt} at t={t}, t'={t2}");
            }
        }
    }

    #[test]
    fn test_certificate_replay() {
        let tb = setup_for(41006, true);
        let p = prefs(true);
        let mut log = FacLog::new(41006, 13669);
        let cnt = tfac(&tb, 41006, 13669, false, &p, Some(&mut log));
        assert_eq!(log.verify(&tb, &p), cnt);

        // standard variant, smaller run
        let tb = setup_for(20_000, false);
        let p = prefs(false);
        let mut log = FacLog::new(20_000, 6700);
        let cnt = tfac(&tb, 20_000, 6700, false, &p, Some(&mut log));
        assert_eq!(log.verify(&tb, &p), cnt);
    }

    #[test]
    fn test_dump_roundtrip() {
        let tb = setup_for(20_000, true);
        let p = prefs(true);
        let mut log = FacLog::new(20_000, 6700);
        let cnt = tfac(&tb, 20_000, 6700, false, &p, Some(&mut log));
        let mut buf = Vec::new();
        log.dump(&mut buf).unwrap();
        let log2 = FacLog::read_dump(&tb, 20_000, 6700, &buf[..]).unwrap();
        assert_eq!(log2.verify(&tb, &p), cnt);
    }
}
