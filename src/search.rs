// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Search for the best provable lower bound.
//!
//! `tbound` looks for the largest t >= ceil(aN/b) such that the greedy
//! engine proves t(N) >= t. A modified bisection uses the surplus or
//! deficit of each run to pick the next probe. In exhaustive mode the
//! feasibility variant of the engine first caps the search interval,
//! then every remaining candidate t is checked, in parallel when a
//! thread pool is available; the workers only share the best t found
//! so far behind a mutex.

use std::sync::Mutex;

use rayon::prelude::*;

use crate::arith::cdiv;
use crate::greedy::{tfac, tfac_verified};
use crate::tables::Tables;
use crate::{Preferences, Verbosity};

/// Largest t >= ceil(aN/b) proved by the engine for this N.
pub fn tbound(
    tb: &Tables,
    n: i64,
    a: i64,
    b: i64,
    exhaustive: bool,
    prefs: &Preferences,
    tpool: Option<&rayon::ThreadPool>,
) -> i64 {
    assert!(a > 0 && b > 0 && 5 * a <= 2 * b && 4 * a >= b);
    let mut t = cdiv(a * n, b);
    let mut cnt = tfac_verified(tb, n, t, prefs);
    while cnt < n {
        t -= 1;
        cnt = tfac_verified(tb, n, t, prefs);
    }
    let mut tmin = t;
    let mut tmax = 2 * n / 5;

    // Bisection of [tmin, tmax) steered by the surplus of the last run.
    while tmin < tmax - 1 {
        if cnt >= n {
            tmin = tmin.max(t);
        } else {
            tmax = tmax.min(t);
        }
        if prefs.verbose(Verbosity::Verbose) {
            eprintln!(
                "t={t} gave {} extra factors, new t-range is [{tmin},{tmax})",
                cnt - n
            );
        }
        let tf = t as f64;
        t = (tf.ln() + (cnt - n) as f64 * tf.ln() / n as f64).exp().round() as i64;
        if t <= tmin {
            t = ((3 * tmin + tmax) / 4).max(tmin + 1);
        }
        if t >= tmax {
            t = ((tmin + 3 * tmax) / 4).min(tmax - 1);
        }
        cnt = tfac_verified(tb, n, t, prefs);
    }
    assert!(tmax < 2 * n / 5);
    if !exhaustive {
        return tmin;
    }
    if prefs.verbose(Verbosity::Info) {
        eprintln!("t({n}) >= {tmin} proved");
    }

    // Cap the interval with the feasibility bound: no t at or above the
    // first infeasible point can ever be proved.
    let mut low = tmin;
    let mut high = 2 * n / 5;
    cnt = tfac(tb, n, high, true, prefs, None);
    assert!(cnt < n);
    while low < high - 1 {
        let mid = (low + high) / 2;
        cnt = tfac(tb, n, mid, true, prefs, None);
        if cnt < n {
            high = mid;
            tmax = mid;
        } else {
            low = mid;
        }
    }
    assert!(tmax > tmin);
    if prefs.verbose(Verbosity::Info) {
        eprintln!("t({n}) >= {tmax} cannot be proved");
        eprintln!(
            "checking {} values of t in ({tmin},{tmax})",
            tmax - tmin - 1
        );
    }

    let best = Mutex::new(tmin);
    let scan = || {
        (tmin + 1..tmax).into_par_iter().for_each(|t| {
            if tfac(tb, n, t, false, prefs, None) >= n {
                let mut b = best.lock().unwrap();
                if t > *b {
                    *b = t;
                    if prefs.verbose(Verbosity::Info) {
                        eprintln!("t({n}) >= {t} proved");
                    }
                }
            }
        });
    };
    match tpool {
        Some(pool) => pool.install(scan),
        None => scan(),
    }
    let tmin = best.into_inner().unwrap();
    if prefs.verify {
        tfac_verified(tb, n, tmin, prefs);
    }
    tmin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arith::fac_s;

    fn setup_for(maxn: i64) -> Tables {
        let maxt = 2 * maxn / 5;
        Tables::new(fac_s(maxt), (maxt as f64).powf(5.0 / 8.0) as i64).unwrap()
    }

    fn prefs() -> Preferences {
        Preferences {
            verbosity: Verbosity::Silent,
            fast: true,
            ..Preferences::default()
        }
    }

    #[test]
    fn test_tbound_is_maximal() {
        let tb = setup_for(10_000);
        let p = prefs();
        let t = tbound(&tb, 10_000, 13, 50, false, &p, None);
        assert!(50 * t >= 13 * 10_000);
        assert!(tfac(&tb, 10_000, t, false, &p, None) >= 10_000);
        assert!(tfac(&tb, 10_000, t + 1, false, &p, None) < 10_000);
    }

    #[test]
    fn test_exhaustive_matches_sequential() {
        let tb = setup_for(10_000);
        let p = prefs();
        let seq = tbound(&tb, 10_000, 13, 50, true, &p, None);
        for threads in [2, 8] {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap();
            let par = tbound(&tb, 10_000, 13, 50, true, &p, Some(&pool));
            assert_eq!(seq, par, "threads={threads}");
        }
        // the exhaustive result can only improve on the bisection
        let heuristic = tbound(&tb, 10_000, 13, 50, false, &p, None);
        assert!(seq >= heuristic);
    }

    #[test]
    fn test_tbound_verified() {
        let tb = setup_for(10_000);
        let p = Preferences {
            verify: true,
            ..prefs()
        };
        let t = tbound(&tb, 10_000, 13, 50, false, &p, None);
        assert!(50 * t >= 13 * 10_000);
    }
}
