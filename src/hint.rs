// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Hint files for batch runs over ranges of N.
//!
//! A hint file is a sequence of `N:t` lines with strictly increasing
//! N. A record proves t(N') >= ceil(aN'/b) for every N' in
//! [N, floor(bt/a)], so a file whose records chain without gaps
//! certifies a whole range. Creating a file runs the search driver
//! repeatedly, jumping to the first N not covered by the previous
//! record; checking replays each record through the engine and
//! rejects gaps, regressions and records that fail to prove.

use std::io::{BufRead, Write};
use std::time::Instant;

use crate::arith::cdiv;
use crate::greedy::tfac_verified;
use crate::search::tbound;
use crate::tables::Tables;
use crate::{Error, Preferences, Verbosity};

pub fn ratio_label(a: i64, b: i64) -> String {
    if a == 1 {
        format!("ceil(N/{b})")
    } else {
        format!("ceil({a}N/{b})")
    }
}

/// Prove t(N) >= ceil(aN/b) for all N in [minn, maxn] by chaining
/// searches, writing one `N:t` record per search. Returns the verified
/// range (whose upper end is below minn when nothing could be proved).
#[allow(clippy::too_many_arguments)]
pub fn create_hints(
    tb: &Tables,
    minn: i64,
    maxn: i64,
    a: i64,
    b: i64,
    exhaustive: bool,
    prefs: &Preferences,
    tpool: Option<&rayon::ThreadPool>,
    mut out: Option<&mut dyn Write>,
) -> Result<(i64, i64), Error> {
    let start = Instant::now();
    let rbuf = ratio_label(a, b);
    let mut n = minn;
    while n <= maxn {
        let t = tbound(tb, n, a, b, exhaustive, prefs, tpool);
        if b * t < a * n {
            break;
        }
        if prefs.verbose(Verbosity::Info) {
            eprintln!(
                "t({n}) >= {t} (t-{rbuf} >= {}) ({:.3}s)",
                t - cdiv(a * n, b),
                start.elapsed().as_secs_f64()
            );
        }
        if let Some(w) = out.as_deref_mut() {
            writeln!(w, "{n}:{t}")?;
        }
        n = b * t / a + 1;
    }
    if prefs.verbose(Verbosity::Info) {
        if n > maxn {
            eprintln!(
                "Verified the {rbuf} Erdős-Guy-Selfridge conjecture for all N in [{minn},{maxn}] ({:.3}s)",
                start.elapsed().as_secs_f64()
            );
        } else if n == minn {
            eprintln!(
                "Unable to verify the {rbuf} Erdős-Guy-Selfridge conjecture for N={minn} ({:.3}s)",
                start.elapsed().as_secs_f64()
            );
        } else {
            eprintln!(
                "Only able to verify the {rbuf} Erdős-Guy-Selfridge conjecture for N in [{minn},{}] ({:.3}s)",
                n - 1,
                start.elapsed().as_secs_f64()
            );
        }
    }
    Ok((minn, (n - 1).min(maxn)))
}

/// Check a hint file against [minn, maxn]: every record must prove its
/// bound and extend the verified range with no gap. Any inconsistency
/// is fatal; a usable prefix is not accepted.
pub fn check_hints<R: BufRead>(
    tb: &Tables,
    minn: i64,
    maxn: i64,
    a: i64,
    b: i64,
    prefs: &Preferences,
    reader: R,
) -> Result<(), Error> {
    let start = Instant::now();
    let mut minv = 0i64;
    let mut maxv = 0i64;
    for line in reader.lines() {
        let line = line?;
        let (n, t) = parse_hint(&line)?;
        if b * t < a * n {
            return Err(Error::Hint(format!(
                "invalid N:t in hint file: {b}*{t} < {a}*{n}"
            )));
        }
        let timer = Instant::now();
        if tfac_verified(tb, n, t, prefs) < n {
            return Err(Error::Hint(format!("failed to verify t({n}) >= {t}")));
        }
        if minv == 0 {
            if n > minn {
                return Err(Error::Hint(format!(
                    "hint file starting N={n} above range minimum {minn}"
                )));
            }
            minv = n;
            maxv = b * t / a;
        } else {
            if n > maxv + 1 {
                return Err(Error::Hint(format!(
                    "hint at N={n} leaves a gap (verified up to {maxv})"
                )));
            }
            if b * t <= a * maxv {
                return Err(Error::Hint(format!(
                    "hint at N={n} did not extend the verified range"
                )));
            }
            maxv = b * t / a;
        }
        if prefs.verbose(Verbosity::Info) {
            println!("t({n}) >= {t} ({:.3}s)", timer.elapsed().as_secs_f64());
        }
        if maxv >= maxn {
            break;
        }
    }
    if minv > minn || maxv < maxn {
        return Err(Error::Hint(format!(
            "hint file only allowed verification of [{minv},{maxv}]"
        )));
    }
    if prefs.verbose(Verbosity::Info) {
        eprintln!(
            "Verified the {} Erdős-Guy-Selfridge conjecture for N in [{minn},{maxn}] ({:.3}s)",
            ratio_label(a, b),
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}

fn parse_hint(line: &str) -> Result<(i64, i64), Error> {
    let bad = || Error::Hint(format!("error parsing hint line {line:?}"));
    let (ns, ts) = line.split_once(':').ok_or_else(&bad)?;
    let n = ns.trim().parse::<i64>().map_err(|_| bad())?;
    let t = ts.trim().parse::<i64>().map_err(|_| bad())?;
    Ok((n, t))
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
    fn test_parse_hint() {
        assert_eq!(parse_hint("1000:334").unwrap(), (1000, 334));
        assert!(parse_hint("1000").is_err());
        assert!(parse_hint("a:b").is_err());
    }

    #[test]
    fn test_create_then_check() {
        let tb = setup_for(3000);
        let p = prefs();
        let mut buf: Vec<u8> = Vec::new();
        let (lo, hi) =
            create_hints(&tb, 1000, 3000, 13, 50, false, &p, None, Some(&mut buf)).unwrap();
        assert_eq!((lo, hi), (1000, 3000));
        // records are strictly increasing in N and contiguous
        let text = String::from_utf8(buf.clone()).unwrap();
        let mut last_n = 0;
        let mut last_cover = 0;
        for line in text.lines() {
            let (n, t) = parse_hint(line).unwrap();
            assert!(n > last_n);
            assert!(last_cover == 0 || n <= last_cover + 1);
            assert!(50 * t >= 13 * n);
            last_n = n;
            last_cover = 50 * t / 13;
        }
        assert!(last_cover >= 3000);
        check_hints(&tb, 1000, 3000, 13, 50, &p, &buf[..]).unwrap();
    }

    #[test]
    fn test_check_rejects_invalid_record() {
        let tb = setup_for(3000);
        let p = prefs();
        // 50*259 < 13*1000: the record does not even claim the ratio
        let hints = b"1000:259\n".to_vec();
        let err = check_hints(&tb, 1000, 1005, 13, 50, &p, &hints[..]).unwrap_err();
        assert!(matches!(err, Error::Hint(_)));
    }

    #[test]
    fn test_check_rejects_gap() {
        let tb = setup_for(3000);
        let p = prefs();
        // the first record covers N <= 50*261/13 = 1003, the second
        // starts at 1100
        let hints = b"1000:261\n1100:290\n".to_vec();
        let err = check_hints(&tb, 1000, 1300, 13, 50, &p, &hints[..]).unwrap_err();
        assert!(matches!(err, Error::Hint(_)));
    }

    #[test]
    fn test_check_rejects_undercoverage() {
        let tb = setup_for(3000);
        let p = prefs();
        let hints = b"1000:261\n".to_vec();
        let err = check_hints(&tb, 1000, 3000, 13, 50, &p, &hints[..]).unwrap_err();
        assert!(matches!(err, Error::Hint(_)));
    }
}
