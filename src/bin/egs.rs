// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::str::FromStr;
use std::time::Instant;

use egs::arith::{cdiv, fac_s};
use egs::{hint, params, search, tfac, Error, FacLog, Preferences, Tables, Verbosity};

fn usage() {
    eprintln!("Usage: egs [OPTIONS] N[-MAXN] [t | a/b]");
    eprintln!();
    eprintln!("Prove lower bounds t(N) >= t for the Erdős-Guy-Selfridge function,");
    eprintln!("i.e. write N! as a product of at least N factors that are all >= t.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --help                    show this help");
    eprintln!("  --verbose silent|info|verbose|debug");
    eprintln!("  --fast true               use the fast variant of the greedy algorithm");
    eprintln!("  --exhaustive true         find the best t the algorithm can prove");
    eprintln!("  --check true              record and verify a factorization certificate");
    eprintln!("  --hints FILE              hint file with records N:t (required for an N-range)");
    eprintln!("  --create true             create the hint file instead of reading it");
    eprintln!("  --dump FILE               dump the factorization to FILE (implies --check true)");
    eprintln!("  --cutoff X                prime enumeration/counting cutoff exponent, in [0.2,0.3]");
    eprintln!("  --threads N               worker threads for the exhaustive search");
    eprintln!();
    eprintln!("N and MAXN accept scientific notation (e.g. 1e6-1e12). The second");
    eprintln!("argument is either a fixed t (single N only) or a ratio a/b setting");
    eprintln!("t = ceil(aN/b), with 1/4 <= a/b <= 2/5; the default ratio is 1/3.");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<(), Error> {
    let arg = arguments::parse(std::env::args()).unwrap();
    if arg.get::<bool>("help").is_some() || arg.orphans.is_empty() || arg.orphans.len() > 2 {
        usage();
        return Ok(());
    }

    let mut prefs = Preferences::default();
    if let Some(v) = arg.get::<String>("verbose") {
        prefs.verbosity = Verbosity::from_str(&v)?;
    }
    prefs.fast = arg.get::<bool>("fast").unwrap_or(false);
    prefs.threads = arg.get::<usize>("threads");
    let exhaustive = arg.get::<bool>("exhaustive").unwrap_or(false);
    let create = arg.get::<bool>("create").unwrap_or(false);
    let hintfile = arg.get::<String>("hints");
    let dumpfile = arg.get::<String>("dump");
    prefs.verify = arg.get::<bool>("check").unwrap_or(false) || dumpfile.is_some();
    if let Some(x) = arg.get::<f64>("cutoff") {
        if !(params::CUTOFF_MIN..=params::CUTOFF_MAX).contains(&x) {
            return Err(Error::Domain(format!(
                "cutoff {x} out of range [{},{}]",
                params::CUTOFF_MIN,
                params::CUTOFF_MAX
            )));
        }
        prefs.cutoff = x;
    }

    let (minn, maxn) = parse_range(&arg.orphans[0])?;
    let mut t = 0i64;
    let (mut a, mut b) = (1i64, 3i64);
    if let Some(tparam) = arg.orphans.get(1) {
        if let Some((astr, bstr)) = tparam.split_once('/') {
            a = parse_scaled(astr)?;
            b = parse_scaled(bstr)?;
            if a <= 0 || b <= 0 || 4 * a < b || 5 * a > 2 * b {
                return Err(Error::Domain(format!(
                    "ratio {a}/{b} must lie in [1/4,2/5]"
                )));
            }
        } else {
            if maxn > minn {
                return Err(Error::Domain(
                    "for a range of N specify a t/N ratio (e.g. 1/3), not a fixed t".into(),
                ));
            }
            t = parse_scaled(tparam)?;
        }
    }
    if minn < 14 || maxn >= params::MAXN {
        return Err(Error::Domain(format!(
            "N-range [{minn},{maxn}] must be contained in [14,{})",
            params::MAXN
        )));
    }
    if t != 0 {
        if 4 * t <= maxn {
            return Err(Error::Domain(format!("t={t} must be greater than N/4")));
        }
        if 2 * t >= maxn {
            return Err(Error::Domain(format!("t={t} must be less than N/2")));
        }
    }

    // Tables sized for the largest t any run in the range may probe.
    let start = Instant::now();
    let maxt = 2 * maxn / 5;
    let maxp = fac_s(maxt);
    let maxm = if prefs.fast {
        (maxt as f64).powf(5.0 / 8.0) as i64
    } else {
        maxt - 1
    };
    if !prefs.fast && (maxp > params::MAXP || maxm > params::MAXM) {
        return Err(Error::Resource(format!(
            "N={maxn} is too large for this implementation of the standard greedy algorithm, \
             use --fast true to switch to the fast variant"
        )));
    }
    let tb = Tables::new(maxp, maxm)?;
    if prefs.verbose(Verbosity::Info) {
        eprintln!(
            "Computed {}-smooth factorizations of m <= {} using {:.3}MB of memory ({:.3}s)",
            tb.maxp(),
            tb.maxm(),
            tb.memory_bytes() as f64 / (1 << 20) as f64,
            start.elapsed().as_secs_f64()
        );
    }

    let tpool: Option<rayon::ThreadPool> = match prefs.threads {
        None | Some(1) => None,
        Some(th) => {
            if prefs.verbose(Verbosity::Verbose) {
                eprintln!("Using a pool of {th} threads");
            }
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(th)
                    .build()
                    .expect("cannot create thread pool"),
            )
        }
    };
    let tpool = tpool.as_ref();

    let start = Instant::now();
    let rbuf = hint::ratio_label(a, b);
    if maxn > minn {
        if create || hintfile.is_none() {
            if create && hintfile.is_none() {
                return Err(Error::Domain(
                    "use --hints to name the hint file to be created".into(),
                ));
            }
            match &hintfile {
                Some(path) => {
                    let mut w = BufWriter::new(File::create(path)?);
                    hint::create_hints(
                        &tb, minn, maxn, a, b, exhaustive, &prefs, tpool,
                        Some(&mut w),
                    )?;
                    w.flush()?;
                }
                None => {
                    if prefs.verbose(Verbosity::Info) {
                        eprintln!(
                            "No hint file specified, t-choices will not be saved \
                             (use --create true --hints FILE to save them)"
                        );
                    }
                    hint::create_hints(&tb, minn, maxn, a, b, exhaustive, &prefs, tpool, None)?;
                }
            }
        } else {
            let f = File::open(hintfile.as_ref().unwrap())?;
            hint::check_hints(&tb, minn, maxn, a, b, &prefs, BufReader::new(f))?;
        }
        return Ok(());
    }

    let n = minn;
    if t != 0 && exhaustive {
        t = 0;
        eprintln!("Ignoring the specified value of t and searching for the optimal value");
    }
    if t == 0 {
        let t = search::tbound(&tb, n, a, b, exhaustive, &prefs, tpool);
        println!(
            "t({n}) >= {t} ({} {}) with t-{rbuf} = {} ({:.3}s)",
            if exhaustive { "exhaustive" } else { "heuristic" },
            if prefs.fast { "fast" } else { "greedy" },
            t - cdiv(a * n, b),
            start.elapsed().as_secs_f64()
        );
    } else {
        let cnt = if prefs.verify {
            let mut log = FacLog::new(n, t);
            let cnt = tfac(&tb, n, t, false, &prefs, Some(&mut log));
            log.verify(&tb, &prefs);
            if let Some(path) = &dumpfile {
                if prefs.verbose(Verbosity::Info) {
                    eprintln!("Dumping factorization certificate to {path} ...");
                }
                let mut w = BufWriter::new(File::create(path)?);
                log.dump(&mut w)?;
                w.flush()?;
            }
            cnt
        } else {
            tfac(&tb, n, t, false, &prefs, None)
        };
        if cnt >= n {
            println!(
                "t({n}) >= {t} with {} extra factors ({:.3}s)",
                cnt - n,
                start.elapsed().as_secs_f64()
            );
        } else {
            eprintln!(
                "failed to prove t({n}) >= {t}, {} factors missing ({:.3}s)",
                n - cnt,
                start.elapsed().as_secs_f64()
            );
        }
    }
    Ok(())
}

/// Integer, possibly in scientific notation (1e6).
fn parse_scaled(s: &str) -> Result<i64, Error> {
    let x: f64 = s
        .trim()
        .parse()
        .map_err(|_| Error::Domain(format!("invalid number {s:?}")))?;
    if !(0.0..9e15).contains(&x) || (x - x.round()).abs() > 0.0001 {
        return Err(Error::Domain(format!("{s:?} must be an integer")));
    }
    Ok(x.round() as i64)
}

/// A single N or a range minN-maxN (also accepted: minN,maxN).
fn parse_range(s: &str) -> Result<(i64, i64), Error> {
    let (lo, hi) = match s.split_once(['-', ',']) {
        Some((ls, hs)) => (parse_scaled(ls)?, parse_scaled(hs)?),
        None => {
            let n = parse_scaled(s)?;
            (n, n)
        }
    };
    if hi < lo {
        return Err(Error::Domain(format!("empty N-range {s:?}")));
    }
    Ok((lo, hi))
}

#[test]
fn test_parse_range() {
    assert_eq!(parse_range("41006").unwrap(), (41006, 41006));
    assert_eq!(parse_range("1e6-1e9").unwrap(), (1_000_000, 1_000_000_000));
    assert_eq!(parse_range("100,200").unwrap(), (100, 200));
    assert!(parse_range("200-100").is_err());
    assert!(parse_range("1.5").is_err());
}
