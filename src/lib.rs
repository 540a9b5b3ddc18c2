// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Erdős–Guy–Selfridge factorizations.
//!
//! Let t(N) be the largest integer t such that N! can be written as a
//! product of N integers, all of them at least t. This crate proves
//! lower bounds t(N) >= t by explicitly constructing, for a given pair
//! (N, t) with N/4 < t < N/2, a multiset of at least N factors of N!
//! that are all >= t. The construction is a greedy allocation of the
//! prime factors of N!, large primes first, driven by precomputed
//! prime and smooth-factorization tables.
//!
//! Bibliography:
//!
//! R. K. Guy, J. L. Selfridge, Factoring factorial n,
//! Amer. Math. Monthly 105 (1998), 766-767
//!
//! T. Tao, Decomposing a factorial into large factors
//! <https://arxiv.org/abs/2503.20170>

use std::fmt;
use std::str::FromStr;

pub mod arith;
pub mod fac;
pub mod greedy;
pub mod hint;
pub mod params;
pub mod primecount;
pub mod search;
pub mod sieve;
pub mod tables;

pub use crate::fac::FacLog;
pub use crate::greedy::{tfac, tfac_verified};
pub use crate::search::tbound;
pub use crate::tables::Tables;

/// How noisy progress reporting should be on stderr.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Info,
    Verbose,
    Debug,
}

impl FromStr for Verbosity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Verbosity, Error> {
        match s {
            "silent" => Ok(Verbosity::Silent),
            "info" => Ok(Verbosity::Info),
            "verbose" => Ok(Verbosity::Verbose),
            "debug" => Ok(Verbosity::Debug),
            _ => Err(Error::Domain(format!("unknown verbosity {s:?}"))),
        }
    }
}

/// User preferences shared by all engine invocations of a process.
#[derive(Clone, Debug)]
pub struct Preferences {
    pub verbosity: Verbosity,
    /// Use the fast variant of the greedy algorithm.
    pub fast: bool,
    /// Record a factorization certificate and verify it after each run.
    pub verify: bool,
    /// Exponent of the enumeration/counting cutoff, in [0.2, 0.3].
    /// It only affects speed, never the reported count.
    pub cutoff: f64,
    pub threads: Option<usize>,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            verbosity: Verbosity::Info,
            fast: false,
            verify: false,
            cutoff: params::CUTOFF_DEFAULT,
            threads: None,
        }
    }
}

impl Preferences {
    pub fn verbose(&self, v: Verbosity) -> bool {
        self.verbosity >= v
    }
}

/// Errors reported to the caller before or instead of running the engine.
/// Breaches of internal invariants are not errors but panics.
#[derive(Debug)]
pub enum Error {
    /// Inputs outside the supported envelope (N, t or a/b out of range).
    Domain(String),
    /// A run would need larger tables than this build supports.
    Resource(String),
    /// A hint file with a gap, a regression or an unprovable record.
    Hint(String),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Domain(s) => write!(f, "{s}"),
            Error::Resource(s) => write!(f, "{s}"),
            Error::Hint(s) => write!(f, "{s}"),
            Error::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

#[test]
fn test_verbosity() {
    assert!(Verbosity::Silent < Verbosity::Info);
    assert_eq!(Verbosity::from_str("debug").unwrap(), Verbosity::Debug);
    assert!(Verbosity::from_str("loud").is_err());
    let prefs = Preferences::default();
    assert!(prefs.verbose(Verbosity::Info));
    assert!(!prefs.verbose(Verbosity::Verbose));
}
