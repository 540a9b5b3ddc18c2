// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Hard limits of this build and tuning knobs shared by the tables
//! and the greedy engine.

/// Largest supported N (exclusive).
pub const MAXN: i64 = (1 << 48) - 1;

/// Largest prime the tables can index. pi(MAXP) fits in 24 bits,
/// which is what the packed prime-power records require.
pub const MAXP: i64 = 310_248_233;

/// Largest admissible prime index (24 bits, index 0 is the sentinel).
pub const MAXPI: i64 = (1 << 24) - 1;

/// Largest cofactor the smooth-factorization index can cover.
pub const MAXM: i64 = 0x7FFF_FFFF;

/// Range of the exponent governing the crossover between enumerating
/// primes (a sieve) and counting them (pi lookups) in the large-prime
/// phase. The asymptotically correct choice would be t^(1/6), but
/// sieving is fast in practice so the default is a bit above that.
pub const CUTOFF_MIN: f64 = 0.2;
pub const CUTOFF_MAX: f64 = 0.3;
pub const CUTOFF_DEFAULT: f64 = 0.225;
