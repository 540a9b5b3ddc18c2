// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Small integer helpers shared by the tables, the engine and the
//! search driver. Everything here works on signed 64-bit integers,
//! which cover the whole supported range N < 2^48.

use num_integer::{Integer, Roots};

/// Ceiling division a/b for positive operands.
#[inline]
pub fn cdiv(a: i64, b: i64) -> i64 {
    Integer::div_ceil(&a, &b)
}

/// Floor of the square root.
#[inline]
pub fn isqrt(n: i64) -> i64 {
    n.sqrt()
}

/// Smallest s with s(s-1) >= t.
///
/// For primes p >= s the minimal cofactor m = ceil(t/p) always yields
/// a factor m*p >= t with m <= p, so the large-prime phase of the
/// engine can start at s.
pub fn fac_s(t: i64) -> i64 {
    let mut s = isqrt(t);
    debug_assert!(s * (s - 1) < t);
    while s * (s - 1) < t {
        s += 1;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdiv() {
        assert_eq!(cdiv(10, 5), 2);
        assert_eq!(cdiv(11, 5), 3);
        assert_eq!(cdiv(1, 7), 1);
        assert_eq!(cdiv(0, 7), 0);
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt((1 << 46) - 1), (1 << 23) - 1);
    }

    #[test]
    fn test_fac_s() {
        // s(s-1) >= t and (s-1)(s-2) < t
        for t in [2, 3, 4, 100, 1000, 13669, 100_000, 1 << 40] {
            let s = fac_s(t);
            assert!(s * (s - 1) >= t);
            assert!((s - 1) * (s - 2) < t);
        }
        assert_eq!(fac_s(6), 3);
        assert_eq!(fac_s(7), 4);
        assert_eq!(fac_s(13669), 118);
    }
}
