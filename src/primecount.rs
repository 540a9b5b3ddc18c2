// Copyright 2024 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Exact prime counting.
//!
//! pi(x) is computed by the Meissel-style recurrence popularised by
//! Lucy_Hedgehog: let S(v, p) be the count of integers in [2, v] that
//! are prime or have no prime factor <= p. Then S(v, p) =
//! S(v, p-1) - (S(v/p, p-1) - pi(p-1)) whenever p is prime and
//! p^2 <= v, and pi(x) = S(x, sqrt(x)). Only the O(sqrt(x)) distinct
//! values of x/k occur, so the whole computation takes O(x^(3/4))
//! time and O(sqrt(x)) space.
//!
//! This covers the entire supported range x < 2^48. Values below the
//! prime table bound are answered by table lookup instead, see
//! `Tables::pi`.

use crate::arith::isqrt;

pub fn prime_pi(x: i64) -> i64 {
    if x < 2 {
        return 0;
    }
    let n = x as u64;
    let r = isqrt(x) as u64;
    // small[v] and large[k] hold S(v, .) and S(n/k, .) minus 1,
    // starting from S(v, 1) = v - 1.
    let mut small: Vec<i64> = (0..=r).map(|v| v as i64 - 1).collect();
    let mut large: Vec<i64> = (0..=r)
        .map(|k| if k == 0 { 0 } else { (n / k) as i64 - 1 })
        .collect();
    for p in 2..=r {
        let pu = p as usize;
        if small[pu] == small[pu - 1] {
            continue;
        }
        // p is prime and small[p-1] = pi(p-1)
        let sp = small[pu - 1];
        let p2 = p * p;
        let kmax = r.min(n / p2);
        for k in 1..=kmax {
            let q = n / k / p;
            let sq = if q <= r {
                small[q as usize]
            } else {
                large[(n / q) as usize]
            };
            large[k as usize] -= sq - sp;
        }
        for v in (p2..=r).rev() {
            small[v as usize] -= small[(v / p) as usize] - sp;
        }
    }
    large[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert_eq!(prime_pi(0), 0);
        assert_eq!(prime_pi(1), 0);
        assert_eq!(prime_pi(2), 1);
        assert_eq!(prime_pi(3), 2);
        assert_eq!(prime_pi(4), 2);
        assert_eq!(prime_pi(10), 4);
        assert_eq!(prime_pi(100), 25);
        assert_eq!(prime_pi(1000), 168);
    }

    #[test]
    fn test_against_sieve() {
        let ps = crate::sieve::primes_up_to(10_000);
        for x in [10, 100, 541, 542, 7919, 7920, 9999] {
            let count = ps.iter().filter(|&&p| p as i64 <= x).count() as i64;
            assert_eq!(prime_pi(x), count, "pi({x})");
        }
    }

    #[test]
    fn test_large_values() {
        assert_eq!(prime_pi(1_000_000), 78498);
        assert_eq!(prime_pi(10_000_000), 664579);
        assert_eq!(prime_pi(1_000_000_000), 50847534);
    }
}
