// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! Bit-position distribution over the flippable module space.
//!
//! Logical bit `i` of the frame lands in flippable-position index
//! `(i·p) mod total`, where `p` is the largest prime below `total`. Since
//! `gcd(p, total) = 1`, stepping by `p` visits every index exactly once
//! before repeating, so any prefix of the sequence is collision-free. Both
//! sides derive the identical sequence from `total` alone — no table, no
//! shared secret — which is what makes blind re-extraction possible.
//!
//! The prime step scatters consecutive frame bits across the symbol instead
//! of clustering them in one corner, keeping the visual disturbance diffuse.
//!
//! Degenerate case: `total ≤ 2` falls back to `p = 2` and the sequence
//! collapses to `[0, 0, …]`. Real symbols never get close (version 1
//! already has 208 flippable modules); the capacity model refuses to encode
//! long before this matters.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::stego::error::StegoError;

/// Trial-division primality test.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true; // 2, 3
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// The largest prime strictly below `m`, or 2 when none exists in `[3, m)`.
pub fn largest_prime_below(m: usize) -> usize {
    let mut n = m.saturating_sub(1);
    while n >= 3 {
        if is_prime(n) {
            return n;
        }
        n -= 1;
    }
    2
}

/// Cached [`largest_prime_below`]. Every encode and decode of a given
/// version asks for the same `total`, so the answer is memoized per process.
pub(crate) fn step_prime(total: usize) -> usize {
    static CACHE: OnceLock<Mutex<HashMap<usize, usize>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = cache.lock().unwrap();
    if let Some(&p) = map.get(&total) {
        return p;
    }
    let p = largest_prime_below(total);
    map.insert(total, p);
    p
}

/// The first `need` indices of the prime-step sequence over `[0, total)`.
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if `need > total` — more bits than
/// module slots can never be placed collision-free.
pub fn distribution(need: usize, total: usize) -> Result<Vec<usize>, StegoError> {
    if need > total {
        return Err(StegoError::CapacityExceeded { need, total });
    }
    let p = step_prime(total);
    Ok((0..need).map(|i| (i * p) % total).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_primes() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(!is_prime(4));
        assert!(is_prime(97));
        assert!(!is_prime(100));
        assert!(is_prime(7919));
        assert!(!is_prime(7917));
    }

    #[test]
    fn largest_prime_below_known_values() {
        assert_eq!(largest_prime_below(100), 97);
        assert_eq!(largest_prime_below(20), 19);
        assert_eq!(largest_prime_below(3), 2);
        assert_eq!(largest_prime_below(4), 3);
        assert_eq!(largest_prime_below(808), 797);
    }

    #[test]
    fn entries_pairwise_distinct() {
        // Flippable counts of versions 1, 2, 4, 7 plus awkward totals.
        for &total in &[208usize, 359, 807, 1568, 100, 97, 51] {
            let seq = distribution(total, total).unwrap();
            let mut sorted = seq.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), total, "collisions for total {total}");
        }
    }

    #[test]
    fn entries_in_bounds() {
        for &(need, total) in &[(10usize, 208usize), (100, 359), (807, 807)] {
            for idx in distribution(need, total).unwrap() {
                assert!(idx < total);
            }
        }
    }

    #[test]
    fn prefix_is_stable() {
        // The first `need` entries never depend on how many are requested.
        let short = distribution(16, 807).unwrap();
        let long = distribution(120, 807).unwrap();
        assert_eq!(short[..], long[..16]);
    }

    #[test]
    fn need_beyond_total_rejected() {
        match distribution(500, 208) {
            Err(StegoError::CapacityExceeded { need, total }) => {
                assert_eq!(need, 500);
                assert_eq!(total, 208);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_total_collapses_to_zero() {
        assert_eq!(distribution(2, 2).unwrap(), vec![0, 0]);
        assert_eq!(distribution(1, 1).unwrap(), vec![0]);
        assert_eq!(distribution(0, 0).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn cached_prime_matches_direct() {
        for &total in &[208usize, 359, 807, 1568] {
            assert_eq!(step_prime(total), largest_prime_below(total));
        }
    }
}
