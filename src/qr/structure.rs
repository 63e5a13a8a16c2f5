// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/qrveil

//! QR structural analysis: function-pattern classification and enumeration
//! of the modules the embedding layer may toggle.
//!
//! A module is *function* when its value is fixed by ISO/IEC 18004: finder
//! patterns with their separators, the two timing lines, alignment patterns,
//! and the format/version information strips. Everything else carries data
//! or error-correction codewords (plus up to 7 remainder bits) and can be
//! toggled within the slack of error-correction level H.
//!
//! The three 9×9 / 8×9 corner windows used here absorb the finder (7×7),
//! its 1-module separator ring, and the adjacent format strip in one test.
//! A consequence worth knowing: the flippable count per version equals the
//! symbol's codeword bit count plus remainder bits (208 for version 1, 359
//! for version 2, 807 for version 4).
//!
//! Both the encoder and the decoder enumerate positions with the same
//! row-major sweep; the resulting list order is the canonical index space
//! the distribution sequence maps into, so the two sides must never diverge.
//! Lists are computed once per version and cached.

use std::sync::OnceLock;

use super::matrix::{Matrix, ModuleClass};

/// Alignment pattern center coordinates per version (ISO/IEC 18004 Annex E).
/// Row `version - 1`; version 1 has no alignment patterns.
const ALIGNMENT_CENTERS: [&[usize]; 40] = [
    &[],
    &[6, 18],
    &[6, 22],
    &[6, 26],
    &[6, 30],
    &[6, 34],
    &[6, 22, 38],
    &[6, 24, 42],
    &[6, 26, 46],
    &[6, 28, 50],
    &[6, 30, 54],
    &[6, 32, 58],
    &[6, 34, 62],
    &[6, 26, 46, 66],
    &[6, 26, 48, 70],
    &[6, 26, 50, 74],
    &[6, 30, 54, 78],
    &[6, 30, 56, 82],
    &[6, 30, 58, 86],
    &[6, 34, 62, 90],
    &[6, 28, 50, 72, 94],
    &[6, 26, 50, 74, 98],
    &[6, 30, 54, 78, 102],
    &[6, 28, 54, 80, 106],
    &[6, 32, 58, 84, 110],
    &[6, 30, 58, 86, 114],
    &[6, 34, 62, 90, 118],
    &[6, 26, 50, 74, 98, 122],
    &[6, 30, 54, 78, 102, 126],
    &[6, 26, 52, 78, 104, 130],
    &[6, 30, 56, 82, 108, 134],
    &[6, 34, 60, 86, 112, 138],
    &[6, 30, 58, 86, 114, 142],
    &[6, 34, 62, 90, 118, 146],
    &[6, 30, 54, 78, 102, 126, 150],
    &[6, 24, 50, 76, 102, 128, 154],
    &[6, 28, 54, 80, 106, 132, 158],
    &[6, 32, 58, 84, 110, 136, 162],
    &[6, 26, 54, 82, 110, 138, 166],
    &[6, 30, 58, 86, 114, 142, 170],
];

/// True when the module at `(x, y)` lies inside an alignment pattern.
///
/// Alignment patterns are 5×5 (Chebyshev distance ≤ 2 from a center).
/// Centers whose pattern would overlap one of the three finder corners are
/// not drawn and are skipped here.
fn in_alignment(x: usize, y: usize, size: usize, version: u8) -> bool {
    let centers = ALIGNMENT_CENTERS[version as usize - 1];
    for &cy in centers {
        for &cx in centers {
            if (cx <= 8 && cy <= 8) || (cx >= size - 9 && cy <= 8) || (cx <= 8 && cy >= size - 9) {
                continue;
            }
            if x.abs_diff(cx) <= 2 && y.abs_diff(cy) <= 2 {
                return true;
            }
        }
    }
    false
}

/// True when the module at `(x, y)` is fixed by ISO/IEC 18004 and must
/// never be toggled.
///
/// This predicate is the ground truth for flip eligibility; the encoder
/// re-checks it immediately before every toggle.
pub fn is_function(x: usize, y: usize, size: usize, version: u8) -> bool {
    // Finder corners. The 8-wide window absorbs the separator ring; the
    // 9th row/column of each window absorbs the format strip and the dark
    // module at (8, size-8).
    if (x < 9 && y < 9) || (x >= size - 8 && y < 9) || (x < 9 && y >= size - 8) {
        return true;
    }

    // Timing lines.
    if x == 6 || y == 6 {
        return true;
    }

    // Alignment patterns (version 2 and up).
    if version >= 2 && in_alignment(x, y, size, version) {
        return true;
    }

    // Format information outside the corner windows.
    if (y == 8 && (x <= 8 || x >= size - 8)) || (x == 8 && (y <= 8 || y >= size - 7)) {
        return true;
    }

    // Version information blocks (version 7 and up): 3×6 next to the
    // top-right finder, 6×3 next to the bottom-left finder.
    if version >= 7
        && ((x <= 5 && y >= size - 11 && y <= size - 9)
            || (y <= 5 && x >= size - 11 && x <= size - 9))
    {
        return true;
    }

    false
}

/// Structural role of the module at `(x, y)`.
///
/// Refines [`is_function`] for reporting: the two predicates agree exactly
/// on the function/data boundary. The dark module and other window slack
/// classify as [`ModuleClass::Separator`].
pub fn classify(x: usize, y: usize, size: usize, version: u8) -> ModuleClass {
    if (x < 7 && y < 7) || (x >= size - 7 && y < 7) || (x < 7 && y >= size - 7) {
        return ModuleClass::Finder;
    }
    if (y == 8 && (x <= 8 || x >= size - 8)) || (x == 8 && (y <= 8 || y >= size - 7)) {
        return ModuleClass::FormatInfo;
    }
    if (x < 9 && y < 9) || (x >= size - 8 && y < 9) || (x < 9 && y >= size - 8) {
        return ModuleClass::Separator;
    }
    if x == 6 || y == 6 {
        return ModuleClass::Timing;
    }
    if version >= 7
        && ((x <= 5 && y >= size - 11 && y <= size - 9)
            || (y <= 5 && x >= size - 11 && x <= size - 9))
    {
        return ModuleClass::VersionInfo;
    }
    if version >= 2 && in_alignment(x, y, size, version) {
        return ModuleClass::Alignment;
    }
    ModuleClass::DataCodeword
}

fn collect_flippable(version: u8) -> Vec<(usize, usize)> {
    let size = 17 + 4 * version as usize;
    let mut positions = Vec::new();
    for y in 0..size {
        for x in 0..size {
            if !is_function(x, y, size, version) {
                positions.push((x, y));
            }
        }
    }
    positions
}

/// All flippable module coordinates for a version, in canonical order:
/// row-major sweep, `y` outer, `x` inner, both ascending.
///
/// The list is a pure function of the version; it is computed once and
/// cached for the lifetime of the process (shared across threads).
pub fn enumerate_flippable(version: u8) -> &'static [(usize, usize)] {
    assert!((1..=40).contains(&version), "QR version out of range: {version}");
    const INIT: OnceLock<Vec<(usize, usize)>> = OnceLock::new();
    static CACHE: [OnceLock<Vec<(usize, usize)>>; 40] = [INIT; 40];
    CACHE[version as usize - 1].get_or_init(|| collect_flippable(version))
}

/// Convenience wrapper: flippable positions of a concrete matrix.
pub fn flippable_positions(matrix: &Matrix) -> &'static [(usize, usize)] {
    enumerate_flippable(matrix.version())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_function_position_is_enumerated() {
        for version in 1..=40u8 {
            let size = 17 + 4 * version as usize;
            for &(x, y) in enumerate_flippable(version) {
                assert!(
                    !is_function(x, y, size, version),
                    "function module ({x},{y}) enumerated for version {version}"
                );
            }
        }
    }

    #[test]
    fn enumeration_is_canonical_row_major() {
        for version in [1u8, 7, 23, 40] {
            let size = 17 + 4 * version as usize;
            let positions = enumerate_flippable(version);
            assert!(!positions.is_empty());
            for pair in positions.windows(2) {
                let (x0, y0) = pair[0];
                let (x1, y1) = pair[1];
                assert!(y0 < y1 || (y0 == y1 && x0 < x1), "not row-major at {pair:?}");
            }
            for &(x, y) in positions {
                assert!(x < size && y < size);
            }
        }
    }

    #[test]
    fn flippable_counts_match_codeword_bits() {
        // data + EC codeword bits plus remainder bits:
        // v1: 26 codewords, 0 remainder; v2: 44 + 7; v3: 70 + 7;
        // v4: 100 + 7; v7: 196 + 0.
        assert_eq!(enumerate_flippable(1).len(), 208);
        assert_eq!(enumerate_flippable(2).len(), 359);
        assert_eq!(enumerate_flippable(3).len(), 567);
        assert_eq!(enumerate_flippable(4).len(), 807);
        assert_eq!(enumerate_flippable(7).len(), 1568);
    }

    #[test]
    fn finder_and_separator_are_function() {
        // Version 1, size 21.
        for &(x, y) in &[(0, 0), (6, 6), (8, 8), (20, 0), (13, 8), (0, 20), (8, 13)] {
            assert!(is_function(x, y, 21, 1), "({x},{y}) should be function");
        }
        // Dark module sits at (8, size-8).
        assert!(is_function(8, 13, 21, 1));
    }

    #[test]
    fn timing_lines_are_function() {
        for i in 0..21 {
            assert!(is_function(6, i, 21, 1));
            assert!(is_function(i, 6, 21, 1));
        }
    }

    #[test]
    fn alignment_pattern_only_from_version_2() {
        // Version 2 keeps the single center at (18, 18); its 5×5 spans 16..=20.
        assert!(is_function(18, 18, 25, 2));
        assert!(is_function(16, 16, 25, 2));
        assert!(is_function(20, 20, 25, 2));
        assert!(!is_function(15, 16, 25, 2));
        // The same interior coordinate is data in version 1 geometry.
        assert!(!is_function(18, 18, 21, 1));
    }

    #[test]
    fn suppressed_alignment_centers_near_finders() {
        // Version 2 centers (6, 18), (18, 6) overlap finder windows and are
        // not drawn; (4, 16) would be inside the (6, 18) pattern.
        assert_eq!(classify(4, 16, 25, 2), ModuleClass::DataCodeword);
        assert_eq!(classify(16, 4, 25, 2), ModuleClass::DataCodeword);
    }

    #[test]
    fn version_info_blocks_from_version_7() {
        // Version 7, size 45: blocks at x ≤ 5, y ∈ 34..=36 and transposed.
        assert!(is_function(0, 34, 45, 7));
        assert!(is_function(5, 36, 45, 7));
        assert!(is_function(34, 0, 45, 7));
        assert!(is_function(36, 5, 45, 7));
        // Version 6 (size 41) has no version info: the corresponding
        // corner-adjacent cells are data.
        assert!(!is_function(0, 30, 41, 6));
        assert!(!is_function(30, 0, 41, 6));
    }

    #[test]
    fn classify_agrees_with_is_function() {
        for version in [1u8, 2, 7, 14, 40] {
            let size = 17 + 4 * version as usize;
            for y in 0..size {
                for x in 0..size {
                    let class = classify(x, y, size, version);
                    assert_eq!(
                        class == ModuleClass::DataCodeword,
                        !is_function(x, y, size, version),
                        "disagreement at ({x},{y}) version {version}: {class:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn cache_returns_stable_slice() {
        let a = enumerate_flippable(5);
        let b = enumerate_flippable(5);
        assert_eq!(a.as_ptr(), b.as_ptr());
    }
}
