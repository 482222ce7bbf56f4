//! Terminal column width classification.
//!
//! Classifies a code point as occupying 0, 1, or 2 grid columns via an
//! ordered cascade of range tables, first match wins:
//!
//! 1. Latin-1 (`< 0xFF`) is width 1 outright; callers have already
//!    routed control characters elsewhere.
//! 2. Unconditional width-2 ranges.
//! 3. Unconditional width-0 ranges (combining and format code points).
//! 4. EastAsianWidth Wide/Fullwidth ranges, behind a cheap bounds filter.
//! 5. A total fallback table for the long tail.
//!
//! Every tier is probed a full vector of bounds at a time: the query is
//! broadcast, a chunk of lower and upper bounds is loaded, and any lane
//! passing `lo <= cp && cp <= hi` short-circuits to the tier's result.
//! The cascade itself is shared across lane widths (only the range
//! probe is dispatched), so the classification is bit-identical to a
//! sequential scan of the same tables in order.

#![allow(unsafe_op_in_unsafe_fn)]

mod tables;

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use unicode_width::UnicodeWidthChar;

use crate::dispatch::kernels;
use tables::{EAW_HI, EAW_LO, EAW_MAX, WIDE_HI, WIDE_LO, ZERO_HI, ZERO_LO};

/// Number of terminal columns `cp` occupies: 0, 1, or 2.
///
/// Callers guarantee `cp` is not a control character; anything below
/// 0xFF classifies as width 1 without a table probe.
pub fn codepoint_width(cp: u32) -> usize {
    if cp < 0xFF {
        return 1;
    }

    let probe = kernels().in_ranges;
    // SAFETY: the tables are parallel, equal-length, padded to a full
    // vector multiple, and the kernel table only holds variants the
    // running CPU supports.
    unsafe {
        if probe(cp, &WIDE_LO, &WIDE_HI) {
            return 2;
        }
        if probe(cp, &ZERO_LO, &ZERO_HI) {
            return 0;
        }
        if cp >= EAW_LO[0] && cp <= EAW_MAX && probe(cp, &EAW_LO, &EAW_HI) {
            return 2;
        }
    }

    fallback_width(cp)
}

/// Total fallback for code points no fast tier claims.
///
/// Delegates to the full Unicode width property table, clamped to the
/// 0..=2 contract (the property table reports 3 for U+2E3B). Control
/// characters (which the contract excludes) and non-scalar values both
/// map to 1 so the classification stays total.
fn fallback_width(cp: u32) -> usize {
    match char::from_u32(cp) {
        Some(ch) => ch.width().map_or(1, |w| w.min(2)),
        None => 1,
    }
}

/// Scalar range probe.
///
/// # Safety
/// None required; `unsafe fn` only to match the dispatch signature.
pub(crate) unsafe fn in_ranges_scalar(cp: u32, lo: &[u32], hi: &[u32]) -> bool {
    lo.iter().zip(hi).any(|(&l, &h)| l <= cp && cp <= h)
}

/// SSE2 range probe: 4 ranges per step.
///
/// # Safety
/// `lo` and `hi` must have equal length, a multiple of 4, and the CPU
/// must support SSE2.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn in_ranges_sse2(cp: u32, lo: &[u32], hi: &[u32]) -> bool {
    // Bounds stay below 2^31, so signed compares are exact.
    let cp_vec = _mm_set1_epi32(cp as i32);
    let mut i = 0;
    while i + 4 <= lo.len() {
        let lo_vec = _mm_loadu_si128(lo.as_ptr().add(i) as *const __m128i);
        let hi_vec = _mm_loadu_si128(hi.as_ptr().add(i) as *const __m128i);
        // A lane is in range iff neither `lo > cp` nor `cp > hi`.
        let below = _mm_cmpgt_epi32(lo_vec, cp_vec);
        let above = _mm_cmpgt_epi32(cp_vec, hi_vec);
        let outside = _mm_or_si128(below, above);
        if _mm_movemask_epi8(outside) != 0xFFFF {
            return true;
        }
        i += 4;
    }
    false
}

/// AVX2 range probe: 8 ranges per step.
///
/// # Safety
/// `lo` and `hi` must have equal length, a multiple of 8, and the CPU
/// must support AVX2.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn in_ranges_avx2(cp: u32, lo: &[u32], hi: &[u32]) -> bool {
    let cp_vec = _mm256_set1_epi32(cp as i32);
    let mut i = 0;
    while i + 8 <= lo.len() {
        let lo_vec = _mm256_loadu_si256(lo.as_ptr().add(i) as *const __m256i);
        let hi_vec = _mm256_loadu_si256(hi.as_ptr().add(i) as *const __m256i);
        let below = _mm256_cmpgt_epi32(lo_vec, cp_vec);
        let above = _mm256_cmpgt_epi32(cp_vec, hi_vec);
        let outside = _mm256_or_si256(below, above);
        if _mm256_movemask_epi8(outside) != -1 {
            return true;
        }
        i += 8;
    }
    false
}
