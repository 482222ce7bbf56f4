//! Vectorized single-byte search.
//!
//! The incremental decoder uses this to find the control-sequence
//! introducer, but the primitive is generic over the needle. Each kernel
//! compares one full vector of input per step and reduces the equality
//! mask to the first set lane; whatever is left after the last full
//! vector is scanned element by element.

// Intrinsics are unsafe fns; the kernels below are themselves unsafe with
// documented contracts, so per-call unsafe blocks would only add noise.
#![allow(unsafe_op_in_unsafe_fn)]

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::dispatch::kernels;

/// Return the index of the first occurrence of `needle` in `haystack`,
/// or `None` if the byte is absent.
///
/// Runs the vector width selected at first dispatch; every width returns
/// the same result.
#[inline]
pub fn index_of(haystack: &[u8], needle: u8) -> Option<usize> {
    // SAFETY: the kernel table only ever holds implementations the
    // running CPU was verified to support.
    unsafe { (kernels().index_of)(haystack, needle) }
}

/// Scalar kernel.
///
/// # Safety
/// None required; `unsafe fn` only to match the dispatch signature.
pub(crate) unsafe fn index_of_scalar(haystack: &[u8], needle: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

/// SSE2 kernel: 16 lanes per step.
///
/// # Safety
/// The CPU must support SSE2.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn index_of_sse2(haystack: &[u8], needle: u8) -> Option<usize> {
    let len = haystack.len();
    let ptr = haystack.as_ptr();
    let needle_vec = _mm_set1_epi8(needle as i8);

    let mut i = 0;
    while i + 16 <= len {
        let chunk = _mm_loadu_si128(ptr.add(i) as *const __m128i);
        let eq = _mm_cmpeq_epi8(chunk, needle_vec);
        let mask = _mm_movemask_epi8(eq) as u32;
        if mask != 0 {
            return Some(i + mask.trailing_zeros() as usize);
        }
        i += 16;
    }

    haystack[i..].iter().position(|&b| b == needle).map(|p| i + p)
}

/// AVX2 kernel: 32 lanes per step.
///
/// # Safety
/// The CPU must support AVX2.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn index_of_avx2(haystack: &[u8], needle: u8) -> Option<usize> {
    let len = haystack.len();
    let ptr = haystack.as_ptr();
    let needle_vec = _mm256_set1_epi8(needle as i8);

    let mut i = 0;
    while i + 32 <= len {
        let chunk = _mm256_loadu_si256(ptr.add(i) as *const __m256i);
        let eq = _mm256_cmpeq_epi8(chunk, needle_vec);
        let mask = _mm256_movemask_epi8(eq) as u32;
        if mask != 0 {
            return Some(i + mask.trailing_zeros() as usize);
        }
        i += 32;
    }

    haystack[i..].iter().position(|&b| b == needle).map(|p| i + p)
}
