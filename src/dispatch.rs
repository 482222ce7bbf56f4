//! Runtime CPU-feature dispatch.
//!
//! Every hot-path algorithm in this crate exists in one variant per
//! supported vector width. The first call into the crate probes the CPU
//! once, resolves a table of function pointers for the best available
//! width, and caches it for the lifetime of the process. Subsequent calls
//! go through a direct function pointer with no per-call feature checks.
//!
//! A scalar variant of every kernel always exists and is always correct,
//! so unsupported architectures degrade gracefully rather than failing.
//! All variants of a kernel produce bit-identical results; the selected
//! width affects throughput only.

use std::fmt;
use std::sync::OnceLock;

use crate::decode;
use crate::scan;
use crate::width;

/// Vector capability level selected at first use.
///
/// Ordered weakest to strongest. `Scalar` is available everywhere; the
/// x86_64 levels are gated on runtime feature detection (SSE2 is part of
/// the x86_64 baseline and needs no probe).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimdLevel {
    /// Portable scalar fallback, one element per step.
    Scalar,
    /// 128-bit vectors, 16 byte lanes.
    #[cfg(target_arch = "x86_64")]
    Sse2,
    /// 256-bit vectors, 32 byte lanes.
    #[cfg(target_arch = "x86_64")]
    Avx2,
}

impl SimdLevel {
    /// Detect the strongest level supported by the current CPU.
    fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") {
                return Self::Avx2;
            }
            // SSE2 is guaranteed on x86_64.
            return Self::Sse2;
        }

        #[allow(unreachable_code)]
        Self::Scalar
    }

    /// All levels the current CPU can execute, weakest first.
    ///
    /// Used by tests to force each width and assert identical results.
    pub fn supported() -> Vec<Self> {
        let mut levels = vec![Self::Scalar];
        #[cfg(target_arch = "x86_64")]
        {
            levels.push(Self::Sse2);
            if is_x86_feature_detected!("avx2") {
                levels.push(Self::Avx2);
            }
        }
        levels
    }
}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("scalar"),
            #[cfg(target_arch = "x86_64")]
            Self::Sse2 => f.write_str("sse2"),
            #[cfg(target_arch = "x86_64")]
            Self::Avx2 => f.write_str("avx2"),
        }
    }
}

/// First occurrence of a byte in a haystack.
///
/// # Safety
/// The CPU must support the features the implementation was compiled for.
pub(crate) type IndexOfFn = unsafe fn(&[u8], u8) -> Option<usize>;

/// Transcode of valid UTF-8 into code points; returns the count written.
///
/// # Safety
/// The input must be valid UTF-8, the output must have room for every
/// code point in the input (one slot per byte always suffices), and the
/// CPU must support the features the implementation was compiled for.
pub(crate) type TranscodeFn = unsafe fn(&[u8], &mut [u32]) -> usize;

/// Membership probe against parallel `[low, high]` range tables.
///
/// # Safety
/// Both tables must have equal length, a multiple of the widest lane
/// count, and the CPU must support the features the implementation was
/// compiled for.
pub(crate) type RangeProbeFn = unsafe fn(u32, &[u32], &[u32]) -> bool;

/// Resolved kernel table: one implementation per algorithm.
#[derive(Clone, Copy)]
pub(crate) struct Kernels {
    pub(crate) level: SimdLevel,
    pub(crate) index_of: IndexOfFn,
    pub(crate) transcode: TranscodeFn,
    pub(crate) in_ranges: RangeProbeFn,
}

impl Kernels {
    /// Resolve the kernel table for a specific level.
    ///
    /// Callers must only pass levels reported by [`SimdLevel::supported`];
    /// the dispatch cache always does, and tests iterate that list.
    pub(crate) fn for_level(level: SimdLevel) -> Self {
        match level {
            SimdLevel::Scalar => Self {
                level,
                index_of: scan::index_of_scalar,
                transcode: decode::transcode_scalar,
                in_ranges: width::in_ranges_scalar,
            },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Sse2 => Self {
                level,
                index_of: scan::index_of_sse2,
                transcode: decode::transcode_sse2,
                in_ranges: width::in_ranges_sse2,
            },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx2 => Self {
                level,
                index_of: scan::index_of_avx2,
                transcode: decode::transcode_avx2,
                in_ranges: width::in_ranges_avx2,
            },
        }
    }
}

static KERNELS: OnceLock<Kernels> = OnceLock::new();

/// The process-wide kernel table, resolved on first use.
///
/// Safe under concurrent first use: racing callers block on the
/// `OnceLock` and all observe the same table.
pub(crate) fn kernels() -> &'static Kernels {
    KERNELS.get_or_init(|| {
        let level = SimdLevel::detect();
        log::debug!("simd dispatch selected: {level}");
        Kernels::for_level(level)
    })
}

/// The vector capability level this process dispatches to.
pub fn simd_level() -> SimdLevel {
    kernels().level
}
