//! Incremental decoding with control-sequence boundaries.
//!
//! PTY reads arrive in arbitrary fixed-size chunks that slice through
//! both escape sequences and multi-byte characters. This module decodes
//! the longest prefix that is safe to decode: everything up to the first
//! control-sequence introducer, or, when no introducer is present, up
//! to the last complete code-point boundary. The caller owns the rest:
//! escape bytes go to the escape-sequence parser, and an incomplete
//! trailing sequence is resubmitted prefixed to the next read.

use crate::decode::decode_utf8;
use crate::scan::index_of;

/// The control-sequence introducer. Everything from this byte onward is
/// the escape-sequence parser's problem, not ours.
pub const ESC: u8 = 0x1B;

/// Result of one incremental decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Bytes consumed from the front of the input.
    pub consumed: usize,
    /// Code points written to the output buffer.
    pub decoded: usize,
}

/// Decode `input` into `output` up to the first ESC byte, or up to the
/// last complete code-point boundary if no ESC is present.
///
/// With an introducer at index `k` (and none earlier), exactly `k` bytes
/// are consumed; the sequence itself is never inspected. `consumed == 0`
/// with a leading ESC byte means the introducer is at the front; the
/// caller should check `input[0]` to tell that apart from an incomplete
/// tail, which also consumes nothing until more bytes arrive.
///
/// Unconsumed trailing bytes must be resubmitted prefixed to the next
/// chunk; a caller that reaches end-of-stream flushes them through
/// [`decode_utf8`] instead. Stray bytes that can never complete a
/// sequence are not held back; they are consumed and replaced with
/// U+FFFD.
///
/// # Panics
/// If `output` is shorter than `input` (see [`decode_utf8`]).
pub fn decode_until_control(input: &[u8], output: &mut [u32]) -> Step {
    assert!(
        output.len() >= input.len(),
        "output must hold one code point per input byte"
    );

    let consumed = match index_of(input, ESC) {
        Some(k) => k,
        // No introducer: consume everything except a trailing sequence
        // that the next read may complete.
        None => trim_partial(input),
    };

    Step {
        consumed,
        decoded: decode_utf8(&input[..consumed], output),
    }
}

/// Length of `input` with any trailing incomplete UTF-8 sequence
/// trimmed.
///
/// Only the final three bytes can open a sequence that runs past the end
/// of the buffer: a trailing lead byte (>= 0xC0), a 3- or 4-byte lead
/// one position earlier (>= 0xE0), or a 4-byte lead two positions
/// earlier (>= 0xF0). Anything else, including garbage that will be
/// replaced during decode, is complete as far as chunking is concerned.
fn trim_partial(input: &[u8]) -> usize {
    let len = input.len();
    if len >= 1 && input[len - 1] >= 0xC0 {
        return len - 1;
    }
    if len >= 2 && input[len - 2] >= 0xE0 {
        return len - 2;
    }
    if len >= 3 && input[len - 3] >= 0xF0 {
        return len - 3;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(input: &[u8]) -> (Step, Vec<u32>) {
        let mut out = vec![0u32; input.len().max(1)];
        let step = decode_until_control(input, &mut out);
        out.truncate(step.decoded);
        (step, out)
    }

    #[test]
    fn empty_input() {
        let (s, cps) = step(b"");
        assert_eq!(s, Step { consumed: 0, decoded: 0 });
        assert!(cps.is_empty());
    }

    #[test]
    fn consumes_up_to_introducer() {
        let (s, cps) = step(b"abc\x1b[31m");
        assert_eq!(s.consumed, 3);
        assert_eq!(cps, vec![0x61, 0x62, 0x63]);
    }

    #[test]
    fn introducer_at_front_consumes_nothing() {
        let (s, cps) = step(b"\x1b[2J");
        assert_eq!(s, Step { consumed: 0, decoded: 0 });
        assert!(cps.is_empty());
    }

    #[test]
    fn only_first_introducer_matters() {
        let (s, _) = step(b"ab\x1bcd\x1bef");
        assert_eq!(s.consumed, 2);
    }

    #[test]
    fn no_introducer_consumes_everything() {
        let (s, cps) = step(b"plain text");
        assert_eq!(s.consumed, 10);
        assert_eq!(cps.len(), 10);
    }

    #[test]
    fn multibyte_before_introducer() {
        let input = "好\u{1b}[0m".as_bytes();
        let (s, cps) = step(input);
        assert_eq!(s.consumed, 3);
        assert_eq!(cps, vec![0x597D]);
    }

    #[test]
    fn trailing_two_byte_lead_held_back() {
        // "é" split after its lead byte.
        let (s, cps) = step(b"ab\xC3");
        assert_eq!(s.consumed, 2);
        assert_eq!(cps, vec![0x61, 0x62]);
    }

    #[test]
    fn trailing_three_byte_sequence_held_back() {
        // First two bytes of U+597D.
        let (s, _) = step(b"ab\xE5\xA5");
        assert_eq!(s.consumed, 2);
    }

    #[test]
    fn trailing_four_byte_sequence_held_back() {
        // First three bytes of U+1F600.
        let (s, _) = step(b"ab\xF0\x9F\x98");
        assert_eq!(s.consumed, 2);
    }

    #[test]
    fn lone_lead_byte_consumes_nothing() {
        let (s, _) = step(b"\xF0");
        assert_eq!(s, Step { consumed: 0, decoded: 0 });
    }

    #[test]
    fn complete_multibyte_tail_not_trimmed() {
        let input = "ab好".as_bytes();
        let (s, cps) = step(input);
        assert_eq!(s.consumed, 5);
        assert_eq!(cps, vec![0x61, 0x62, 0x597D]);
    }

    #[test]
    fn stray_continuations_are_consumed() {
        // Continuation bytes with no lead can never complete: decode them
        // (as replacements) instead of holding them back forever.
        let (s, cps) = step(b"\x80\x80");
        assert_eq!(s.consumed, 2);
        assert_eq!(cps, vec![0xFFFD, 0xFFFD]);
    }

    #[test]
    fn introducer_wins_over_partial_tail() {
        // ESC before an incomplete tail: the tail is past the boundary,
        // so it does not matter yet.
        let (s, cps) = step(b"ok\x1b\xC3");
        assert_eq!(s.consumed, 2);
        assert_eq!(cps, vec![0x6F, 0x6B]);
    }

    #[test]
    fn resubmitted_tail_decodes_cleanly() {
        let text = "naïve 日本語".as_bytes();
        let mut all = Vec::new();
        let mut pending: Vec<u8> = Vec::new();
        for chunk in text.chunks(4) {
            pending.extend_from_slice(chunk);
            let mut out = vec![0u32; pending.len()];
            let s = decode_until_control(&pending, &mut out);
            all.extend_from_slice(&out[..s.decoded]);
            pending.drain(..s.consumed);
        }
        assert!(pending.is_empty());
        let expected: Vec<u32> = "naïve 日本語".chars().map(|c| c as u32).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn trim_partial_complete_input() {
        assert_eq!(trim_partial("abcé".as_bytes()), 5);
        assert_eq!(trim_partial("好".as_bytes()), 3);
        assert_eq!(trim_partial("😀".as_bytes()), 4);
    }

    #[test]
    fn trim_partial_short_buffers() {
        assert_eq!(trim_partial(b""), 0);
        assert_eq!(trim_partial(b"a"), 1);
        assert_eq!(trim_partial(b"\xC3"), 0);
        assert_eq!(trim_partial(b"\xE5\xA5"), 0);
        assert_eq!(trim_partial(b"\xF0\x9F\x98"), 0);
    }
}
