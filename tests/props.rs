//! Property tests for the decode and scan universals.

use proptest::prelude::*;

use vtdecode::{decode_until_control, decode_utf8, index_of};

proptest! {
    /// Arbitrary byte soup decodes without panicking, never produces
    /// more code points than input bytes, and never produces a
    /// non-scalar value.
    #[test]
    fn decode_absorbs_arbitrary_bytes(input in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut out = vec![0u32; input.len().max(1)];
        let n = decode_utf8(&input, &mut out);
        prop_assert!(n <= input.len());
        for &cp in &out[..n] {
            prop_assert!(char::from_u32(cp).is_some(), "non-scalar U+{cp:04X}");
        }
    }

    /// Encoding any text to UTF-8 and decoding it returns the original
    /// scalar sequence.
    #[test]
    fn round_trip(text in "\\PC{0,64}") {
        let mut out = vec![0u32; text.len().max(1)];
        let n = decode_utf8(text.as_bytes(), &mut out);
        let expected: Vec<u32> = text.chars().map(|c| c as u32).collect();
        prop_assert_eq!(&out[..n], expected.as_slice());
    }

    /// Splitting a valid stream at any byte offset, decoding the first
    /// part incrementally, and resubmitting the held-back tail with the
    /// second part matches a single whole-stream decode.
    #[test]
    fn split_and_resubmit_matches_one_shot(
        text in "[^\u{1b}]{0,64}",
        split in any::<prop::sample::Index>(),
    ) {
        let bytes = text.as_bytes();
        let split = split.index(bytes.len() + 1);

        let mut whole = vec![0u32; bytes.len().max(1)];
        let n = decode_utf8(bytes, &mut whole);

        let mut acc = Vec::new();
        let mut buf = vec![0u32; bytes.len().max(1)];
        let mut pending = bytes[..split].to_vec();
        let step = decode_until_control(&pending, &mut buf);
        acc.extend_from_slice(&buf[..step.decoded]);
        pending.drain(..step.consumed);
        pending.extend_from_slice(&bytes[split..]);
        let n2 = decode_utf8(&pending, &mut buf);
        acc.extend_from_slice(&buf[..n2]);

        prop_assert_eq!(acc, whole[..n].to_vec());
    }

    /// The boundary report is exact: with an introducer at byte `k` and
    /// none earlier, exactly `k` bytes are consumed.
    #[test]
    fn consumed_equals_first_introducer_index(
        prefix in "[^\u{1b}]{0,32}",
        suffix in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut stream = prefix.as_bytes().to_vec();
        let k = stream.len();
        stream.push(0x1B);
        stream.extend_from_slice(&suffix);

        let mut out = vec![0u32; stream.len()];
        let step = decode_until_control(&stream, &mut out);
        prop_assert_eq!(step.consumed, k);
    }

    /// The search primitive agrees with a naive scan on every input.
    #[test]
    fn index_of_matches_naive(
        haystack in proptest::collection::vec(any::<u8>(), 0..256),
        needle in any::<u8>(),
    ) {
        prop_assert_eq!(index_of(&haystack, needle), haystack.iter().position(|&b| b == needle));
    }
}
