//! Base64 decoding for OSC 52 clipboard payloads.
//!
//! Clipboard writes arrive base64-encoded inside an OSC 52 sequence.
//! The payload is untrusted like everything else on the wire, so a
//! malformed encoding yields `None` rather than an error. Output is
//! caller-allocated, sized with [`decoded_len_estimate`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Upper bound on the decoded size of a base64 payload of `encoded_len`
/// bytes. Allocate this much and pass it to [`decode`].
pub fn decoded_len_estimate(encoded_len: usize) -> usize {
    base64::decoded_len_estimate(encoded_len)
}

/// Decode a standard-alphabet base64 payload into `output`.
///
/// Returns the number of bytes written, or `None` if the payload is not
/// valid base64 or `output` is too small.
pub fn decode(input: &[u8], output: &mut [u8]) -> Option<usize> {
    STANDARD.decode_slice(input, output).ok()
}
