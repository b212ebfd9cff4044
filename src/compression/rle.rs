// src/compression/rle.rs
//! Greedy single-pass run-length encoding.
//!
//! A run of at least `min_run` identical bytes becomes a token
//! `[` count unit `]`, e.g. `aaaaa` → `[5a]`. Shorter runs are copied
//! literally. The bracket bytes themselves are always emitted as tokens,
//! so a literal `[` or `]` never appears in the output and decoding is
//! unambiguous.
//!
//! Token grammar for the decoder: after `[`, read the maximal digit run `D`.
//! * `D` followed by `]]`: count `D`, unit `]`.
//! * `D` followed by a single `]`: the unit is the last digit of `D`.
//! * `D` followed by any other byte `u` and `]`: count `D`, unit `u`.

use thiserror::Error;

use super::{CompressionInput, CompressionRunner};
use crate::error::BenchmarkError;

pub const METHOD: &str = "Run-Length Encoding";

const OPEN: u8 = b'[';
const CLOSE: u8 = b']';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RleError {
    #[error("Truncated run token at offset {0}")]
    Truncated(usize),
    #[error("Run token at offset {0} has no count")]
    MissingCount(usize),
    #[error("Run token at offset {0} is not terminated")]
    Unterminated(usize),
    #[error("Run count at offset {0} is out of range")]
    CountOverflow(usize),
    #[error("Unexpected `]` at offset {0}")]
    StrayClose(usize),
}

#[derive(Debug, Clone)]
pub struct RleRunner {
    min_run: usize,
    min_time_ms: u64,
}

impl RleRunner {
    pub fn new(min_run: usize, min_time_ms: u64) -> Self {
        Self { min_run, min_time_ms }
    }
}

fn is_control(unit: u8) -> bool {
    unit == OPEN || unit == CLOSE
}

/// Encodes `input`, tokenizing runs of at least `min_run` bytes.
pub fn encode(input: &[u8], min_run: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let unit = input[i];
        let run = input[i..].iter().take_while(|&&b| b == unit).count();
        if run >= min_run || is_control(unit) {
            out.push(OPEN);
            out.extend_from_slice(run.to_string().as_bytes());
            out.push(unit);
            out.push(CLOSE);
        } else {
            out.extend(std::iter::repeat(unit).take(run));
        }
        i += run;
    }
    out
}

/// Inverse of [`encode`].
pub fn decode(encoded: &[u8]) -> Result<Vec<u8>, RleError> {
    let mut out = Vec::with_capacity(encoded.len());
    let mut i = 0;
    while i < encoded.len() {
        match encoded[i] {
            OPEN => {
                let digits_start = i + 1;
                let digits_end = digits_start
                    + encoded[digits_start..].iter().take_while(|b| b.is_ascii_digit()).count();
                if digits_end == digits_start {
                    return Err(RleError::MissingCount(i));
                }

                let (count_end, unit, next) = match encoded.get(digits_end) {
                    None => return Err(RleError::Truncated(i)),
                    Some(&CLOSE) if encoded.get(digits_end + 1) == Some(&CLOSE) => {
                        (digits_end, CLOSE, digits_end + 2)
                    }
                    Some(&CLOSE) => {
                        if digits_end - digits_start < 2 {
                            return Err(RleError::MissingCount(i));
                        }
                        (digits_end - 1, encoded[digits_end - 1], digits_end + 1)
                    }
                    Some(&unit) => {
                        if encoded.get(digits_end + 1) != Some(&CLOSE) {
                            return Err(RleError::Unterminated(i));
                        }
                        (digits_end, unit, digits_end + 2)
                    }
                };

                let count: usize = std::str::from_utf8(&encoded[digits_start..count_end])
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(RleError::CountOverflow(i))?;
                out.extend(std::iter::repeat(unit).take(count));
                i = next;
            }
            CLOSE => return Err(RleError::StrayClose(i)),
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    Ok(out)
}

impl CompressionRunner for RleRunner {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn description(&self) -> &'static str {
        "Run-length encoding with bracketed run tokens"
    }

    fn technique(&self) -> &'static str {
        "Pattern-based compression"
    }

    fn min_time_ms(&self) -> u64 {
        self.min_time_ms
    }

    fn compressed_size(&self, input: &CompressionInput<'_>) -> Result<usize, BenchmarkError> {
        Ok(encode(input.bytes, self.min_run).len())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn round_trip(input: &[u8]) {
        let encoded = encode(input, 4);
        assert_eq!(decode(&encoded).unwrap(), input, "encoded as {:?}", String::from_utf8_lossy(&encoded));
    }

    #[test]
    fn test_empty_input() {
        assert!(encode(b"", 4).is_empty());
        assert_eq!(decode(b"").unwrap(), b"");
    }

    #[test]
    fn test_short_runs_are_literal() {
        assert_eq!(encode(b"aaabbc", 4), b"aaabbc");
    }

    #[test]
    fn test_long_runs_are_tokenized() {
        assert_eq!(encode(b"aaaab", 4), b"[4a]b");
        assert_eq!(encode(b"x0000000000000", 4), b"x[130]");
    }

    #[test]
    fn test_trailing_run_is_flushed() {
        assert_eq!(encode(b"abzzzzz", 4), b"ab[5z]");
        round_trip(b"abzzzzz");
    }

    #[test]
    fn test_brackets_are_always_tokenized() {
        assert_eq!(encode(b"[]", 4), b"[1[][1]]");
        round_trip(b"[{\"a\":[1111]}]");
    }

    #[test]
    fn test_digit_units() {
        round_trip(b"11111");
        round_trip(b"1111]");
        round_trip(b"22222222222222222222222222]]]]]");
        round_trip(b"5555[[[[9999");
    }

    #[test]
    fn test_all_identical_and_no_runs() {
        round_trip(&[b'q'; 1000]);
        round_trip(b"abcdefghijklmnopqrstuvwxyz0123456789");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode(b"[a]"), Err(RleError::MissingCount(0)));
        assert_eq!(decode(b"x[12"), Err(RleError::Truncated(1)));
        assert_eq!(decode(b"[3ab"), Err(RleError::Unterminated(0)));
        assert_eq!(decode(b"ab]"), Err(RleError::StrayClose(2)));
        assert_eq!(decode(b"[5]"), Err(RleError::MissingCount(0)));
    }

    proptest! {
        #[test]
        fn prop_round_trip_arbitrary_bytes(input in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(decode(&encode(&input, 4)).unwrap(), input);
        }

        #[test]
        fn prop_round_trip_run_heavy(input in proptest::collection::vec(prop_oneof![Just(b'['), Just(b']'), Just(b'1'), Just(b'a')], 0..256)) {
            prop_assert_eq!(decode(&encode(&input, 4)).unwrap(), input);
        }

        #[test]
        fn prop_round_trip_any_threshold(input in proptest::collection::vec(any::<u8>(), 0..128), min_run in 1usize..8) {
            prop_assert_eq!(decode(&encode(&input, min_run)).unwrap(), input);
        }
    }
}
