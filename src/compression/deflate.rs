// src/compression/deflate.rs

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::{CompressionInput, CompressionRunner};
use crate::error::BenchmarkError;

pub const METHOD: &str = "Deflate (zlib)";

/// Standard zlib stream at the default compression level.
#[derive(Debug, Clone)]
pub struct DeflateRunner {
    min_time_ms: u64,
}

impl DeflateRunner {
    pub fn new(min_time_ms: u64) -> Self {
        Self { min_time_ms }
    }
}

/// Zlib-compresses `bytes`.
pub fn deflate(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

impl CompressionRunner for DeflateRunner {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn description(&self) -> &'static str {
        "Standard zlib compression"
    }

    fn technique(&self) -> &'static str {
        "zlib deflate"
    }

    fn min_time_ms(&self) -> u64 {
        self.min_time_ms
    }

    fn compressed_size(&self, input: &CompressionInput<'_>) -> Result<usize, BenchmarkError> {
        deflate(input.bytes).map(|out| out.len()).map_err(|e| BenchmarkError::Compression {
            method: METHOD.to_string(),
            reason: e.to_string(),
        })
    }
}
