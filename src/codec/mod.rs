//! gzip / zlib stages over byte streams, backed by `flate2`.

use std::io::Write;

use bytes::Bytes;
use flate2::write::{GzDecoder, GzEncoder, ZlibDecoder, ZlibEncoder};
use flate2::Compression;

use crate::error::{Error, Result};
use crate::pipeline::stage::{Stage, StageSpec};

pub const DEFAULT_LEVEL: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Gzip,
    Zlib,
}

enum Deflater {
    Gzip(GzEncoder<Vec<u8>>),
    Zlib(ZlibEncoder<Vec<u8>>),
}

impl Deflater {
    fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
        match self {
            Self::Gzip(e) => e.write_all(data),
            Self::Zlib(e) => e.write_all(data),
        }
    }

    fn try_finish(&mut self) -> std::io::Result<()> {
        match self {
            Self::Gzip(e) => e.try_finish(),
            Self::Zlib(e) => e.try_finish(),
        }
    }

    fn take_output(&mut self) -> Bytes {
        let out = match self {
            Self::Gzip(e) => e.get_mut(),
            Self::Zlib(e) => e.get_mut(),
        };
        Bytes::from(std::mem::take(out))
    }
}

/// Compresses a byte stream. Trailer bytes only appear on finalize.
pub struct Compress {
    deflater: Deflater,
}

impl Compress {
    pub fn new(format: Format, level: u32) -> Self {
        let level = Compression::new(level.min(9));
        let deflater = match format {
            Format::Gzip => Deflater::Gzip(GzEncoder::new(Vec::new(), level)),
            Format::Zlib => Deflater::Zlib(ZlibEncoder::new(Vec::new(), level)),
        };
        Self { deflater }
    }

    pub fn gzip() -> Self {
        Self::new(Format::Gzip, DEFAULT_LEVEL)
    }

    pub fn zlib() -> Self {
        Self::new(Format::Zlib, DEFAULT_LEVEL)
    }
}

impl Stage for Compress {
    type Input = Bytes;
    type Output = Bytes;

    fn name(&self) -> &'static str {
        "compress"
    }

    fn transform(&mut self, chunk: Bytes) -> Result<Bytes> {
        self.deflater
            .write_all(&chunk)
            .map_err(|e| Error::stage("compress", e.to_string()))?;
        Ok(self.deflater.take_output())
    }

    fn finalize(&mut self) -> Result<Bytes> {
        self.deflater
            .try_finish()
            .map_err(|e| Error::stage("compress", e.to_string()))?;
        Ok(self.deflater.take_output())
    }
}

enum Inflater {
    Gzip(GzDecoder<Vec<u8>>),
    Zlib(ZlibDecoder<Vec<u8>>),
}

impl Inflater {
    fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
        match self {
            Self::Gzip(d) => d.write_all(data),
            Self::Zlib(d) => d.write_all(data),
        }
    }

    fn try_finish(&mut self) -> std::io::Result<()> {
        match self {
            Self::Gzip(d) => d.try_finish(),
            Self::Zlib(d) => d.try_finish(),
        }
    }

    fn take_output(&mut self) -> Bytes {
        let out = match self {
            Self::Gzip(d) => d.get_mut(),
            Self::Zlib(d) => d.get_mut(),
        };
        Bytes::from(std::mem::take(out))
    }
}

/// Decompresses a byte stream. Intermediate output is often empty.
pub struct Decompress {
    inflater: Inflater,
    seen_input: bool,
}

impl Decompress {
    pub fn new(format: Format) -> Self {
        let inflater = match format {
            Format::Gzip => Inflater::Gzip(GzDecoder::new(Vec::new())),
            Format::Zlib => Inflater::Zlib(ZlibDecoder::new(Vec::new())),
        };
        Self {
            inflater,
            seen_input: false,
        }
    }

    pub fn gzip() -> Self {
        Self::new(Format::Gzip)
    }

    pub fn zlib() -> Self {
        Self::new(Format::Zlib)
    }
}

impl Stage for Decompress {
    type Input = Bytes;
    type Output = Bytes;

    fn name(&self) -> &'static str {
        "decompress"
    }

    fn transform(&mut self, chunk: Bytes) -> Result<Bytes> {
        self.seen_input = true;
        self.inflater
            .write_all(&chunk)
            .map_err(|e| Error::stage("decompress", e.to_string()))?;
        Ok(self.inflater.take_output())
    }

    fn finalize(&mut self) -> Result<Bytes> {
        if !self.seen_input {
            return Ok(Bytes::new());
        }
        self.inflater
            .try_finish()
            .map_err(|e| Error::stage("decompress", e.to_string()))?;
        Ok(self.inflater.take_output())
    }
}

pub fn gzip() -> StageSpec<fn() -> Compress> {
    StageSpec::new(Compress::gzip as fn() -> Compress)
}

pub fn gunzip() -> StageSpec<fn() -> Decompress> {
    StageSpec::new(Decompress::gzip as fn() -> Decompress)
}
