use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::pipeline::writer::Writer;

pub const DEFAULT_BATCH_BYTES: usize = 6_000_000;

/// Regroups a byte stream into writes of exactly `batch_size` bytes, plus one
/// shorter write for the remainder on finalize.
///
/// Useful in front of writers with per-request overhead or part-size rules,
/// such as [`MultipartUploadWriter`](crate::ext::s3::MultipartUploadWriter).
pub struct BufferedWriter<W> {
    inner: W,
    buf: BytesMut,
    batch_size: usize,
}

impl<W> BufferedWriter<W>
where
    W: Writer<Chunk = Bytes>,
{
    pub fn new(inner: W) -> Self {
        Self::with_batch_size(inner, DEFAULT_BATCH_BYTES)
    }

    pub fn with_batch_size(inner: W, batch_size: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            batch_size: batch_size.max(1),
        }
    }

    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

impl<W> Writer for BufferedWriter<W>
where
    W: Writer<Chunk = Bytes>,
{
    type Chunk = Bytes;
    type Output = W::Output;

    fn write(&mut self, chunk: Bytes) -> Result<()> {
        self.buf.extend_from_slice(&chunk);
        while self.buf.len() >= self.batch_size {
            let batch = self.buf.split_to(self.batch_size).freeze();
            self.inner.write(batch)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if !self.buf.is_empty() {
            let rest = self.buf.split().freeze();
            self.inner.write(rest)?;
        }
        self.inner.finalize()
    }

    fn abort(&mut self) {
        self.inner.abort()
    }

    fn into_output(self) -> W::Output {
        self.inner.into_output()
    }
}
