use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::pipeline::writer::Writer;

/// Collects an object stream into a `Vec`.
pub struct Collect<T> {
    items: Vec<T>,
}

impl<T> Collect<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Collect<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Writer for Collect<T> {
    type Chunk = Vec<T>;
    type Output = Vec<T>;

    fn write(&mut self, mut chunk: Vec<T>) -> Result<()> {
        self.items.append(&mut chunk);
        Ok(())
    }

    fn into_output(self) -> Vec<T> {
        self.items
    }
}

/// Collects a byte stream into one buffer.
#[derive(Default)]
pub struct BytesWriter {
    buf: BytesMut,
}

impl BytesWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

impl Writer for BytesWriter {
    type Chunk = Bytes;
    type Output = Bytes;

    fn write(&mut self, chunk: Bytes) -> Result<()> {
        self.buf.extend_from_slice(&chunk);
        Ok(())
    }

    fn into_output(self) -> Bytes {
        self.buf.freeze()
    }
}
