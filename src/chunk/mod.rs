//! The unit of transfer between pipeline parts.
//!
//! A [`Chunk`] is an ordered batch of items: bytes for byte streams, records
//! for line streams, values for object streams. Workers only ever need to
//! measure, split and concatenate chunks, so that is all the trait asks for.
//! An empty chunk means "no data right now"; end of stream is signalled
//! separately through [`ReadResult::is_final`](crate::pipeline::reader::ReadResult).

use bytes::{Bytes, BytesMut};

pub trait Chunk: Default {
    /// Number of items in the chunk.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the first `at` items and return them.
    ///
    /// `at` larger than the chunk takes everything.
    fn split_to(&mut self, at: usize) -> Self;

    /// Append `other` to the end of this chunk.
    fn append(&mut self, other: Self);

    /// Concatenate `parts` in order.
    fn concat(parts: Vec<Self>) -> Self
    where
        Self: Sized,
    {
        parts.into_iter().fold(Self::default(), |mut acc, part| {
            acc.append(part);
            acc
        })
    }
}

impl Chunk for Bytes {
    fn len(&self) -> usize {
        Bytes::len(self)
    }

    fn split_to(&mut self, at: usize) -> Self {
        let at = at.min(Bytes::len(self));
        Bytes::split_to(self, at)
    }

    fn append(&mut self, other: Self) {
        if other.is_empty() {
            return;
        }
        if Bytes::is_empty(self) {
            *self = other;
            return;
        }

        let mut joined = BytesMut::with_capacity(Bytes::len(self) + other.len());
        joined.extend_from_slice(self);
        joined.extend_from_slice(&other);
        *self = joined.freeze();
    }

    // One allocation for the whole run instead of one per part.
    fn concat(mut parts: Vec<Self>) -> Self {
        if parts.len() <= 1 {
            return parts.pop().unwrap_or_default();
        }
        let total = parts.iter().map(Bytes::len).sum();
        let mut joined = BytesMut::with_capacity(total);
        for part in &parts {
            joined.extend_from_slice(part);
        }
        joined.freeze()
    }
}

impl<T> Chunk for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn split_to(&mut self, at: usize) -> Self {
        let at = at.min(Vec::len(self));
        let tail = self.split_off(at);
        std::mem::replace(self, tail)
    }

    fn append(&mut self, mut other: Self) {
        if Vec::is_empty(self) {
            *self = other;
        } else {
            Vec::append(self, &mut other);
        }
    }
}
