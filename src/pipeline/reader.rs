use crate::chunk::Chunk;
use crate::error::Result;

/// One pull's worth of data.
///
/// `is_final` means the producer is exhausted: no further non-empty chunk will
/// ever come from it. The final read may still carry trailing data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResult<C> {
    pub chunk: C,
    pub is_final: bool,
}

impl<C: Chunk> ReadResult<C> {
    pub fn more(chunk: C) -> Self {
        Self {
            chunk,
            is_final: false,
        }
    }

    pub fn last(chunk: C) -> Self {
        Self {
            chunk,
            is_final: true,
        }
    }

    /// `(empty, true)`, what every reader keeps returning once exhausted.
    pub fn exhausted() -> Self {
        Self::last(C::default())
    }

    pub fn into_parts(self) -> (C, bool) {
        (self.chunk, self.is_final)
    }
}

/// Anything that can be pulled from: sources and workers alike.
///
/// `amount` is how many items the caller wants; `None` asks for everything up
/// to end of stream. Implementations must return at most `amount` items and
/// must keep answering `(empty, true)` after they reported final.
pub trait Reader {
    type Chunk: Chunk;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Self::Chunk>>;
}

impl<R: Reader + ?Sized> Reader for &mut R {
    type Chunk = R::Chunk;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Self::Chunk>> {
        (**self).read(amount)
    }
}

impl<R: Reader + ?Sized> Reader for Box<R> {
    type Chunk = R::Chunk;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Self::Chunk>> {
        (**self).read(amount)
    }
}
