use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::pipeline::stage::{Stage, StageSpec};

/// Joined streams carry small records, so workers pull fewer at a time.
pub const DEFAULT_JOIN_CHUNK_SIZE: usize = 1 << 10;

/// Flattens a stream of records into bytes, with `by` between records.
///
/// The separator goes between records across chunk boundaries too: the first
/// chunk gets none in front, every later chunk gets one.
pub struct Join {
    by: Bytes,
    first: bool,
}

impl Join {
    pub fn new(by: impl Into<Bytes>) -> Self {
        Self {
            by: by.into(),
            first: true,
        }
    }

    pub fn lines() -> Self {
        Self::new(Bytes::from_static(b"\n"))
    }
}

impl Stage for Join {
    type Input = Vec<Bytes>;
    type Output = Bytes;

    fn name(&self) -> &'static str {
        "join"
    }

    fn transform(&mut self, chunk: Vec<Bytes>) -> Result<Bytes> {
        let size = chunk.iter().map(Bytes::len).sum::<usize>() + self.by.len() * chunk.len();
        let mut out = BytesMut::with_capacity(size);

        for (i, record) in chunk.iter().enumerate() {
            if i > 0 || !self.first {
                out.extend_from_slice(&self.by);
            }
            out.extend_from_slice(record);
        }
        self.first = false;

        Ok(out.freeze())
    }
}

pub fn join(by: &'static [u8]) -> StageSpec<impl Fn() -> Join> {
    StageSpec::new(move || Join::new(Bytes::from_static(by))).chunk_size(DEFAULT_JOIN_CHUNK_SIZE)
}
