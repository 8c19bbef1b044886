use crate::chunk::Chunk;
use crate::error::Result;
use crate::pipeline::config::DEFAULT_CHUNK_SIZE;
use crate::pipeline::reader::Reader;
use crate::pipeline::worker::Worker;

/// A per-chunk transformation plugged into a [`Worker`].
///
/// Only `transform` is required. `finalize` runs once, after upstream is
/// exhausted, and may return trailing output. `abort` runs once if anything
/// on the read path fails.
pub trait Stage {
    type Input: Chunk;
    type Output: Chunk;

    /// Name used in logs and for per-stage configuration.
    fn name(&self) -> &'static str {
        "stage"
    }

    /// Transform one non-empty input chunk. An empty result means "buffered,
    /// nothing to emit yet".
    fn transform(&mut self, chunk: Self::Input) -> Result<Self::Output>;

    fn finalize(&mut self) -> Result<Self::Output> {
        Ok(Self::Output::default())
    }

    fn abort(&mut self) {}
}

/// A stage constructor plus the chunk size its workers pull with.
///
/// Every [`bind`](Self::bind) builds a fresh stage, so one spec can be
/// attached to any number of pipelines without sharing state.
#[derive(Clone)]
pub struct StageSpec<F> {
    factory: F,
    chunk_size: usize,
}

impl<F, S> StageSpec<F>
where
    F: Fn() -> S,
    S: Stage,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }

    pub fn default_chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn build(&self) -> S {
        (self.factory)()
    }

    pub fn bind<R>(&self, upstream: R) -> Worker<R, S>
    where
        R: Reader<Chunk = S::Input>,
    {
        Worker::new(upstream, self.build()).chunk_size(self.chunk_size)
    }
}
