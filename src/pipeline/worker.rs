use std::collections::VecDeque;

use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::pipeline::config::DEFAULT_CHUNK_SIZE;
use crate::pipeline::reader::{ReadResult, Reader};
use crate::pipeline::stage::Stage;

/// Where a [`Worker`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Upstream not exhausted yet.
    Accumulating,
    /// Upstream exhausted, buffered output left to hand out.
    Draining,
    /// Upstream exhausted and buffer empty.
    Done,
    /// A read failed and the stage was aborted.
    Failed,
}

/// Runs one [`Stage`] over an upstream [`Reader`].
///
/// The worker pulls `chunk_size` items at a time from upstream, transforms
/// them and buffers the output until the caller's request can be answered.
/// Once upstream reports final the stage is finalized exactly once and
/// upstream is never read again.
///
/// Buffered output is kept as the queue of transformed chunks and only
/// concatenated when handed out, so a large request costs one copy.
pub struct Worker<R, S: Stage> {
    upstream: R,
    stage: S,
    buffer: VecDeque<S::Output>,
    buffered: usize,
    eof: bool,
    failed: bool,
    chunk_size: usize,
}

impl<R, S> Worker<R, S>
where
    R: Reader<Chunk = S::Input>,
    S: Stage,
{
    pub fn new(upstream: R, stage: S) -> Self {
        Self {
            upstream,
            stage,
            buffer: VecDeque::new(),
            buffered: 0,
            eof: false,
            failed: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// How many items to request from upstream per pull.
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }

    pub fn requested_chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn state(&self) -> WorkerState {
        if self.failed {
            WorkerState::Failed
        } else if !self.eof {
            WorkerState::Accumulating
        } else if self.buffered == 0 {
            WorkerState::Done
        } else {
            WorkerState::Draining
        }
    }

    /// Items transformed but not handed out yet.
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn into_parts(self) -> (R, S) {
        (self.upstream, self.stage)
    }

    fn read_complete(&self, amount: Option<usize>) -> bool {
        self.eof || amount.is_some_and(|n| self.buffered >= n)
    }

    fn fill(&mut self, amount: Option<usize>) -> Result<()> {
        while !self.read_complete(amount) {
            let (chunk, is_final) = self.upstream.read(Some(self.chunk_size))?.into_parts();

            if !chunk.is_empty() {
                let out = self.stage.transform(chunk)?;
                self.push(out);
            } else if !is_final {
                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::TRACE, event = "tubing.upstream.idle", stage = self.stage.name(), "tubing.upstream.idle");
            }

            if is_final {
                self.eof = true;
                let tail = self.stage.finalize()?;
                self.push(tail);

                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::DEBUG, event = "tubing.stage.finalized", stage = self.stage.name(), buffered = self.buffered, "tubing.stage.finalized");
            }
        }
        Ok(())
    }

    fn push(&mut self, out: S::Output) {
        if !out.is_empty() {
            self.buffered += out.len();
            self.buffer.push_back(out);
        }
    }

    fn shift(&mut self, amount: Option<usize>) -> S::Output {
        let mut want = amount.unwrap_or(self.buffered).min(self.buffered);
        self.buffered -= want;

        let mut parts = Vec::new();
        while want > 0 {
            let Some(mut front) = self.buffer.pop_front() else {
                break;
            };
            if front.len() > want {
                parts.push(front.split_to(want));
                self.buffer.push_front(front);
                break;
            }
            want -= front.len();
            parts.push(front);
        }
        S::Output::concat(parts)
    }
}

impl<R, S> Reader for Worker<R, S>
where
    R: Reader<Chunk = S::Input>,
    S: Stage,
{
    type Chunk = S::Output;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<S::Output>> {
        if self.failed {
            return Err(Error::pipeline("read from a failed stage"));
        }

        if let Err(err) = self.fill(amount) {
            #[cfg(feature = "tracing")]
            tracing::event!(tracing::Level::WARN, event = "tubing.stage.failed", stage = self.stage.name(), error = %err, "tubing.stage.failed");

            self.failed = true;
            self.stage.abort();
            return Err(err);
        }

        let chunk = self.shift(amount);
        let is_final = self.eof && self.buffered == 0;
        Ok(ReadResult { chunk, is_final })
    }
}
