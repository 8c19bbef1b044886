use crate::error::Result;
use crate::pipeline::config::DEFAULT_CHUNK_SIZE;
use crate::pipeline::reader::{ReadResult, Reader};
use crate::pipeline::writer::Writer;

/// Drives a pipeline: pulls the tail until it reports final and hands every
/// chunk to a [`Writer`].
///
/// On success the writer is finalized and its output returned. On any error,
/// whether from upstream, from `write` or from `finalize`, the writer is
/// aborted once and the error is returned unchanged.
///
/// Only the writer is aborted when `write` fails. Workers upstream are not
/// told, because the failure happened below them in the pull order.
#[derive(Clone, Debug)]
pub struct Sink {
    chunk_size: Option<usize>,
}

impl Sink {
    pub fn new() -> Self {
        Self {
            chunk_size: Some(DEFAULT_CHUNK_SIZE),
        }
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = Some(n.max(1));
        self
    }

    /// Read the whole pipeline in one request.
    pub fn unbounded(mut self) -> Self {
        self.chunk_size = None;
        self
    }

    pub fn run<R, W>(&self, mut tail: R, mut writer: W) -> Result<W::Output>
    where
        R: Reader,
        W: Writer<Chunk = R::Chunk>,
    {
        match self.drive(&mut tail, &mut writer) {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::DEBUG, event = "tubing.sink.finalized", "tubing.sink.finalized");

                Ok(writer.into_output())
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::event!(tracing::Level::WARN, event = "tubing.sink.aborted", error = %err, "tubing.sink.aborted");

                writer.abort();
                Err(err)
            }
        }
    }

    fn drive<R, W>(&self, tail: &mut R, writer: &mut W) -> Result<()>
    where
        R: Reader,
        W: Writer<Chunk = R::Chunk>,
    {
        loop {
            let ReadResult { chunk, is_final } = tail.read(self.chunk_size)?;
            writer.write(chunk)?;
            if is_final {
                break;
            }
        }
        writer.finalize()
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::new()
    }
}
