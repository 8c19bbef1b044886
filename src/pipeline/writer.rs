use crate::chunk::Chunk;
use crate::error::Result;

/// The terminus of a pipeline.
///
/// [`Sink`](crate::pipeline::sink::Sink) calls `write` for every chunk it
/// pulls, then exactly one of `finalize` (success) or `abort` (failure).
pub trait Writer {
    type Chunk: Chunk;
    type Output;

    fn write(&mut self, chunk: Self::Chunk) -> Result<()>;

    /// Flush trailing state once the stream is exhausted.
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Best-effort cleanup after a failure. Cleanup errors are logged by the
    /// implementation, never returned, so they cannot mask the original error.
    fn abort(&mut self) {}

    /// The writer's result, read after a successful run.
    fn into_output(self) -> Self::Output
    where
        Self: Sized;
}

/// Borrowed writers let the caller inspect the writer after the run.
impl<W: Writer + ?Sized> Writer for &mut W {
    type Chunk = W::Chunk;
    type Output = ();

    fn write(&mut self, chunk: Self::Chunk) -> Result<()> {
        (**self).write(chunk)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }

    fn abort(&mut self) {
        (**self).abort()
    }

    fn into_output(self) -> Self::Output {}
}
