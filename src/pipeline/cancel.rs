use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::pipeline::reader::{ReadResult, Reader};

/// Shared flag checked by [`Cancellable`] sources.
///
/// Hosting applications translate OS signals (or anything else) into
/// [`cancel`](Self::cancel); the next read on a guarded source then fails with
/// [`Error::Cancelled`] and the usual abort cascade runs.
#[derive(Clone, Default, Debug)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A reader that stops with [`Error::Cancelled`] once its token fires.
pub struct Cancellable<R> {
    inner: R,
    token: CancelToken,
}

impl<R> Cancellable<R> {
    pub fn new(inner: R, token: CancelToken) -> Self {
        Self { inner, token }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Reader> Reader for Cancellable<R> {
    type Chunk = R::Chunk;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Self::Chunk>> {
        if self.token.is_cancelled() {
            #[cfg(feature = "tracing")]
            tracing::event!(tracing::Level::DEBUG, event = "tubing.cancelled", where_ = "read", "tubing.cancelled");
            return Err(Error::Cancelled);
        }
        self.inner.read(amount)
    }
}
