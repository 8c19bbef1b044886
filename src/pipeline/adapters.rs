use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::chunk::Chunk;
use crate::error::Result;
use crate::pipeline::stage::Stage;
use crate::pipeline::writer::Writer;

/// map: T -> U, element by element
pub struct Map<F, T> {
    f: F,
    _m: PhantomData<fn(T)>,
}

impl<F, T> Map<F, T> {
    pub fn new(f: F) -> Self {
        Self { f, _m: PhantomData }
    }
}

impl<T, U, F> Stage for Map<F, T>
where
    F: FnMut(T) -> U,
{
    type Input = Vec<T>;
    type Output = Vec<U>;

    fn name(&self) -> &'static str {
        "map"
    }

    fn transform(&mut self, chunk: Vec<T>) -> Result<Vec<U>> {
        Ok(chunk.into_iter().map(&mut self.f).collect())
    }
}

/// Whole-chunk transform. The closure may fail; failures abort the stage.
pub struct ChunkMap<F, I> {
    f: F,
    _m: PhantomData<fn(I)>,
}

impl<F, I> ChunkMap<F, I> {
    pub fn new(f: F) -> Self {
        Self { f, _m: PhantomData }
    }
}

impl<I, O, F> Stage for ChunkMap<F, I>
where
    I: Chunk,
    O: Chunk,
    F: FnMut(I) -> Result<O>,
{
    type Input = I;
    type Output = O;

    fn name(&self) -> &'static str {
        "chunk_map"
    }

    fn transform(&mut self, chunk: I) -> Result<O> {
        (self.f)(chunk)
    }
}

pub struct Filter<P, T> {
    pred: P,
    _m: PhantomData<fn(T)>,
}

impl<P, T> Filter<P, T> {
    pub fn new(pred: P) -> Self {
        Self {
            pred,
            _m: PhantomData,
        }
    }
}

impl<T, P> Stage for Filter<P, T>
where
    P: FnMut(&T) -> bool,
{
    type Input = Vec<T>;
    type Output = Vec<T>;

    fn name(&self) -> &'static str {
        "filter"
    }

    fn transform(&mut self, mut chunk: Vec<T>) -> Result<Vec<T>> {
        chunk.retain(|item| (self.pred)(item));
        Ok(chunk)
    }
}

/// Looks at every chunk on its way through, e.g. to log it.
pub struct Inspect<F, C> {
    f: F,
    _m: PhantomData<fn(C)>,
}

impl<F, C> Inspect<F, C> {
    pub fn new(f: F) -> Self {
        Self { f, _m: PhantomData }
    }
}

impl<C, F> Stage for Inspect<F, C>
where
    C: Chunk,
    F: FnMut(&C),
{
    type Input = C;
    type Output = C;

    fn name(&self) -> &'static str {
        "inspect"
    }

    fn transform(&mut self, chunk: C) -> Result<C> {
        #[cfg(feature = "tracing")]
        tracing::event!(tracing::Level::DEBUG, event = "tubing.inspect", len = chunk.len(), "tubing.inspect");
        (self.f)(&chunk);
        Ok(chunk)
    }
}

/// Where a [`Tee`] leaves its side writer's output once finalized.
pub struct TeeOutput<O>(Rc<RefCell<Option<O>>>);

impl<O> TeeOutput<O> {
    pub fn is_ready(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn take(&self) -> Option<O> {
        self.0.borrow_mut().take()
    }
}

impl<O> Clone for TeeOutput<O> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Copies every chunk into a side writer before passing it on unchanged.
///
/// The side write happens synchronously, so the side writer sees chunks in
/// exactly the main order. Its failures fail the stage.
pub struct Tee<W: Writer> {
    writer: Option<W>,
    output: TeeOutput<W::Output>,
}

impl<W: Writer> Tee<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            output: TeeOutput(Rc::new(RefCell::new(None))),
        }
    }

    /// Handle to the side writer's output, filled when the stage finalizes.
    pub fn output(&self) -> TeeOutput<W::Output> {
        self.output.clone()
    }
}

impl<W> Stage for Tee<W>
where
    W: Writer,
    W::Chunk: Clone,
{
    type Input = W::Chunk;
    type Output = W::Chunk;

    fn name(&self) -> &'static str {
        "tee"
    }

    fn transform(&mut self, chunk: W::Chunk) -> Result<W::Chunk> {
        if let Some(writer) = self.writer.as_mut() {
            writer.write(chunk.clone())?;
        }
        Ok(chunk)
    }

    fn finalize(&mut self) -> Result<W::Chunk> {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.finalize() {
                self.writer = Some(writer);
                return Err(err);
            }
            *self.output.0.borrow_mut() = Some(writer.into_output());
        }
        Ok(W::Chunk::default())
    }

    fn abort(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.abort();
        }
    }
}
