use crate::error::Result;
use crate::pipeline::adapters::{ChunkMap, Filter, Inspect, Map, Tee};
use crate::pipeline::cancel::{CancelToken, Cancellable};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::reader::Reader;
use crate::pipeline::sink::Sink;
use crate::pipeline::stage::{Stage, StageSpec};
use crate::pipeline::worker::Worker;
use crate::pipeline::writer::Writer;

/// Wiring for every [`Reader`].
///
/// Each method consumes the reader and returns a new [`Worker`] holding it;
/// nothing is read until a sink or an iterator pulls.
pub trait ReaderExt: Reader + Sized {
    fn pipe<S>(self, stage: S) -> Worker<Self, S>
    where
        S: Stage<Input = Self::Chunk>,
    {
        Worker::new(self, stage)
    }

    fn connect<F, S>(self, spec: &StageSpec<F>) -> Worker<Self, S>
    where
        F: Fn() -> S,
        S: Stage<Input = Self::Chunk>,
    {
        spec.bind(self)
    }

    fn map<T, U, F>(self, f: F) -> Worker<Self, Map<F, T>>
    where
        Self: Reader<Chunk = Vec<T>>,
        F: FnMut(T) -> U,
    {
        Worker::new(self, Map::new(f))
    }

    fn chunk_map<O, F>(self, f: F) -> Worker<Self, ChunkMap<F, Self::Chunk>>
    where
        O: crate::chunk::Chunk,
        F: FnMut(Self::Chunk) -> Result<O>,
    {
        Worker::new(self, ChunkMap::new(f))
    }

    fn filter<T, P>(self, pred: P) -> Worker<Self, Filter<P, T>>
    where
        Self: Reader<Chunk = Vec<T>>,
        P: FnMut(&T) -> bool,
    {
        Worker::new(self, Filter::new(pred))
    }

    fn inspect<F>(self, f: F) -> Worker<Self, Inspect<F, Self::Chunk>>
    where
        F: FnMut(&Self::Chunk),
    {
        Worker::new(self, Inspect::new(f))
    }

    fn tee<W>(self, writer: W) -> Worker<Self, Tee<W>>
    where
        W: Writer<Chunk = Self::Chunk>,
        W::Chunk: Clone,
    {
        Worker::new(self, Tee::new(writer))
    }

    fn with_cancel(self, token: CancelToken) -> Cancellable<Self> {
        Cancellable::new(self, token)
    }

    /// Iterate over chunks of at most `amount` items, ending after the final
    /// chunk.
    fn chunks(self, amount: Option<usize>) -> Chunks<Self> {
        Chunks {
            reader: self,
            amount,
            done: false,
        }
    }

    /// Run the pipeline into `writer` with a default [`Sink`].
    fn sink<W>(self, writer: W) -> Result<W::Output>
    where
        W: Writer<Chunk = Self::Chunk>,
    {
        Sink::new().run(self, writer)
    }

    fn drain_into<W>(self, sink: &Sink, writer: W) -> Result<W::Output>
    where
        W: Writer<Chunk = Self::Chunk>,
    {
        sink.run(self, writer)
    }
}

impl<R: Reader> ReaderExt for R {}

pub struct Chunks<R> {
    reader: R,
    amount: Option<usize>,
    done: bool,
}

impl<R> Chunks<R> {
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Reader> Iterator for Chunks<R> {
    type Item = Result<R::Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read(self.amount) {
            Ok(r) => {
                self.done = r.is_final;
                Some(Ok(r.chunk))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Fluent builder over a source, sizing each stage from a [`PipelineConfig`].
///
/// ```no_run
/// use tubing::prelude::*;
/// use tubing::source::memory::Objects;
/// use tubing::store::memory::Collect;
///
/// # fn main() -> tubing::error::Result<()> {
/// let out = Pipeline::new(Objects::new(vec![1u32, 2, 3]))
///     .with_config(PipelineConfig::new().chunk_size(2))
///     .then(tubing::pipeline::adapters::Map::new(|x: u32| x + 1))
///     .run(Collect::new())?;
/// assert_eq!(out, vec![2, 3, 4]);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<R> {
    tail: R,
    config: PipelineConfig,
}

impl<R: Reader> Pipeline<R> {
    pub fn new(source: R) -> Self {
        Self {
            tail: source,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn then<S>(self, stage: S) -> Pipeline<Worker<R, S>>
    where
        S: Stage<Input = R::Chunk>,
    {
        let size = self
            .config
            .chunk_size_for(stage.name(), self.config.global_chunk_size());
        Pipeline {
            tail: Worker::new(self.tail, stage).chunk_size(size),
            config: self.config,
        }
    }

    pub fn connect<F, S>(self, spec: &StageSpec<F>) -> Pipeline<Worker<R, S>>
    where
        F: Fn() -> S,
        S: Stage<Input = R::Chunk>,
    {
        let stage = spec.build();
        let size = self
            .config
            .chunk_size_for(stage.name(), spec.default_chunk_size());
        Pipeline {
            tail: Worker::new(self.tail, stage).chunk_size(size),
            config: self.config,
        }
    }

    pub fn run<W>(self, writer: W) -> Result<W::Output>
    where
        W: Writer<Chunk = R::Chunk>,
    {
        self.config.sink().run(self.tail, writer)
    }

    pub fn into_reader(self) -> R {
        self.tail
    }
}
