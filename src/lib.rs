//! # tubing
//!
//! **Lazy, pull-based streaming pipelines in Rust.**
//!
//! `tubing` moves data from a source, through a chain of transforms, into a
//! destination without ever holding the whole dataset in memory. Nothing
//! happens until the sink pulls: every part of the pipeline only reads from
//! its upstream when asked for output.
//!
//! It is designed for batch ETL constraints:
//!
//! - large inputs (GBs, not MBs)
//! - bounded memory, sized by chunk requests
//! - one thread, no runtime
//! - deterministic cleanup on failure
//!
//! ---
//!
//! ## Core Model
//!
//! A pipeline is a chain of readers ending in a writer:
//!
//! ```text
//! Source → Worker(Stage) → Worker(Stage) → … → Sink → Writer
//! ```
//!
//! - A [`Reader`] answers `read(amount)` with a [`ReadResult`]: a chunk of at
//!   most `amount` items and a flag saying whether this is the final chunk.
//! - A [`Stage`] is a chunk transform with an end-of-stream `finalize` and a
//!   failure hook `abort`.
//! - A [`Worker`] wraps a stage and its upstream and is itself a reader. It
//!   buffers transformed output, calls `finalize` exactly once and calls
//!   `abort` on the stage when anything it drives fails.
//! - A [`Sink`] pulls the tail of the chain and feeds a [`Writer`], then
//!   finalizes it, or aborts it if anything failed.
//!
//! Chunks are anything implementing [`Chunk`]: [`bytes::Bytes`] for byte
//! streams and `Vec<T>` for record and object streams.
//!
//! ---
//!
//! ## Example
//!
//! Encode records as JSON lines, gzip them and write a file:
//!
//! ```no_run
//! use serde::Serialize;
//! use tubing::prelude::*;
//! use tubing::codec::gzip;
//! use tubing::json::json_encode;
//! use tubing::source::memory::Objects;
//! use tubing::store::io::FileWriter;
//! use tubing::text::join;
//!
//! #[derive(Serialize)]
//! struct Person {
//!     name: &'static str,
//!     age: u32,
//! }
//!
//! fn main() -> tubing::error::Result<()> {
//!     let people = vec![
//!         Person { name: "Calvin", age: 6 },
//!         Person { name: "Hobbes", age: 6 },
//!     ];
//!
//!     let path = Objects::new(people)
//!         .connect(&json_encode())
//!         .connect(&join(b"\n"))
//!         .connect(&gzip())
//!         .sink(FileWriter::create("people.json.gz")?)?;
//!
//!     println!("wrote {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! The same chain with per-stage chunk sizes:
//!
//! ```no_run
//! # use tubing::prelude::*;
//! # use tubing::source::memory::Objects;
//! # use tubing::store::memory::BytesWriter;
//! let config = PipelineConfig::new()
//!     .chunk_size(1024)
//!     .stage_chunk_size("compress", 1 << 20);
//!
//! let out = Pipeline::new(Objects::new(vec![serde_json::json!({"n": 1})]))
//!     .with_config(config)
//!     .connect(&tubing::json::json_encode())
//!     .connect(&tubing::text::join(b"\n"))
//!     .connect(&tubing::codec::gzip())
//!     .run(BytesWriter::new())?;
//! # Ok::<(), tubing::error::Error>(())
//! ```
//!
//! ---
//!
//! ## Built-in Stages
//!
//! - [`codec`]: gzip / zlib compression and decompression
//! - [`text`]: split a byte stream into records, join records into bytes
//! - [`json`]: decode records as JSON values, encode values as JSON
//! - [`pipeline::adapters`]: `map`, `chunk_map`, `filter`, `inspect`, `tee`
//!
//! ```no_run
//! use tubing::prelude::*;
//! use tubing::source::memory::Objects;
//! use tubing::store::memory::Collect;
//!
//! # fn main() -> tubing::error::Result<()> {
//! let evens = Objects::new((1..=10u32).collect::<Vec<_>>())
//!     .filter(|x: &u32| x % 2 == 0)
//!     .map(|x: u32| x * 10)
//!     .inspect(|chunk: &Vec<u32>| println!("{} values", chunk.len()))
//!     .sink(Collect::new())?;
//! assert_eq!(evens, vec![20, 40, 60, 80, 100]);
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Error Handling Contract
//!
//! - A failure in a stage, or anywhere upstream of it, aborts that stage and
//!   every worker the error unwinds through, then reaches the sink, which
//!   aborts the writer.
//! - A failure in `Writer::write` or `Writer::finalize` aborts only the
//!   writer.
//! - `abort` never fails; implementations log their own cleanup problems so
//!   the original error always reaches the caller.
//! - A worker that failed refuses further reads.
//!
//! ---
//!
//! ## Cancellation
//!
//! Guard a source with a [`CancelToken`]. Cancelling makes the next read fail
//! with [`error::Error::Cancelled`] and the normal abort path runs.
//!
//! ```no_run
//! use tubing::prelude::*;
//! use tubing::source::memory::Objects;
//! use tubing::store::memory::Collect;
//!
//! let token = CancelToken::new();
//! let handle = token.clone();
//! // e.g. from a signal handler thread
//! handle.cancel();
//!
//! let res = Objects::new(vec![1, 2, 3])
//!     .with_cancel(token)
//!     .sink(Collect::new());
//! assert!(res.is_err());
//! ```
//!
//! ---
//!
//! ## Observability
//!
//! With the `tracing` feature (default) `tubing` emits structured events such
//! as `tubing.stage.finalized`, `tubing.stage.failed`, `tubing.sink.aborted`,
//! `tubing.cancelled`, `tubing.s3.part` and `tubing.bulk.errors`.
//!
//! ```ignore
//! use tracing_subscriber::fmt;
//!
//! fn main() {
//!     fmt().with_env_filter("tubing=debug").init();
//! }
//! ```
//!
//! ---
//!
//! ## Feature Flags
//!
//! - `tracing` *(default)*: structured events.
//! - `http`: [`http::UreqTransport`], a blocking HTTP client for the HTTP
//!   writers and the bulk indexer.
//!
//! ---
//!
//! [`Reader`]: pipeline::reader::Reader
//! [`ReadResult`]: pipeline::reader::ReadResult
//! [`Stage`]: pipeline::stage::Stage
//! [`Worker`]: pipeline::worker::Worker
//! [`Sink`]: pipeline::sink::Sink
//! [`Writer`]: pipeline::writer::Writer
//! [`Chunk`]: chunk::Chunk
//! [`CancelToken`]: pipeline::cancel::CancelToken

pub mod chunk;
pub mod codec;
pub mod error;
pub mod ext;
pub mod http;
pub mod json;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod text;

pub mod prelude {
    //! Convenient imports for most `tubing` users.

    pub use crate::chunk::Chunk;
    pub use crate::pipeline::cancel::CancelToken;
    pub use crate::pipeline::chain::{Pipeline, ReaderExt};
    pub use crate::pipeline::config::PipelineConfig;
    pub use crate::pipeline::reader::{ReadResult, Reader};
    pub use crate::pipeline::sink::Sink;
    pub use crate::pipeline::stage::{Stage, StageSpec};
    pub use crate::pipeline::writer::Writer;
}
