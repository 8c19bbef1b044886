use tubing::error::Error;
use tubing::pipeline::worker::WorkerState;
use tubing::prelude::*;
use tubing::source::memory::Objects;

mod common;
use common::{Calls, CountingSource, Recording, RecordingWriter};

#[test]
fn finalize_runs_once_whatever_the_drain_size() {
    for sink_size in [1usize, 2, 3, 7, 100] {
        let calls = Calls::default();
        let out = Objects::new((0..20u32).collect::<Vec<_>>())
            .pipe(Recording::new("a", calls.clone()))
            .pipe(Recording::new("b", calls.clone()))
            .drain_into(
                &Sink::new().chunk_size(sink_size),
                RecordingWriter::new(calls.clone()),
            )
            .expect("pipeline runs");

        assert_eq!(out, (0..20).collect::<Vec<_>>());
        assert_eq!(calls.count("a.finalize"), 1, "sink size {sink_size}");
        assert_eq!(calls.count("b.finalize"), 1, "sink size {sink_size}");
        assert_eq!(calls.count("writer.finalize"), 1);
        assert_eq!(calls.count("writer.abort"), 0);
    }
}

#[test]
fn unbounded_sink_reads_everything_at_once() {
    let calls = Calls::default();
    let out = Objects::new(vec![1, 2, 3])
        .pipe(Recording::new("a", calls.clone()))
        .drain_into(&Sink::new().unbounded(), RecordingWriter::new(calls.clone()))
        .expect("pipeline runs");

    assert_eq!(out, vec![1, 2, 3]);
    assert_eq!(calls.count("writer.write"), 1);
}

#[test]
fn upstream_is_not_read_after_eof() {
    let mut source = CountingSource::new(vec![1, 2, 3]);
    let calls = Calls::default();
    {
        let mut worker = (&mut source).pipe(Recording::new("a", calls.clone()));
        for _ in 0..5 {
            let _ = worker.read(Some(1)).expect("read");
        }
        assert_eq!(worker.state(), WorkerState::Done);
    }
    // Default worker chunk size drains the source in one pull.
    assert_eq!(source.reads, 1);
}

#[test]
fn idle_upstream_is_polled_until_data_arrives() {
    let mut source = CountingSource::new((0..6u32).collect()).gaps(&[0, 2, 3]);
    let calls = Calls::default();

    let out = (&mut source)
        .pipe(Recording::new("a", calls.clone()))
        .chunk_size(2)
        .sink(RecordingWriter::new(calls.clone()))
        .expect("pipeline runs");

    assert_eq!(out, (0..6).collect::<Vec<_>>());
    // three empty polls plus three reads of two items each
    assert_eq!(source.reads, 6);
    assert_eq!(calls.count("a.transform"), 3);
    assert_eq!(calls.count("a.finalize"), 1);
    assert_eq!(calls.count("writer.abort"), 0);
}

#[test]
fn write_failure_aborts_writer_only() {
    let calls = Calls::default();
    let res = Objects::new(vec![1, 2, 3, 4])
        .pipe(Recording::new("a", calls.clone()))
        .drain_into(
            &Sink::new().chunk_size(1),
            RecordingWriter::new(calls.clone()).fail_on_write(2),
        );

    assert!(matches!(res, Err(Error::Pipeline { context: "write failed" })));
    assert_eq!(calls.count("writer.abort"), 1);
    assert_eq!(calls.count("writer.finalize"), 0);
    assert_eq!(calls.count("a.abort"), 0);
}

#[test]
fn finalize_failure_aborts_writer() {
    let calls = Calls::default();
    let res = Objects::new(vec![1])
        .drain_into(&Sink::new(), RecordingWriter::new(calls.clone()).fail_finalize());

    assert!(res.is_err());
    assert_eq!(
        calls.all(),
        vec!["writer.write", "writer.finalize", "writer.abort"]
    );
}

#[test]
fn transform_failure_aborts_downstream_chain_and_writer() {
    let calls = Calls::default();
    let res = Objects::new((0..10u32).collect::<Vec<_>>())
        .pipe(Recording::new("a", calls.clone()).fail_on(1))
        .pipe(Recording::new("b", calls.clone()))
        .sink(RecordingWriter::new(calls.clone()));

    assert!(matches!(res, Err(Error::Stage { stage: "a", .. })));
    assert_eq!(
        calls.all(),
        vec!["a.transform", "a.abort", "b.abort", "writer.abort"]
    );
}

#[test]
fn source_failure_aborts_every_stage() {
    let calls = Calls::default();
    let res = CountingSource::new((0..10u32).collect())
        .fail_after(2)
        .pipe(Recording::new("a", calls.clone()))
        .chunk_size(3)
        .sink(RecordingWriter::new(calls.clone()));

    assert!(res.is_err());
    assert_eq!(calls.count("a.abort"), 1);
    assert_eq!(calls.count("a.finalize"), 0);
    assert_eq!(calls.count("writer.abort"), 1);
}

#[test]
fn failed_worker_refuses_further_reads() {
    let calls = Calls::default();
    let mut worker = Objects::new(vec![1, 2])
        .pipe(Recording::new("a", calls.clone()).fail_on(1));

    assert!(worker.read(Some(1)).is_err());
    assert_eq!(worker.state(), WorkerState::Failed);
    assert!(worker.read(Some(1)).is_err());
    assert_eq!(calls.count("a.abort"), 1);
    assert_eq!(calls.count("a.transform"), 1);
}

#[test]
fn cancelled_source_fails_the_run() {
    let calls = Calls::default();
    let token = CancelToken::new();
    token.cancel();

    let res = Objects::new(vec![1, 2, 3])
        .with_cancel(token.clone())
        .pipe(Recording::new("a", calls.clone()))
        .sink(RecordingWriter::new(calls.clone()));

    assert!(matches!(res, Err(Error::Cancelled)));
    assert!(token.is_cancelled());
    assert_eq!(calls.all(), vec!["a.abort", "writer.abort"]);
}

#[test]
fn cancel_mid_stream_stops_pulling() {
    let token = CancelToken::new();
    let trigger = token.clone();
    let mut seen = 0;

    let res = Objects::new((0..100u32).collect::<Vec<_>>())
        .with_cancel(token)
        .inspect(move |_chunk: &Vec<u32>| {
            seen += 1;
            if seen == 2 {
                trigger.cancel();
            }
        })
        .chunk_size(10)
        .pipe(tubing::pipeline::adapters::Map::new(|x: u32| x))
        .chunks(Some(10))
        .collect::<Vec<_>>();

    assert!(matches!(res.last(), Some(Err(Error::Cancelled))));
}
