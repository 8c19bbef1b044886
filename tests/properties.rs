use bytes::Bytes;
use proptest::prelude::*;
use tubing::prelude::*;
use tubing::source::memory::Objects;
use tubing::store::memory::Collect;
use tubing::text::{Join, Split};

proptest! {
    #[test]
    fn worker_buffers_conserve_items(
        input in proptest::collection::vec(any::<u16>(), 0..512),
        worker_size in 1usize..64,
        requests in proptest::collection::vec(1usize..50, 1..16),
    ) {
        let mut tail = Objects::new(input.clone())
            .map(|x: u16| x)
            .chunk_size(worker_size)
            .filter(|_: &u16| true)
            .chunk_size(worker_size + 1);

        let mut out = Vec::new();
        let mut finished = false;
        for n in requests.iter().cycle().take(2048) {
            let res = tail.read(Some(*n)).expect("read");
            prop_assert!(res.chunk.len() <= *n);
            out.extend(res.chunk);
            if res.is_final {
                finished = true;
                break;
            }
        }

        prop_assert!(finished);
        prop_assert_eq!(out, input);
    }

    #[test]
    fn split_undoes_join(
        records in proptest::collection::vec("[a-z,]{0,8}", 1..32),
        chunk in 1usize..16,
    ) {
        let records: Vec<Bytes> = records.into_iter().map(Bytes::from).collect();
        let config = PipelineConfig::new().chunk_size(chunk).sink_chunk_size(chunk);

        let out = Pipeline::new(Objects::new(records.clone()))
            .with_config(config)
            .then(Join::new(Bytes::from_static(b"\n")))
            .then(Split::new(Bytes::from_static(b"\n")))
            .run(Collect::new())
            .expect("run");

        prop_assert_eq!(out, records);
    }

    #[test]
    fn split_handles_multibyte_delimiters(
        records in proptest::collection::vec("[ab]{0,6}", 1..16),
        chunk in 1usize..8,
    ) {
        let records: Vec<Bytes> = records.into_iter().map(Bytes::from).collect();
        let config = PipelineConfig::new().chunk_size(chunk);

        let out = Pipeline::new(Objects::new(records.clone()))
            .with_config(config)
            .then(Join::new(Bytes::from_static(b"\r\n")))
            .then(Split::new(Bytes::from_static(b"\r\n")))
            .run(Collect::new())
            .expect("run");

        prop_assert_eq!(out, records);
    }
}
