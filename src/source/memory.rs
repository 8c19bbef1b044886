use std::collections::VecDeque;

use bytes::Bytes;

use crate::error::Result;
use crate::pipeline::reader::{ReadResult, Reader};

/// Streams an in-memory list of objects.
#[derive(Clone, Debug)]
pub struct Objects<T> {
    items: VecDeque<T>,
}

impl<T> Objects<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

impl<T> Reader for Objects<T> {
    type Chunk = Vec<T>;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Vec<T>>> {
        let n = amount.unwrap_or(self.items.len()).min(self.items.len());
        let chunk: Vec<T> = self.items.drain(..n).collect();
        Ok(ReadResult {
            chunk,
            is_final: self.items.is_empty(),
        })
    }
}

/// Streams an in-memory byte buffer.
#[derive(Clone, Debug)]
pub struct BytesSource {
    data: Bytes,
}

impl BytesSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl Reader for BytesSource {
    type Chunk = Bytes;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Bytes>> {
        let n = amount.unwrap_or(self.data.len()).min(self.data.len());
        let chunk = self.data.split_to(n);
        Ok(ReadResult {
            chunk,
            is_final: self.data.is_empty(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_reports_final_with_last_items() {
        let mut src = Objects::new(vec![1, 2, 3]);
        assert_eq!(src.read(Some(2)).unwrap(), ReadResult::more(vec![1, 2]));
        assert_eq!(src.read(Some(2)).unwrap(), ReadResult::last(vec![3]));
        assert_eq!(src.read(Some(2)).unwrap(), ReadResult::exhausted());
    }

    #[test]
    fn empty_source_is_final_immediately() {
        let mut src = BytesSource::new(Bytes::new());
        assert_eq!(src.read(Some(8)).unwrap(), ReadResult::exhausted());
    }
}
