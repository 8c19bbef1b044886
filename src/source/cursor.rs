use crate::error::Result;
use crate::pipeline::reader::{ReadResult, Reader};

/// Rows fetched per call when the caller asks for everything.
pub const DEFAULT_FETCH_SIZE: usize = 256;

/// Streams rows from a batch fetch function, the shape of a database cursor's
/// `fetchmany`.
///
/// `fetch(n)` returns up to `n` rows; an empty batch ends the stream. Rows
/// beyond what the caller asked for are held back for the next read.
pub struct CursorSource<F, T> {
    fetch: F,
    pending: Vec<T>,
    fetch_size: usize,
    done: bool,
}

impl<F, T> CursorSource<F, T>
where
    F: FnMut(usize) -> Result<Vec<T>>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            pending: Vec::new(),
            fetch_size: DEFAULT_FETCH_SIZE,
            done: false,
        }
    }

    pub fn fetch_size(mut self, n: usize) -> Self {
        self.fetch_size = n.max(1);
        self
    }

    fn next_batch(&mut self, n: usize) -> Result<Vec<T>> {
        if !self.pending.is_empty() {
            return Ok(std::mem::take(&mut self.pending));
        }
        let rows = (self.fetch)(n)?;
        if rows.is_empty() {
            self.done = true;
        }
        Ok(rows)
    }
}

impl<F, T> Reader for CursorSource<F, T>
where
    F: FnMut(usize) -> Result<Vec<T>>,
{
    type Chunk = Vec<T>;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Vec<T>>> {
        if self.done && self.pending.is_empty() {
            return Ok(ReadResult::exhausted());
        }

        match amount {
            Some(n) => {
                let mut rows = self.next_batch(n)?;
                if rows.len() > n {
                    self.pending = rows.split_off(n);
                }
                let is_final = self.done && self.pending.is_empty();
                Ok(ReadResult {
                    chunk: rows,
                    is_final,
                })
            }
            None => {
                let mut all = std::mem::take(&mut self.pending);
                while !self.done {
                    let batch = self.next_batch(self.fetch_size)?;
                    all.extend(batch);
                }
                Ok(ReadResult::last(all))
            }
        }
    }
}
