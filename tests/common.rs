#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tubing::error::{Error, Result};
use tubing::pipeline::reader::{ReadResult, Reader};
use tubing::pipeline::stage::Stage;
use tubing::pipeline::writer::Writer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
}

pub fn people() -> Vec<Person> {
    [("Bob", 38), ("Carrie", 38), ("Devyn", 18), ("Calvin", 13)]
        .into_iter()
        .map(|(name, age)| Person {
            name: name.to_string(),
            age,
        })
        .collect()
}

/// Shared log of lifecycle calls, so tests can assert ordering across parts.
#[derive(Clone, Default)]
pub struct Calls(Rc<RefCell<Vec<String>>>);

impl Calls {
    pub fn push(&self, call: impl Into<String>) {
        self.0.borrow_mut().push(call.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.borrow().iter().filter(|c| *c == call).count()
    }
}

/// Pass-through stage recording `transform`, `finalize` and `abort`.
pub struct Recording<T> {
    label: &'static str,
    calls: Calls,
    fail_on: Option<usize>,
    seen: usize,
    _m: std::marker::PhantomData<fn(T)>,
}

impl<T> Recording<T> {
    pub fn new(label: &'static str, calls: Calls) -> Self {
        Self {
            label,
            calls,
            fail_on: None,
            seen: 0,
            _m: std::marker::PhantomData,
        }
    }

    /// Fail the `n`th transform call (1-based).
    pub fn fail_on(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }
}

impl<T> Stage for Recording<T> {
    type Input = Vec<T>;
    type Output = Vec<T>;

    fn name(&self) -> &'static str {
        self.label
    }

    fn transform(&mut self, chunk: Vec<T>) -> Result<Vec<T>> {
        self.seen += 1;
        self.calls.push(format!("{}.transform", self.label));
        if self.fail_on == Some(self.seen) {
            return Err(Error::stage(self.label, "boom"));
        }
        Ok(chunk)
    }

    fn finalize(&mut self) -> Result<Vec<T>> {
        self.calls.push(format!("{}.finalize", self.label));
        Ok(Vec::new())
    }

    fn abort(&mut self) {
        self.calls.push(format!("{}.abort", self.label));
    }
}

/// Writer recording every call; optionally fails a given write.
pub struct RecordingWriter<T> {
    pub items: Vec<T>,
    calls: Calls,
    fail_on_write: Option<usize>,
    fail_finalize: bool,
    writes: usize,
}

impl<T> RecordingWriter<T> {
    pub fn new(calls: Calls) -> Self {
        Self {
            items: Vec::new(),
            calls,
            fail_on_write: None,
            fail_finalize: false,
            writes: 0,
        }
    }

    pub fn fail_on_write(mut self, n: usize) -> Self {
        self.fail_on_write = Some(n);
        self
    }

    pub fn fail_finalize(mut self) -> Self {
        self.fail_finalize = true;
        self
    }
}

impl<T> Writer for RecordingWriter<T> {
    type Chunk = Vec<T>;
    type Output = Vec<T>;

    fn write(&mut self, chunk: Vec<T>) -> Result<()> {
        self.writes += 1;
        self.calls.push("writer.write");
        if self.fail_on_write == Some(self.writes) {
            return Err(Error::pipeline("write failed"));
        }
        self.items.extend(chunk);
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.calls.push("writer.finalize");
        if self.fail_finalize {
            return Err(Error::pipeline("finalize failed"));
        }
        Ok(())
    }

    fn abort(&mut self) {
        self.calls.push("writer.abort");
    }

    fn into_output(self) -> Vec<T> {
        self.items
    }
}

/// Source that counts reads and fails once `fail_after` reads have happened.
///
/// Reads listed in `gaps` (0-based) answer `(empty, false)`, like a polled
/// socket with nothing ready.
pub struct CountingSource<T> {
    items: Vec<T>,
    pub reads: usize,
    fail_after: Option<usize>,
    gaps: Vec<usize>,
}

impl<T> CountingSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            reads: 0,
            fail_after: None,
            gaps: Vec::new(),
        }
    }

    pub fn gaps(mut self, reads: &[usize]) -> Self {
        self.gaps = reads.to_vec();
        self
    }

    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl<T> Reader for CountingSource<T> {
    type Chunk = Vec<T>;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Vec<T>>> {
        if self.fail_after == Some(self.reads) {
            return Err(Error::pipeline("source failed"));
        }
        let read = self.reads;
        self.reads += 1;
        if self.gaps.contains(&read) {
            return Ok(ReadResult {
                chunk: Vec::new(),
                is_final: false,
            });
        }
        let n = amount.unwrap_or(self.items.len()).min(self.items.len());
        let chunk: Vec<T> = self.items.drain(..n).collect();
        let is_final = self.items.is_empty();
        Ok(ReadResult { chunk, is_final })
    }
}
