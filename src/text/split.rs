use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Error, Result};
use crate::pipeline::stage::{Stage, StageSpec};

/// Splits a byte stream into records on a delimiter.
///
/// Records may straddle input chunks. Whatever follows the last delimiter is
/// emitted on finalize as a one-element chunk, even when empty, so
/// `split |> join` with the same delimiter gives back the input.
pub struct Split {
    on: Bytes,
    residual: BytesMut,
    // residual[..scanned] is known to hold no delimiter start
    scanned: usize,
}

impl Split {
    /// # Panics
    ///
    /// Panics if `on` is empty. Use [`Split::try_new`] for delimiters that
    /// are not known up front.
    pub fn new(on: impl Into<Bytes>) -> Self {
        match Self::try_new(on) {
            Ok(split) => split,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(on: impl Into<Bytes>) -> Result<Self> {
        let on = on.into();
        if on.is_empty() {
            return Err(Error::stage("split", "delimiter must not be empty"));
        }
        Ok(Self {
            on,
            residual: BytesMut::new(),
            scanned: 0,
        })
    }

    pub fn lines() -> Self {
        Self::new(Bytes::from_static(b"\n"))
    }

    fn find(&self, from: usize) -> Option<usize> {
        let hay = &self.residual[from..];
        let pos = if self.on.len() == 1 {
            hay.iter().position(|b| *b == self.on[0])
        } else {
            hay.windows(self.on.len()).position(|w| w == &self.on[..])
        };
        pos.map(|p| p + from)
    }
}

impl Stage for Split {
    type Input = Bytes;
    type Output = Vec<Bytes>;

    fn name(&self) -> &'static str {
        "split"
    }

    fn transform(&mut self, chunk: Bytes) -> Result<Vec<Bytes>> {
        self.residual.extend_from_slice(&chunk);

        let mut records = Vec::new();
        let mut from = self.scanned;
        while let Some(at) = self.find(from) {
            records.push(self.residual.split_to(at).freeze());
            self.residual.advance(self.on.len());
            from = 0;
        }
        self.scanned = self.residual.len().saturating_sub(self.on.len() - 1);

        Ok(records)
    }

    fn finalize(&mut self) -> Result<Vec<Bytes>> {
        self.scanned = 0;
        Ok(vec![self.residual.split().freeze()])
    }
}

/// # Panics
///
/// Panics if `on` is empty.
pub fn split(on: &'static [u8]) -> StageSpec<impl Fn() -> Split> {
    assert!(!on.is_empty(), "split delimiter must not be empty");
    StageSpec::new(move || Split::new(Bytes::from_static(on)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &'static str) -> Bytes {
        Bytes::from_static(s.as_bytes())
    }

    #[test]
    fn records_straddle_chunks() {
        let mut s = Split::lines();
        assert_eq!(s.transform(b("ab")).unwrap(), Vec::<Bytes>::new());
        assert_eq!(s.transform(b("c\nd")).unwrap(), vec![b("abc")]);
        assert_eq!(s.transform(b("\n\n")).unwrap(), vec![b("d"), b("")]);
        assert_eq!(s.finalize().unwrap(), vec![b("")]);
    }

    #[test]
    fn multi_byte_delimiter_across_chunks() {
        let mut s = Split::new(b("\r\n"));
        assert_eq!(s.transform(b("one\r")).unwrap(), Vec::<Bytes>::new());
        assert_eq!(s.transform(b("\ntwo")).unwrap(), vec![b("one")]);
        assert_eq!(s.finalize().unwrap(), vec![b("two")]);
    }

    #[test]
    fn empty_delimiter_is_rejected() {
        assert!(matches!(
            Split::try_new(Bytes::new()),
            Err(Error::Stage { stage: "split", .. })
        ));
    }

    #[test]
    #[should_panic(expected = "delimiter must not be empty")]
    fn split_spec_rejects_empty_delimiter() {
        let _ = split(b"");
    }
}
