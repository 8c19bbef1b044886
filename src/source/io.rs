use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use bytes::Bytes;

use crate::error::Result;
use crate::pipeline::reader::{ReadResult, Reader};

/// Streams bytes from any [`std::io::Read`]: files, sockets, pipes.
///
/// A read that times out or would block yields an empty, non-final chunk, so
/// a socket with a receive timeout behaves as a polling source. End of stream
/// is the first zero-length read.
pub struct IoReader<R> {
    inner: R,
    eof: bool,
}

impl IoReader<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, eof: false }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn is_poll_miss(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
    )
}

impl<R: Read> Reader for IoReader<R> {
    type Chunk = Bytes;

    fn read(&mut self, amount: Option<usize>) -> Result<ReadResult<Bytes>> {
        if self.eof {
            return Ok(ReadResult::exhausted());
        }

        let Some(n) = amount else {
            let mut buf = Vec::new();
            return match self.inner.read_to_end(&mut buf) {
                Ok(_) => {
                    self.eof = true;
                    Ok(ReadResult::last(Bytes::from(buf)))
                }
                Err(e) if is_poll_miss(e.kind()) => Ok(ReadResult::more(Bytes::from(buf))),
                Err(e) => Err(e.into()),
            };
        };

        if n == 0 {
            return Ok(ReadResult::more(Bytes::new()));
        }

        let mut buf = vec![0_u8; n];
        match self.inner.read(&mut buf) {
            Ok(0) => {
                self.eof = true;
                Ok(ReadResult::exhausted())
            }
            Ok(read) => {
                buf.truncate(read);
                Ok(ReadResult::more(Bytes::from(buf)))
            }
            Err(e) if is_poll_miss(e.kind()) => Ok(ReadResult::more(Bytes::new())),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    struct Flaky {
        script: Vec<io::Result<&'static [u8]>>,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.script.is_empty() {
                return Ok(0);
            }
            let data = self.script.remove(0)?;
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn timeouts_become_empty_chunks() {
        let mut r = IoReader::new(Flaky {
            script: vec![
                Err(io::Error::from(ErrorKind::TimedOut)),
                Ok(b"ab"),
                Err(io::Error::from(ErrorKind::WouldBlock)),
            ],
        });

        assert_eq!(r.read(Some(4)).unwrap(), ReadResult::more(Bytes::new()));
        assert_eq!(r.read(Some(4)).unwrap(), ReadResult::more(Bytes::from_static(b"ab")));
        assert_eq!(r.read(Some(4)).unwrap(), ReadResult::more(Bytes::new()));
        assert_eq!(r.read(Some(4)).unwrap(), ReadResult::exhausted());
        assert_eq!(r.read(Some(4)).unwrap(), ReadResult::exhausted());
    }

    #[test]
    fn hard_errors_propagate() {
        let mut r = IoReader::new(Flaky {
            script: vec![Err(io::Error::from(ErrorKind::BrokenPipe))],
        });
        assert!(r.read(Some(4)).is_err());
    }
}
