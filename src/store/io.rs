use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::pipeline::writer::Writer;

/// Writes a byte stream into any [`std::io::Write`].
pub struct IoWriter<W> {
    inner: W,
}

impl<W: Write> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Writer for IoWriter<W> {
    type Chunk = Bytes;
    type Output = W;

    fn write(&mut self, chunk: Bytes) -> Result<()> {
        self.inner.write_all(&chunk)?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    fn into_output(self) -> W {
        self.inner
    }
}

/// Writes a byte stream to a file.
///
/// On abort the partial file is removed.
pub struct FileWriter {
    path: PathBuf,
    file: Option<BufWriter<File>>,
}

impl FileWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: Some(BufWriter::new(file)),
        })
    }

    fn file(&mut self) -> Result<&mut BufWriter<File>> {
        self.file
            .as_mut()
            .ok_or(Error::pipeline("file writer already closed"))
    }
}

impl Writer for FileWriter {
    type Chunk = Bytes;
    type Output = PathBuf;

    fn write(&mut self, chunk: Bytes) -> Result<()> {
        self.file()?.write_all(&chunk)?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let file = self.file()?;
        file.flush()?;
        file.get_ref().sync_all()?;
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.file.take());
        if let Err(_err) = fs::remove_file(&self.path) {
            #[cfg(feature = "tracing")]
            tracing::event!(tracing::Level::WARN, event = "tubing.file.cleanup_failed", path = %self.path.display(), error = %_err, "tubing.file.cleanup_failed");
        }
    }

    fn into_output(self) -> PathBuf {
        self.path
    }
}
