//! Multipart object uploads.
//!
//! The storage service itself sits behind [`MultipartClient`]; the writer
//! only owns the protocol: one upload per run, parts numbered from 1, the
//! ordered part list on completion, cancellation on abort.

use bytes::Bytes;

use crate::error::Result;
use crate::pipeline::writer::Writer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    pub part_number: u32,
    pub etag: String,
}

pub trait MultipartClient {
    /// Start an upload, returning its id.
    fn create(&mut self, bucket: &str, key: &str) -> Result<String>;

    /// Upload one part, returning its ETag.
    fn upload_part(
        &mut self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        body: Bytes,
    ) -> Result<String>;

    fn complete(
        &mut self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<()>;

    fn abort(&mut self, bucket: &str, key: &str, upload_id: &str) -> Result<()>;
}

impl<C: MultipartClient + ?Sized> MultipartClient for &mut C {
    fn create(&mut self, bucket: &str, key: &str) -> Result<String> {
        (**self).create(bucket, key)
    }

    fn upload_part(
        &mut self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        body: Bytes,
    ) -> Result<String> {
        (**self).upload_part(bucket, key, upload_id, part_number, body)
    }

    fn complete(
        &mut self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: &[CompletedPart],
    ) -> Result<()> {
        (**self).complete(bucket, key, upload_id, parts)
    }

    fn abort(&mut self, bucket: &str, key: &str, upload_id: &str) -> Result<()> {
        (**self).abort(bucket, key, upload_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub bucket: String,
    pub key: String,
    pub upload_id: String,
    pub parts: Vec<CompletedPart>,
    pub bytes: usize,
    /// `false` when nothing was written and the upload was cancelled instead.
    pub completed: bool,
}

/// Writes each non-empty chunk as one part of a multipart upload.
///
/// Services usually require every part but the last to have a minimum size;
/// wrap this writer in a [`BufferedWriter`](crate::store::buffered::BufferedWriter)
/// to get parts of a fixed size.
pub struct MultipartUploadWriter<C> {
    client: C,
    bucket: String,
    key: String,
    upload_id: String,
    parts: Vec<CompletedPart>,
    bytes: usize,
    completed: bool,
    closed: bool,
}

impl<C: MultipartClient> MultipartUploadWriter<C> {
    /// Starts the upload right away.
    pub fn create(mut client: C, bucket: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        let key = key.into();
        let upload_id = client.create(&bucket, &key)?;
        Ok(Self {
            client,
            bucket,
            key,
            upload_id,
            parts: Vec::new(),
            bytes: 0,
            completed: false,
            closed: false,
        })
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    pub fn parts(&self) -> &[CompletedPart] {
        &self.parts
    }

    fn cancel(&mut self) -> Result<()> {
        self.closed = true;
        self.client.abort(&self.bucket, &self.key, &self.upload_id)
    }
}

impl<C: MultipartClient> Writer for MultipartUploadWriter<C> {
    type Chunk = Bytes;
    type Output = UploadSummary;

    fn write(&mut self, chunk: Bytes) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        let part_number = self.parts.len() as u32 + 1;
        let size = chunk.len();
        let etag = self.client.upload_part(
            &self.bucket,
            &self.key,
            &self.upload_id,
            part_number,
            chunk,
        )?;

        #[cfg(feature = "tracing")]
        tracing::event!(tracing::Level::DEBUG, event = "tubing.s3.part", key = %self.key, part_number, size, "tubing.s3.part");

        self.bytes += size;
        self.parts.push(CompletedPart { part_number, etag });
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.parts.is_empty() {
            return self.cancel();
        }
        self.client
            .complete(&self.bucket, &self.key, &self.upload_id, &self.parts)?;
        self.completed = true;
        self.closed = true;
        Ok(())
    }

    fn abort(&mut self) {
        if self.closed {
            return;
        }
        if let Err(_err) = self.cancel() {
            #[cfg(feature = "tracing")]
            tracing::event!(tracing::Level::WARN, event = "tubing.s3.abort_failed", upload_id = %self.upload_id, error = %_err, "tubing.s3.abort_failed");
        }
    }

    fn into_output(self) -> UploadSummary {
        UploadSummary {
            bucket: self.bucket,
            key: self.key,
            upload_id: self.upload_id,
            parts: self.parts,
            bytes: self.bytes,
            completed: self.completed,
        }
    }
}
