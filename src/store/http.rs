use bytes::Bytes;

use crate::error::{Error, Result};
use crate::http::{HttpResponse, Transport};
use crate::pipeline::writer::Writer;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostSummary {
    pub requests: usize,
    pub bytes: usize,
}

/// POSTs every non-empty chunk as one request body.
pub struct HttpPostWriter<T> {
    url: String,
    transport: T,
    headers: Vec<(String, String)>,
    summary: PostSummary,
}

impl<T: Transport> HttpPostWriter<T> {
    pub fn new(url: impl Into<String>, transport: T) -> Self {
        Self {
            url: url.into(),
            transport,
            headers: Vec::new(),
            summary: PostSummary::default(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

pub(crate) fn check_status(url: &str, resp: &HttpResponse) -> Result<()> {
    if resp.is_success() {
        return Ok(());
    }
    Err(Error::Http(format!(
        "POST {url} returned {}: {}",
        resp.status,
        resp.body.chars().take(200).collect::<String>()
    )))
}

impl<T: Transport> Writer for HttpPostWriter<T> {
    type Chunk = Bytes;
    type Output = PostSummary;

    fn write(&mut self, chunk: Bytes) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        let resp = self.transport.post(&self.url, &self.headers, &chunk)?;
        check_status(&self.url, &resp)?;

        self.summary.requests += 1;
        self.summary.bytes += chunk.len();
        Ok(())
    }

    fn into_output(self) -> PostSummary {
        self.summary
    }
}
