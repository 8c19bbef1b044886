//! Elasticsearch bulk indexing.
//!
//! [`BulkBatcher`] turns [`DocUpdate`]s into NDJSON bulk bodies of a fixed
//! number of updates; [`BulkWriter`] POSTs each body to the `_bulk` endpoint.
//!
//! ```no_run
//! use tubing::prelude::*;
//! use tubing::ext::elasticsearch::{BulkBatcher, BulkConfig, BulkWriter, DocUpdate};
//! use tubing::source::memory::Objects;
//!
//! # fn demo<T: tubing::http::Transport>(docs: Vec<DocUpdate>, transport: T) -> tubing::error::Result<()> {
//! let config = BulkConfig::new("http://localhost:9200", "media", "doc");
//! let summary = Objects::new(docs)
//!     .pipe(BulkBatcher::new(500))
//!     .sink(BulkWriter::new(config, transport))?;
//! println!("{} batches", summary.batches);
//! # Ok(())
//! # }
//! ```

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{basic_auth, Transport};
use crate::pipeline::stage::Stage;
use crate::pipeline::writer::Writer;
use crate::store::http::check_status;

pub const DEFAULT_BULK_BATCH_SIZE: usize = 7500;

/// One document update in a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub struct DocUpdate {
    pub id: String,
    pub doc: Value,
    pub doc_type: String,
    pub parent_id: Option<String>,
    pub doc_as_upsert: bool,
}

#[derive(Serialize)]
struct Action<'a> {
    update: ActionMeta<'a>,
}

#[derive(Serialize)]
struct ActionMeta<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    #[serde(rename = "_type")]
    doc_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    doc: &'a Value,
    doc_as_upsert: bool,
}

impl DocUpdate {
    /// An upsert of `doc` under `id`.
    pub fn new(id: impl Into<String>, doc: Value, doc_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            doc,
            doc_type: doc_type.into(),
            parent_id: None,
            doc_as_upsert: true,
        }
    }

    pub fn parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn doc_as_upsert(mut self, yes: bool) -> Self {
        self.doc_as_upsert = yes;
        self
    }

    /// The action line and the body line, each newline-terminated.
    pub fn to_ndjson(&self) -> Result<Vec<u8>> {
        let action = Action {
            update: ActionMeta {
                id: &self.id,
                doc_type: &self.doc_type,
                parent: self.parent_id.as_deref(),
            },
        };
        let body = UpdateBody {
            doc: &self.doc,
            doc_as_upsert: self.doc_as_upsert,
        };

        let mut out = serde_json::to_vec(&action)?;
        out.push(b'\n');
        serde_json::to_writer(&mut out, &body)?;
        out.push(b'\n');
        Ok(out)
    }
}

/// Groups serialized updates into bulk bodies of `batch_size` updates.
///
/// Each output element is one complete body; a shorter remainder body is
/// emitted on finalize, and nothing at all if the remainder is empty.
pub struct BulkBatcher {
    batch_size: usize,
    pending: BytesMut,
    pending_docs: usize,
}

impl BulkBatcher {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pending: BytesMut::new(),
            pending_docs: 0,
        }
    }

    pub fn pending_docs(&self) -> usize {
        self.pending_docs
    }

    fn flush(&mut self) -> Bytes {
        self.pending_docs = 0;
        self.pending.split().freeze()
    }
}

impl Default for BulkBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BULK_BATCH_SIZE)
    }
}

impl Stage for BulkBatcher {
    type Input = Vec<DocUpdate>;
    type Output = Vec<Bytes>;

    fn name(&self) -> &'static str {
        "bulk_batcher"
    }

    fn transform(&mut self, chunk: Vec<DocUpdate>) -> Result<Vec<Bytes>> {
        let mut batches = Vec::new();
        for doc in &chunk {
            self.pending.extend_from_slice(&doc.to_ndjson()?);
            self.pending_docs += 1;
            if self.pending_docs == self.batch_size {
                batches.push(self.flush());
            }
        }
        Ok(batches)
    }

    /// Emits nothing, rather than an empty body, when the updates divided
    /// evenly into batches.
    fn finalize(&mut self) -> Result<Vec<Bytes>> {
        if self.pending_docs == 0 {
            return Ok(Vec::new());
        }
        Ok(vec![self.flush()])
    }
}

/// Where and as whom to send bulk requests.
#[derive(Debug, Clone)]
pub struct BulkConfig {
    pub base_url: String,
    pub index: String,
    pub doc_type: String,
    pub credentials: Option<(String, String)>,
}

impl BulkConfig {
    pub fn new(
        base_url: impl Into<String>,
        index: impl Into<String>,
        doc_type: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            index: index.into(),
            doc_type: doc_type.into(),
            credentials: None,
        }
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    pub fn url(&self) -> String {
        format!(
            "{}/{}/{}/_bulk",
            self.base_url.trim_end_matches('/'),
            self.index,
            self.doc_type
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSummary {
    pub batches: usize,
    /// Batches the service reported item errors for, when those are tolerated.
    pub failed_batches: usize,
}

#[derive(Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

impl BulkResponse {
    fn error_reasons(&self, limit: usize) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| item.as_object()?.values().next()?.get("error").cloned())
            .take(limit)
            .map(|err| match err.get("reason").and_then(Value::as_str) {
                Some(reason) => reason.to_string(),
                None => err.to_string(),
            })
            .collect()
    }
}

/// POSTs bulk bodies and checks the service's per-item verdict.
///
/// By default a response with `"errors": true` fails the run with
/// [`Error::Service`]. With `fail_on_errors(false)` it is logged and counted
/// in [`BulkSummary::failed_batches`] instead.
pub struct BulkWriter<T> {
    url: String,
    headers: Vec<(String, String)>,
    transport: T,
    fail_on_errors: bool,
    summary: BulkSummary,
}

impl<T: Transport> BulkWriter<T> {
    pub fn new(config: BulkConfig, transport: T) -> Self {
        let mut headers = vec![(
            "Content-Type".to_string(),
            "application/x-ndjson".to_string(),
        )];
        if let Some((user, pass)) = &config.credentials {
            headers.push(("Authorization".to_string(), basic_auth(user, pass)));
        }
        Self {
            url: config.url(),
            headers,
            transport,
            fail_on_errors: true,
            summary: BulkSummary::default(),
        }
    }

    pub fn fail_on_errors(mut self, yes: bool) -> Self {
        self.fail_on_errors = yes;
        self
    }

    fn post_batch(&mut self, body: &[u8]) -> Result<()> {
        let resp = self.transport.post(&self.url, &self.headers, body)?;
        check_status(&self.url, &resp)?;
        self.summary.batches += 1;

        let parsed: BulkResponse = serde_json::from_str(&resp.body)?;
        if !parsed.errors {
            return Ok(());
        }

        let reasons = parsed.error_reasons(3).join("; ");
        if self.fail_on_errors {
            return Err(Error::service("elasticsearch", reasons));
        }

        #[cfg(feature = "tracing")]
        tracing::event!(tracing::Level::WARN, event = "tubing.bulk.errors", url = %self.url, reasons = %reasons, "tubing.bulk.errors");
        self.summary.failed_batches += 1;
        Ok(())
    }
}

impl<T: Transport> Writer for BulkWriter<T> {
    type Chunk = Vec<Bytes>;
    type Output = BulkSummary;

    fn write(&mut self, chunk: Vec<Bytes>) -> Result<()> {
        for body in chunk.iter().filter(|b| !b.is_empty()) {
            self.post_batch(body)?;
        }
        Ok(())
    }

    fn into_output(self) -> BulkSummary {
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn update_serializes_to_two_lines() {
        let du = DocUpdate::new("id1", json!({"name": "id1"}), "test-child")
            .parent("id0")
            .doc_as_upsert(false);
        let raw = du.to_ndjson().unwrap();
        let text = String::from_utf8(raw).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            serde_json::from_str::<Value>(lines[0]).unwrap(),
            json!({"update": {"_id": "id1", "_type": "test-child", "parent": "id0"}})
        );
        assert_eq!(
            serde_json::from_str::<Value>(lines[1]).unwrap(),
            json!({"doc": {"name": "id1"}, "doc_as_upsert": false})
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn batcher_holds_partial_batch_until_finalize() {
        let mut b = BulkBatcher::new(2);
        let docs = vec![
            DocUpdate::new("a", json!({}), "t"),
            DocUpdate::new("b", json!({}), "t"),
            DocUpdate::new("c", json!({}), "t"),
        ];
        assert_eq!(b.transform(docs).unwrap().len(), 1);
        assert_eq!(b.pending_docs(), 1);
        assert_eq!(b.finalize().unwrap().len(), 1);
        assert!(b.finalize().unwrap().is_empty());
    }

    #[test]
    fn url_joins_parts() {
        let cfg = BulkConfig::new("http://es:9200/", "media", "doc");
        assert_eq!(cfg.url(), "http://es:9200/media/doc/_bulk");
    }
}
