use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::pipeline::stage::{Stage, StageSpec};

const DEFAULT_MAX_RECORD_BYTES: usize = 1024 * 1024;

/// Parses each raw record as one JSON document.
///
/// Empty records (blank lines, the trailing fragment after a final newline)
/// are skipped. A record that fails to parse fails the stage.
pub struct JsonDecode<T> {
    max_record_bytes: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDecode<T> {
    pub fn new() -> Self {
        Self {
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            _marker: PhantomData,
        }
    }

    /// Maximum number of bytes allowed for a single record.
    pub fn max_record_bytes(mut self, n: usize) -> Self {
        self.max_record_bytes = n;
        self
    }
}

impl<T> Default for JsonDecode<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> JsonDecode<T>
where
    T: DeserializeOwned,
{
    fn decode_record(&self, raw: &[u8]) -> Result<T> {
        if raw.len() > self.max_record_bytes {
            return Err(Error::stage(
                "json_decode",
                format!(
                    "record exceeded max_record_bytes ({} > {})",
                    raw.len(),
                    self.max_record_bytes
                ),
            ));
        }

        serde_json::from_slice::<T>(raw).map_err(|err| {
            Error::stage(
                "json_decode",
                format!(
                    "failed to parse record ({} bytes, preview: {:?}): {}",
                    raw.len(),
                    preview(raw),
                    err
                ),
            )
        })
    }
}

impl<T> Stage for JsonDecode<T>
where
    T: DeserializeOwned,
{
    type Input = Vec<Bytes>;
    type Output = Vec<T>;

    fn name(&self) -> &'static str {
        "json_decode"
    }

    fn transform(&mut self, chunk: Vec<Bytes>) -> Result<Vec<T>> {
        chunk
            .iter()
            .map(|raw| strip_cr(raw))
            .filter(|raw| !raw.is_empty())
            .map(|raw| self.decode_record(raw))
            .collect()
    }
}

pub fn json_decode<T: DeserializeOwned>() -> StageSpec<fn() -> JsonDecode<T>> {
    StageSpec::new(JsonDecode::<T>::new as fn() -> JsonDecode<T>)
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if let Some(stripped) = line.strip_suffix(b"\r") {
        stripped
    } else {
        line
    }
}

fn preview(line: &[u8]) -> String {
    const PREVIEW_LEN: usize = 80;
    let text = String::from_utf8_lossy(line);
    let escaped = text.replace('\n', "\\n").replace('\r', "\\r");
    let mut short = escaped.chars().take(PREVIEW_LEN).collect::<String>();
    if escaped.chars().count() > PREVIEW_LEN {
        short.push_str("...");
    }
    short
}
