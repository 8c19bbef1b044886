use std::marker::PhantomData;

use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;
use crate::pipeline::stage::{Stage, StageSpec};

/// Serializes each object into one compact JSON record, order preserved.
pub struct JsonEncode<T> {
    _marker: PhantomData<fn(T)>,
}

impl<T> JsonEncode<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonEncode<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> Stage for JsonEncode<T> {
    type Input = Vec<T>;
    type Output = Vec<Bytes>;

    fn name(&self) -> &'static str {
        "json_encode"
    }

    fn transform(&mut self, chunk: Vec<T>) -> Result<Vec<Bytes>> {
        chunk
            .iter()
            .map(|obj| -> Result<Bytes> { Ok(Bytes::from(serde_json::to_vec(obj)?)) })
            .collect()
    }
}

pub fn json_encode<T: Serialize>() -> StageSpec<fn() -> JsonEncode<T>> {
    StageSpec::new(JsonEncode::<T>::new as fn() -> JsonEncode<T>)
}
