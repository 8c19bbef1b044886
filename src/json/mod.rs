//! JSON records: one document per record, typically framed by
//! [`Split`](crate::text::Split) / [`Join`](crate::text::Join).

mod decode;
mod encode;

pub use decode::{json_decode, JsonDecode};
pub use encode::{json_encode, JsonEncode};
