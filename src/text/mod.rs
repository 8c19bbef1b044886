//! Record framing for byte streams: split on a delimiter, join with a
//! separator.

mod join;
mod split;

pub use join::{join, Join, DEFAULT_JOIN_CHUNK_SIZE};
pub use split::{split, Split};
