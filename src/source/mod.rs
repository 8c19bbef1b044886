//! Readers that originate a stream.

pub mod cursor;
pub mod io;
pub mod memory;
