//! Writers that terminate a stream.

pub mod buffered;
pub mod http;
pub mod io;
pub mod memory;
