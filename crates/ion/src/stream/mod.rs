//! Byte streams with paging, marks, and pushback.
//!
//! Readers pull from an [`InputStream`], writers push into an
//! [`OutputStream`]. Both buffer through fixed-size pages drawn from the
//! arena's thread-local pool, so stream buffers and arena blocks recycle
//! through the same free list.

mod input;
mod output;
mod source;

pub use input::InputStream;
pub use output::OutputStream;
pub use source::{StreamSink, StreamSource};
