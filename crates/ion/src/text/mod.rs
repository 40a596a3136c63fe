//! The text codec: tokenizer, parser, and emitter.

pub mod reader;
pub mod scanner;
pub mod writer;

pub use reader::RawTextReader;
pub use scanner::{Scanner, Token};
pub use writer::RawTextWriter;
