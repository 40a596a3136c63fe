//! Streaming reader/writer for the Ion data format.
//!
//! Ion is a richly-typed, self-describing serialization format with two
//! isomorphic encodings: a compact binary form and a human-readable text
//! form. This crate reads and writes both with bit-exact fidelity.
//!
//! # Overview
//!
//! - [`Reader`] - pull cursor over binary or text input (`next`,
//!   `step_in`, `step_out`, typed reads)
//! - [`Writer`] - typed value writer producing binary or text
//! - [`Element`] / [`Value`] - owned value trees
//! - [`SymbolTable`] / [`Catalog`] - symbol interning and import
//!   resolution
//! - [`IonInt`], [`Decimal`], [`Timestamp`] - the arbitrary-precision
//!   scalar types
//! - [`InputStream`] / [`OutputStream`] - paged byte streams
//!
//! # Example
//!
//! ```
//! use ion_kit::{Reader, ReaderOptions, Writer, WriterOptions, IonType};
//!
//! // Parse text, re-encode as binary.
//! let mut reader = Reader::for_slice(b"{a:1, b:[2, 3]}", ReaderOptions::default()).unwrap();
//! let mut writer = Writer::new(WriterOptions {
//!     output_as_binary: true,
//!     ..WriterOptions::default()
//! });
//! writer.write_all_values(&mut reader).unwrap();
//! let binary = writer.finish().unwrap();
//! assert_eq!(&binary[0..4], &[0xe0, 0x01, 0x00, 0xea]);
//!
//! // And read it back.
//! let mut reader = Reader::for_bytes(binary, ReaderOptions::default()).unwrap();
//! assert_eq!(reader.next().unwrap(), Some(IonType::Struct));
//! ```

pub mod binary;
pub mod catalog;
pub mod decimal;
pub mod element;
pub mod error;
pub mod int;
pub mod ion_type;
pub mod options;
pub mod reader;
pub mod stream;
pub mod symtab;
pub mod text;
pub mod timestamp;
pub mod writer;

pub use catalog::Catalog;
pub use decimal::Decimal;
pub use element::{Element, Value};
pub use error::{IonError, IonResult, Position};
pub use int::{IonInt, Sign};
pub use ion_type::{IonType, Sid, SymbolToken};
pub use options::{ReaderOptions, WriterOptions};
pub use reader::Reader;
pub use stream::{InputStream, OutputStream, StreamSink, StreamSource};
pub use symtab::{system_symbol_table, Import, ImportSpec, SymbolTable};
pub use timestamp::{Timestamp, TsPrecision};
pub use writer::Writer;
