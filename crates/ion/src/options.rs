//! Reader and writer configuration.

use crate::catalog::Catalog;
use std::sync::Arc;

/// Reader knobs.
#[derive(Clone)]
pub struct ReaderOptions {
    /// Surface IVMs and symbol-table structs instead of consuming them.
    pub return_system_values: bool,
    /// Bound on container nesting.
    pub max_container_depth: usize,
    /// Bound on annotations per value.
    pub max_annotation_count: usize,
    /// Longest symbol or field name the reader will materialize.
    pub symbol_threshold: usize,
    /// Largest single allocation made on the caller's behalf; longer
    /// values must be read in chunks.
    pub user_value_threshold: usize,
    /// Size at which lob and string values switch to chunked reads.
    pub chunk_threshold: usize,
    /// Arena page size for the reader's pools.
    pub allocation_page_size: usize,
    /// Catalog used to resolve symbol-table imports.
    pub catalog: Option<Arc<Catalog>>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            return_system_values: false,
            max_container_depth: 10,
            max_annotation_count: 10,
            symbol_threshold: 512,
            user_value_threshold: 4096,
            chunk_threshold: 16384,
            allocation_page_size: 64 * 1024,
            catalog: None,
        }
    }
}

/// Writer knobs.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Binary emitter instead of text.
    pub output_as_binary: bool,
    /// Text emitter escapes every non-ASCII code point.
    pub escape_all_non_ascii: bool,
    /// Text emitter inserts newlines and indentation.
    pub pretty_print: bool,
    /// Text emitter flushes the stream after each top-level value.
    pub flush_every_value: bool,
    /// Bound on container nesting.
    pub max_container_depth: usize,
    /// Bound on annotations per value.
    pub max_annotation_count: usize,
    /// Arena page size for the writer's pools.
    pub allocation_page_size: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            output_as_binary: false,
            escape_all_non_ascii: false,
            pretty_print: false,
            flush_every_value: false,
            max_container_depth: 10,
            max_annotation_count: 10,
            allocation_page_size: 64 * 1024,
        }
    }
}
