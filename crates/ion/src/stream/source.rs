//! Stream back-ends.

use crate::error::{IonError, IonResult};
use std::io::{Read, Seek, SeekFrom, Write};

/// Callback that refills the window it is handed; returns the byte count
/// produced, with zero meaning end of input.
pub type ReadHandler = Box<dyn FnMut(&mut [u8]) -> std::io::Result<usize>>;

/// Callback that drains the bytes it is handed.
pub type WriteHandler = Box<dyn FnMut(&[u8]) -> std::io::Result<()>>;

/// Where an [`super::InputStream`] gets its bytes.
pub enum StreamSource {
    /// A fixed in-memory buffer.
    Memory(Vec<u8>),
    /// A file handle; seekable.
    File(std::fs::File),
    /// A user callback; forward-only.
    Callback(ReadHandler),
}

impl StreamSource {
    /// Whether the back-end supports repositioning.
    pub fn can_seek(&self) -> bool {
        matches!(self, StreamSource::Memory(_) | StreamSource::File(_))
    }

    /// Reads at the back-end's current position. Zero means end of input.
    pub(crate) fn read(&mut self, pos: u64, buf: &mut [u8]) -> IonResult<usize> {
        match self {
            StreamSource::Memory(data) => {
                let at = (pos as usize).min(data.len());
                let n = (data.len() - at).min(buf.len());
                buf[..n].copy_from_slice(&data[at..at + n]);
                Ok(n)
            }
            StreamSource::File(file) => {
                file.read(buf).map_err(|e| IonError::ReadError(e.kind()))
            }
            StreamSource::Callback(handler) => {
                handler(buf).map_err(|e| IonError::ReadError(e.kind()))
            }
        }
    }

    /// Repositions a seekable back-end.
    pub(crate) fn seek(&mut self, pos: u64) -> IonResult<()> {
        match self {
            StreamSource::Memory(_) => Ok(()),
            StreamSource::File(file) => file
                .seek(SeekFrom::Start(pos))
                .map(|_| ())
                .map_err(|e| IonError::SeekError(e.kind())),
            StreamSource::Callback(_) => Err(IonError::SeekError(
                std::io::ErrorKind::Unsupported,
            )),
        }
    }
}

/// Where an [`super::OutputStream`] sends its bytes.
pub enum StreamSink {
    /// Accumulates in memory.
    Memory(Vec<u8>),
    /// A file handle.
    File(std::fs::File),
    /// A user callback handed each drained window.
    Callback(WriteHandler),
}

impl StreamSink {
    pub(crate) fn write_all(&mut self, bytes: &[u8]) -> IonResult<()> {
        match self {
            StreamSink::Memory(data) => {
                data.extend_from_slice(bytes);
                Ok(())
            }
            StreamSink::File(file) => file
                .write_all(bytes)
                .map_err(|e| IonError::WriteError(e.kind())),
            StreamSink::Callback(handler) => {
                handler(bytes).map_err(|e| IonError::WriteError(e.kind()))
            }
        }
    }

    pub(crate) fn flush(&mut self) -> IonResult<()> {
        match self {
            StreamSink::Memory(_) => Ok(()),
            StreamSink::File(file) => file.flush().map_err(|e| IonError::WriteError(e.kind())),
            StreamSink::Callback(_) => Ok(()),
        }
    }
}
