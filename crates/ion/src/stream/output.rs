//! Buffered output stream.

use super::source::StreamSink;
use crate::error::{IonError, IonResult};
use ion_kit_arena::pool;

/// A write-through buffered sink.
///
/// Bytes collect in one pool page and drain to the back-end on overflow or
/// [`flush`](OutputStream::flush).
pub struct OutputStream {
    sink: StreamSink,
    buf: Box<[u8]>,
    len: usize,
    /// Bytes already handed to the sink.
    flushed: u64,
}

impl OutputStream {
    /// Opens over a sink.
    pub fn new(sink: StreamSink) -> Self {
        Self {
            sink,
            buf: pool::acquire(),
            len: 0,
            flushed: 0,
        }
    }

    /// Opens over a fresh in-memory sink.
    pub fn in_memory() -> Self {
        Self::new(StreamSink::Memory(Vec::new()))
    }

    /// Total bytes written so far.
    pub fn position(&self) -> u64 {
        self.flushed + self.len as u64
    }

    /// Writes one byte.
    pub fn write_byte(&mut self, byte: u8) -> IonResult<()> {
        if self.len == self.buf.len() {
            self.drain()?;
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Writes a byte run.
    pub fn write(&mut self, bytes: &[u8]) -> IonResult<()> {
        let mut rest = bytes;
        while !rest.is_empty() {
            if self.len == self.buf.len() {
                self.drain()?;
            }
            let n = rest.len().min(self.buf.len() - self.len);
            self.buf[self.len..self.len + n].copy_from_slice(&rest[..n]);
            self.len += n;
            rest = &rest[n..];
        }
        Ok(())
    }

    fn drain(&mut self) -> IonResult<()> {
        if self.len > 0 {
            self.sink.write_all(&self.buf[..self.len])?;
            self.flushed += self.len as u64;
            self.len = 0;
        }
        Ok(())
    }

    /// Drains the buffer and flushes the back-end.
    pub fn flush(&mut self) -> IonResult<()> {
        self.drain()?;
        self.sink.flush()
    }

    /// Discards everything written to an in-memory sink.
    pub fn truncate(&mut self) -> IonResult<()> {
        match &mut self.sink {
            StreamSink::Memory(data) => {
                data.clear();
                self.len = 0;
                self.flushed = 0;
                Ok(())
            }
            _ => Err(IonError::InvalidState),
        }
    }

    /// Flushes and returns the accumulated bytes of an in-memory sink.
    pub fn into_bytes(mut self) -> IonResult<Vec<u8>> {
        self.drain()?;
        match &mut self.sink {
            StreamSink::Memory(data) => Ok(std::mem::take(data)),
            _ => Err(IonError::InvalidState),
        }
    }

    /// Peeks at the bytes accumulated in an in-memory sink.
    pub fn bytes(&mut self) -> IonResult<&[u8]> {
        self.drain()?;
        match &self.sink {
            StreamSink::Memory(data) => Ok(data.as_slice()),
            _ => Err(IonError::InvalidState),
        }
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        let buf = std::mem::replace(&mut self.buf, Vec::new().into_boxed_slice());
        if buf.len() == pool::page_size() {
            pool::release(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_bytes_in_memory() {
        let mut out = OutputStream::in_memory();
        out.write_byte(b'a').unwrap();
        out.write(b"bcdef").unwrap();
        assert_eq!(out.position(), 6);
        assert_eq!(out.into_bytes().unwrap(), b"abcdef");
    }

    #[test]
    fn drains_through_a_callback() {
        use std::cell::RefCell;
        use std::rc::Rc;
        let collected = Rc::new(RefCell::new(Vec::new()));
        let sink_target = Rc::clone(&collected);
        let mut out = OutputStream::new(StreamSink::Callback(Box::new(move |bytes: &[u8]| {
            sink_target.borrow_mut().extend_from_slice(bytes);
            Ok(())
        })));
        let payload: Vec<u8> = (0..100_000).map(|i| (i % 251) as u8).collect();
        out.write(&payload).unwrap();
        out.flush().unwrap();
        assert_eq!(&*collected.borrow(), &payload);
    }

    #[test]
    fn truncate_resets_memory_sinks() {
        let mut out = OutputStream::in_memory();
        out.write(b"scratch").unwrap();
        out.truncate().unwrap();
        out.write(b"kept").unwrap();
        assert_eq!(out.into_bytes().unwrap(), b"kept");
    }
}
