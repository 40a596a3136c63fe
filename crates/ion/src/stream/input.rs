//! Paged input stream with marks, pushback, and seek.

use super::source::StreamSource;
use crate::error::{IonError, IonResult};
use ion_kit_arena::pool;
use ion_kit_collections::HashIndex;

struct PageSlot {
    page_id: u64,
    buf: Box<[u8]>,
    /// Count of valid bytes at the front of `buf`.
    limit: usize,
}

/// A forward reader with bounded pushback, marks with rewind, and seek
/// where the backing source permits.
///
/// The stream materializes the source one fixed-size page at a time. Pages
/// are indexed by `page_id = offset / page_size`, so stepping backwards
/// (pushback, mark rewind, seek) rediscovers a cached page instead of
/// touching the source. Pages behind the read point are recycled unless a
/// mark pins them or the stream is configured to buffer everything.
pub struct InputStream {
    source: StreamSource,
    pages: Vec<Option<PageSlot>>,
    free_slots: Vec<usize>,
    index: HashIndex<u64, usize>,
    page_size: usize,
    pos: u64,
    /// Known end-of-input offset, once the source has reported it.
    end: Option<u64>,
    /// Next offset a sequential source read will produce.
    source_pos: u64,
    mark: Option<u64>,
    buffer_all: bool,
    last_read: Option<u8>,
    /// One-byte synthesized page for pushback past the cached window.
    pushback: Option<(u64, u8)>,
}

impl InputStream {
    /// Opens over a back-end with the pool's page size.
    pub fn new(source: StreamSource) -> Self {
        Self::with_page_size(source, pool::page_size())
    }

    /// Opens with an explicit page size (pages outside the pool size come
    /// from the system allocator instead of the pool).
    pub fn with_page_size(source: StreamSource, page_size: usize) -> Self {
        Self {
            source,
            pages: Vec::new(),
            free_slots: Vec::new(),
            index: HashIndex::new(),
            page_size: page_size.max(1),
            pos: 0,
            end: None,
            source_pos: 0,
            mark: None,
            buffer_all: false,
            last_read: None,
            pushback: None,
        }
    }

    /// Opens over an owned byte vector.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(StreamSource::Memory(bytes))
    }

    /// Opens over a borrowed slice, copying it.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes.to_vec())
    }

    /// Keeps every materialized page for the stream's lifetime.
    pub fn buffer_all(mut self) -> Self {
        self.buffer_all = true;
        self
    }

    /// Current logical read position.
    pub fn position(&self) -> u64 {
        self.pos
    }

    fn alloc_buf(&self) -> Box<[u8]> {
        if self.page_size == pool::page_size() {
            pool::acquire()
        } else {
            vec![0u8; self.page_size].into_boxed_slice()
        }
    }

    fn free_buf(&self, buf: Box<[u8]>) {
        if buf.len() == pool::page_size() {
            pool::release(buf);
        }
    }

    /// Finds or creates the slot for a page, without filling it.
    fn slot_for(&mut self, page_id: u64) -> usize {
        if let Some(&idx) = self.index.find(&page_id) {
            return idx;
        }
        let slot = PageSlot {
            page_id,
            buf: self.alloc_buf(),
            limit: 0,
        };
        let idx = match self.free_slots.pop() {
            Some(idx) => {
                self.pages[idx] = Some(slot);
                idx
            }
            None => {
                self.pages.push(Some(slot));
                self.pages.len() - 1
            }
        };
        self.index.upsert(page_id, idx);
        idx
    }

    /// Pulls more source bytes into a page. Returns `false` at end of
    /// input, `true` when the page grew.
    fn fill_page(&mut self, idx: usize) -> IonResult<bool> {
        let (page_id, limit) = {
            let slot = self.pages[idx].as_ref().ok_or(IonError::ParserInternal)?;
            (slot.page_id, slot.limit)
        };
        let want = page_id * self.page_size as u64 + limit as u64;
        if let Some(end) = self.end {
            if want >= end {
                return Ok(false);
            }
        }
        if self.source_pos != want {
            match &self.source {
                StreamSource::Memory(_) => self.source_pos = want,
                _ if want > self.source_pos => {
                    // Forward gap: drain and discard.
                    let mut scratch = [0u8; 512];
                    while self.source_pos < want {
                        let gap = (want - self.source_pos).min(scratch.len() as u64) as usize;
                        let n = self.source.read(self.source_pos, &mut scratch[..gap])?;
                        if n == 0 {
                            self.end = Some(self.source_pos);
                            return Ok(false);
                        }
                        self.source_pos += n as u64;
                    }
                }
                _ => {
                    self.source.seek(want)?;
                    self.source_pos = want;
                }
            }
        }
        let slot = self.pages[idx].as_mut().ok_or(IonError::ParserInternal)?;
        let n = self.source.read(self.source_pos, &mut slot.buf[limit..])?;
        if n == 0 {
            self.end = Some(want);
            return Ok(false);
        }
        slot.limit += n;
        self.source_pos += n as u64;
        Ok(true)
    }

    /// Recycles pages behind the read point that nothing pins.
    fn evict(&mut self) {
        if self.buffer_all {
            return;
        }
        let current = self.pos / self.page_size as u64;
        let mut pin = current.saturating_sub(1);
        if let Some(mark) = self.mark {
            pin = pin.min(mark / self.page_size as u64);
        }
        for idx in 0..self.pages.len() {
            let stale = match &self.pages[idx] {
                Some(slot) => slot.page_id < pin,
                None => false,
            };
            if stale {
                let slot = self.pages[idx].take().unwrap();
                self.index.delete(&slot.page_id);
                self.free_buf(slot.buf);
                self.free_slots.push(idx);
            }
        }
    }

    /// Reads one byte; `None` at end of input.
    pub fn read_byte(&mut self) -> IonResult<Option<u8>> {
        if let Some((at, byte)) = self.pushback {
            if at == self.pos {
                self.pushback = None;
                self.pos += 1;
                self.last_read = Some(byte);
                return Ok(Some(byte));
            }
        }
        loop {
            if let Some(end) = self.end {
                if self.pos >= end {
                    return Ok(None);
                }
            }
            let page_id = self.pos / self.page_size as u64;
            let off = (self.pos % self.page_size as u64) as usize;
            let idx = self.slot_for(page_id);
            let slot = self.pages[idx].as_ref().ok_or(IonError::ParserInternal)?;
            if off < slot.limit {
                let byte = slot.buf[off];
                self.pos += 1;
                self.last_read = Some(byte);
                if off + 1 == self.page_size {
                    self.evict();
                }
                return Ok(Some(byte));
            }
            if !self.fill_page(idx)? {
                // End reached; the loop exits through the check above.
                if self.end.is_none() {
                    return Err(IonError::ParserInternal);
                }
            }
        }
    }

    /// Reads into `buf`, returning the byte count; zero only at EOF.
    pub fn read(&mut self, buf: &mut [u8]) -> IonResult<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.read_byte()? {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    /// Pushes back the byte most recently read.
    ///
    /// Only the byte just read may be unread, and only once; anything else
    /// is [`IonError::InvalidArg`]. The byte is served again by the next
    /// read even when its page has been recycled.
    pub fn unread_byte(&mut self, byte: u8) -> IonResult<()> {
        if self.pos == 0 || self.last_read != Some(byte) {
            return Err(IonError::InvalidArg);
        }
        self.pos -= 1;
        self.last_read = None;
        self.pushback = Some((self.pos, byte));
        Ok(())
    }

    /// Skips `n` bytes; fails with [`IonError::UnexpectedEof`] short.
    pub fn skip(&mut self, n: u64) -> IonResult<()> {
        for _ in 0..n {
            if self.read_byte()?.is_none() {
                return Err(IonError::UnexpectedEof);
            }
        }
        Ok(())
    }

    /// Repositions the stream.
    ///
    /// Backward movement needs a seekable back-end or a mark at or before
    /// the target (marked pages stay cached). Forward movement resolves
    /// lazily on the next read.
    pub fn seek(&mut self, pos: u64) -> IonResult<()> {
        let backward_ok =
            self.source.can_seek() || self.mark.is_some_and(|m| pos >= m);
        if pos < self.pos && !backward_ok {
            return Err(IonError::SeekError(std::io::ErrorKind::Unsupported));
        }
        self.pos = pos;
        self.last_read = None;
        Ok(())
    }

    /// Remembers the current position and pins pages from it forward.
    ///
    /// Marks do not nest: a second mark keeps the earlier position.
    pub fn mark(&mut self) {
        self.mark = Some(match self.mark {
            Some(existing) => existing.min(self.pos),
            None => self.pos,
        });
    }

    /// Rewinds to the mark.
    pub fn mark_rewind(&mut self) -> IonResult<()> {
        let mark = self.mark.ok_or(IonError::MarkNotSet)?;
        self.pos = mark;
        self.last_read = None;
        Ok(())
    }

    /// Releases the mark and lets its pages recycle.
    pub fn mark_clear(&mut self) {
        self.mark = None;
        self.evict();
    }

    /// Number of pages currently materialized.
    pub fn pages_cached(&self) -> usize {
        self.pages.iter().filter(|p| p.is_some()).count()
    }
}

impl Drop for InputStream {
    fn drop(&mut self) {
        for slot in self.pages.drain(..).flatten() {
            if slot.buf.len() == pool::page_size() {
                pool::release(slot.buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunked_source(data: &'static [u8], chunk: usize) -> StreamSource {
        let mut at = 0usize;
        StreamSource::Callback(Box::new(move |buf: &mut [u8]| {
            let n = chunk.min(buf.len()).min(data.len() - at);
            buf[..n].copy_from_slice(&data[at..at + n]);
            at += n;
            Ok(n)
        }))
    }

    #[test]
    fn reads_whole_input() {
        let mut stream = InputStream::with_page_size(StreamSource::Memory(b"hello".to_vec()), 2);
        let mut out = Vec::new();
        while let Some(byte) = stream.read_byte().unwrap() {
            out.push(byte);
        }
        assert_eq!(out, b"hello");
        assert_eq!(stream.read_byte().unwrap(), None);
        assert_eq!(stream.position(), 5);
    }

    #[test]
    fn unread_restores_position() {
        let mut stream = InputStream::from_slice(b"abc");
        for _ in 0..3 {
            let c = stream.read_byte().unwrap().unwrap();
            let before = stream.position();
            stream.unread_byte(c).unwrap();
            assert_eq!(stream.position(), before - 1);
            assert_eq!(stream.read_byte().unwrap(), Some(c));
        }
    }

    #[test]
    fn unread_rejects_the_wrong_byte() {
        let mut stream = InputStream::from_slice(b"ab");
        assert_eq!(stream.unread_byte(b'a'), Err(IonError::InvalidArg));
        let a = stream.read_byte().unwrap().unwrap();
        assert_eq!(stream.unread_byte(b'x'), Err(IonError::InvalidArg));
        stream.unread_byte(a).unwrap();
        // A second pushback without an intervening read is invalid.
        assert_eq!(stream.unread_byte(a), Err(IonError::InvalidArg));
    }

    #[test]
    fn mark_rewind_replays_bytes_across_pages() {
        let data: &'static [u8] = b"0123456789abcdefghij";
        let mut stream = InputStream::with_page_size(chunked_source(data, 3), 4);
        let mut first = Vec::new();
        for _ in 0..5 {
            first.push(stream.read_byte().unwrap().unwrap());
        }
        stream.mark();
        let mut marked = Vec::new();
        for _ in 0..10 {
            marked.push(stream.read_byte().unwrap().unwrap());
        }
        stream.mark_rewind().unwrap();
        let mut replay = Vec::new();
        for _ in 0..10 {
            replay.push(stream.read_byte().unwrap().unwrap());
        }
        assert_eq!(marked, replay);
        stream.mark_clear();
        assert_eq!(stream.mark_rewind(), Err(IonError::MarkNotSet));
    }

    #[test]
    fn second_mark_keeps_the_earlier_position() {
        let mut stream = InputStream::from_slice(b"abcdef");
        stream.read_byte().unwrap();
        stream.mark();
        stream.read_byte().unwrap();
        stream.read_byte().unwrap();
        stream.mark();
        stream.mark_rewind().unwrap();
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn seek_backward_needs_support() {
        let data: &'static [u8] = b"0123456789";
        let mut stream = InputStream::with_page_size(chunked_source(data, 4), 4);
        stream.skip(6).unwrap();
        assert!(stream.seek(0).is_err());
        let mut mem = InputStream::from_slice(b"0123456789");
        mem.skip(6).unwrap();
        mem.seek(2).unwrap();
        assert_eq!(mem.read_byte().unwrap(), Some(b'2'));
    }

    #[test]
    fn forward_seek_skips_lazily() {
        let data: &'static [u8] = b"0123456789";
        let mut stream = InputStream::with_page_size(chunked_source(data, 2), 4);
        stream.seek(7).unwrap();
        assert_eq!(stream.read_byte().unwrap(), Some(b'7'));
    }

    #[test]
    fn pages_recycle_without_a_mark() {
        let data: Vec<u8> = (0..=255u8).collect();
        let mut stream = InputStream::with_page_size(StreamSource::Memory(data), 8);
        for _ in 0..256 {
            stream.read_byte().unwrap();
        }
        assert!(stream.pages_cached() <= 3);
    }
}
