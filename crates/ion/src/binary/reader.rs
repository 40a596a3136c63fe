//! Raw binary reader: descriptor-driven cursor over an input stream.

use super::constants::{type_code, IVM, LEN_IS_NULL, LEN_IS_VAR};
use super::var::{read_int_parts, read_uint, read_var_int_parts, read_var_uint};
use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::int::IonInt;
use crate::ion_type::{IonType, Sid};
use crate::stream::InputStream;
use crate::timestamp::Timestamp;

/// What the cursor stopped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    /// A value of the given type is current.
    Value(IonType),
    /// An Ion version marker; the symbol-table context resets.
    Ivm,
}

struct Frame {
    ty: IonType,
    end: u64,
}

struct Current {
    ty: IonType,
    is_null: bool,
    bool_value: bool,
    negative: bool,
    is_sorted_struct: bool,
    body_start: u64,
    body_len: u64,
    /// End of the whole encoding, annotation wrapper included.
    skip_end: u64,
    consumed: bool,
    chunk_read: u64,
}

/// The binary cursor.
///
/// An explicit iterative state machine: a stack of container end offsets
/// plus a descriptor for the current value. No recursion, so a partially
/// read value never holds a call frame.
pub struct RawBinaryReader {
    stream: InputStream,
    stack: Vec<Frame>,
    value: Option<Current>,
    field_sid: Option<Sid>,
    annotations: Vec<Sid>,
}

impl RawBinaryReader {
    pub fn new(stream: InputStream) -> Self {
        Self {
            stream,
            stack: Vec::new(),
            value: None,
            field_sid: None,
            annotations: Vec::new(),
        }
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Byte offset the cursor will read next.
    pub fn offset(&self) -> u64 {
        self.stream.position()
    }

    fn read_length(&mut self, nibble: u8) -> IonResult<u64> {
        if nibble == LEN_IS_VAR {
            read_var_uint(&mut self.stream)
        } else {
            Ok(nibble as u64)
        }
    }

    fn container_end(&self) -> Option<u64> {
        self.stack.last().map(|f| f.end)
    }

    /// Advances to the next value at the current depth.
    ///
    /// Returns `None` at the end of the current container (the cursor
    /// stays inside; `step_out` leaves) and at the end of the stream at
    /// top level. NOP padding is consumed silently.
    pub fn next(&mut self) -> IonResult<Option<RawEvent>> {
        if let Some(value) = self.value.take() {
            if !value.consumed {
                let pos = self.stream.position();
                if value.skip_end > pos {
                    self.stream.skip(value.skip_end - pos)?;
                }
            }
        }
        self.field_sid = None;
        self.annotations.clear();
        loop {
            if let Some(end) = self.container_end() {
                if self.stream.position() >= end {
                    return Ok(None);
                }
            }
            let in_struct = matches!(self.stack.last(), Some(f) if f.ty == IonType::Struct);
            if in_struct {
                self.field_sid = Some(read_var_uint(&mut self.stream)? as Sid);
            }
            let descriptor = match self.stream.read_byte()? {
                Some(byte) => byte,
                None if self.stack.is_empty() && self.field_sid.is_none() => return Ok(None),
                None => return Err(IonError::UnexpectedEof),
            };
            match self.parse_descriptor(descriptor, true)? {
                Parsed::Value(current) => {
                    if let Some(end) = self.container_end() {
                        if current.skip_end > end {
                            return Err(IonError::UnexpectedEof);
                        }
                    }
                    let ty = current.ty;
                    self.value = Some(current);
                    return Ok(Some(RawEvent::Value(ty)));
                }
                Parsed::Ivm => {
                    if !self.stack.is_empty() {
                        return Err(IonError::InvalidToken);
                    }
                    return Ok(Some(RawEvent::Ivm));
                }
                Parsed::Pad => continue,
            }
        }
    }

    fn parse_descriptor(&mut self, descriptor: u8, allow_wrappers: bool) -> IonResult<Parsed> {
        let code = descriptor >> 4;
        let nibble = descriptor & 0x0f;
        if code == type_code::ANNOTATION {
            if !allow_wrappers {
                return Err(IonError::InvalidToken);
            }
            if nibble == 0 {
                // Top-level 0xE0 opens a version marker.
                let mut rest = [0u8; 3];
                if self.stream.read(&mut rest)? != 3 {
                    return Err(IonError::UnexpectedEof);
                }
                if rest != IVM[1..] {
                    return Err(IonError::InvalidToken);
                }
                return Ok(Parsed::Ivm);
            }
            let total = self.read_length(nibble)?;
            let wrapper_end = self.stream.position() + total;
            let annot_len = read_var_uint(&mut self.stream)?;
            let annot_end = self.stream.position() + annot_len;
            self.annotations.clear();
            while self.stream.position() < annot_end {
                self.annotations.push(read_var_uint(&mut self.stream)? as Sid);
            }
            if self.annotations.is_empty() {
                return Err(IonError::InvalidToken);
            }
            let inner = self
                .stream
                .read_byte()?
                .ok_or(IonError::UnexpectedEof)?;
            // An annotation must wrap one concrete value.
            return match self.parse_descriptor(inner, false)? {
                Parsed::Value(mut current) => {
                    if current.skip_end > wrapper_end {
                        return Err(IonError::UnexpectedEof);
                    }
                    current.skip_end = wrapper_end;
                    Ok(Parsed::Value(current))
                }
                _ => Err(IonError::InvalidToken),
            };
        }
        let (ty, negative) = match code {
            type_code::NULL => {
                if nibble == LEN_IS_NULL {
                    (IonType::Null, false)
                } else {
                    // NOP padding.
                    let len = self.read_length(nibble)?;
                    self.stream.skip(len)?;
                    return Ok(Parsed::Pad);
                }
            }
            type_code::BOOL => (IonType::Bool, false),
            type_code::POS_INT => (IonType::Int, false),
            type_code::NEG_INT => (IonType::Int, true),
            type_code::FLOAT => (IonType::Float, false),
            type_code::DECIMAL => (IonType::Decimal, false),
            type_code::TIMESTAMP => (IonType::Timestamp, false),
            type_code::SYMBOL => (IonType::Symbol, false),
            type_code::STRING => (IonType::String, false),
            type_code::CLOB => (IonType::Clob, false),
            type_code::BLOB => (IonType::Blob, false),
            type_code::LIST => (IonType::List, false),
            type_code::SEXP => (IonType::Sexp, false),
            type_code::STRUCT => (IonType::Struct, false),
            _ => return Err(IonError::InvalidToken),
        };
        if nibble == LEN_IS_NULL {
            let start = self.stream.position();
            return Ok(Parsed::Value(Current {
                ty,
                is_null: true,
                bool_value: false,
                negative: false,
                is_sorted_struct: false,
                body_start: start,
                body_len: 0,
                skip_end: start,
                consumed: true,
                chunk_read: 0,
            }));
        }
        let mut is_sorted_struct = false;
        let mut bool_value = false;
        let body_len = match ty {
            IonType::Bool => {
                bool_value = match nibble {
                    0 => false,
                    1 => true,
                    _ => return Err(IonError::InvalidToken),
                };
                0
            }
            IonType::Float => match nibble {
                0 => 0,
                4 => 4,
                8 => 8,
                _ => return Err(IonError::InvalidToken),
            },
            IonType::Int if negative && nibble == 0 => {
                // `0x30` would be negative zero.
                return Err(IonError::InvalidToken);
            }
            IonType::Struct if nibble == 1 => {
                // Sorted-by-field-SID: the length always follows as a
                // VarUInt. Accepted on read, never produced.
                is_sorted_struct = true;
                read_var_uint(&mut self.stream)?
            }
            _ => self.read_length(nibble)?,
        };
        let body_start = self.stream.position();
        Ok(Parsed::Value(Current {
            ty,
            is_null: false,
            bool_value,
            negative,
            is_sorted_struct,
            body_start,
            body_len,
            skip_end: body_start + body_len,
            consumed: body_len == 0,
            chunk_read: 0,
        }))
    }

    fn current(&self) -> IonResult<&Current> {
        self.value.as_ref().ok_or(IonError::InvalidState)
    }

    /// Type of the current value.
    pub fn ion_type(&self) -> Option<IonType> {
        self.value.as_ref().map(|v| v.ty)
    }

    /// Whether the current value is a (typed) null.
    pub fn is_null(&self) -> bool {
        self.value.as_ref().is_some_and(|v| v.is_null)
    }

    /// Whether the current struct was declared sorted by field SID.
    pub fn is_sorted_struct(&self) -> bool {
        self.value.as_ref().is_some_and(|v| v.is_sorted_struct)
    }

    /// Field SID of the current value when inside a struct.
    pub fn field_sid(&self) -> Option<Sid> {
        self.field_sid
    }

    /// Annotation SIDs of the current value, outermost first.
    pub fn annotations(&self) -> &[Sid] {
        &self.annotations
    }

    /// Body length of the current value in bytes.
    pub fn value_len(&self) -> u64 {
        self.value.as_ref().map_or(0, |v| v.body_len)
    }

    /// Enters the current container.
    pub fn step_in(&mut self) -> IonResult<()> {
        let value = self.current()?;
        if !value.ty.is_container() || value.is_null {
            return Err(IonError::InvalidState);
        }
        let frame = Frame {
            ty: value.ty,
            end: value.body_start + value.body_len,
        };
        self.value = None;
        self.field_sid = None;
        self.annotations.clear();
        self.stack.push(frame);
        Ok(())
    }

    /// Leaves the current container, skipping unread children.
    pub fn step_out(&mut self) -> IonResult<()> {
        let frame = self.stack.pop().ok_or(IonError::InvalidState)?;
        let pos = self.stream.position();
        if frame.end > pos {
            self.stream.skip(frame.end - pos)?;
        }
        self.value = None;
        self.field_sid = None;
        self.annotations.clear();
        Ok(())
    }

    fn take_scalar(&mut self, expect: IonType) -> IonResult<Current> {
        let value = self.value.take().ok_or(IonError::InvalidState)?;
        if value.ty != expect || value.is_null {
            self.value = Some(value);
            return Err(IonError::InvalidState);
        }
        Ok(value)
    }

    fn body_bytes(&mut self, value: &Current) -> IonResult<Vec<u8>> {
        let mut bytes = vec![0u8; value.body_len as usize];
        if self.stream.read(&mut bytes)? != bytes.len() {
            return Err(IonError::UnexpectedEof);
        }
        Ok(bytes)
    }

    pub fn read_bool(&mut self) -> IonResult<bool> {
        let value = self.take_scalar(IonType::Bool)?;
        Ok(value.bool_value)
    }

    pub fn read_int(&mut self) -> IonResult<IonInt> {
        let value = self.take_scalar(IonType::Int)?;
        let bytes = self.body_bytes(&value)?;
        Ok(IonInt::from_unsigned_bytes(&bytes, value.negative))
    }

    pub fn read_i64(&mut self) -> IonResult<i64> {
        self.read_int()?.to_i64()
    }

    pub fn read_f64(&mut self) -> IonResult<f64> {
        let value = self.take_scalar(IonType::Float)?;
        let bytes = self.body_bytes(&value)?;
        Ok(match bytes.len() {
            0 => 0.0,
            4 => f32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            8 => f64::from_be_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
            _ => return Err(IonError::InvalidToken),
        })
    }

    pub fn read_decimal(&mut self) -> IonResult<Decimal> {
        let value = self.take_scalar(IonType::Decimal)?;
        if value.body_len == 0 {
            return Ok(Decimal::zero());
        }
        let end = value.body_start + value.body_len;
        let (exp_negative, exp_magnitude) = read_var_int_parts(&mut self.stream)?;
        if exp_magnitude > i32::MAX as u64 {
            return Err(IonError::NumericOverflow);
        }
        let exponent: i64 = if exp_negative {
            -(exp_magnitude as i64)
        } else {
            exp_magnitude as i64
        };
        let exponent = exponent as i32;
        let coefficient_len = end.saturating_sub(self.stream.position());
        let (negative, coefficient) = read_int_parts(&mut self.stream, coefficient_len)?;
        Ok(Decimal::from_parts(negative, coefficient, exponent))
    }

    pub fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        let value = self.take_scalar(IonType::Timestamp)?;
        let end = value.body_start + value.body_len;
        let (off_negative, off_magnitude) = read_var_int_parts(&mut self.stream)?;
        let offset = if off_negative && off_magnitude == 0 {
            None
        } else {
            let minutes = off_magnitude as i64 * if off_negative { -1 } else { 1 };
            if minutes <= -(24 * 60) || minutes >= 24 * 60 {
                return Err(IonError::InvalidTimestamp);
            }
            Some(minutes as i16)
        };
        let year = read_var_uint(&mut self.stream)?;
        if year == 0 || year > 9999 {
            return Err(IonError::InvalidTimestamp);
        }
        let mut parts = [0u64; 5];
        let mut have = 0usize;
        while have < 5 && self.stream.position() < end {
            parts[have] = read_var_uint(&mut self.stream)?;
            have += 1;
        }
        let ts = match have {
            0 => Timestamp::for_year(year as u16)?,
            1 => Timestamp::for_month(year as u16, parts[0] as u8)?,
            2 => Timestamp::for_day(year as u16, parts[0] as u8, parts[1] as u8)?,
            3 => return Err(IonError::InvalidTimestamp),
            4 => Timestamp::for_minute(
                year as u16,
                parts[0] as u8,
                parts[1] as u8,
                parts[2] as u8,
                parts[3] as u8,
                offset,
            )?,
            _ => {
                let ts = Timestamp::for_second(
                    year as u16,
                    parts[0] as u8,
                    parts[1] as u8,
                    parts[2] as u8,
                    parts[3] as u8,
                    parts[4] as u8,
                    offset,
                )?;
                if self.stream.position() < end {
                    let (exp_negative, exp_magnitude) = read_var_int_parts(&mut self.stream)?;
                    let exponent = if exp_negative {
                        -(exp_magnitude as i64)
                    } else {
                        exp_magnitude as i64
                    };
                    if !(-64..=0).contains(&exponent) {
                        return Err(IonError::InvalidTimestamp);
                    }
                    let coefficient_len = end.saturating_sub(self.stream.position());
                    let (frac_negative, coefficient) =
                        read_int_parts(&mut self.stream, coefficient_len)?;
                    if frac_negative && !coefficient.is_zero() {
                        return Err(IonError::InvalidTimestamp);
                    }
                    if exponent < 0 {
                        ts.with_fraction(Decimal::from_parts(
                            false,
                            coefficient,
                            exponent as i32,
                        ))?
                    } else {
                        ts
                    }
                } else {
                    ts
                }
            }
        };
        Ok(ts)
    }

    pub fn read_symbol_sid(&mut self) -> IonResult<Sid> {
        let value = self.take_scalar(IonType::Symbol)?;
        let sid = read_uint(&mut self.stream, value.body_len)?;
        if sid > Sid::MAX as u64 {
            return Err(IonError::NumericOverflow);
        }
        Ok(sid as Sid)
    }

    pub fn read_string(&mut self) -> IonResult<String> {
        let value = self.take_scalar(IonType::String)?;
        let bytes = self.body_bytes(&value)?;
        String::from_utf8(bytes).map_err(|_| IonError::InvalidUtf8)
    }

    /// Reads a clob or blob body whole.
    pub fn read_lob(&mut self) -> IonResult<Vec<u8>> {
        let value = self.value.take().ok_or(IonError::InvalidState)?;
        if !value.ty.is_lob() || value.is_null {
            self.value = Some(value);
            return Err(IonError::InvalidState);
        }
        self.body_bytes(&value)
    }

    /// Reads up to `buf.len()` bytes of a string/clob/blob body.
    ///
    /// Returns the byte count and whether more remain; the value stays
    /// current until the last chunk is taken.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> IonResult<(usize, bool)> {
        let value = self.value.as_mut().ok_or(IonError::InvalidState)?;
        if !(value.ty.is_lob() || value.ty == IonType::String) || value.is_null {
            return Err(IonError::InvalidState);
        }
        let remaining = value.body_len - value.chunk_read;
        let want = (buf.len() as u64).min(remaining) as usize;
        let n = self.stream.read(&mut buf[..want])?;
        if n < want {
            return Err(IonError::UnexpectedEof);
        }
        value.chunk_read += n as u64;
        let more = value.chunk_read < value.body_len;
        if !more {
            value.consumed = true;
        }
        Ok((n, more))
    }
}

enum Parsed {
    Value(Current),
    Ivm,
    Pad,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> RawBinaryReader {
        RawBinaryReader::new(InputStream::from_slice(bytes))
    }

    #[test]
    fn ivm_then_small_int() {
        let mut r = reader(&[0xe0, 0x01, 0x00, 0xea, 0x21, 0x07]);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Ivm));
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Int)));
        assert_eq!(r.read_i64().unwrap(), 7);
        assert_eq!(r.next().unwrap(), None);
    }

    #[test]
    fn negative_zero_int_is_rejected() {
        let mut r = reader(&[0x30]);
        assert_eq!(r.next(), Err(IonError::InvalidToken));
    }

    #[test]
    fn typed_nulls() {
        let mut r = reader(&[0x0f, 0x2f, 0xdf]);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Null)));
        assert!(r.is_null());
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Int)));
        assert!(r.is_null());
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Struct)));
        assert!(r.is_null());
        assert_eq!(r.next().unwrap(), None);
    }

    #[test]
    fn bools_and_floats() {
        let mut r = reader(&[0x10, 0x11, 0x40]);
        r.next().unwrap();
        assert!(!r.read_bool().unwrap());
        r.next().unwrap();
        assert!(r.read_bool().unwrap());
        r.next().unwrap();
        assert_eq!(r.read_f64().unwrap(), 0.0);
    }

    #[test]
    fn nested_containers() {
        // [1, [2]] encoded by hand:
        //   list len 6: 21 01, list len 2: 21 02
        let mut r = reader(&[0xb6, 0x21, 0x01, 0xb2, 0x21, 0x02]);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::List)));
        r.step_in().unwrap();
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Int)));
        assert_eq!(r.read_i64().unwrap(), 1);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::List)));
        r.step_in().unwrap();
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Int)));
        assert_eq!(r.read_i64().unwrap(), 2);
        assert_eq!(r.next().unwrap(), None);
        r.step_out().unwrap();
        assert_eq!(r.next().unwrap(), None);
        r.step_out().unwrap();
        assert_eq!(r.next().unwrap(), None);
    }

    #[test]
    fn struct_fields_carry_sids() {
        // {$4: "x"} — field SID 4, one-char string.
        let mut r = reader(&[0xd3, 0x84, 0x81, b'x']);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Struct)));
        r.step_in().unwrap();
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::String)));
        assert_eq!(r.field_sid(), Some(4));
        assert_eq!(r.read_string().unwrap(), "x");
        assert_eq!(r.next().unwrap(), None);
    }

    #[test]
    fn annotations_are_surfaced() {
        // $4::7 — annot wrapper len 4: annot_len 1, sid 4, int 7.
        let mut r = reader(&[0xe4, 0x81, 0x84, 0x21, 0x07]);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Int)));
        assert_eq!(r.annotations(), &[4]);
        assert_eq!(r.read_i64().unwrap(), 7);
    }

    #[test]
    fn skipping_unread_values() {
        let mut r = reader(&[0xb3, 0x21, 0x01, 0x10, 0x21, 0x09]);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::List)));
        // Never step in; the whole list is skipped.
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Int)));
        assert_eq!(r.read_i64().unwrap(), 9);
    }

    #[test]
    fn nop_padding_is_whitespace() {
        let mut r = reader(&[0x00, 0x03, 0xaa, 0xbb, 0xcc, 0x21, 0x05]);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Int)));
        assert_eq!(r.read_i64().unwrap(), 5);
    }

    #[test]
    fn truncated_value_is_unexpected_eof() {
        let mut r = reader(&[0x26, 0x01, 0x02]);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Int)));
        assert_eq!(r.read_int(), Err(IonError::UnexpectedEof));
    }

    #[test]
    fn chunked_lob_reads() {
        let mut bytes = vec![0xae, 0x90];
        bytes.extend((0u8..16).map(|i| i * 3));
        let mut r = reader(&bytes);
        assert_eq!(r.next().unwrap(), Some(RawEvent::Value(IonType::Blob)));
        let mut out = Vec::new();
        let mut chunk = [0u8; 5];
        loop {
            let (n, more) = r.read_chunk(&mut chunk).unwrap();
            out.extend_from_slice(&chunk[..n]);
            if !more {
                break;
            }
        }
        assert_eq!(out, (0u8..16).map(|i| i * 3).collect::<Vec<_>>());
        assert_eq!(r.next().unwrap(), None);
    }
}
