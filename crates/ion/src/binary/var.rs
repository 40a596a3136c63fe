//! VarUInt / VarInt / UInt / Int field primitives.
//!
//! VarUInt and VarInt pack base-128 groups big-endian; the high bit of the
//! final octet is set. VarInt additionally spends bit 6 of the first octet
//! on the sign, so negative zero (used by unknown timestamp offsets) has a
//! one-byte image, `0xC0`. UInt and Int fields have externally known
//! lengths; Int carries its sign in the high bit of the first byte.

use crate::error::{IonError, IonResult};
use crate::int::IonInt;
use crate::stream::InputStream;

/// Reads a VarUInt capped at 64 bits.
pub fn read_var_uint(stream: &mut InputStream) -> IonResult<u64> {
    let mut value: u64 = 0;
    loop {
        let byte = stream.read_byte()?.ok_or(IonError::UnexpectedEof)?;
        if value > u64::MAX >> 7 {
            return Err(IonError::NumericOverflow);
        }
        value = (value << 7) | (byte & 0x7f) as u64;
        if byte & 0x80 != 0 {
            return Ok(value);
        }
    }
}

/// Reads a VarInt as sign and magnitude, preserving negative zero.
pub fn read_var_int_parts(stream: &mut InputStream) -> IonResult<(bool, u64)> {
    let first = stream.read_byte()?.ok_or(IonError::UnexpectedEof)?;
    let negative = first & 0x40 != 0;
    let mut value: u64 = (first & 0x3f) as u64;
    if first & 0x80 != 0 {
        return Ok((negative, value));
    }
    loop {
        let byte = stream.read_byte()?.ok_or(IonError::UnexpectedEof)?;
        if value > u64::MAX >> 7 {
            return Err(IonError::NumericOverflow);
        }
        value = (value << 7) | (byte & 0x7f) as u64;
        if byte & 0x80 != 0 {
            return Ok((negative, value));
        }
    }
}

/// Reads a VarInt capped at a signed 64-bit result.
pub fn read_var_int(stream: &mut InputStream) -> IonResult<i64> {
    let (negative, magnitude) = read_var_int_parts(stream)?;
    if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(IonError::NumericOverflow);
        }
        Ok((magnitude as i64).wrapping_neg())
    } else {
        if magnitude > i64::MAX as u64 {
            return Err(IonError::NumericOverflow);
        }
        Ok(magnitude as i64)
    }
}

/// Reads a `len`-byte UInt field.
pub fn read_uint(stream: &mut InputStream, len: u64) -> IonResult<u64> {
    if len > 8 {
        return Err(IonError::NumericOverflow);
    }
    let mut value: u64 = 0;
    for _ in 0..len {
        let byte = stream.read_byte()?.ok_or(IonError::UnexpectedEof)?;
        value = (value << 8) | byte as u64;
    }
    Ok(value)
}

/// Reads a `len`-byte UInt field of any width.
pub fn read_uint_big(stream: &mut InputStream, len: u64) -> IonResult<IonInt> {
    let mut bytes = vec![0u8; len as usize];
    let n = stream.read(&mut bytes)?;
    if n != bytes.len() {
        return Err(IonError::UnexpectedEof);
    }
    Ok(IonInt::from_unsigned_bytes(&bytes, false))
}

/// Reads a `len`-byte Int field (sign-magnitude) of any width.
///
/// Returns the sign separately so a negative-zero coefficient survives.
pub fn read_int_parts(stream: &mut InputStream, len: u64) -> IonResult<(bool, IonInt)> {
    if len == 0 {
        return Ok((false, IonInt::zero()));
    }
    let mut bytes = vec![0u8; len as usize];
    let n = stream.read(&mut bytes)?;
    if n != bytes.len() {
        return Err(IonError::UnexpectedEof);
    }
    let negative = bytes[0] & 0x80 != 0;
    bytes[0] &= 0x7f;
    Ok((negative, IonInt::from_unsigned_bytes(&bytes, negative)))
}

/// Byte length of a VarUInt image.
pub fn var_uint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros().min(63);
    (bits as usize).div_ceil(7)
}

/// Appends a VarUInt image.
pub fn write_var_uint(buf: &mut Vec<u8>, value: u64) {
    let len = var_uint_len(value);
    for at in (0..len).rev() {
        let group = ((value >> (7 * at)) & 0x7f) as u8;
        buf.push(if at == 0 { group | 0x80 } else { group });
    }
}

/// Appends a VarInt image from sign and magnitude.
pub fn write_var_int_parts(buf: &mut Vec<u8>, negative: bool, magnitude: u64) {
    let sign = if negative { 0x40u8 } else { 0 };
    if magnitude < 0x40 {
        buf.push(0x80 | sign | magnitude as u8);
        return;
    }
    // First octet holds six payload bits; the rest hold seven.
    let bits = 64 - magnitude.leading_zeros() as usize;
    let tail_octets = (bits - 6).div_ceil(7);
    buf.push(sign | ((magnitude >> (7 * tail_octets)) & 0x3f) as u8);
    for at in (0..tail_octets).rev() {
        let group = ((magnitude >> (7 * at)) & 0x7f) as u8;
        buf.push(if at == 0 { group | 0x80 } else { group });
    }
}

/// Appends a VarInt image.
pub fn write_var_int(buf: &mut Vec<u8>, value: i64) {
    write_var_int_parts(buf, value < 0, value.unsigned_abs());
}

/// Minimal byte length of a UInt image; zero takes zero bytes.
pub fn uint_len(value: u64) -> usize {
    ((64 - value.leading_zeros() as usize) + 7) / 8
}

/// Appends a minimal UInt image; zero appends nothing.
pub fn write_uint(buf: &mut Vec<u8>, value: u64) {
    for at in (0..uint_len(value)).rev() {
        buf.push((value >> (8 * at)) as u8);
    }
}

/// Appends an Int (sign-magnitude) image from sign and magnitude bytes.
///
/// Pads with a leading zero byte when the magnitude's high bit would be
/// read as the sign. A zero magnitude appends nothing when positive and
/// the single byte `0x80` when negative.
pub fn write_int_parts(buf: &mut Vec<u8>, negative: bool, magnitude: &IonInt) {
    if magnitude.is_zero() {
        if negative {
            buf.push(0x80);
        }
        return;
    }
    let bytes = magnitude.to_unsigned_bytes();
    let start = buf.len();
    if bytes[0] & 0x80 != 0 {
        buf.push(0);
    }
    buf.extend_from_slice(&bytes);
    if negative {
        buf[start] |= 0x80;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(bytes: &[u8]) -> InputStream {
        InputStream::from_slice(bytes)
    }

    #[test]
    fn var_uint_images() {
        let mut buf = Vec::new();
        write_var_uint(&mut buf, 0);
        assert_eq!(buf, [0x80]);
        buf.clear();
        write_var_uint(&mut buf, 127);
        assert_eq!(buf, [0xff]);
        buf.clear();
        write_var_uint(&mut buf, 128);
        assert_eq!(buf, [0x01, 0x80]);
    }

    #[test]
    fn var_uint_round_trip() {
        for value in [0u64, 1, 7, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            write_var_uint(&mut buf, value);
            assert_eq!(buf.len(), var_uint_len(value));
            assert_eq!(read_var_uint(&mut stream(&buf)).unwrap(), value, "{value}");
        }
    }

    #[test]
    fn var_int_round_trip() {
        for value in [0i64, 1, -1, 63, 64, -64, -65, 8191, -8192, i64::MAX, i64::MIN + 1] {
            let mut buf = Vec::new();
            write_var_int(&mut buf, value);
            assert_eq!(read_var_int(&mut stream(&buf)).unwrap(), value, "{value}");
        }
    }

    #[test]
    fn var_int_negative_zero() {
        let mut buf = Vec::new();
        write_var_int_parts(&mut buf, true, 0);
        assert_eq!(buf, [0xc0]);
        let (negative, magnitude) = read_var_int_parts(&mut stream(&buf)).unwrap();
        assert!(negative);
        assert_eq!(magnitude, 0);
    }

    #[test]
    fn uint_images_are_minimal() {
        let mut buf = Vec::new();
        write_uint(&mut buf, 0);
        assert!(buf.is_empty());
        write_uint(&mut buf, 7);
        assert_eq!(buf, [7]);
        buf.clear();
        write_uint(&mut buf, 0x1_00);
        assert_eq!(buf, [1, 0]);
    }

    #[test]
    fn int_field_sign_handling() {
        let mut buf = Vec::new();
        write_int_parts(&mut buf, true, &IonInt::from_u64(3));
        assert_eq!(buf, [0x83]);
        let (neg, mag) = read_int_parts(&mut stream(&buf), 1).unwrap();
        assert!(neg);
        assert_eq!(mag.to_i64().unwrap(), -3);

        // Magnitude with the high bit set needs a pad byte.
        buf.clear();
        write_int_parts(&mut buf, false, &IonInt::from_u64(0x80));
        assert_eq!(buf, [0x00, 0x80]);
        let (neg, mag) = read_int_parts(&mut stream(&buf), 2).unwrap();
        assert!(!neg);
        assert_eq!(mag.to_i64().unwrap(), 0x80);

        // Negative zero coefficient image.
        buf.clear();
        write_int_parts(&mut buf, true, &IonInt::zero());
        assert_eq!(buf, [0x80]);
        let (neg, mag) = read_int_parts(&mut stream(&buf), 1).unwrap();
        assert!(neg);
        assert!(mag.is_zero());
    }

    #[test]
    fn unexpected_eof_inside_a_field() {
        assert_eq!(
            read_var_uint(&mut stream(&[0x01])),
            Err(IonError::UnexpectedEof)
        );
        assert_eq!(
            read_uint(&mut stream(&[0x01]), 2),
            Err(IonError::UnexpectedEof)
        );
    }

    #[test]
    fn var_uint_overflow_is_detected() {
        // Eleven continuation octets exceed 64 bits.
        let bytes = [0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0xff];
        assert_eq!(
            read_var_uint(&mut stream(&bytes)),
            Err(IonError::NumericOverflow)
        );
    }
}
