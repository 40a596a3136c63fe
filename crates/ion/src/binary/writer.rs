//! Raw binary writer: stages container bodies, patches lengths on close.

use super::constants::{type_code, IVM, LEN_IS_NULL, LEN_IS_VAR, VAR_INT_NEGATIVE_ZERO};
use super::var::{write_int_parts, write_uint, write_var_int_parts, write_var_uint, uint_len};
use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::int::IonInt;
use crate::ion_type::{IonType, Sid};
use crate::stream::OutputStream;
use crate::timestamp::{Timestamp, TsPrecision};

struct Container {
    ty: Option<IonType>,
    buf: Vec<u8>,
    field_sid: Option<Sid>,
    annotations: Vec<Sid>,
}

/// The binary staging writer.
///
/// Binary lengths precede bodies, so every container writes its children
/// into its own buffer; closing the container computes the final length
/// and splices descriptor plus body into the parent. `flush` emits the
/// whole staged datagram behind an IVM.
pub struct RawBinaryWriter {
    stack: Vec<Container>,
    pending_field: Option<Sid>,
    pending_annotations: Vec<Sid>,
}

fn push_descriptor(buf: &mut Vec<u8>, code: u8, len: u64) {
    if len < LEN_IS_VAR as u64 {
        buf.push((code << 4) | len as u8);
    } else {
        buf.push((code << 4) | LEN_IS_VAR);
        write_var_uint(buf, len);
    }
}

impl Default for RawBinaryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl RawBinaryWriter {
    pub fn new() -> Self {
        Self {
            stack: vec![Container {
                ty: None,
                buf: Vec::new(),
                field_sid: None,
                annotations: Vec::new(),
            }],
            pending_field: None,
            pending_annotations: Vec::new(),
        }
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Declares the field SID for the next value (struct context only).
    pub fn set_field_sid(&mut self, sid: Sid) {
        self.pending_field = Some(sid);
    }

    /// Adds an annotation SID to the next value.
    pub fn add_annotation_sid(&mut self, sid: Sid) {
        self.pending_annotations.push(sid);
    }

    /// Whether anything is staged at top level.
    pub fn has_staged_values(&self) -> bool {
        !self.stack[0].buf.is_empty()
    }

    fn take_pending(&mut self) -> (Option<Sid>, Vec<Sid>) {
        (
            self.pending_field.take(),
            std::mem::take(&mut self.pending_annotations),
        )
    }

    /// Splices one encoded value (descriptor and body) into the open
    /// container, applying the field SID and annotation wrapper.
    fn commit(&mut self, field: Option<Sid>, annotations: Vec<Sid>, encoded: &[u8]) -> IonResult<()> {
        let parent = self.stack.last_mut().ok_or(IonError::InvalidState)?;
        match (parent.ty, field) {
            (Some(IonType::Struct), Some(sid)) => write_var_uint(&mut parent.buf, sid as u64),
            (Some(IonType::Struct), None) => return Err(IonError::InvalidState),
            (_, Some(_)) => return Err(IonError::InvalidState),
            (_, None) => {}
        }
        if annotations.is_empty() {
            parent.buf.extend_from_slice(encoded);
            return Ok(());
        }
        let mut sid_bytes = Vec::new();
        for sid in &annotations {
            write_var_uint(&mut sid_bytes, *sid as u64);
        }
        let annot_len = sid_bytes.len() as u64;
        let mut annot_len_image = Vec::new();
        write_var_uint(&mut annot_len_image, annot_len);
        let total = annot_len_image.len() as u64 + annot_len + encoded.len() as u64;
        push_descriptor(&mut parent.buf, type_code::ANNOTATION, total);
        parent.buf.extend_from_slice(&annot_len_image);
        parent.buf.extend_from_slice(&sid_bytes);
        parent.buf.extend_from_slice(encoded);
        Ok(())
    }

    fn write_scalar(&mut self, encode: impl FnOnce(&mut Vec<u8>)) -> IonResult<()> {
        let (field, annotations) = self.take_pending();
        let mut encoded = Vec::new();
        encode(&mut encoded);
        self.commit(field, annotations, &encoded)
    }

    /// Opens a container.
    pub fn step_in(&mut self, ty: IonType) -> IonResult<()> {
        if !ty.is_container() {
            return Err(IonError::InvalidArg);
        }
        let (field, annotations) = self.take_pending();
        if matches!(self.stack.last(), Some(c) if c.ty == Some(IonType::Struct))
            != field.is_some()
        {
            return Err(IonError::InvalidState);
        }
        self.stack.push(Container {
            ty: Some(ty),
            buf: Vec::new(),
            field_sid: field,
            annotations,
        });
        Ok(())
    }

    /// Closes the open container and splices it into its parent.
    pub fn step_out(&mut self) -> IonResult<()> {
        if self.stack.len() < 2 {
            return Err(IonError::InvalidState);
        }
        let frame = self.stack.pop().ok_or(IonError::InvalidState)?;
        let code = match frame.ty {
            Some(IonType::List) => type_code::LIST,
            Some(IonType::Sexp) => type_code::SEXP,
            Some(IonType::Struct) => type_code::STRUCT,
            _ => return Err(IonError::InvalidState),
        };
        let mut encoded = Vec::with_capacity(frame.buf.len() + 4);
        // A struct whose length nibble would be 1 must use the VarUInt
        // form; nibble 1 is reserved for sorted structs.
        if code == type_code::STRUCT && frame.buf.len() == 1 {
            encoded.push((code << 4) | LEN_IS_VAR);
            write_var_uint(&mut encoded, 1);
        } else {
            push_descriptor(&mut encoded, code, frame.buf.len() as u64);
        }
        encoded.extend_from_slice(&frame.buf);
        self.commit(frame.field_sid, frame.annotations, &encoded)
    }

    pub fn write_null(&mut self, ty: IonType) -> IonResult<()> {
        let code = match ty {
            IonType::Null => type_code::NULL,
            IonType::Bool => type_code::BOOL,
            IonType::Int => type_code::POS_INT,
            IonType::Float => type_code::FLOAT,
            IonType::Decimal => type_code::DECIMAL,
            IonType::Timestamp => type_code::TIMESTAMP,
            IonType::Symbol => type_code::SYMBOL,
            IonType::String => type_code::STRING,
            IonType::Clob => type_code::CLOB,
            IonType::Blob => type_code::BLOB,
            IonType::List => type_code::LIST,
            IonType::Sexp => type_code::SEXP,
            IonType::Struct => type_code::STRUCT,
        };
        self.write_scalar(|buf| buf.push((code << 4) | LEN_IS_NULL))
    }

    pub fn write_bool(&mut self, value: bool) -> IonResult<()> {
        self.write_scalar(|buf| buf.push((type_code::BOOL << 4) | value as u8))
    }

    pub fn write_int(&mut self, value: &IonInt) -> IonResult<()> {
        let code = if value.is_negative() {
            type_code::NEG_INT
        } else {
            type_code::POS_INT
        };
        let magnitude = if value.is_zero() {
            Vec::new()
        } else {
            value.to_unsigned_bytes()
        };
        self.write_scalar(|buf| {
            push_descriptor(buf, code, magnitude.len() as u64);
            buf.extend_from_slice(&magnitude);
        })
    }

    pub fn write_i64(&mut self, value: i64) -> IonResult<()> {
        let code = if value < 0 {
            type_code::NEG_INT
        } else {
            type_code::POS_INT
        };
        let magnitude = value.unsigned_abs();
        self.write_scalar(|buf| {
            push_descriptor(buf, code, uint_len(magnitude) as u64);
            write_uint(buf, magnitude);
        })
    }

    pub fn write_f32(&mut self, value: f32) -> IonResult<()> {
        self.write_scalar(|buf| {
            if value == 0.0 && value.is_sign_positive() {
                buf.push(type_code::FLOAT << 4);
            } else {
                buf.push((type_code::FLOAT << 4) | 4);
                buf.extend_from_slice(&value.to_be_bytes());
            }
        })
    }

    pub fn write_f64(&mut self, value: f64) -> IonResult<()> {
        self.write_scalar(|buf| {
            if value == 0.0 && value.is_sign_positive() {
                buf.push(type_code::FLOAT << 4);
            } else {
                buf.push((type_code::FLOAT << 4) | 8);
                buf.extend_from_slice(&value.to_be_bytes());
            }
        })
    }

    pub fn write_decimal(&mut self, value: &Decimal) -> IonResult<()> {
        let mut body = Vec::new();
        if !(value.is_zero() && !value.is_negative() && value.exponent() == 0) {
            write_var_int_parts(
                &mut body,
                value.exponent() < 0,
                value.exponent().unsigned_abs() as u64,
            );
            write_int_parts(&mut body, value.is_negative(), value.coefficient());
        }
        self.write_scalar(|buf| {
            push_descriptor(buf, type_code::DECIMAL, body.len() as u64);
            buf.extend_from_slice(&body);
        })
    }

    pub fn write_timestamp(&mut self, value: &Timestamp) -> IonResult<()> {
        let mut body = Vec::new();
        match value.offset_minutes() {
            None => body.push(VAR_INT_NEGATIVE_ZERO),
            Some(minutes) => {
                write_var_int_parts(&mut body, minutes < 0, minutes.unsigned_abs() as u64)
            }
        }
        write_var_uint(&mut body, value.year() as u64);
        let precision = value.precision();
        if precision >= TsPrecision::Month {
            write_var_uint(&mut body, value.month() as u64);
        }
        if precision >= TsPrecision::Day {
            write_var_uint(&mut body, value.day() as u64);
        }
        if precision >= TsPrecision::Minute {
            write_var_uint(&mut body, value.hour() as u64);
            write_var_uint(&mut body, value.minute() as u64);
        }
        if precision >= TsPrecision::Second {
            write_var_uint(&mut body, value.second() as u64);
        }
        if let Some(fraction) = value.fraction() {
            write_var_int_parts(
                &mut body,
                fraction.exponent() < 0,
                fraction.exponent().unsigned_abs() as u64,
            );
            write_int_parts(&mut body, false, fraction.coefficient());
        }
        self.write_scalar(|buf| {
            push_descriptor(buf, type_code::TIMESTAMP, body.len() as u64);
            buf.extend_from_slice(&body);
        })
    }

    pub fn write_symbol_sid(&mut self, sid: Sid) -> IonResult<()> {
        self.write_scalar(|buf| {
            push_descriptor(buf, type_code::SYMBOL, uint_len(sid as u64) as u64);
            write_uint(buf, sid as u64);
        })
    }

    pub fn write_string(&mut self, text: &str) -> IonResult<()> {
        self.write_scalar(|buf| {
            push_descriptor(buf, type_code::STRING, text.len() as u64);
            buf.extend_from_slice(text.as_bytes());
        })
    }

    pub fn write_clob(&mut self, bytes: &[u8]) -> IonResult<()> {
        self.write_scalar(|buf| {
            push_descriptor(buf, type_code::CLOB, bytes.len() as u64);
            buf.extend_from_slice(bytes);
        })
    }

    pub fn write_blob(&mut self, bytes: &[u8]) -> IonResult<()> {
        self.write_scalar(|buf| {
            push_descriptor(buf, type_code::BLOB, bytes.len() as u64);
            buf.extend_from_slice(bytes);
        })
    }

    /// Emits the staged datagram: IVM, the symbol-table image when one is
    /// supplied, then every staged top-level value. A no-op when nothing
    /// is staged.
    pub fn flush(
        &mut self,
        out: &mut OutputStream,
        symtab_image: Option<&[u8]>,
    ) -> IonResult<()> {
        if self.depth() != 0 {
            return Err(IonError::InvalidState);
        }
        if !self.has_staged_values() {
            return Ok(());
        }
        out.write(&IVM)?;
        if let Some(image) = symtab_image {
            out.write(image)?;
        }
        out.write(&self.stack[0].buf)?;
        self.stack[0].buf.clear();
        out.flush()
    }

    /// Hands back the staged top-level bytes without the IVM framing.
    pub fn take_staged(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.stack[0].buf)
    }
}
