//! Text emitter.

use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::int::IonInt;
use crate::ion_type::{IonType, Sid};
use crate::stream::OutputStream;
use crate::timestamp::Timestamp;
use ion_kit_base64::{to_base64, Base64Encoder};

const INDENT: &str = "  ";

/// Words an unquoted symbol must not spell.
fn is_reserved_word(text: &str) -> bool {
    if matches!(text, "true" | "false" | "nan" | "null") {
        return true;
    }
    match text.strip_prefix("null.") {
        Some(rest) => IonType::from_keyword(rest).is_some(),
        None => false,
    }
}

/// Whether symbol text can be emitted bare.
fn is_identifier(text: &str) -> bool {
    let mut bytes = text.bytes();
    match bytes.next() {
        Some(c) if c.is_ascii_alphabetic() || c == b'_' || c == b'$' => {}
        _ => return false,
    }
    if !text
        .bytes()
        .all(|c| c.is_ascii_alphanumeric() || c == b'_' || c == b'$')
    {
        return false;
    }
    if is_reserved_word(text) {
        return false;
    }
    // `$` followed by digits only would read back as a SID literal.
    !(text.len() > 1
        && text.as_bytes()[0] == b'$'
        && text[1..].bytes().all(|c| c.is_ascii_digit()))
}

struct Frame {
    ty: IonType,
    count: usize,
}

enum LobState {
    Blob(Base64Encoder),
    Clob,
}

/// The text emitter.
///
/// Compact by default; `pretty` adds newlines and indentation. Escaping
/// follows the value kind: strings may pass non-ASCII through, clobs never
/// do.
pub struct RawTextWriter {
    out: OutputStream,
    pretty: bool,
    escape_non_ascii: bool,
    flush_every_value: bool,
    stack: Vec<Frame>,
    top_level_count: usize,
    pending_field: Option<String>,
    pending_field_sid: Option<Sid>,
    pending_annotations: Vec<String>,
    lob: Option<LobState>,
}

impl RawTextWriter {
    pub fn new(out: OutputStream) -> Self {
        Self {
            out,
            pretty: false,
            escape_non_ascii: false,
            flush_every_value: false,
            stack: Vec::new(),
            top_level_count: 0,
            pending_field: None,
            pending_field_sid: None,
            pending_annotations: Vec::new(),
            lob: None,
        }
    }

    pub fn pretty(mut self, on: bool) -> Self {
        self.pretty = on;
        self
    }

    pub fn escape_all_non_ascii(mut self, on: bool) -> Self {
        self.escape_non_ascii = on;
        self
    }

    pub fn flush_every_value(mut self, on: bool) -> Self {
        self.flush_every_value = on;
        self
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn set_field_name(&mut self, name: &str) {
        self.pending_field = Some(name.to_owned());
        self.pending_field_sid = None;
    }

    pub fn set_field_name_sid(&mut self, sid: Sid) {
        self.pending_field = None;
        self.pending_field_sid = Some(sid);
    }

    pub fn add_annotation(&mut self, text: &str) {
        self.pending_annotations.push(text.to_owned());
    }

    pub fn add_annotation_sid(&mut self, sid: Sid) {
        self.pending_annotations.push(format!("${sid}"));
    }

    fn emit(&mut self, text: &str) -> IonResult<()> {
        self.out.write(text.as_bytes())
    }

    fn newline_indent(&mut self, depth: usize) -> IonResult<()> {
        self.out.write_byte(b'\n')?;
        for _ in 0..depth {
            self.out.write(INDENT.as_bytes())?;
        }
        Ok(())
    }

    /// Separator before a value, then field name and annotations.
    fn begin_value(&mut self) -> IonResult<()> {
        if self.lob.is_some() {
            return Err(IonError::InvalidState);
        }
        let depth = self.stack.len();
        match self.stack.last() {
            None => {
                if self.top_level_count > 0 {
                    if self.pretty {
                        self.out.write_byte(b'\n')?;
                    } else {
                        self.out.write_byte(b' ')?;
                    }
                }
            }
            Some(frame) => {
                let first = frame.count == 0;
                match frame.ty {
                    IonType::Sexp => {
                        if !first {
                            self.out.write_byte(b' ')?;
                        } else if self.pretty {
                            self.newline_indent(depth)?;
                        }
                    }
                    _ => {
                        if !first {
                            self.out.write_byte(b',')?;
                        }
                        if self.pretty {
                            self.newline_indent(depth)?;
                        } else if !first {
                            self.out.write_byte(b' ')?;
                        }
                    }
                }
            }
        }
        let in_struct = matches!(self.stack.last(), Some(f) if f.ty == IonType::Struct);
        let field = self.pending_field.take();
        let field_sid = self.pending_field_sid.take();
        if in_struct {
            match (field, field_sid) {
                (Some(name), _) => {
                    self.emit_symbol_text(&name)?;
                }
                (None, Some(sid)) => {
                    let image = format!("${sid}");
                    self.emit(&image)?;
                }
                (None, None) => return Err(IonError::InvalidState),
            }
            self.emit(if self.pretty { ": " } else { ":" })?;
        } else if field.is_some() || field_sid.is_some() {
            return Err(IonError::InvalidState);
        }
        let annotations = std::mem::take(&mut self.pending_annotations);
        for annotation in &annotations {
            self.emit_symbol_text(annotation)?;
            self.emit("::")?;
        }
        Ok(())
    }

    fn end_value(&mut self) -> IonResult<()> {
        match self.stack.last_mut() {
            Some(frame) => frame.count += 1,
            None => {
                self.top_level_count += 1;
                if self.flush_every_value {
                    self.out.flush()?;
                }
            }
        }
        Ok(())
    }

    fn emit_symbol_text(&mut self, text: &str) -> IonResult<()> {
        if is_identifier(text) {
            return self.emit(text);
        }
        let mut quoted = String::with_capacity(text.len() + 2);
        quoted.push('\'');
        escape_into(&mut quoted, text.as_bytes(), b'\'', self.escape_non_ascii, false);
        quoted.push('\'');
        self.emit(&quoted)
    }

    pub fn step_in(&mut self, ty: IonType) -> IonResult<()> {
        if !ty.is_container() {
            return Err(IonError::InvalidArg);
        }
        self.begin_value()?;
        self.emit(match ty {
            IonType::List => "[",
            IonType::Sexp => "(",
            _ => "{",
        })?;
        self.stack.push(Frame { ty, count: 0 });
        Ok(())
    }

    pub fn step_out(&mut self) -> IonResult<()> {
        let frame = self.stack.pop().ok_or(IonError::InvalidState)?;
        if self.pretty && frame.count > 0 {
            self.newline_indent(self.stack.len())?;
        }
        self.emit(match frame.ty {
            IonType::List => "]",
            IonType::Sexp => ")",
            _ => "}",
        })?;
        self.end_value()
    }

    pub fn write_null(&mut self, ty: IonType) -> IonResult<()> {
        self.begin_value()?;
        match ty {
            IonType::Null => self.emit("null")?,
            other => {
                let image = format!("null.{}", other.keyword());
                self.emit(&image)?;
            }
        }
        self.end_value()
    }

    pub fn write_bool(&mut self, value: bool) -> IonResult<()> {
        self.begin_value()?;
        self.emit(if value { "true" } else { "false" })?;
        self.end_value()
    }

    pub fn write_i64(&mut self, value: i64) -> IonResult<()> {
        self.begin_value()?;
        self.emit(&value.to_string())?;
        self.end_value()
    }

    pub fn write_int(&mut self, value: &IonInt) -> IonResult<()> {
        self.begin_value()?;
        self.emit(&value.to_decimal_string())?;
        self.end_value()
    }

    pub fn write_f64(&mut self, value: f64) -> IonResult<()> {
        self.begin_value()?;
        let image = float_text(value);
        self.emit(&image)?;
        self.end_value()
    }

    pub fn write_f32(&mut self, value: f32) -> IonResult<()> {
        self.write_f64(value as f64)
    }

    pub fn write_decimal(&mut self, value: &Decimal) -> IonResult<()> {
        self.begin_value()?;
        self.emit(&value.to_text())?;
        self.end_value()
    }

    pub fn write_timestamp(&mut self, value: &Timestamp) -> IonResult<()> {
        self.begin_value()?;
        self.emit(&value.to_text())?;
        self.end_value()
    }

    pub fn write_symbol(&mut self, text: &str) -> IonResult<()> {
        self.begin_value()?;
        self.emit_symbol_text(text)?;
        self.end_value()
    }

    /// Emits `$N` for a symbol whose text is unknown.
    pub fn write_symbol_sid(&mut self, sid: Sid) -> IonResult<()> {
        self.begin_value()?;
        let image = format!("${sid}");
        self.emit(&image)?;
        self.end_value()
    }

    pub fn write_string(&mut self, text: &str) -> IonResult<()> {
        self.begin_value()?;
        let mut quoted = String::with_capacity(text.len() + 2);
        quoted.push('"');
        escape_into(&mut quoted, text.as_bytes(), b'"', self.escape_non_ascii, false);
        quoted.push('"');
        self.emit(&quoted)?;
        self.end_value()
    }

    pub fn write_clob(&mut self, bytes: &[u8]) -> IonResult<()> {
        self.begin_value()?;
        let mut image = String::with_capacity(bytes.len() + 8);
        image.push_str("{{\"");
        escape_into(&mut image, bytes, b'"', true, true);
        image.push_str("\"}}");
        self.emit(&image)?;
        self.end_value()
    }

    pub fn write_blob(&mut self, bytes: &[u8]) -> IonResult<()> {
        self.begin_value()?;
        let mut image = String::with_capacity(bytes.len() * 4 / 3 + 8);
        image.push_str("{{");
        image.push_str(&to_base64(bytes));
        image.push_str("}}");
        self.emit(&image)?;
        self.end_value()
    }

    /// Opens a streaming lob; feed it with [`append_lob`](Self::append_lob).
    pub fn begin_lob(&mut self, ty: IonType) -> IonResult<()> {
        if self.lob.is_some() {
            return Err(IonError::InvalidState);
        }
        self.begin_value()?;
        match ty {
            IonType::Blob => {
                self.emit("{{")?;
                self.lob = Some(LobState::Blob(Base64Encoder::new()));
            }
            IonType::Clob => {
                self.emit("{{\"")?;
                self.lob = Some(LobState::Clob);
            }
            _ => return Err(IonError::InvalidArg),
        }
        Ok(())
    }

    /// Appends bytes of any granularity to the open lob.
    pub fn append_lob(&mut self, bytes: &[u8]) -> IonResult<()> {
        let mut image = String::new();
        match self.lob.as_mut().ok_or(IonError::InvalidState)? {
            LobState::Blob(encoder) => encoder.push(bytes, &mut image),
            LobState::Clob => escape_into(&mut image, bytes, b'"', true, true),
        }
        self.out.write(image.as_bytes())
    }

    /// Closes the streaming lob, emitting base64 padding as needed.
    pub fn end_lob(&mut self) -> IonResult<()> {
        let mut image = String::new();
        match self.lob.take().ok_or(IonError::InvalidState)? {
            LobState::Blob(mut encoder) => {
                encoder.finish(&mut image);
                image.push_str("}}");
            }
            LobState::Clob => image.push_str("\"}}"),
        }
        self.emit(&image)?;
        self.end_value()
    }

    pub fn flush(&mut self) -> IonResult<()> {
        self.out.flush()
    }

    /// Flushes and hands back the in-memory sink's bytes.
    pub fn into_bytes(mut self) -> IonResult<Vec<u8>> {
        self.out.flush()?;
        self.out.into_bytes()
    }
}

/// Renders a float with a mandatory exponent marker.
fn float_text(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+inf" } else { "-inf" }.to_owned();
    }
    format!("{value:e}")
}

/// Escapes `bytes` into `out` for a quoted context.
///
/// `byte_wise` treats the input as opaque bytes (clobs): everything
/// non-printable goes out as `\xHH` and `escape_non_ascii` is implied.
fn escape_into(out: &mut String, bytes: &[u8], quote: u8, escape_non_ascii: bool, byte_wise: bool) {
    use std::fmt::Write;
    if byte_wise {
        for &b in bytes {
            match b {
                0x00 => out.push_str("\\0"),
                0x07 => out.push_str("\\a"),
                0x08 => out.push_str("\\b"),
                b'\t' => out.push_str("\\t"),
                b'\n' => out.push_str("\\n"),
                0x0b => out.push_str("\\v"),
                0x0c => out.push_str("\\f"),
                b'\r' => out.push_str("\\r"),
                b'\\' => out.push_str("\\\\"),
                b if b == quote => {
                    out.push('\\');
                    out.push(b as char);
                }
                0x20..=0x7e => out.push(b as char),
                b => {
                    let _ = write!(out, "\\x{b:02x}");
                }
            }
        }
        return;
    }
    // Text mode walks code points so non-ASCII can pass through whole.
    let text = std::str::from_utf8(bytes).unwrap_or_default();
    for ch in text.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            ch if ch as u32 == quote as u32 => {
                out.push('\\');
                out.push(ch);
            }
            ch if (ch as u32) < 0x20 => {
                let _ = write!(out, "\\x{:02x}", ch as u32);
            }
            ch if ch.is_ascii() => out.push(ch),
            ch if escape_non_ascii => {
                let cp = ch as u32;
                if cp <= 0xffff {
                    let _ = write!(out, "\\u{cp:04x}");
                } else {
                    let _ = write!(out, "\\U{cp:08x}");
                }
            }
            ch => out.push(ch),
        }
    }
}
