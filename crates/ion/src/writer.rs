//! The unified writer: typed staging over binary or text emission.
//!
//! The binary path interns field names, annotations, and symbol text into
//! a pending local symbol table and emits it, with the IVM, ahead of the
//! values on flush. The text path spells symbol text out directly and
//! falls back to `$N` for text-less SIDs.

use crate::binary::writer::RawBinaryWriter;
use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::int::IonInt;
use crate::ion_type::{IonType, Sid, SymbolToken};
use crate::options::WriterOptions;
use crate::reader::Reader;
use crate::stream::OutputStream;
use crate::symtab::{SymbolTable, SID_ION_SYMBOL_TABLE, SID_SYMBOLS};
use crate::text::writer::RawTextWriter;
use crate::timestamp::Timestamp;

enum RawWriter {
    Binary {
        raw: RawBinaryWriter,
        out: OutputStream,
    },
    Text(RawTextWriter),
}

/// The typed value writer.
pub struct Writer {
    raw: RawWriter,
    options: WriterOptions,
    /// Pending local table for the binary path.
    symtab: SymbolTable,
    annotation_count: usize,
    /// Binary lobs stage here until the streaming append ends.
    lob: Option<(IonType, Vec<u8>)>,
}

impl Writer {
    /// Opens over a sink stream.
    pub fn for_stream(out: OutputStream, options: WriterOptions) -> Self {
        let raw = if options.output_as_binary {
            RawWriter::Binary {
                raw: RawBinaryWriter::new(),
                out,
            }
        } else {
            RawWriter::Text(
                RawTextWriter::new(out)
                    .pretty(options.pretty_print)
                    .escape_all_non_ascii(options.escape_all_non_ascii)
                    .flush_every_value(options.flush_every_value),
            )
        };
        Self {
            raw,
            options,
            symtab: SymbolTable::new_local(),
            annotation_count: 0,
            lob: None,
        }
    }

    /// Opens over a fresh in-memory sink.
    pub fn new(options: WriterOptions) -> Self {
        Self::for_stream(OutputStream::in_memory(), options)
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        match &self.raw {
            RawWriter::Binary { raw, .. } => raw.depth(),
            RawWriter::Text(raw) => raw.depth(),
        }
    }

    fn intern(&mut self, text: &str) -> IonResult<Sid> {
        self.symtab.add_symbol(text)
    }

    /// Declares the field name of the next value.
    pub fn set_field_name(&mut self, name: &str) -> IonResult<()> {
        match &mut self.raw {
            RawWriter::Binary { .. } => {
                let sid = self.intern(name)?;
                if let RawWriter::Binary { raw, .. } = &mut self.raw {
                    raw.set_field_sid(sid);
                }
            }
            RawWriter::Text(raw) => raw.set_field_name(name),
        }
        Ok(())
    }

    /// Declares the field name of the next value by SID.
    pub fn set_field_name_sid(&mut self, sid: Sid) -> IonResult<()> {
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.set_field_sid(sid),
            RawWriter::Text(raw) => raw.set_field_name_sid(sid),
        }
        Ok(())
    }

    /// Adds an annotation to the next value.
    pub fn add_annotation(&mut self, text: &str) -> IonResult<()> {
        if self.annotation_count + 1 > self.options.max_annotation_count {
            return Err(IonError::InvalidArg);
        }
        self.annotation_count += 1;
        match &mut self.raw {
            RawWriter::Binary { .. } => {
                let sid = self.intern(text)?;
                if let RawWriter::Binary { raw, .. } = &mut self.raw {
                    raw.add_annotation_sid(sid);
                }
            }
            RawWriter::Text(raw) => raw.add_annotation(text),
        }
        Ok(())
    }

    /// Adds an annotation by SID.
    pub fn add_annotation_sid(&mut self, sid: Sid) -> IonResult<()> {
        if self.annotation_count + 1 > self.options.max_annotation_count {
            return Err(IonError::InvalidArg);
        }
        self.annotation_count += 1;
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.add_annotation_sid(sid),
            RawWriter::Text(raw) => raw.add_annotation_sid(sid),
        }
        Ok(())
    }

    fn value_written(&mut self) {
        self.annotation_count = 0;
    }

    pub fn step_in(&mut self, ty: IonType) -> IonResult<()> {
        if self.depth() + 1 > self.options.max_container_depth {
            return Err(IonError::InvalidState);
        }
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.step_in(ty),
            RawWriter::Text(raw) => raw.step_in(ty),
        }
    }

    pub fn step_out(&mut self) -> IonResult<()> {
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.step_out(),
            RawWriter::Text(raw) => raw.step_out(),
        }
    }

    pub fn write_null(&mut self, ty: IonType) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_null(ty),
            RawWriter::Text(raw) => raw.write_null(ty),
        }
    }

    pub fn write_bool(&mut self, value: bool) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_bool(value),
            RawWriter::Text(raw) => raw.write_bool(value),
        }
    }

    pub fn write_i64(&mut self, value: i64) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_i64(value),
            RawWriter::Text(raw) => raw.write_i64(value),
        }
    }

    pub fn write_int(&mut self, value: &IonInt) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_int(value),
            RawWriter::Text(raw) => raw.write_int(value),
        }
    }

    pub fn write_f32(&mut self, value: f32) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_f32(value),
            RawWriter::Text(raw) => raw.write_f32(value),
        }
    }

    pub fn write_f64(&mut self, value: f64) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_f64(value),
            RawWriter::Text(raw) => raw.write_f64(value),
        }
    }

    pub fn write_decimal(&mut self, value: &Decimal) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_decimal(value),
            RawWriter::Text(raw) => raw.write_decimal(value),
        }
    }

    pub fn write_timestamp(&mut self, value: &Timestamp) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_timestamp(value),
            RawWriter::Text(raw) => raw.write_timestamp(value),
        }
    }

    pub fn write_symbol(&mut self, text: &str) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { .. } => {
                let sid = self.intern(text)?;
                if let RawWriter::Binary { raw, .. } = &mut self.raw {
                    raw.write_symbol_sid(sid)?;
                }
                Ok(())
            }
            RawWriter::Text(raw) => raw.write_symbol(text),
        }
    }

    /// Writes a symbol by SID; the text form is `$N`.
    pub fn write_symbol_sid(&mut self, sid: Sid) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_symbol_sid(sid),
            RawWriter::Text(raw) => raw.write_symbol_sid(sid),
        }
    }

    /// Writes a symbol token, preferring its text.
    pub fn write_symbol_token(&mut self, token: &SymbolToken) -> IonResult<()> {
        match (token.text(), token.sid) {
            (Some(text), _) => self.write_symbol(text),
            (None, Some(sid)) => self.write_symbol_sid(sid),
            (None, None) => Err(IonError::InvalidSymbol),
        }
    }

    pub fn write_string(&mut self, text: &str) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_string(text),
            RawWriter::Text(raw) => raw.write_string(text),
        }
    }

    pub fn write_clob(&mut self, bytes: &[u8]) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_clob(bytes),
            RawWriter::Text(raw) => raw.write_clob(bytes),
        }
    }

    pub fn write_blob(&mut self, bytes: &[u8]) -> IonResult<()> {
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => raw.write_blob(bytes),
            RawWriter::Text(raw) => raw.write_blob(bytes),
        }
    }

    /// Opens a streaming lob; bytes arrive via [`append_lob`](Self::append_lob).
    pub fn begin_lob(&mut self, ty: IonType) -> IonResult<()> {
        if !ty.is_lob() {
            return Err(IonError::InvalidArg);
        }
        if self.lob.is_some() {
            return Err(IonError::InvalidState);
        }
        self.value_written();
        match &mut self.raw {
            RawWriter::Binary { .. } => {
                self.lob = Some((ty, Vec::new()));
                Ok(())
            }
            RawWriter::Text(raw) => {
                self.lob = Some((ty, Vec::new()));
                raw.begin_lob(ty)
            }
        }
    }

    /// Appends lob bytes of any granularity.
    pub fn append_lob(&mut self, bytes: &[u8]) -> IonResult<()> {
        match &mut self.raw {
            RawWriter::Binary { .. } => {
                let (_, staged) = self.lob.as_mut().ok_or(IonError::InvalidState)?;
                staged.extend_from_slice(bytes);
                Ok(())
            }
            RawWriter::Text(raw) => {
                if self.lob.is_none() {
                    return Err(IonError::InvalidState);
                }
                raw.append_lob(bytes)
            }
        }
    }

    /// Ends the streaming lob.
    pub fn end_lob(&mut self) -> IonResult<()> {
        let (ty, staged) = self.lob.take().ok_or(IonError::InvalidState)?;
        match &mut self.raw {
            RawWriter::Binary { raw, .. } => match ty {
                IonType::Clob => raw.write_clob(&staged),
                _ => raw.write_blob(&staged),
            },
            RawWriter::Text(raw) => raw.end_lob(),
        }
    }

    /// Serializes a symbol table as its annotated struct.
    pub fn write_symbol_table(&mut self, table: &SymbolTable) -> IonResult<()> {
        self.add_annotation(if table.is_shared() {
            "$ion_shared_symbol_table"
        } else {
            "$ion_symbol_table"
        })?;
        self.step_in(IonType::Struct)?;
        if table.is_shared() {
            if let Some(name) = table.name() {
                self.set_field_name("name")?;
                self.write_string(name)?;
            }
            self.set_field_name("version")?;
            self.write_i64(table.version() as i64)?;
        }
        if !table.imports().is_empty() {
            self.set_field_name("imports")?;
            self.step_in(IonType::List)?;
            for import in table.imports() {
                self.step_in(IonType::Struct)?;
                self.set_field_name("name")?;
                self.write_string(&import.name)?;
                self.set_field_name("version")?;
                self.write_i64(import.version as i64)?;
                self.set_field_name("max_id")?;
                self.write_i64(import.max_id as i64)?;
                self.step_out()?;
            }
            self.step_out()?;
        }
        if table.local_symbol_count() > 0 {
            self.set_field_name("symbols")?;
            self.step_in(IonType::List)?;
            for text in table.local_symbols().collect::<Vec<_>>() {
                match text {
                    Some(text) => self.write_string(text)?,
                    None => self.write_null(IonType::String)?,
                }
            }
            self.step_out()?;
        }
        if table.is_shared() {
            self.set_field_name("max_id")?;
            self.write_i64(table.max_sid() as i64)?;
        }
        self.step_out()?;
        Ok(())
    }

    /// Transcodes every remaining value from a reader, containers and all.
    pub fn write_all_values(&mut self, reader: &mut Reader) -> IonResult<()> {
        while let Some(ty) = reader.next()? {
            self.write_one_value(reader, ty)?;
        }
        Ok(())
    }

    fn write_one_value(&mut self, reader: &mut Reader, ty: IonType) -> IonResult<()> {
        if let Some(field) = reader.field_name()? {
            match (field.text(), field.sid) {
                (Some(text), _) => self.set_field_name(text)?,
                (None, Some(sid)) => self.set_field_name_sid(sid)?,
                (None, None) => return Err(IonError::InvalidSymbol),
            }
        }
        for annotation in reader.annotations()? {
            match (annotation.text(), annotation.sid) {
                (Some(text), _) => self.add_annotation(text)?,
                (None, Some(sid)) => self.add_annotation_sid(sid)?,
                (None, None) => return Err(IonError::InvalidSymbol),
            }
        }
        if reader.is_null() {
            return self.write_null(ty);
        }
        match ty {
            IonType::Null => self.write_null(ty),
            IonType::Bool => self.write_bool(reader.read_bool()?),
            IonType::Int => self.write_int(&reader.read_int()?),
            IonType::Float => self.write_f64(reader.read_f64()?),
            IonType::Decimal => self.write_decimal(&reader.read_decimal()?),
            IonType::Timestamp => self.write_timestamp(&reader.read_timestamp()?),
            IonType::Symbol => self.write_symbol_token(&reader.read_symbol()?),
            IonType::String => self.write_string(&reader.read_string()?),
            IonType::Clob => self.write_clob(&reader.read_clob()?),
            IonType::Blob => self.write_blob(&reader.read_blob()?),
            IonType::List | IonType::Sexp | IonType::Struct => {
                reader.step_in()?;
                self.step_in(ty)?;
                loop {
                    match reader.next()? {
                        Some(child) => self.write_one_value(reader, child)?,
                        None => break,
                    }
                }
                reader.step_out()?;
                self.step_out()
            }
        }
    }

    fn binary_symtab_image(table: &SymbolTable) -> IonResult<Vec<u8>> {
        if table.local_symbol_count() == 0 {
            return Ok(Vec::new());
        }
        let mut raw = RawBinaryWriter::new();
        raw.add_annotation_sid(SID_ION_SYMBOL_TABLE);
        raw.step_in(IonType::Struct)?;
        raw.set_field_sid(SID_SYMBOLS);
        raw.step_in(IonType::List)?;
        for text in table.local_symbols() {
            match text {
                Some(text) => raw.write_string(text)?,
                None => raw.write_null(IonType::String)?,
            }
        }
        raw.step_out()?;
        raw.step_out()?;
        Ok(raw.take_staged())
    }

    /// Emits everything staged as a self-contained segment.
    ///
    /// Binary output opens with the IVM and, when any local symbols were
    /// interned, the local symbol table. Flushing with nothing staged
    /// writes nothing. After a flush the writer starts a fresh segment
    /// with a fresh symbol table.
    pub fn flush(&mut self) -> IonResult<()> {
        if self.depth() != 0 {
            return Err(IonError::InvalidState);
        }
        match &mut self.raw {
            RawWriter::Binary { raw, out } => {
                if !raw.has_staged_values() {
                    return Ok(());
                }
                let image = Self::binary_symtab_image(&self.symtab)?;
                let image = if image.is_empty() {
                    None
                } else {
                    Some(image)
                };
                raw.flush(out, image.as_deref())?;
                self.symtab = SymbolTable::new_local();
                Ok(())
            }
            RawWriter::Text(raw) => raw.flush(),
        }
    }

    /// Flushes and hands back an in-memory sink's bytes.
    pub fn finish(mut self) -> IonResult<Vec<u8>> {
        self.flush()?;
        match self.raw {
            RawWriter::Binary { out, .. } => out.into_bytes(),
            RawWriter::Text(raw) => raw.into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReaderOptions;

    fn binary_writer() -> Writer {
        Writer::new(WriterOptions {
            output_as_binary: true,
            ..WriterOptions::default()
        })
    }

    #[test]
    fn binary_stream_opens_with_ivm() {
        let mut w = binary_writer();
        w.write_i64(7).unwrap();
        let bytes = w.finish().unwrap();
        assert_eq!(&bytes[0..4], &[0xe0, 0x01, 0x00, 0xea]);
        assert_eq!(&bytes[4..], &[0x21, 0x07]);
    }

    #[test]
    fn binary_structs_emit_a_local_symbol_table() {
        let mut w = binary_writer();
        w.step_in(IonType::Struct).unwrap();
        w.set_field_name("a").unwrap();
        w.write_i64(1).unwrap();
        w.step_out().unwrap();
        let bytes = w.finish().unwrap();

        let mut r = Reader::for_bytes(bytes, ReaderOptions::default()).unwrap();
        assert_eq!(r.next().unwrap(), Some(IonType::Struct));
        r.step_in().unwrap();
        assert_eq!(r.next().unwrap(), Some(IonType::Int));
        let field = r.field_name().unwrap().unwrap();
        assert_eq!(field.text(), Some("a"));
        assert_eq!(r.read_i64().unwrap(), 1);
    }

    #[test]
    fn text_writer_spells_symbols_out() {
        let mut w = Writer::new(WriterOptions::default());
        w.add_annotation("x").unwrap();
        w.write_symbol("hello").unwrap();
        let bytes = w.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "x::hello");
    }

    #[test]
    fn transcode_text_to_binary_and_back() {
        let source = "{a:1, b:[2, 3]} test::(x + 1) \"str\" {{aW9u}}";
        let mut reader = Reader::for_slice(source.as_bytes(), ReaderOptions::default()).unwrap();
        let mut writer = binary_writer();
        writer.write_all_values(&mut reader).unwrap();
        let binary = writer.finish().unwrap();
        assert_eq!(&binary[0..4], &[0xe0, 0x01, 0x00, 0xea]);

        let mut back = Reader::for_bytes(binary, ReaderOptions::default()).unwrap();
        let mut text_writer = Writer::new(WriterOptions::default());
        text_writer.write_all_values(&mut back).unwrap();
        let text = String::from_utf8(text_writer.finish().unwrap()).unwrap();
        assert_eq!(text, "{a:1, b:[2, 3]} test::(x '+' 1) \"str\" {{aW9u}}");
    }

    #[test]
    fn annotation_limit_is_enforced() {
        let mut w = Writer::new(WriterOptions {
            max_annotation_count: 2,
            ..WriterOptions::default()
        });
        w.add_annotation("a").unwrap();
        w.add_annotation("b").unwrap();
        assert_eq!(w.add_annotation("c"), Err(IonError::InvalidArg));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut w = Writer::new(WriterOptions {
            max_container_depth: 2,
            ..WriterOptions::default()
        });
        w.step_in(IonType::List).unwrap();
        w.step_in(IonType::List).unwrap();
        assert_eq!(w.step_in(IonType::List), Err(IonError::InvalidState));
    }
}
