//! The unified reader: typed cursor over binary or text.
//!
//! A reader sniffs the first four bytes for the binary version marker and
//! binds to the matching codec. On top of the raw cursor it maintains the
//! current local symbol table (installing `$ion_symbol_table` structs,
//! resetting on IVMs) and resolves SIDs to text in both directions.

use crate::binary::reader::{RawBinaryReader, RawEvent};
use crate::binary::constants::IVM;
use crate::decimal::Decimal;
use crate::error::{IonError, IonResult, Position};
use crate::int::IonInt;
use crate::ion_type::{IonType, Sid, SymbolToken};
use crate::options::ReaderOptions;
use crate::stream::InputStream;
use crate::symtab::{ImportSpec, SymbolTable, SID_ION_SHARED_SYMBOL_TABLE, SID_ION_SYMBOL_TABLE};
use crate::text::reader::{RawSymbol, RawTextEvent, RawTextReader};
use crate::timestamp::Timestamp;
use ion_kit_arena::Owner;

enum RawReader {
    Binary(RawBinaryReader),
    Text(RawTextReader),
}

enum Event {
    Value(IonType),
    Ivm,
}

/// The typed pull cursor.
pub struct Reader {
    raw: RawReader,
    options: ReaderOptions,
    symtab: SymbolTable,
    /// Owns transient buffers for the current top-level value; reset on
    /// each top-level advance.
    temp_pool: Owner,
    /// Set when `next` surfaced an IVM as a system value.
    synthetic_ivm: bool,
}

impl Reader {
    /// Opens over a stream, sniffing binary vs text.
    pub fn open(mut stream: InputStream, options: ReaderOptions) -> IonResult<Self> {
        stream.mark();
        let mut head = [0u8; 4];
        let n = stream.read(&mut head)?;
        stream.mark_rewind()?;
        stream.mark_clear();
        let raw = if n == 4 && head == IVM {
            RawReader::Binary(RawBinaryReader::new(stream))
        } else {
            RawReader::Text(RawTextReader::new(stream))
        };
        Ok(Self {
            raw,
            options,
            symtab: SymbolTable::new_local(),
            temp_pool: Owner::new(),
            synthetic_ivm: false,
        })
    }

    /// Opens over a borrowed byte slice.
    pub fn for_slice(bytes: &[u8], options: ReaderOptions) -> IonResult<Self> {
        Self::open(InputStream::from_slice(bytes), options)
    }

    /// Opens over an owned byte vector.
    pub fn for_bytes(bytes: Vec<u8>, options: ReaderOptions) -> IonResult<Self> {
        Self::open(InputStream::from_bytes(bytes), options)
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        match &self.raw {
            RawReader::Binary(r) => r.depth(),
            RawReader::Text(r) => r.depth(),
        }
    }

    /// Position of the byte or token the cursor last touched.
    pub fn get_position(&self) -> Position {
        match &self.raw {
            RawReader::Binary(r) => Position {
                line: 0,
                column: 0,
                offset: r.offset(),
            },
            RawReader::Text(r) => r.position(),
        }
    }

    /// The symbol table currently in effect.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symtab
    }

    fn raw_next(&mut self) -> IonResult<Option<Event>> {
        Ok(match &mut self.raw {
            RawReader::Binary(r) => r.next()?.map(|e| match e {
                RawEvent::Value(ty) => Event::Value(ty),
                RawEvent::Ivm => Event::Ivm,
            }),
            RawReader::Text(r) => r.next()?.map(|e| match e {
                RawTextEvent::Value(ty) => Event::Value(ty),
                RawTextEvent::Ivm => Event::Ivm,
            }),
        })
    }

    fn annotation_count(&self) -> usize {
        match &self.raw {
            RawReader::Binary(r) => r.annotations().len(),
            RawReader::Text(r) => r.annotations().len(),
        }
    }

    fn first_annotation_is(&self, sid: Sid, text: &str) -> bool {
        match &self.raw {
            RawReader::Binary(r) => r.annotations().first() == Some(&sid),
            RawReader::Text(r) => match r.annotations().first() {
                Some(RawSymbol::Text(t)) => t == text,
                Some(RawSymbol::Sid(s)) => *s == sid,
                None => false,
            },
        }
    }

    /// Advances to the next value at this depth.
    ///
    /// `None` marks the end of the current container (step out to leave)
    /// or of the stream. At top level, IVMs reset the symbol table and
    /// `$ion_symbol_table` structs install a new one; both are silent
    /// unless the reader was configured to return system values.
    pub fn next(&mut self) -> IonResult<Option<IonType>> {
        self.synthetic_ivm = false;
        loop {
            let event = match self.raw_next()? {
                Some(event) => event,
                None => return Ok(None),
            };
            match event {
                Event::Ivm => {
                    self.symtab = SymbolTable::new_local();
                    if self.options.return_system_values {
                        self.synthetic_ivm = true;
                        return Ok(Some(IonType::Symbol));
                    }
                }
                Event::Value(ty) => {
                    if self.annotation_count() > self.options.max_annotation_count {
                        return Err(IonError::InvalidToken);
                    }
                    if self.depth() == 0 {
                        self.temp_pool.reset();
                        if ty == IonType::Struct
                            && !self.is_null()
                            && self.first_annotation_is(SID_ION_SYMBOL_TABLE, "$ion_symbol_table")
                        {
                            if self.options.return_system_values {
                                return Ok(Some(ty));
                            }
                            let table = self.load_symbol_table()?;
                            self.symtab = table;
                            continue;
                        }
                    }
                    return Ok(Some(ty));
                }
            }
        }
    }

    /// Type of the current value.
    pub fn ion_type(&self) -> Option<IonType> {
        if self.synthetic_ivm {
            return Some(IonType::Symbol);
        }
        match &self.raw {
            RawReader::Binary(r) => r.ion_type(),
            RawReader::Text(r) => r.ion_type(),
        }
    }

    /// Whether the current value is a (typed) null.
    pub fn is_null(&self) -> bool {
        match &self.raw {
            RawReader::Binary(r) => r.is_null(),
            RawReader::Text(r) => r.is_null(),
        }
    }

    fn resolve_sid(&self, sid: Sid) -> IonResult<SymbolToken> {
        if sid == 0 {
            return Ok(SymbolToken {
                text: None,
                sid: Some(0),
            });
        }
        if !self.symtab.sid_in_range(sid) {
            return Err(IonError::InvalidSymbol);
        }
        Ok(match self.symtab.find_by_sid(sid) {
            Some(text) => SymbolToken::resolved(text, sid),
            None => SymbolToken::unknown(sid),
        })
    }

    fn resolve_raw(&self, raw: &RawSymbol) -> IonResult<SymbolToken> {
        match raw {
            RawSymbol::Text(text) => Ok(SymbolToken {
                sid: self.symtab.find_by_name(text),
                text: Some(text.clone()),
            }),
            RawSymbol::Sid(sid) => self.resolve_sid(*sid),
        }
    }

    fn check_symbol_len(&self, token: &SymbolToken) -> IonResult<()> {
        match token.text() {
            Some(text) if text.len() > self.options.symbol_threshold => {
                Err(IonError::BufferTooSmall)
            }
            _ => Ok(()),
        }
    }

    /// Field name of the current value, resolved through the current
    /// symbol table.
    pub fn field_name(&self) -> IonResult<Option<SymbolToken>> {
        let token = match &self.raw {
            RawReader::Binary(r) => match r.field_sid() {
                Some(sid) => Some(self.resolve_sid(sid)?),
                None => None,
            },
            RawReader::Text(r) => match r.field_name() {
                Some(raw) => Some(self.resolve_raw(raw)?),
                None => None,
            },
        };
        if let Some(token) = &token {
            self.check_symbol_len(token)?;
        }
        Ok(token)
    }

    /// Annotations of the current value, outermost first.
    pub fn annotations(&self) -> IonResult<Vec<SymbolToken>> {
        match &self.raw {
            RawReader::Binary(r) => {
                r.annotations().iter().map(|s| self.resolve_sid(*s)).collect()
            }
            RawReader::Text(r) => {
                r.annotations().iter().map(|s| self.resolve_raw(s)).collect()
            }
        }
    }

    /// Enters the current container.
    pub fn step_in(&mut self) -> IonResult<()> {
        if self.depth() + 1 > self.options.max_container_depth {
            return Err(IonError::InvalidState);
        }
        match &mut self.raw {
            RawReader::Binary(r) => r.step_in(),
            RawReader::Text(r) => r.step_in(),
        }
    }

    /// Leaves the current container, skipping what remains in it.
    pub fn step_out(&mut self) -> IonResult<()> {
        match &mut self.raw {
            RawReader::Binary(r) => r.step_out(),
            RawReader::Text(r) => r.step_out(),
        }
    }

    pub fn read_bool(&mut self) -> IonResult<bool> {
        match &mut self.raw {
            RawReader::Binary(r) => r.read_bool(),
            RawReader::Text(r) => r.read_bool(),
        }
    }

    pub fn read_int(&mut self) -> IonResult<IonInt> {
        match &mut self.raw {
            RawReader::Binary(r) => r.read_int(),
            RawReader::Text(r) => r.read_int(),
        }
    }

    pub fn read_i64(&mut self) -> IonResult<i64> {
        match &mut self.raw {
            RawReader::Binary(r) => r.read_i64(),
            RawReader::Text(r) => r.read_i64(),
        }
    }

    pub fn read_f64(&mut self) -> IonResult<f64> {
        match &mut self.raw {
            RawReader::Binary(r) => r.read_f64(),
            RawReader::Text(r) => r.read_f64(),
        }
    }

    pub fn read_decimal(&mut self) -> IonResult<Decimal> {
        match &mut self.raw {
            RawReader::Binary(r) => r.read_decimal(),
            RawReader::Text(r) => r.read_decimal(),
        }
    }

    pub fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        match &mut self.raw {
            RawReader::Binary(r) => r.read_timestamp(),
            RawReader::Text(r) => r.read_timestamp(),
        }
    }

    /// Reads a symbol value, resolving through the current table.
    ///
    /// A SID with no text inside a substituted import range comes back
    /// with `text: None`; a SID outside the table's range is
    /// [`IonError::InvalidSymbol`].
    pub fn read_symbol(&mut self) -> IonResult<SymbolToken> {
        if self.synthetic_ivm {
            self.synthetic_ivm = false;
            return Ok(SymbolToken::resolved("$ion_1_0", 2));
        }
        let token = match &mut self.raw {
            RawReader::Binary(r) => {
                let sid = r.read_symbol_sid()?;
                self.resolve_sid(sid)?
            }
            RawReader::Text(r) => {
                let raw = r.read_symbol()?;
                self.resolve_raw(&raw)?
            }
        };
        self.check_symbol_len(&token)?;
        Ok(token)
    }

    fn check_value_len(&self, len: usize) -> IonResult<()> {
        if len > self.options.user_value_threshold {
            Err(IonError::BufferTooSmall)
        } else {
            Ok(())
        }
    }

    pub fn read_string(&mut self) -> IonResult<String> {
        match &mut self.raw {
            RawReader::Binary(r) => {
                let len = r.value_len() as usize;
                if len > self.options.user_value_threshold {
                    return Err(IonError::BufferTooSmall);
                }
                r.read_string()
            }
            RawReader::Text(r) => {
                let text = r.read_string()?;
                self.check_value_len(text.len())?;
                Ok(text)
            }
        }
    }

    fn read_lob(&mut self, expect: IonType) -> IonResult<Vec<u8>> {
        if self.ion_type() != Some(expect) {
            return Err(IonError::InvalidState);
        }
        match &mut self.raw {
            RawReader::Binary(r) => {
                let len = r.value_len() as usize;
                if len > self.options.user_value_threshold {
                    return Err(IonError::BufferTooSmall);
                }
                r.read_lob()
            }
            RawReader::Text(r) => {
                let bytes = r.read_lob()?;
                self.check_value_len(bytes.len())?;
                Ok(bytes)
            }
        }
    }

    pub fn read_clob(&mut self) -> IonResult<Vec<u8>> {
        self.read_lob(IonType::Clob)
    }

    pub fn read_blob(&mut self) -> IonResult<Vec<u8>> {
        self.read_lob(IonType::Blob)
    }

    /// Reads up to `buf.len()` bytes of a string or lob body; the second
    /// result reports whether more remain.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> IonResult<(usize, bool)> {
        match &mut self.raw {
            RawReader::Binary(r) => r.read_chunk(buf),
            RawReader::Text(r) => r.read_chunk(buf),
        }
    }

    // ---- symbol tables ------------------------------------------------

    fn annotation_names_table(&self) -> IonResult<bool> {
        if self.first_annotation_is(SID_ION_SYMBOL_TABLE, "$ion_symbol_table") {
            return Ok(false);
        }
        if self.first_annotation_is(SID_ION_SHARED_SYMBOL_TABLE, "$ion_shared_symbol_table") {
            return Ok(true);
        }
        Err(IonError::NotASymbolTable)
    }

    /// Parses the current annotated struct as a symbol table.
    ///
    /// This is the reader half of symbol-table serialization; the writer
    /// half is [`crate::writer::Writer::write_symbol_table`]. Local
    /// tables resolve their imports against the reader's catalog.
    pub fn load_symbol_table(&mut self) -> IonResult<SymbolTable> {
        let shared = self.annotation_names_table()?;
        if self.ion_type() != Some(IonType::Struct) || self.is_null() {
            return Err(IonError::NotASymbolTable);
        }
        let mut name: Option<String> = None;
        let mut version: Option<i64> = None;
        let mut max_id: Option<i64> = None;
        let mut imports: Option<Vec<ImportSpec>> = None;
        let mut symbols: Option<Vec<Option<String>>> = None;
        self.step_in()?;
        while let Some(ty) = self.next()? {
            let field = match self.field_name()? {
                Some(token) => token,
                None => return Err(IonError::InvalidSymbolTable),
            };
            match field.text() {
                Some("name") => {
                    if name.is_some() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    if ty != IonType::String || self.is_null() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    name = Some(self.read_string()?);
                }
                Some("version") => {
                    if version.is_some() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    if ty != IonType::Int || self.is_null() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    version = Some(self.read_i64()?);
                }
                Some("max_id") => {
                    if max_id.is_some() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    if ty != IonType::Int || self.is_null() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    max_id = Some(self.read_i64()?);
                }
                Some("imports") => {
                    if imports.is_some() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    if ty != IonType::List || self.is_null() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    imports = Some(self.load_import_list()?);
                }
                Some("symbols") => {
                    if symbols.is_some() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    if ty != IonType::List || self.is_null() {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    symbols = Some(self.load_symbol_list()?);
                }
                _ => {
                    // Unrecognized fields are ignored.
                }
            }
        }
        self.step_out()?;
        if shared {
            let mut table =
                SymbolTable::new_shared(name.ok_or(IonError::InvalidSymbolTable)?, {
                    let v = version.unwrap_or(1);
                    if v < 1 {
                        return Err(IonError::InvalidSymbolTable);
                    }
                    v as u32
                });
            for text in symbols.unwrap_or_default() {
                table.push_symbol(text)?;
            }
            if let Some(declared) = max_id {
                if declared < 0 {
                    return Err(IonError::InvalidSymbolTable);
                }
                table.set_max_sid(declared as Sid)?;
            }
            table.lock();
            Ok(table)
        } else {
            let mut table = SymbolTable::new_local();
            let catalog = self.options.catalog.clone();
            for spec in imports.unwrap_or_default() {
                table.add_import(&spec, catalog.as_deref())?;
            }
            for text in symbols.unwrap_or_default() {
                table.push_symbol(text)?;
            }
            Ok(table)
        }
    }

    fn load_import_list(&mut self) -> IonResult<Vec<ImportSpec>> {
        let mut specs = Vec::new();
        self.step_in()?;
        while let Some(ty) = self.next()? {
            if ty != IonType::Struct || self.is_null() {
                return Err(IonError::InvalidSymbolTable);
            }
            let mut name: Option<String> = None;
            let mut version: Option<i64> = None;
            let mut max_id: Option<i64> = None;
            self.step_in()?;
            while let Some(field_ty) = self.next()? {
                let field = self
                    .field_name()?
                    .ok_or(IonError::InvalidSymbolTable)?;
                match field.text() {
                    Some("name") if field_ty == IonType::String && !self.is_null() => {
                        name = Some(self.read_string()?);
                    }
                    Some("version") if field_ty == IonType::Int && !self.is_null() => {
                        version = Some(self.read_i64()?);
                    }
                    Some("max_id") if field_ty == IonType::Int && !self.is_null() => {
                        max_id = Some(self.read_i64()?);
                    }
                    _ => {}
                }
            }
            self.step_out()?;
            let name = name.ok_or(IonError::InvalidSymbolTable)?;
            let version = version.unwrap_or(1).max(1) as u32;
            let max_id = match max_id {
                Some(m) if m >= 0 => Some(m as Sid),
                Some(_) => return Err(IonError::InvalidSymbolTable),
                None => None,
            };
            specs.push(ImportSpec {
                name,
                version,
                max_id,
            });
        }
        self.step_out()?;
        Ok(specs)
    }

    fn load_symbol_list(&mut self) -> IonResult<Vec<Option<String>>> {
        let mut symbols = Vec::new();
        self.step_in()?;
        while let Some(ty) = self.next()? {
            if ty == IonType::String && !self.is_null() {
                symbols.push(Some(self.read_string()?));
            } else {
                // Anything but a string claims a SID with unknown text.
                symbols.push(None);
            }
        }
        self.step_out()?;
        Ok(symbols)
    }
}
