//! Text parser: drives the scanner and exposes the raw cursor API.

use super::scanner::{parse_float_token, parse_int_token, Scanner, Token};
use crate::decimal::Decimal;
use crate::error::{IonError, IonResult, Position};
use crate::int::IonInt;
use crate::ion_type::{IonType, Sid};
use crate::stream::InputStream;
use crate::timestamp::Timestamp;

/// A symbol as the text parser sees it: spelled-out text or a `$N` SID.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSymbol {
    Text(String),
    Sid(Sid),
}

/// What the cursor stopped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTextEvent {
    Value(IonType),
    /// Top-level bare `$ion_1_0`; the symbol-table context resets.
    Ivm,
}

#[derive(Debug)]
enum TextValue {
    Null(IonType),
    Bool(bool),
    Int(IonInt),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Symbol(RawSymbol),
    Str(String),
    Clob(Vec<u8>),
    Blob(Vec<u8>),
    ContainerStart(IonType),
}

impl TextValue {
    fn ion_type(&self) -> IonType {
        match self {
            TextValue::Null(ty) => *ty,
            TextValue::Bool(_) => IonType::Bool,
            TextValue::Int(_) => IonType::Int,
            TextValue::Float(_) => IonType::Float,
            TextValue::Decimal(_) => IonType::Decimal,
            TextValue::Timestamp(_) => IonType::Timestamp,
            TextValue::Symbol(_) => IonType::Symbol,
            TextValue::Str(_) => IonType::String,
            TextValue::Clob(_) => IonType::Clob,
            TextValue::Blob(_) => IonType::Blob,
            TextValue::ContainerStart(ty) => *ty,
        }
    }
}

struct Frame {
    ty: IonType,
    after_value: bool,
}

/// The text cursor.
pub struct RawTextReader {
    scanner: Scanner,
    stack: Vec<Frame>,
    value: Option<TextValue>,
    field_name: Option<RawSymbol>,
    annotations: Vec<RawSymbol>,
    /// Cursor into a string/lob payload for chunked reads.
    chunk_at: usize,
}

impl RawTextReader {
    pub fn new(stream: InputStream) -> Self {
        Self {
            scanner: Scanner::new(stream),
            stack: Vec::new(),
            value: None,
            field_name: None,
            annotations: Vec::new(),
            chunk_at: 0,
        }
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Position of the token the cursor last touched.
    pub fn position(&self) -> Position {
        self.scanner.position()
    }

    fn in_sexp(&self) -> bool {
        matches!(self.stack.last(), Some(f) if f.ty == IonType::Sexp)
    }

    fn close_token(ty: IonType) -> Token {
        match ty {
            IonType::List => Token::CloseBracket,
            IonType::Sexp => Token::CloseParen,
            _ => Token::CloseBrace,
        }
    }

    /// Consumes an unentered container's tokens, balancing brackets.
    fn skip_container(&mut self, ty: IonType) -> IonResult<()> {
        let mut kinds = vec![ty];
        while let Some(&top) = kinds.last() {
            let token = self.scanner.next(top == IonType::Sexp)?;
            match token {
                Token::Eof => return Err(IonError::UnexpectedEof),
                Token::ListOpen => kinds.push(IonType::List),
                Token::SexpOpen => kinds.push(IonType::Sexp),
                Token::StructOpen => kinds.push(IonType::Struct),
                Token::CloseBracket if top == IonType::List => {
                    kinds.pop();
                }
                Token::CloseParen if top == IonType::Sexp => {
                    kinds.pop();
                }
                Token::CloseBrace if top == IonType::Struct => {
                    kinds.pop();
                }
                Token::CloseBracket | Token::CloseParen | Token::CloseBrace => {
                    return Err(IonError::InvalidSyntax)
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Advances to the next value at this depth; `None` at the end of the
    /// container or stream.
    pub fn next(&mut self) -> IonResult<Option<RawTextEvent>> {
        if let Some(TextValue::ContainerStart(ty)) = self.value.take() {
            self.skip_container(ty)?;
        }
        self.field_name = None;
        self.annotations.clear();
        self.chunk_at = 0;
        // Separator or close after a previous value.
        if let Some(frame) = self.stack.last_mut() {
            if frame.after_value {
                match frame.ty {
                    IonType::List | IonType::Struct => {
                        let close = Self::close_token(frame.ty);
                        let token = self.scanner.next(false)?;
                        if token == Token::Comma {
                            frame.after_value = false;
                        } else if token == close {
                            self.scanner.un_next(token);
                            return Ok(None);
                        } else {
                            return Err(IonError::InvalidSyntax);
                        }
                    }
                    _ => {
                        // Sexp values are whitespace separated.
                    }
                }
            }
        }
        // Struct field name.
        if matches!(self.stack.last(), Some(f) if f.ty == IonType::Struct) {
            let token = self.scanner.next(false)?;
            match token {
                Token::CloseBrace => {
                    self.scanner.un_next(Token::CloseBrace);
                    return Ok(None);
                }
                Token::Eof => return Err(IonError::UnexpectedEof),
                Token::Symbol(text) | Token::QuotedSymbol(text) => {
                    self.field_name = Some(RawSymbol::Text(text));
                }
                Token::Str(text) => {
                    self.field_name = Some(RawSymbol::Text(text));
                }
                Token::SidSymbol(sid) => {
                    self.field_name = Some(RawSymbol::Sid(sid));
                }
                _ => return Err(IonError::InvalidSyntax),
            }
            if self.scanner.next(false)? != Token::Colon {
                return Err(IonError::InvalidSyntax);
            }
        }
        // Annotations, then the value itself.
        loop {
            let token = self.scanner.next(self.in_sexp())?;
            let close = self.stack.last().map(|f| Self::close_token(f.ty));
            if Some(&token) == close.as_ref() {
                if self.field_name.is_some() {
                    // A field name with no value.
                    return Err(IonError::InvalidSyntax);
                }
                self.scanner.un_next(token);
                return Ok(None);
            }
            let value = match token {
                Token::Eof => {
                    if self.stack.is_empty() && self.annotations.is_empty() {
                        return Ok(None);
                    }
                    return Err(IonError::UnexpectedEof);
                }
                Token::Symbol(text) | Token::QuotedSymbol(text)
                    if self.peek_double_colon()? =>
                {
                    self.annotations.push(RawSymbol::Text(text));
                    continue;
                }
                Token::SidSymbol(sid) if self.peek_double_colon()? => {
                    self.annotations.push(RawSymbol::Sid(sid));
                    continue;
                }
                Token::Symbol(text) => {
                    if self.stack.is_empty()
                        && self.annotations.is_empty()
                        && text == "$ion_1_0"
                    {
                        // A bare version marker restarts the segment.
                        self.value = None;
                        self.mark_after_value();
                        return Ok(Some(RawTextEvent::Ivm));
                    }
                    TextValue::Symbol(RawSymbol::Text(text))
                }
                Token::QuotedSymbol(text) => TextValue::Symbol(RawSymbol::Text(text)),
                Token::ExtendedSymbol(text) => TextValue::Symbol(RawSymbol::Text(text)),
                Token::SidSymbol(sid) => TextValue::Symbol(RawSymbol::Sid(sid)),
                Token::Str(text) => TextValue::Str(text),
                Token::Clob(bytes) => TextValue::Clob(bytes),
                Token::Blob(bytes) => TextValue::Blob(bytes),
                Token::Int { text, radix } => TextValue::Int(parse_int_token(&text, radix)?),
                Token::Decimal(text) => TextValue::Decimal(Decimal::parse(&text)?),
                Token::Float(text) => TextValue::Float(parse_float_token(&text)?),
                Token::Timestamp(ts) => TextValue::Timestamp(ts),
                Token::Null(ty) => TextValue::Null(ty),
                Token::Bool(value) => TextValue::Bool(value),
                Token::ListOpen => TextValue::ContainerStart(IonType::List),
                Token::SexpOpen => TextValue::ContainerStart(IonType::Sexp),
                Token::StructOpen => TextValue::ContainerStart(IonType::Struct),
                Token::Comma | Token::Colon | Token::DoubleColon => {
                    return Err(IonError::InvalidSyntax)
                }
                Token::CloseBracket | Token::CloseParen | Token::CloseBrace => {
                    return Err(IonError::InvalidSyntax)
                }
            };
            let ty = value.ion_type();
            self.value = Some(value);
            self.mark_after_value();
            return Ok(Some(RawTextEvent::Value(ty)));
        }
    }

    fn peek_double_colon(&mut self) -> IonResult<bool> {
        let token = self.scanner.next(self.in_sexp())?;
        if token == Token::DoubleColon {
            Ok(true)
        } else {
            self.scanner.un_next(token);
            Ok(false)
        }
    }

    fn mark_after_value(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.after_value = true;
        }
    }

    /// Type of the current value.
    pub fn ion_type(&self) -> Option<IonType> {
        self.value.as_ref().map(|v| v.ion_type())
    }

    /// Whether the current value is a (typed) null.
    pub fn is_null(&self) -> bool {
        matches!(self.value, Some(TextValue::Null(_)))
    }

    /// Field name of the current value when inside a struct.
    pub fn field_name(&self) -> Option<&RawSymbol> {
        self.field_name.as_ref()
    }

    /// Annotations of the current value, outermost first.
    pub fn annotations(&self) -> &[RawSymbol] {
        &self.annotations
    }

    /// Enters the current container.
    pub fn step_in(&mut self) -> IonResult<()> {
        match self.value.take() {
            Some(TextValue::ContainerStart(ty)) => {
                self.stack.push(Frame {
                    ty,
                    after_value: false,
                });
                self.field_name = None;
                self.annotations.clear();
                Ok(())
            }
            other => {
                self.value = other;
                Err(IonError::InvalidState)
            }
        }
    }

    /// Leaves the current container, skipping unread children.
    pub fn step_out(&mut self) -> IonResult<()> {
        if self.stack.is_empty() {
            return Err(IonError::InvalidState);
        }
        while self.next()?.is_some() {}
        let frame = self.stack.pop().ok_or(IonError::InvalidState)?;
        let close = Self::close_token(frame.ty);
        let token = self.scanner.next(false)?;
        if token != close {
            return Err(IonError::InvalidSyntax);
        }
        self.value = None;
        self.mark_after_value();
        Ok(())
    }

    fn take_value(&mut self) -> IonResult<TextValue> {
        self.value.take().ok_or(IonError::InvalidState)
    }

    fn wrong_type(&mut self, value: TextValue) -> IonError {
        self.value = Some(value);
        IonError::InvalidState
    }

    pub fn read_bool(&mut self) -> IonResult<bool> {
        match self.take_value()? {
            TextValue::Bool(value) => Ok(value),
            other => Err(self.wrong_type(other)),
        }
    }

    pub fn read_int(&mut self) -> IonResult<IonInt> {
        match self.take_value()? {
            TextValue::Int(value) => Ok(value),
            other => Err(self.wrong_type(other)),
        }
    }

    pub fn read_i64(&mut self) -> IonResult<i64> {
        self.read_int()?.to_i64()
    }

    pub fn read_f64(&mut self) -> IonResult<f64> {
        match self.take_value()? {
            TextValue::Float(value) => Ok(value),
            other => Err(self.wrong_type(other)),
        }
    }

    pub fn read_decimal(&mut self) -> IonResult<Decimal> {
        match self.take_value()? {
            TextValue::Decimal(value) => Ok(value),
            other => Err(self.wrong_type(other)),
        }
    }

    pub fn read_timestamp(&mut self) -> IonResult<Timestamp> {
        match self.take_value()? {
            TextValue::Timestamp(value) => Ok(value),
            other => Err(self.wrong_type(other)),
        }
    }

    pub fn read_symbol(&mut self) -> IonResult<RawSymbol> {
        match self.take_value()? {
            TextValue::Symbol(value) => Ok(value),
            other => Err(self.wrong_type(other)),
        }
    }

    pub fn read_string(&mut self) -> IonResult<String> {
        match self.take_value()? {
            TextValue::Str(value) => Ok(value),
            other => Err(self.wrong_type(other)),
        }
    }

    pub fn read_lob(&mut self) -> IonResult<Vec<u8>> {
        match self.take_value()? {
            TextValue::Clob(bytes) | TextValue::Blob(bytes) => Ok(bytes),
            other => Err(self.wrong_type(other)),
        }
    }

    /// Reads up to `buf.len()` bytes of a string/clob/blob payload.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> IonResult<(usize, bool)> {
        let payload: &[u8] = match self.value.as_ref().ok_or(IonError::InvalidState)? {
            TextValue::Str(text) => text.as_bytes(),
            TextValue::Clob(bytes) | TextValue::Blob(bytes) => bytes,
            _ => return Err(IonError::InvalidState),
        };
        let remaining = &payload[self.chunk_at..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.chunk_at += n;
        let more = self.chunk_at < payload.len();
        if !more {
            self.value = None;
        }
        Ok((n, more))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> RawTextReader {
        RawTextReader::new(InputStream::from_slice(text.as_bytes()))
    }

    #[test]
    fn scalars_at_top_level() {
        let mut r = reader("1 2.5 true \"s\" sym null.int");
        assert_eq!(r.next().unwrap(), Some(RawTextEvent::Value(IonType::Int)));
        assert_eq!(r.read_i64().unwrap(), 1);
        assert_eq!(
            r.next().unwrap(),
            Some(RawTextEvent::Value(IonType::Decimal))
        );
        assert_eq!(r.read_decimal().unwrap().to_text(), "2.5");
        r.next().unwrap();
        assert!(r.read_bool().unwrap());
        r.next().unwrap();
        assert_eq!(r.read_string().unwrap(), "s");
        r.next().unwrap();
        assert_eq!(
            r.read_symbol().unwrap(),
            RawSymbol::Text("sym".to_owned())
        );
        assert_eq!(r.next().unwrap(), Some(RawTextEvent::Value(IonType::Int)));
        assert!(r.is_null());
        assert_eq!(r.next().unwrap(), None);
    }

    #[test]
    fn structs_with_fields() {
        let mut r = reader("{a:1, b:[2, 3], \"c\": x}");
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.field_name(), Some(&RawSymbol::Text("a".to_owned())));
        assert_eq!(r.read_i64().unwrap(), 1);
        r.next().unwrap();
        assert_eq!(r.field_name(), Some(&RawSymbol::Text("b".to_owned())));
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.read_i64().unwrap(), 2);
        r.next().unwrap();
        assert_eq!(r.read_i64().unwrap(), 3);
        assert_eq!(r.next().unwrap(), None);
        r.step_out().unwrap();
        r.next().unwrap();
        assert_eq!(r.field_name(), Some(&RawSymbol::Text("c".to_owned())));
        assert_eq!(r.read_symbol().unwrap(), RawSymbol::Text("x".to_owned()));
        assert_eq!(r.next().unwrap(), None);
        r.step_out().unwrap();
        assert_eq!(r.next().unwrap(), None);
    }

    #[test]
    fn annotations_collect() {
        let mut r = reader("a::b::7 x::[1]");
        r.next().unwrap();
        assert_eq!(
            r.annotations(),
            &[
                RawSymbol::Text("a".to_owned()),
                RawSymbol::Text("b".to_owned())
            ]
        );
        assert_eq!(r.read_i64().unwrap(), 7);
        r.next().unwrap();
        assert_eq!(r.annotations(), &[RawSymbol::Text("x".to_owned())]);
        assert_eq!(r.ion_type(), Some(IonType::List));
    }

    #[test]
    fn sexp_operators() {
        let mut r = reader("(a + (b - 3))");
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.read_symbol().unwrap(), RawSymbol::Text("a".to_owned()));
        r.next().unwrap();
        assert_eq!(r.read_symbol().unwrap(), RawSymbol::Text("+".to_owned()));
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.read_symbol().unwrap(), RawSymbol::Text("b".to_owned()));
        r.next().unwrap();
        assert_eq!(r.read_symbol().unwrap(), RawSymbol::Text("-".to_owned()));
        r.next().unwrap();
        assert_eq!(r.read_i64().unwrap(), 3);
        assert_eq!(r.next().unwrap(), None);
        r.step_out().unwrap();
        assert_eq!(r.next().unwrap(), None);
        r.step_out().unwrap();
    }

    #[test]
    fn unread_containers_are_skipped() {
        let mut r = reader("{a: {b: [1, 2]}} 42");
        r.next().unwrap();
        r.next().unwrap();
        assert_eq!(r.read_i64().unwrap(), 42);
    }

    #[test]
    fn trailing_commas_are_tolerated() {
        let mut r = reader("[1, 2,]");
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        r.next().unwrap();
        assert_eq!(r.next().unwrap(), None);
        r.step_out().unwrap();
    }

    #[test]
    fn missing_separator_is_a_syntax_error() {
        let mut r = reader("[1 2]");
        r.next().unwrap();
        r.step_in().unwrap();
        r.next().unwrap();
        assert_eq!(r.next(), Err(IonError::InvalidSyntax));
    }

    #[test]
    fn ivm_symbol_is_surfaced() {
        let mut r = reader("$ion_1_0 1");
        assert_eq!(r.next().unwrap(), Some(RawTextEvent::Ivm));
        assert_eq!(r.next().unwrap(), Some(RawTextEvent::Value(IonType::Int)));
        let mut quoted = reader("'$ion_1_0'");
        assert_eq!(
            quoted.next().unwrap(),
            Some(RawTextEvent::Value(IonType::Symbol))
        );
    }

    #[test]
    fn struct_grammar_violations() {
        assert_eq!(
            {
                let mut r = reader("{1: 2}");
                r.next().unwrap();
                r.step_in().unwrap();
                r.next()
            },
            Err(IonError::InvalidSyntax)
        );
        assert_eq!(
            {
                let mut r = reader("{a 2}");
                r.next().unwrap();
                r.step_in().unwrap();
                r.next()
            },
            Err(IonError::InvalidSyntax)
        );
    }

    #[test]
    fn chunked_string_reads() {
        let mut r = reader("\"abcdefghij\"");
        r.next().unwrap();
        let mut buf = [0u8; 4];
        let mut out = Vec::new();
        loop {
            let (n, more) = r.read_chunk(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
            if !more {
                break;
            }
        }
        assert_eq!(out, b"abcdefghij");
    }
}
