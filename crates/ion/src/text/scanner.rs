//! Text tokenizer.
//!
//! Cracks the input stream into tokens with one token of pushback.
//! Punctuation needs one code point of lookahead; keywords are confirmed
//! by checking that the character after the candidate terminates a value.
//! Line and column advance here, treating CR, LF, and CR+LF each as one
//! logical newline.

use crate::error::{IonError, IonResult, Position};
use crate::int::IonInt;
use crate::ion_type::{IonType, Sid};
use crate::stream::InputStream;
use crate::timestamp::Timestamp;

/// Integer literal radix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Hex,
    Binary,
}

/// One lexical token.
///
/// Payload-bearing tokens arrive fully decoded: strings are unescaped,
/// long-string segments concatenated, lobs base64-decoded, numbers
/// normalized (underscores stripped, sign attached).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Eof,
    ListOpen,
    SexpOpen,
    StructOpen,
    CloseBracket,
    CloseParen,
    CloseBrace,
    Comma,
    Colon,
    DoubleColon,
    /// Plain identifier symbol.
    Symbol(String),
    /// Single-quoted symbol.
    QuotedSymbol(String),
    /// Operator-character run inside an sexp.
    ExtendedSymbol(String),
    /// `$N` SID literal.
    SidSymbol(Sid),
    Str(String),
    Clob(Vec<u8>),
    Blob(Vec<u8>),
    /// Normalized integer text plus its radix.
    Int { text: String, radix: Radix },
    /// Normalized decimal text (`.` or `d` form).
    Decimal(String),
    /// Normalized float text (`e` form or inf/nan).
    Float(String),
    Timestamp(Timestamp),
    Null(IonType),
    Bool(bool),
}

const OPERATOR_CHARS: &[u8] = b"!#%&*+-./;<=>?@^|~";

fn is_identifier_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_identifier_part(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Whether `c` may legally follow a keyword or number.
fn is_value_terminator(c: Option<u8>) -> bool {
    match c {
        None => true,
        Some(c) => {
            is_whitespace(c)
                || matches!(
                    c,
                    b',' | b']' | b')' | b'}' | b':' | b'"' | b'\'' | b'[' | b'(' | b'{' | b'/'
                )
        }
    }
}

/// The tokenizer.
pub struct Scanner {
    stream: InputStream,
    /// Byte pushback, most recent last. Two deep: long-string lookahead
    /// needs to back out of a quote with another byte already pending.
    peeked: Vec<u8>,
    line: usize,
    column: usize,
    last_was_cr: bool,
    token_pos: Position,
    pushback: Option<Token>,
}

impl Scanner {
    pub fn new(stream: InputStream) -> Self {
        Self {
            stream,
            peeked: Vec::with_capacity(2),
            line: 1,
            column: 0,
            last_was_cr: false,
            token_pos: Position {
                line: 1,
                column: 0,
                offset: 0,
            },
            pushback: None,
        }
    }

    /// Position at which the current token started.
    pub fn position(&self) -> Position {
        self.token_pos
    }

    fn read_fresh(&mut self) -> IonResult<Option<u8>> {
        let c = self.stream.read_byte()?;
        match c {
            Some(b'\n') => {
                if self.last_was_cr {
                    // CR+LF already counted at the CR.
                    self.last_was_cr = false;
                } else {
                    self.line += 1;
                    self.column = 0;
                }
            }
            Some(b'\r') => {
                self.line += 1;
                self.column = 0;
                self.last_was_cr = true;
            }
            Some(_) => {
                self.column += 1;
                self.last_was_cr = false;
            }
            None => {}
        }
        Ok(c)
    }

    fn read(&mut self) -> IonResult<Option<u8>> {
        if let Some(c) = self.peeked.pop() {
            return Ok(Some(c));
        }
        self.read_fresh()
    }

    fn unread(&mut self, c: u8) {
        self.peeked.push(c);
    }

    fn peek(&mut self) -> IonResult<Option<u8>> {
        if self.peeked.is_empty() {
            if let Some(c) = self.read_fresh()? {
                self.peeked.push(c);
            }
        }
        Ok(self.peeked.last().copied())
    }

    /// Consumes whitespace, comments, and BOMs.
    fn skip_whitespace(&mut self) -> IonResult<()> {
        loop {
            let c = match self.read()? {
                Some(c) => c,
                None => return Ok(()),
            };
            if is_whitespace(c) {
                continue;
            }
            if c == 0xef {
                // UTF-8 byte order mark.
                let b1 = self.read()?;
                let b2 = self.read()?;
                if b1 != Some(0xbb) || b2 != Some(0xbf) {
                    return Err(IonError::InvalidTokenChar);
                }
                continue;
            }
            if c == b'/' {
                match self.peek()? {
                    Some(b'/') => {
                        self.read()?;
                        loop {
                            match self.read()? {
                                Some(b'\n') | None => break,
                                Some(b'\r') => {
                                    if self.peek()? == Some(b'\n') {
                                        self.read()?;
                                    }
                                    break;
                                }
                                Some(_) => {}
                            }
                        }
                        continue;
                    }
                    Some(b'*') => {
                        self.read()?;
                        let mut prev = 0u8;
                        loop {
                            match self.read()? {
                                Some(b'/') if prev == b'*' => break,
                                Some(c) => prev = c,
                                None => return Err(IonError::UnexpectedEof),
                            }
                        }
                        continue;
                    }
                    _ => {
                        self.unread(c);
                        return Ok(());
                    }
                }
            }
            self.unread(c);
            return Ok(());
        }
    }

    /// Pushes a token back; the next [`next`](Scanner::next) returns it.
    pub fn un_next(&mut self, token: Token) {
        self.pushback = Some(token);
    }

    /// Produces the next token. `in_sexp` enables operator symbols.
    pub fn next(&mut self, in_sexp: bool) -> IonResult<Token> {
        if let Some(token) = self.pushback.take() {
            return Ok(token);
        }
        self.skip_whitespace()?;
        self.token_pos = Position {
            line: self.line,
            column: self.column + 1,
            offset: self.stream.position(),
        };
        let c = match self.read()? {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };
        match c {
            b'[' => Ok(Token::ListOpen),
            b']' => Ok(Token::CloseBracket),
            b'(' => Ok(Token::SexpOpen),
            b')' => Ok(Token::CloseParen),
            b'}' => Ok(Token::CloseBrace),
            b',' => Ok(Token::Comma),
            b':' => {
                if self.peek()? == Some(b':') {
                    self.read()?;
                    Ok(Token::DoubleColon)
                } else {
                    Ok(Token::Colon)
                }
            }
            b'{' => {
                if self.peek()? == Some(b'{') {
                    self.read()?;
                    self.scan_lob()
                } else {
                    Ok(Token::StructOpen)
                }
            }
            b'"' => {
                let bytes = self.scan_quoted(b'"', true, false)?;
                String::from_utf8(bytes)
                    .map(Token::Str)
                    .map_err(|_| IonError::InvalidUtf8)
            }
            b'\'' => {
                if self.peek()? == Some(b'\'') {
                    self.read()?;
                    match self.peek()? {
                        Some(b'\'') => {
                            self.read()?;
                            let bytes = self.scan_long_segments(true)?;
                            String::from_utf8(bytes)
                                .map(Token::Str)
                                .map_err(|_| IonError::InvalidUtf8)
                        }
                        _ => {
                            // Two quotes form the empty quoted symbol.
                            Ok(Token::QuotedSymbol(String::new()))
                        }
                    }
                } else {
                    let bytes = self.scan_quoted(b'\'', true, false)?;
                    String::from_utf8(bytes)
                        .map(Token::QuotedSymbol)
                        .map_err(|_| IonError::InvalidUtf8)
                }
            }
            b'+' => match self.peek()? {
                Some(b'i') => {
                    self.expect_keyword(b"inf")?;
                    self.check_terminator()?;
                    Ok(Token::Float("+inf".to_owned()))
                }
                _ if in_sexp => self.scan_operator(c),
                _ => Err(IonError::InvalidTokenChar),
            },
            b'-' => match self.peek()? {
                Some(d) if d.is_ascii_digit() => self.scan_number(true),
                Some(b'i') => {
                    self.expect_keyword(b"inf")?;
                    self.check_terminator()?;
                    Ok(Token::Float("-inf".to_owned()))
                }
                _ if in_sexp => self.scan_operator(c),
                _ => Err(IonError::InvalidTokenChar),
            },
            c if c.is_ascii_digit() => {
                self.unread(c);
                self.scan_number(false)
            }
            c if is_identifier_start(c) => self.scan_identifier(c),
            c if in_sexp && OPERATOR_CHARS.contains(&c) => self.scan_operator(c),
            _ => Err(IonError::InvalidTokenChar),
        }
    }

    fn expect_keyword(&mut self, rest: &[u8]) -> IonResult<()> {
        for &expected in rest {
            if self.read()? != Some(expected) {
                return Err(IonError::InvalidToken);
            }
        }
        Ok(())
    }

    fn check_terminator(&mut self) -> IonResult<()> {
        let c = self.peek()?;
        if is_value_terminator(c) {
            Ok(())
        } else {
            Err(IonError::InvalidTokenChar)
        }
    }

    // ---- identifiers and keywords ------------------------------------

    fn scan_identifier(&mut self, first: u8) -> IonResult<Token> {
        let mut text = String::new();
        text.push(first as char);
        while let Some(c) = self.peek()? {
            if is_identifier_part(c) {
                self.read()?;
                text.push(c as char);
            } else {
                break;
            }
        }
        // SID literals: `$` followed by digits only.
        if text.len() > 1 && text.as_bytes()[0] == b'$' && text[1..].bytes().all(|c| c.is_ascii_digit())
        {
            let sid: Sid = text[1..].parse().map_err(|_| IonError::NumericOverflow)?;
            return Ok(Token::SidSymbol(sid));
        }
        match text.as_str() {
            "true" => {
                self.check_terminator()?;
                Ok(Token::Bool(true))
            }
            "false" => {
                self.check_terminator()?;
                Ok(Token::Bool(false))
            }
            "nan" => {
                self.check_terminator()?;
                Ok(Token::Float("nan".to_owned()))
            }
            "null" => {
                if self.peek()? == Some(b'.') {
                    self.read()?;
                    let mut word = String::new();
                    while let Some(c) = self.peek()? {
                        if c.is_ascii_lowercase() {
                            self.read()?;
                            word.push(c as char);
                        } else {
                            break;
                        }
                    }
                    self.check_terminator()?;
                    let ty = IonType::from_keyword(&word).ok_or(IonError::InvalidToken)?;
                    Ok(Token::Null(ty))
                } else {
                    self.check_terminator()?;
                    Ok(Token::Null(IonType::Null))
                }
            }
            _ => Ok(Token::Symbol(text)),
        }
    }

    fn scan_operator(&mut self, first: u8) -> IonResult<Token> {
        let mut text = String::new();
        text.push(first as char);
        while let Some(c) = self.peek()? {
            if !OPERATOR_CHARS.contains(&c) {
                break;
            }
            if c == b'/' {
                // A comment ends the run; the slash is whitespace's problem.
                break;
            }
            self.read()?;
            text.push(c as char);
        }
        Ok(Token::ExtendedSymbol(text))
    }

    // ---- numbers ------------------------------------------------------

    /// Collects digits with underscore rules: only between digits, never
    /// doubled, never leading or trailing. `any` is true when a digit of
    /// this run has already been consumed by the caller.
    fn scan_digit_run(&mut self, out: &mut String, radix: Radix, mut any: bool) -> IonResult<()> {
        let is_digit = |c: u8| match radix {
            Radix::Decimal => c.is_ascii_digit(),
            Radix::Hex => c.is_ascii_hexdigit(),
            Radix::Binary => c == b'0' || c == b'1',
        };
        let mut prev_underscore = false;
        while let Some(c) = self.peek()? {
            if is_digit(c) {
                self.read()?;
                out.push(c as char);
                prev_underscore = false;
                any = true;
            } else if c == b'_' {
                if !any || prev_underscore {
                    return Err(IonError::InvalidTokenChar);
                }
                self.read()?;
                prev_underscore = true;
            } else {
                break;
            }
        }
        if prev_underscore || !any {
            return Err(IonError::InvalidTokenChar);
        }
        Ok(())
    }

    fn scan_number(&mut self, negative: bool) -> IonResult<Token> {
        let first = self.read()?.ok_or(IonError::UnexpectedEof)?;
        // Hex and binary branch off a leading zero.
        if first == b'0' {
            match self.peek()? {
                Some(b'x') | Some(b'X') => {
                    self.read()?;
                    let mut text = String::from(if negative { "-0x" } else { "0x" });
                    self.scan_digit_run(&mut text, Radix::Hex, false)?;
                    self.check_terminator()?;
                    return Ok(Token::Int {
                        text,
                        radix: Radix::Hex,
                    });
                }
                Some(b'b') | Some(b'B') => {
                    self.read()?;
                    let mut text = String::from(if negative { "-0b" } else { "0b" });
                    self.scan_digit_run(&mut text, Radix::Binary, false)?;
                    self.check_terminator()?;
                    return Ok(Token::Int {
                        text,
                        radix: Radix::Binary,
                    });
                }
                _ => {}
            }
        }
        let mut digits = String::new();
        digits.push(first as char);
        if let Some(c) = self.peek()? {
            if c.is_ascii_digit() || c == b'_' {
                self.scan_digit_run(&mut digits, Radix::Decimal, true)?;
            }
        }
        // A four-digit run followed by `-` or `T` opens a timestamp.
        if !negative && digits.len() == 4 {
            if let Some(c) = self.peek()? {
                if c == b'-' || c == b'T' {
                    return self.scan_timestamp(digits);
                }
            }
        }
        if digits.len() > 1 && digits.as_bytes()[0] == b'0' {
            return Err(IonError::InvalidLeadingZeros);
        }
        let mut is_decimal = false;
        let mut is_float = false;
        let mut text = String::new();
        if negative {
            text.push('-');
        }
        text.push_str(&digits);
        if self.peek()? == Some(b'.') {
            self.read()?;
            is_decimal = true;
            text.push('.');
            if let Some(c) = self.peek()? {
                if c.is_ascii_digit() {
                    self.scan_digit_run(&mut text, Radix::Decimal, false)?;
                } else if c == b'_' {
                    return Err(IonError::InvalidTokenChar);
                }
            }
        }
        match self.peek()? {
            Some(b'e') | Some(b'E') => {
                self.read()?;
                is_float = true;
                is_decimal = false;
                text.push('e');
                self.scan_exponent(&mut text)?;
            }
            Some(b'd') | Some(b'D') => {
                self.read()?;
                is_decimal = true;
                text.push('d');
                self.scan_exponent(&mut text)?;
            }
            _ => {}
        }
        self.check_terminator()?;
        if is_float {
            Ok(Token::Float(text))
        } else if is_decimal {
            Ok(Token::Decimal(text))
        } else {
            Ok(Token::Int {
                text,
                radix: Radix::Decimal,
            })
        }
    }

    fn scan_exponent(&mut self, text: &mut String) -> IonResult<()> {
        match self.peek()? {
            Some(b'+') => {
                self.read()?;
            }
            Some(b'-') => {
                self.read()?;
                text.push('-');
            }
            _ => {}
        }
        match self.peek()? {
            Some(c) if c.is_ascii_digit() => self.scan_digit_run(text, Radix::Decimal, false),
            _ => Err(IonError::InvalidTokenChar),
        }
    }

    fn scan_timestamp(&mut self, year: String) -> IonResult<Token> {
        let mut text = year;
        while let Some(c) = self.peek()? {
            if c.is_ascii_digit() || matches!(c, b'-' | b':' | b'+' | b'.' | b'T' | b'Z' | b'z') {
                self.read()?;
                text.push(c as char);
            } else {
                break;
            }
        }
        self.check_terminator()?;
        Ok(Token::Timestamp(Timestamp::parse_text(&text)?))
    }

    // ---- strings, symbols, escapes -----------------------------------

    /// Scans to the closing quote, processing escapes.
    ///
    /// `unicode_escapes` is off for clobs, which reject `\u`/`\U`.
    fn scan_quoted(
        &mut self,
        quote: u8,
        unicode_escapes: bool,
        is_clob: bool,
    ) -> IonResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            let c = self.read()?.ok_or(IonError::UnexpectedEof)?;
            if c == quote {
                return Ok(out);
            }
            match c {
                b'\n' | b'\r' => return Err(IonError::NewLineInString),
                b'\\' => self.read_escape(&mut out, unicode_escapes, is_clob)?,
                c if is_clob && c >= 0x80 => return Err(IonError::InvalidTokenChar),
                c => out.push(c),
            }
        }
    }

    /// Scans `'''…'''` segments; adjacent segments separated by
    /// whitespace concatenate into one value.
    fn scan_long_segments(&mut self, unicode_escapes: bool) -> IonResult<Vec<u8>> {
        let mut out = Vec::new();
        loop {
            // Body of one segment; the opening ''' is already consumed.
            loop {
                let c = self.read()?.ok_or(IonError::UnexpectedEof)?;
                if c == b'\'' {
                    if self.peek()? == Some(b'\'') {
                        self.read()?;
                        if self.peek()? == Some(b'\'') {
                            self.read()?;
                            break;
                        }
                        out.push(b'\'');
                        out.push(b'\'');
                    } else {
                        out.push(b'\'');
                    }
                } else if c == b'\\' {
                    self.read_escape(&mut out, unicode_escapes, !unicode_escapes)?;
                } else if !unicode_escapes && c >= 0x80 {
                    // Clob segments are byte data, ASCII on the wire.
                    return Err(IonError::InvalidTokenChar);
                } else if c == b'\r' {
                    // Normalized to LF; CR+LF collapses.
                    if self.peek()? == Some(b'\n') {
                        self.read()?;
                    }
                    out.push(b'\n');
                } else {
                    out.push(c);
                }
            }
            // Peek past whitespace for another segment.
            self.skip_whitespace()?;
            match self.peek()? {
                Some(b'\'') => {
                    self.read()?;
                    if self.peek()? == Some(b'\'') {
                        self.read()?;
                        if self.peek()? == Some(b'\'') {
                            self.read()?;
                            continue;
                        }
                        return Err(IonError::InvalidToken);
                    }
                    // A single quote after a long string is its own token.
                    self.unread(b'\'');
                    return Ok(out);
                }
                _ => return Ok(out),
            }
        }
    }

    fn hex_digits(&mut self, count: usize) -> IonResult<u32> {
        let mut value = 0u32;
        for _ in 0..count {
            let c = self.read()?.ok_or(IonError::UnexpectedEof)?;
            let digit = match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                b'A'..=b'F' => c - b'A' + 10,
                _ => return Err(IonError::InvalidEscapeSequence),
            };
            value = (value << 4) | digit as u32;
        }
        Ok(value)
    }

    fn push_code_point(out: &mut Vec<u8>, cp: u32) -> IonResult<()> {
        let ch = char::from_u32(cp).ok_or(IonError::InvalidEscapeSequence)?;
        let mut buf = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        Ok(())
    }

    fn read_escape(
        &mut self,
        out: &mut Vec<u8>,
        unicode_escapes: bool,
        is_clob: bool,
    ) -> IonResult<()> {
        let c = self.read()?.ok_or(IonError::UnexpectedEof)?;
        match c {
            b'0' => out.push(0x00),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b't' => out.push(b'\t'),
            b'n' => out.push(b'\n'),
            b'f' => out.push(0x0c),
            b'r' => out.push(b'\r'),
            b'v' => out.push(0x0b),
            b'\'' => out.push(b'\''),
            b'"' => out.push(b'"'),
            b'?' => out.push(b'?'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'\n' => {}
            b'\r' => {
                // Line continuation swallows CR+LF as one newline.
                if self.peek()? == Some(b'\n') {
                    self.read()?;
                }
            }
            b'x' => {
                let value = self.hex_digits(2)?;
                if is_clob {
                    out.push(value as u8);
                } else {
                    Self::push_code_point(out, value)?;
                }
            }
            b'u' => {
                if !unicode_escapes {
                    return Err(IonError::InvalidEscapeSequence);
                }
                let unit = self.hex_digits(4)?;
                if (0xd800..0xdc00).contains(&unit) {
                    // High surrogate: its partner must follow immediately.
                    if self.read()? != Some(b'\\') || self.read()? != Some(b'u') {
                        return Err(IonError::InvalidEscapeSequence);
                    }
                    let low = self.hex_digits(4)?;
                    if !(0xdc00..0xe000).contains(&low) {
                        return Err(IonError::InvalidEscapeSequence);
                    }
                    let cp = 0x10000 + ((unit - 0xd800) << 10) + (low - 0xdc00);
                    Self::push_code_point(out, cp)?;
                } else if (0xdc00..0xe000).contains(&unit) {
                    return Err(IonError::InvalidEscapeSequence);
                } else {
                    Self::push_code_point(out, unit)?;
                }
            }
            b'U' => {
                if !unicode_escapes {
                    return Err(IonError::InvalidEscapeSequence);
                }
                let cp = self.hex_digits(8)?;
                if (0xd800..0xe000).contains(&cp) {
                    return Err(IonError::InvalidEscapeSequence);
                }
                Self::push_code_point(out, cp)?;
            }
            _ => return Err(IonError::InvalidEscapeSequence),
        }
        Ok(())
    }

    // ---- lobs ---------------------------------------------------------

    fn scan_lob(&mut self) -> IonResult<Token> {
        // Whitespace is allowed between {{ and the payload, comments are
        // not (a slash is base64).
        let mut c = self.read()?.ok_or(IonError::UnexpectedEof)?;
        while is_whitespace(c) {
            c = self.read()?.ok_or(IonError::UnexpectedEof)?;
        }
        if c == b'"' {
            let bytes = self.scan_quoted(b'"', false, true)?;
            self.expect_lob_close()?;
            return Ok(Token::Clob(bytes));
        }
        if c == b'\'' {
            if self.read()? != Some(b'\'') || self.read()? != Some(b'\'') {
                return Err(IonError::InvalidToken);
            }
            let bytes = self.scan_long_segments(false)?;
            self.expect_lob_close()?;
            return Ok(Token::Clob(bytes));
        }
        // Base64 blob body.
        let mut encoded = Vec::new();
        loop {
            if c == b'}' {
                if self.read()? != Some(b'}') {
                    return Err(IonError::InvalidLobTerminator);
                }
                let bytes = ion_kit_base64::from_base64(&encoded)?;
                return Ok(Token::Blob(bytes));
            }
            if is_whitespace(c) {
                // Whitespace may split the base64 run anywhere.
            } else if c.is_ascii_alphanumeric() || matches!(c, b'+' | b'/' | b'=') {
                encoded.push(c);
            } else {
                return Err(IonError::BadBase64Blob);
            }
            c = self.read()?.ok_or(IonError::UnexpectedEof)?;
        }
    }

    fn expect_lob_close(&mut self) -> IonResult<()> {
        let mut c = self.read()?.ok_or(IonError::UnexpectedEof)?;
        while is_whitespace(c) {
            c = self.read()?.ok_or(IonError::UnexpectedEof)?;
        }
        if c != b'}' || self.read()? != Some(b'}') {
            return Err(IonError::InvalidLobTerminator);
        }
        Ok(())
    }
}

/// Parses a normalized integer token into an [`IonInt`].
pub fn parse_int_token(text: &str, radix: Radix) -> IonResult<IonInt> {
    match radix {
        Radix::Decimal => IonInt::from_decimal_str(text),
        Radix::Hex => IonInt::from_hex_str(text),
        Radix::Binary => IonInt::from_binary_str(text),
    }
}

/// Parses a normalized float token.
pub fn parse_float_token(text: &str) -> IonResult<f64> {
    match text {
        "+inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        "nan" => Ok(f64::NAN),
        _ => text.parse().map_err(|_| IonError::UnrecognizedFloat),
    }
}
