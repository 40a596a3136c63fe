//! Error taxonomy shared by every subsystem.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type IonResult<T> = Result<T, IonError>;

/// Source position of the first rejected byte.
///
/// Lines and columns are 1-based; `offset` counts bytes from the start of
/// the stream. CR, LF, and CR+LF each advance the line count once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: u64,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}, column {}, offset {}",
            self.line, self.column, self.offset
        )
    }
}

/// Every failure the library can surface.
///
/// Errors propagate to the API boundary without recovery; after an error a
/// reader or writer is only good for closing. EOF at a value boundary is
/// not an error and is reported as `None` from cursor calls; running out of
/// bytes inside a value is [`IonError::UnexpectedEof`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IonError {
    #[error("invalid argument")]
    InvalidArg,
    #[error("out of memory")]
    NoMemory,
    #[error("end of input")]
    Eof,
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid state")]
    InvalidState,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid character in token")]
    InvalidTokenChar,
    #[error("invalid syntax")]
    InvalidSyntax,
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("invalid escape sequence")]
    InvalidEscapeSequence,
    #[error("invalid leading zeros")]
    InvalidLeadingZeros,
    #[error("invalid timestamp")]
    InvalidTimestamp,
    #[error("invalid symbol")]
    InvalidSymbol,
    #[error("invalid symbol table")]
    InvalidSymbolTable,
    #[error("duplicate symbol")]
    DuplicateSymbol,
    #[error("key already exists")]
    KeyAlreadyExists,
    #[error("buffer too small")]
    BufferTooSmall,
    #[error("numeric overflow")]
    NumericOverflow,
    #[error("unrecognized float")]
    UnrecognizedFloat,
    #[error("bad base64 in blob")]
    BadBase64Blob,
    #[error("write error: {0:?}")]
    WriteError(std::io::ErrorKind),
    #[error("read error: {0:?}")]
    ReadError(std::io::ErrorKind),
    #[error("seek error: {0:?}")]
    SeekError(std::io::ErrorKind),
    #[error("mark not set")]
    MarkNotSet,
    #[error("import not found")]
    ImportNotFound,
    #[error("not a symbol table")]
    NotASymbolTable,
    #[error("table is immutable")]
    IsImmutable,
    #[error("table already has local symbols")]
    HasLocalSymbols,
    #[error("parser internal error")]
    ParserInternal,
    #[error("new line in string")]
    NewLineInString,
    #[error("invalid lob terminator")]
    InvalidLobTerminator,
    #[error("not implemented")]
    NotImpl,
}

impl From<ion_kit_collections::IndexError> for IonError {
    fn from(e: ion_kit_collections::IndexError) -> Self {
        match e {
            ion_kit_collections::IndexError::KeyAlreadyExists => IonError::KeyAlreadyExists,
        }
    }
}

impl From<ion_kit_base64::Base64Error> for IonError {
    fn from(_: ion_kit_base64::Base64Error) -> Self {
        IonError::BadBase64Blob
    }
}
