//! The Ion value domain and symbol tokens.

/// Symbol ID: a positive integer assigned contiguously from 1.
pub type Sid = u32;

/// The closed set of Ion value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IonType {
    Null,
    Bool,
    Int,
    Float,
    Decimal,
    Timestamp,
    Symbol,
    String,
    Clob,
    Blob,
    List,
    Sexp,
    Struct,
}

impl IonType {
    /// Whether values of this type hold child values.
    pub fn is_container(self) -> bool {
        matches!(self, IonType::List | IonType::Sexp | IonType::Struct)
    }

    /// Whether this is one of the two lob types.
    pub fn is_lob(self) -> bool {
        matches!(self, IonType::Clob | IonType::Blob)
    }

    /// The type keyword as it appears after `null.` in text.
    pub fn keyword(self) -> &'static str {
        match self {
            IonType::Null => "null",
            IonType::Bool => "bool",
            IonType::Int => "int",
            IonType::Float => "float",
            IonType::Decimal => "decimal",
            IonType::Timestamp => "timestamp",
            IonType::Symbol => "symbol",
            IonType::String => "string",
            IonType::Clob => "clob",
            IonType::Blob => "blob",
            IonType::List => "list",
            IonType::Sexp => "sexp",
            IonType::Struct => "struct",
        }
    }

    /// Resolves a `null.TYPE` keyword.
    pub fn from_keyword(word: &str) -> Option<IonType> {
        Some(match word {
            "null" => IonType::Null,
            "bool" => IonType::Bool,
            "int" => IonType::Int,
            "float" => IonType::Float,
            "decimal" => IonType::Decimal,
            "timestamp" => IonType::Timestamp,
            "symbol" => IonType::Symbol,
            "string" => IonType::String,
            "clob" => IonType::Clob,
            "blob" => IonType::Blob,
            "list" => IonType::List,
            "sexp" => IonType::Sexp,
            "struct" => IonType::Struct,
        _ => return None,
        })
    }
}

impl std::fmt::Display for IonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A symbol as it travels through readers and writers.
///
/// Either side may be missing: a symbol read from binary before its table
/// is known has only a SID; a symbol handed to a text writer has only
/// text. A SID with no text that falls inside a substituted import range
/// stays unresolved and round-trips as `$N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolToken {
    pub text: Option<String>,
    pub sid: Option<Sid>,
}

impl SymbolToken {
    /// A token with known text and no SID binding yet.
    pub fn known(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            sid: None,
        }
    }

    /// A token with only a SID.
    pub fn unknown(sid: Sid) -> Self {
        Self {
            text: None,
            sid: Some(sid),
        }
    }

    /// A token carrying both text and its SID.
    pub fn resolved(text: impl Into<String>, sid: Sid) -> Self {
        Self {
            text: Some(text.into()),
            sid: Some(sid),
        }
    }

    /// The token's text, if known.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl std::fmt::Display for SymbolToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.text, self.sid) {
            (Some(text), _) => f.write_str(text),
            (None, Some(sid)) => write!(f, "${sid}"),
            (None, None) => f.write_str("$0"),
        }
    }
}
