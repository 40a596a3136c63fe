//! Owned value trees.
//!
//! Streaming cursors are the primary API; an [`Element`] materializes one
//! value (annotations included) for callers that want the whole tree, and
//! for round-trip testing.

use crate::decimal::Decimal;
use crate::error::{IonError, IonResult};
use crate::int::IonInt;
use crate::ion_type::{IonType, SymbolToken};
use crate::reader::Reader;
use crate::timestamp::Timestamp;
use crate::writer::Writer;

/// One Ion value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(IonType),
    Bool(bool),
    Int(IonInt),
    Float(f64),
    Decimal(Decimal),
    Timestamp(Timestamp),
    Symbol(SymbolToken),
    String(String),
    Clob(Vec<u8>),
    Blob(Vec<u8>),
    List(Vec<Element>),
    Sexp(Vec<Element>),
    Struct(Vec<(SymbolToken, Element)>),
}

impl Value {
    /// The value's type.
    pub fn ion_type(&self) -> IonType {
        match self {
            Value::Null(ty) => *ty,
            Value::Bool(_) => IonType::Bool,
            Value::Int(_) => IonType::Int,
            Value::Float(_) => IonType::Float,
            Value::Decimal(_) => IonType::Decimal,
            Value::Timestamp(_) => IonType::Timestamp,
            Value::Symbol(_) => IonType::Symbol,
            Value::String(_) => IonType::String,
            Value::Clob(_) => IonType::Clob,
            Value::Blob(_) => IonType::Blob,
            Value::List(_) => IonType::List,
            Value::Sexp(_) => IonType::Sexp,
            Value::Struct(_) => IonType::Struct,
        }
    }
}

/// A value plus its annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub annotations: Vec<SymbolToken>,
    pub value: Value,
}

impl Element {
    /// Wraps a bare value.
    pub fn new(value: Value) -> Self {
        Self {
            annotations: Vec::new(),
            value,
        }
    }

    /// Wraps a value with annotations.
    pub fn annotated(annotations: Vec<SymbolToken>, value: Value) -> Self {
        Self { annotations, value }
    }

    /// Materializes the reader's current value.
    pub fn read_from(reader: &mut Reader) -> IonResult<Self> {
        let ty = reader.ion_type().ok_or(IonError::InvalidState)?;
        let annotations = reader.annotations()?;
        if reader.is_null() {
            return Ok(Self::annotated(annotations, Value::Null(ty)));
        }
        let value = match ty {
            IonType::Null => Value::Null(IonType::Null),
            IonType::Bool => Value::Bool(reader.read_bool()?),
            IonType::Int => Value::Int(reader.read_int()?),
            IonType::Float => Value::Float(reader.read_f64()?),
            IonType::Decimal => Value::Decimal(reader.read_decimal()?),
            IonType::Timestamp => Value::Timestamp(reader.read_timestamp()?),
            IonType::Symbol => Value::Symbol(reader.read_symbol()?),
            IonType::String => Value::String(reader.read_string()?),
            IonType::Clob => Value::Clob(reader.read_clob()?),
            IonType::Blob => Value::Blob(reader.read_blob()?),
            IonType::List | IonType::Sexp => {
                let mut children = Vec::new();
                reader.step_in()?;
                while reader.next()?.is_some() {
                    children.push(Self::read_from(reader)?);
                }
                reader.step_out()?;
                if ty == IonType::List {
                    Value::List(children)
                } else {
                    Value::Sexp(children)
                }
            }
            IonType::Struct => {
                let mut fields = Vec::new();
                reader.step_in()?;
                while reader.next()?.is_some() {
                    let name = reader.field_name()?.ok_or(IonError::InvalidState)?;
                    fields.push((name, Self::read_from(reader)?));
                }
                reader.step_out()?;
                Value::Struct(fields)
            }
        };
        Ok(Self::annotated(annotations, value))
    }

    /// Materializes every remaining top-level value.
    pub fn read_all(reader: &mut Reader) -> IonResult<Vec<Self>> {
        let mut elements = Vec::new();
        while reader.next()?.is_some() {
            elements.push(Self::read_from(reader)?);
        }
        Ok(elements)
    }

    /// Writes this element through a writer.
    pub fn write_to(&self, writer: &mut Writer) -> IonResult<()> {
        for annotation in &self.annotations {
            match (annotation.text(), annotation.sid) {
                (Some(text), _) => writer.add_annotation(text)?,
                (None, Some(sid)) => writer.add_annotation_sid(sid)?,
                (None, None) => return Err(IonError::InvalidSymbol),
            }
        }
        match &self.value {
            Value::Null(ty) => writer.write_null(*ty),
            Value::Bool(value) => writer.write_bool(*value),
            Value::Int(value) => writer.write_int(value),
            Value::Float(value) => writer.write_f64(*value),
            Value::Decimal(value) => writer.write_decimal(value),
            Value::Timestamp(value) => writer.write_timestamp(value),
            Value::Symbol(token) => writer.write_symbol_token(token),
            Value::String(text) => writer.write_string(text),
            Value::Clob(bytes) => writer.write_clob(bytes),
            Value::Blob(bytes) => writer.write_blob(bytes),
            Value::List(children) | Value::Sexp(children) => {
                writer.step_in(self.value.ion_type())?;
                for child in children {
                    child.write_to(writer)?;
                }
                writer.step_out()
            }
            Value::Struct(fields) => {
                writer.step_in(IonType::Struct)?;
                for (name, child) in fields {
                    match (name.text(), name.sid) {
                        (Some(text), _) => writer.set_field_name(text)?,
                        (None, Some(sid)) => writer.set_field_name_sid(sid)?,
                        (None, None) => return Err(IonError::InvalidSymbol),
                    }
                    child.write_to(writer)?;
                }
                writer.step_out()
            }
        }
    }
}
