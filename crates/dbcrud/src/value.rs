//! Dynamically typed column values and field payloads.
//!
//! Generated `select`/`update`/`delete` functions take their filters and
//! updates as [`Fields`]: an ordered list of `column -> value` pairs. The
//! order is kept so the rendered SQL and its placeholders stay deterministic.

use std::error::Error;

use bytes::BytesMut;
use chrono::NaiveDateTime;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single bindable column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
}

impl Value {
    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            Self::Bool(v) => v,
            Self::Int32(v) => v,
            Self::Int64(v) => v,
            Self::Float32(v) => v,
            Self::Float64(v) => v,
            Self::Text(v) => v,
            Self::Bytes(v) => v,
            Self::Timestamp(v) => v,
        }
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        self.as_sql().to_sql_checked(ty, out)
    }

    // The wrapped value decides; see `to_sql_checked`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    /// Integers and floats bind to a column of the other width: `Int32`
    /// widens to `BIGINT`, `Float32` to `DOUBLE PRECISION`, and `Int64`
    /// narrows to `INTEGER` when it fits.
    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Self::Int32(v) if *ty == Type::INT8 => i64::from(*v).to_sql_checked(ty, out),
            Self::Int64(v) if *ty == Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
            Self::Float32(v) if *ty == Type::FLOAT8 => f64::from(*v).to_sql_checked(ty, out),
            _ => self.as_sql().to_sql_checked(ty, out),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    NaiveDateTime => Timestamp,
}

/// An ordered `column -> value` payload.
///
/// Setting a column twice replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Fields::set`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set `column` to `value`.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    /// Look up the value bound to `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (column, value) in iter {
            fields.set(column, value);
        }
        fields
    }
}

/// Build a [`Fields`] payload from `column => value` pairs.
///
/// ```ignore
/// let query = dbcrud::fields! { "some_int" => 45i64, "some_bool" => true };
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {
        $crate::Fields::new()$(.with($column, $value))+
    };
}
