///
/// Dynamic values and index-or-name keys at the bind/get seam.
///
/// Dynamically-typed callers funnel into the statically-typed engine API
/// through [`Value`], a tagged variant with one case per bindable SQL
/// type, and through [`ParamKey`]/[`ColumnKey`], which let every bind and
/// get operation accept either a positional index or a name without
/// duplicating the method set.
///

use std::os::raw::c_int;

use libsqlite3_sys as ffi;

/// A dynamically-typed SQL value.
///
/// `Float` carries single precision to match the narrowing bind path; the
/// engine itself stores all reals as doubles. Fetched rows only ever
/// contain `Null`, `Int64`, `Double`, `Text` and `Blob`, the engine's
/// actual storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

/// Storage class of a result column, valid after a ROW step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

impl ColumnType {
    /// Map the engine's fundamental type code. Anything unrecognized is
    /// reported as `Null`, the engine's own default for columns that have
    /// not produced a value.
    pub fn from_raw(code: c_int) -> Self {
        match code {
            ffi::SQLITE_INTEGER => ColumnType::Integer,
            ffi::SQLITE_FLOAT => ColumnType::Float,
            ffi::SQLITE_TEXT => ColumnType::Text,
            ffi::SQLITE_BLOB => ColumnType::Blob,
            _ => ColumnType::Null,
        }
    }
}

/// A bind target: 1-based parameter index, or a parameter name
/// (`:name`, `@name`, `$name`, `?NNN`).
#[derive(Debug, Clone, Copy)]
pub enum ParamKey<'a> {
    Index(i32),
    Name(&'a str),
}

impl From<i32> for ParamKey<'static> {
    fn from(index: i32) -> Self {
        ParamKey::Index(index)
    }
}

impl<'a> From<&'a str> for ParamKey<'a> {
    fn from(name: &'a str) -> Self {
        ParamKey::Name(name)
    }
}

/// A column selector: 0-based index, or a column name resolved by a
/// case-insensitive scan.
#[derive(Debug, Clone, Copy)]
pub enum ColumnKey<'a> {
    Index(i32),
    Name(&'a str),
}

impl From<i32> for ColumnKey<'static> {
    fn from(index: i32) -> Self {
        ColumnKey::Index(index)
    }
}

impl<'a> From<&'a str> for ColumnKey<'a> {
    fn from(name: &'a str) -> Self {
        ColumnKey::Name(name)
    }
}
