use std::fmt;

use crate::error::{QueryKitError, Result};

/// Represents a SQL parameter value in a driver-agnostic way.
/// Drivers are responsible for converting these to their native types.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Bool(bool),
}

impl SqlValue {
    /// Returns the runtime type of this value, or `None` for NULL.
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            SqlValue::Null => None,
            SqlValue::Text(_) => Some(SqlType::Text),
            SqlValue::Int32(_) => Some(SqlType::Int32),
            SqlValue::Int64(_) => Some(SqlType::Int64),
            SqlValue::Float64(_) => Some(SqlType::Float64),
            SqlValue::Bool(_) => Some(SqlType::Bool),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Converts this value into the requested type.
    ///
    /// NULL is never replaced by a default: it stays NULL whatever the target.
    /// Integers widen freely and narrow only when the value fits, integers
    /// widen to floats, every value renders as text and text is parsed back
    /// into numbers or booleans.
    pub fn coerce(self, required: SqlType) -> Result<SqlValue> {
        if self.sql_type().map_or(true, |t| t == required) {
            return Ok(self);
        }
        let converted = match (&self, required) {
            (SqlValue::Int32(v), SqlType::Int64) => Some(SqlValue::Int64(i64::from(*v))),
            (SqlValue::Int64(v), SqlType::Int32) => i32::try_from(*v).ok().map(SqlValue::Int32),
            (SqlValue::Int32(v), SqlType::Float64) => Some(SqlValue::Float64(f64::from(*v))),
            (SqlValue::Int64(v), SqlType::Float64) => Some(SqlValue::Float64(*v as f64)),
            (value, SqlType::Text) => Some(SqlValue::Text(value.to_string())),
            (SqlValue::Text(s), SqlType::Int32) => s.trim().parse().ok().map(SqlValue::Int32),
            (SqlValue::Text(s), SqlType::Int64) => s.trim().parse().ok().map(SqlValue::Int64),
            (SqlValue::Text(s), SqlType::Float64) => s.trim().parse().ok().map(SqlValue::Float64),
            (SqlValue::Text(s), SqlType::Bool) => s.trim().parse().ok().map(SqlValue::Bool),
            _ => None,
        };
        converted.ok_or_else(|| QueryKitError::TypeMismatch {
            expected: required,
            actual: self.describe(),
        })
    }

    fn describe(&self) -> String {
        match self.sql_type() {
            Some(t) => format!("{:?}({})", t, self),
            None => "NULL".to_string(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Int32(i) => write!(f, "{}", i),
            SqlValue::Int64(i) => write!(f, "{}", i),
            SqlValue::Float64(v) => write!(f, "{}", v),
            SqlValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int32(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int64(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float64(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

/// Runtime descriptor of a result value type.
///
/// This is what gets handed to a client when a caller asks for a value of a
/// declared Rust type, see [`FromSql::SQL_TYPE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Int32,
    Int64,
    Float64,
    Text,
    Bool,
}

/// A Rust type that a single column value can be read into.
pub trait FromSql: Sized {
    /// Descriptor forwarded to the client for this type.
    const SQL_TYPE: SqlType;

    /// Converts a value already coerced to [`Self::SQL_TYPE`].
    fn from_sql(value: SqlValue) -> Result<Self>;
}

macro_rules! impl_from_sql {
    ($ty:ty, $sql_type:ident, $variant:ident) => {
        impl FromSql for $ty {
            const SQL_TYPE: SqlType = SqlType::$sql_type;

            fn from_sql(value: SqlValue) -> Result<Self> {
                match value.coerce(Self::SQL_TYPE)? {
                    SqlValue::$variant(v) => Ok(v),
                    SqlValue::Null => Err(QueryKitError::UnexpectedNull(Self::SQL_TYPE)),
                    other => Err(QueryKitError::TypeMismatch {
                        expected: Self::SQL_TYPE,
                        actual: other.describe(),
                    }),
                }
            }
        }
    };
}

impl_from_sql!(i32, Int32, Int32);
impl_from_sql!(i64, Int64, Int64);
impl_from_sql!(f64, Float64, Float64);
impl_from_sql!(String, Text, Text);
impl_from_sql!(bool, Bool, Bool);

impl<T: FromSql> FromSql for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;

    fn from_sql(value: SqlValue) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_sql(value).map(Some)
        }
    }
}

/// Builds a parameter array from heterogeneous values.
///
/// ```
/// use querykit::{args, SqlValue};
///
/// let params = args![3, "Alice", None::<i64>];
/// assert_eq!(params[0], SqlValue::Int32(3));
/// assert_eq!(params[2], SqlValue::Null);
/// ```
#[macro_export]
macro_rules! args {
    () => {{
        let empty: [$crate::types::SqlValue; 0] = [];
        empty
    }};
    ($($value:expr),+ $(,)?) => {
        [$($crate::types::SqlValue::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_keeps_null() {
        assert_eq!(SqlValue::Null.coerce(SqlType::Int32).unwrap(), SqlValue::Null);
    }

    #[test]
    fn test_coerce_integer_narrowing() {
        assert_eq!(
            SqlValue::Int64(42).coerce(SqlType::Int32).unwrap(),
            SqlValue::Int32(42)
        );
        let err = SqlValue::Int64(i64::MAX).coerce(SqlType::Int32).unwrap_err();
        assert!(matches!(
            err,
            QueryKitError::TypeMismatch {
                expected: SqlType::Int32,
                ..
            }
        ));
    }

    #[test]
    fn test_coerce_text() {
        assert_eq!(
            SqlValue::Text(" 22 ".to_string()).coerce(SqlType::Int32).unwrap(),
            SqlValue::Int32(22)
        );
        assert_eq!(
            SqlValue::Bool(true).coerce(SqlType::Text).unwrap(),
            SqlValue::Text("true".to_string())
        );
        assert!(SqlValue::Text("abc".to_string())
            .coerce(SqlType::Int64)
            .is_err());
    }

    #[test]
    fn test_coerce_float_to_int_is_rejected() {
        assert!(SqlValue::Float64(1.5).coerce(SqlType::Int32).is_err());
    }

    #[test]
    fn test_from_sql_null_is_not_defaulted() {
        let err = i32::from_sql(SqlValue::Null).unwrap_err();
        assert!(matches!(err, QueryKitError::UnexpectedNull(SqlType::Int32)));
        assert_eq!(Option::<i32>::from_sql(SqlValue::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::from_sql(SqlValue::Int64(7)).unwrap(),
            Some(7)
        );
    }

    #[test]
    fn test_option_shares_inner_descriptor() {
        assert_eq!(<Option<String> as FromSql>::SQL_TYPE, SqlType::Text);
        assert_eq!(<i64 as FromSql>::SQL_TYPE, SqlType::Int64);
    }

    #[test]
    fn test_args_macro() {
        let params = crate::args![3, "x", true, None::<i32>];
        assert_eq!(
            params,
            [
                SqlValue::Int32(3),
                SqlValue::Text("x".to_string()),
                SqlValue::Bool(true),
                SqlValue::Null
            ]
        );
        let empty: [SqlValue; 0] = crate::args![];
        assert!(empty.is_empty());
    }
}
