mod param_type;
mod row;
mod sql_value;

pub use param_type::ParamType;
pub use row::{QueryResult, RawQueryResult, ResultSet, Row};
pub use sql_value::{FromSql, SqlType, SqlValue};
