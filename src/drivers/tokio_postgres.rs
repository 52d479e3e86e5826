use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls, Statement};
use uuid::Uuid;

use crate::error::{QueryKitError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{ParamType, RawQueryResult, SqlType, SqlValue};

/// PostgreSQL driver implementation using tokio-postgres.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| QueryKitError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        Ok(Self { client })
    }

    async fn run(&self, statement: &Statement, params: &[SqlValue]) -> Result<RawQueryResult> {
        // Convert SqlValue params to tokio-postgres compatible types
        let converted_params: Vec<Box<dyn ToSql + Sync + Send>> = params
            .iter()
            .zip(statement.params().iter().map(Some).chain(std::iter::repeat(None)))
            .map(|(value, type_)| sql_value_to_tosql(value, type_))
            .collect::<Result<_>>()?;

        let param_refs: Vec<&(dyn ToSql + Sync)> = converted_params
            .iter()
            .map(|b| b.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = self
            .client
            .query(statement, &param_refs)
            .await
            .map_err(|e| QueryKitError::QueryFailed(e.to_string()))?;

        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let result_rows = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| row_value(row, i))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawQueryResult::new(columns, result_rows))
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let statement = self
            .client
            .prepare(sql)
            .await
            .map_err(|e| QueryKitError::QueryFailed(e.to_string()))?;
        self.run(&statement, params).await
    }

    async fn execute_typed(
        &self,
        sql: &str,
        params: &[SqlValue],
        param_types: &[ParamType],
    ) -> Result<RawQueryResult> {
        let types: Vec<Type> = param_types.iter().map(|t| param_type_to_pg(*t)).collect();
        let statement = self
            .client
            .prepare_typed(sql, &types)
            .await
            .map_err(|e| QueryKitError::QueryFailed(e.to_string()))?;
        self.run(&statement, params).await
    }
}

fn param_type_to_pg(param_type: ParamType) -> Type {
    Type::from_oid(param_type.oid()).unwrap_or(Type::UNKNOWN)
}

/// The value type a parameter of this Postgres type is bound from, if known.
fn bind_type(type_: &Type) -> Option<SqlType> {
    if *type_ == Type::INT2 || *type_ == Type::INT4 {
        Some(SqlType::Int32)
    } else if *type_ == Type::INT8 {
        Some(SqlType::Int64)
    } else if *type_ == Type::FLOAT4 || *type_ == Type::FLOAT8 {
        Some(SqlType::Float64)
    } else if *type_ == Type::BOOL {
        Some(SqlType::Bool)
    } else if *type_ == Type::TEXT
        || *type_ == Type::VARCHAR
        || *type_ == Type::BPCHAR
        || *type_ == Type::NAME
    {
        Some(SqlType::Text)
    } else {
        None
    }
}

/// Convert a SqlValue to a boxed ToSql trait object.
///
/// The value is first coerced to the prepared parameter type, so an `Int32`
/// binds to a `bigint` or `float8` parameter and a number binds to `text`.
/// NULL is bound with the Rust type matching the parameter type.
fn sql_value_to_tosql(
    value: &SqlValue,
    type_: Option<&Type>,
) -> Result<Box<dyn ToSql + Sync + Send>> {
    let value = match type_.and_then(bind_type) {
        Some(required) => value.clone().coerce(required)?,
        None => value.clone(),
    };
    let is = |expected: &Type| type_ == Some(expected);

    let boxed: Box<dyn ToSql + Sync + Send> = match value {
        SqlValue::Null if is(&Type::INT2) => Box::new(None::<i16>),
        SqlValue::Null if is(&Type::INT4) => Box::new(None::<i32>),
        SqlValue::Null if is(&Type::INT8) => Box::new(None::<i64>),
        SqlValue::Null if is(&Type::FLOAT4) => Box::new(None::<f32>),
        SqlValue::Null if is(&Type::FLOAT8) => Box::new(None::<f64>),
        SqlValue::Null if is(&Type::BOOL) => Box::new(None::<bool>),
        SqlValue::Null => Box::new(None::<String>),
        SqlValue::Int32(i) if is(&Type::INT2) => Box::new(i16::try_from(i).map_err(|_| {
            QueryKitError::QueryFailed(format!("{} is out of range for smallint", i))
        })?),
        SqlValue::Float64(f) if is(&Type::FLOAT4) => Box::new(f as f32),
        SqlValue::Text(s) => Box::new(s),
        SqlValue::Int32(i) => Box::new(i),
        SqlValue::Int64(i) => Box::new(i),
        SqlValue::Float64(f) => Box::new(f),
        SqlValue::Bool(b) => Box::new(b),
    };
    Ok(boxed)
}

/// How a result column is read back into a SqlValue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Uuid,
    Json,
    /// Text-like types and anything else `String` accepts.
    Text,
}

fn column_kind(type_: &Type) -> ColumnKind {
    if *type_ == Type::INT2 {
        ColumnKind::Int16
    } else if *type_ == Type::INT4 {
        ColumnKind::Int32
    } else if *type_ == Type::INT8 {
        ColumnKind::Int64
    } else if *type_ == Type::FLOAT4 {
        ColumnKind::Float32
    } else if *type_ == Type::FLOAT8 {
        ColumnKind::Float64
    } else if *type_ == Type::BOOL {
        ColumnKind::Bool
    } else if *type_ == Type::DATE {
        ColumnKind::Date
    } else if *type_ == Type::TIME {
        ColumnKind::Time
    } else if *type_ == Type::TIMESTAMP {
        ColumnKind::Timestamp
    } else if *type_ == Type::TIMESTAMPTZ {
        ColumnKind::TimestampTz
    } else if *type_ == Type::UUID {
        ColumnKind::Uuid
    } else if *type_ == Type::JSON || *type_ == Type::JSONB {
        ColumnKind::Json
    } else {
        ColumnKind::Text
    }
}

fn text<T: ToString>(value: Option<T>) -> SqlValue {
    value.map(|v| v.to_string()).into()
}

/// Read the value at a given index according to its column type.
///
/// Integers, floats and booleans keep their type. Dates, times, timestamps,
/// UUIDs and JSON come back as text. Other types are read as text only when
/// the driver can decode them as a string; NUMERIC, for one, cannot and has
/// to be cast in the query (`sum(x)::float8` or `sum(x)::text`).
fn row_value(row: &tokio_postgres::Row, index: usize) -> Result<SqlValue> {
    let type_ = row.columns()[index].type_();
    let value = match column_kind(type_) {
        ColumnKind::Int16 => row
            .try_get::<_, Option<i16>>(index)
            .map(|v| SqlValue::from(v.map(i32::from))),
        ColumnKind::Int32 => row.try_get::<_, Option<i32>>(index).map(SqlValue::from),
        ColumnKind::Int64 => row.try_get::<_, Option<i64>>(index).map(SqlValue::from),
        ColumnKind::Float32 => row
            .try_get::<_, Option<f32>>(index)
            .map(|v| SqlValue::from(v.map(f64::from))),
        ColumnKind::Float64 => row.try_get::<_, Option<f64>>(index).map(SqlValue::from),
        ColumnKind::Bool => row.try_get::<_, Option<bool>>(index).map(SqlValue::from),
        ColumnKind::Date => row.try_get::<_, Option<NaiveDate>>(index).map(text),
        ColumnKind::Time => row.try_get::<_, Option<NaiveTime>>(index).map(text),
        ColumnKind::Timestamp => row.try_get::<_, Option<NaiveDateTime>>(index).map(text),
        ColumnKind::TimestampTz => row
            .try_get::<_, Option<DateTime<Utc>>>(index)
            .map(|v| SqlValue::from(v.map(|ts| ts.to_rfc3339()))),
        ColumnKind::Uuid => row.try_get::<_, Option<Uuid>>(index).map(text),
        ColumnKind::Json => row.try_get::<_, Option<serde_json::Value>>(index).map(text),
        ColumnKind::Text => row.try_get::<_, Option<String>>(index).map(SqlValue::from),
    };

    value.map_err(|e| {
        QueryKitError::Mapping(format!(
            "column {} of type {}: {}",
            index,
            type_.name(),
            e
        ))
    })
}
