use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{ResultSetExtractor, RowCallbackHandler, RowMapper};
use crate::types::{ParamType, SqlType, SqlValue};

/// The query surface of a database client, one method per call shape.
///
/// [`QueryTemplate`](crate::QueryTemplate) is the real implementation.
/// Most callers go through [`QueryOperationsExt`](crate::QueryOperationsExt)
/// instead of calling these directly.
#[async_trait]
pub trait QueryOperations: Send + Sync {
    /// Query for a single value of the required type.
    /// The query must return exactly one row with exactly one column.
    async fn query_for_value(&self, sql: &str, required_type: SqlType) -> Result<SqlValue>;

    async fn query_for_value_with_args(
        &self,
        sql: &str,
        args: &[SqlValue],
        required_type: SqlType,
    ) -> Result<SqlValue>;

    /// Like [`query_for_value_with_args`](Self::query_for_value_with_args),
    /// binding `args[i]` with the explicit type `arg_types[i]`.
    async fn query_for_value_with_arg_types(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: &[ParamType],
        required_type: SqlType,
    ) -> Result<SqlValue>;

    /// Query for a single-column list of values of the required type.
    async fn query_for_values(&self, sql: &str, required_type: SqlType) -> Result<Vec<SqlValue>>;

    async fn query_for_values_with_args(
        &self,
        sql: &str,
        args: &[SqlValue],
        required_type: SqlType,
    ) -> Result<Vec<SqlValue>>;

    async fn query_for_values_with_arg_types(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: &[ParamType],
        required_type: SqlType,
    ) -> Result<Vec<SqlValue>>;

    /// Map the single row returned by the query.
    async fn query_for_object_with_mapper<T: Send>(
        &self,
        sql: &str,
        row_mapper: &dyn RowMapper<T>,
        args: &[SqlValue],
    ) -> Result<T>;

    /// Map every row returned by the query, in order.
    async fn query_with_mapper<T: Send>(
        &self,
        sql: &str,
        row_mapper: &dyn RowMapper<T>,
        args: &[SqlValue],
    ) -> Result<Vec<T>>;

    /// Reduce the whole result set with an extractor.
    async fn query_with_extractor<T: Send>(
        &self,
        sql: &str,
        extractor: &dyn ResultSetExtractor<T>,
        args: &[SqlValue],
    ) -> Result<T>;

    /// Run a callback for every row returned by the query.
    async fn query_with_callback(
        &self,
        sql: &str,
        callback: &mut dyn RowCallbackHandler,
        args: &[SqlValue],
    ) -> Result<()>;
}
