//! Typed shortcuts over [`QueryOperations`].
//!
//! Every method here forwards to exactly one [`QueryOperations`] method and
//! only reshapes arguments: the declared result type `T` becomes a
//! [`SqlType`](crate::SqlType) descriptor, and closures are handed over as the
//! client's callback traits. Arguments keep their order and errors from the
//! client are returned untouched.

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{QueryOperations, ResultSetExtractor, RowCallbackHandler, RowMapper};
use crate::types::{FromSql, ParamType, ResultSet, Row, SqlValue};

/// Convenience methods available on every [`QueryOperations`] implementation.
///
/// # Example
/// ```ignore
/// use querykit::{args, QueryOperationsExt};
///
/// let age = template
///     .query_for_object::<i32>("select age from customer where id = 3")
///     .await?;
/// let name: Option<String> = template
///     .query_for_object_mapped("select name from customer where id = $1", &args![3], |row, _| {
///         row.get(0)
///     })
///     .await?;
/// ```
#[async_trait]
pub trait QueryOperationsExt: QueryOperations {
    /// Query for a single value of type `T`.
    async fn query_for_object<T>(&self, sql: &str) -> Result<T>
    where
        T: FromSql + Send,
    {
        T::from_sql(self.query_for_value(sql, T::SQL_TYPE).await?)
    }

    async fn query_for_object_with_args<T>(&self, sql: &str, args: &[SqlValue]) -> Result<T>
    where
        T: FromSql + Send,
    {
        T::from_sql(
            self.query_for_value_with_args(sql, args, T::SQL_TYPE)
                .await?,
        )
    }

    async fn query_for_object_with_arg_types<T>(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: &[ParamType],
    ) -> Result<T>
    where
        T: FromSql + Send,
    {
        T::from_sql(
            self.query_for_value_with_arg_types(sql, args, arg_types, T::SQL_TYPE)
                .await?,
        )
    }

    /// Query for a single row and map it with `row_mapper`.
    ///
    /// The mapper's output type is kept as is: a mapper returning
    /// `Option<T>` may yield `None` and that is what the caller gets back.
    async fn query_for_object_mapped<T, F>(
        &self,
        sql: &str,
        args: &[SqlValue],
        row_mapper: F,
    ) -> Result<T>
    where
        T: Send,
        F: Fn(&Row, usize) -> Result<T> + Send + Sync,
    {
        let row_mapper: &dyn RowMapper<T> = &row_mapper;
        self.query_for_object_with_mapper(sql, row_mapper, args)
            .await
    }

    /// Query for a list of single-column values of type `T`.
    async fn query_for_list<T>(&self, sql: &str) -> Result<Vec<T>>
    where
        T: FromSql + Send,
    {
        self.query_for_values(sql, T::SQL_TYPE)
            .await?
            .into_iter()
            .map(T::from_sql)
            .collect()
    }

    async fn query_for_list_with_args<T>(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<T>>
    where
        T: FromSql + Send,
    {
        self.query_for_values_with_args(sql, args, T::SQL_TYPE)
            .await?
            .into_iter()
            .map(T::from_sql)
            .collect()
    }

    async fn query_for_list_with_arg_types<T>(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: &[ParamType],
    ) -> Result<Vec<T>>
    where
        T: FromSql + Send,
    {
        self.query_for_values_with_arg_types(sql, args, arg_types, T::SQL_TYPE)
            .await?
            .into_iter()
            .map(T::from_sql)
            .collect()
    }

    /// Map every row with `row_mapper`.
    async fn query_mapped<T, F>(&self, sql: &str, args: &[SqlValue], row_mapper: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&Row, usize) -> Result<T> + Send + Sync,
    {
        let row_mapper: &dyn RowMapper<T> = &row_mapper;
        self.query_with_mapper(sql, row_mapper, args).await
    }

    /// Reduce the whole result set with `extractor`.
    async fn query_extract<T, F>(&self, sql: &str, args: &[SqlValue], extractor: F) -> Result<T>
    where
        T: Send,
        F: Fn(&mut ResultSet) -> Result<T> + Send + Sync,
    {
        let extractor: &dyn ResultSetExtractor<T> = &extractor;
        self.query_with_extractor(sql, extractor, args).await
    }

    /// Run `callback` for every row.
    async fn query_each<F>(&self, sql: &str, args: &[SqlValue], mut callback: F) -> Result<()>
    where
        F: FnMut(&Row) -> Result<()> + Send,
    {
        let callback: &mut dyn RowCallbackHandler = &mut callback;
        self.query_with_callback(sql, callback, args).await
    }
}

impl<O: QueryOperations> QueryOperationsExt for O {}
