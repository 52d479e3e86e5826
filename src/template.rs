use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{QueryKitError, Result};
use crate::traits::{
    DatabaseDriver, QueryOperations, ResultSetExtractor, RowCallbackHandler, RowMapper,
};
use crate::types::{ParamType, QueryResult, Row, SqlType, SqlValue};

/// Execution settings applied by a [`QueryTemplate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateConfig {
    max_rows: Option<usize>,
    query_timeout: Option<Duration>,
}

impl TemplateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most this many rows of every result.
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Fail queries that take longer than this.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn get_max_rows(&self) -> Option<usize> {
        self.max_rows
    }

    pub fn get_query_timeout(&self) -> Option<Duration> {
        self.query_timeout
    }
}

/// Database client executing queries through a [`DatabaseDriver`].
///
/// Owns the result policies: single-value queries need exactly one row and
/// one column, values are coerced to the requested [`SqlType`], and mapper
/// based single-object queries need exactly one row.
#[derive(Clone)]
pub struct QueryTemplate {
    driver: Arc<dyn DatabaseDriver>,
    config: TemplateConfig,
}

impl QueryTemplate {
    pub fn new(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self::with_config(driver, TemplateConfig::default())
    }

    pub fn with_config(driver: Arc<dyn DatabaseDriver>, config: TemplateConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    async fn fetch(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: Option<&[ParamType]>,
    ) -> Result<QueryResult> {
        tracing::debug!(sql, params = args.len(), typed = arg_types.is_some(), "executing query");

        let execution = async {
            match arg_types {
                Some(types) => self.driver.execute_typed(sql, args, types).await,
                None => self.driver.execute(sql, args).await,
            }
        };
        let raw = match self.config.query_timeout {
            Some(timeout) => tokio::time::timeout(timeout, execution)
                .await
                .map_err(|_| QueryKitError::Timeout(timeout))
                .and_then(|r| r),
            None => execution.await,
        }
        .map_err(|e| {
            tracing::warn!(sql, error = %e, "query failed");
            e
        })?;

        let mut result = QueryResult::from_raw(raw);
        if let Some(max_rows) = self.config.max_rows {
            result.truncate(max_rows);
        }
        Ok(result)
    }

    async fn single_value(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: Option<&[ParamType]>,
        required_type: SqlType,
    ) -> Result<SqlValue> {
        let row = self.fetch(sql, args, arg_types).await?.single_row()?;
        single_column(row)?.coerce(required_type)
    }

    async fn value_list(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: Option<&[ParamType]>,
        required_type: SqlType,
    ) -> Result<Vec<SqlValue>> {
        self.fetch(sql, args, arg_types)
            .await?
            .rows()
            .into_iter()
            .map(|row| single_column(row)?.coerce(required_type))
            .collect()
    }
}

fn single_column(row: Row) -> Result<SqlValue> {
    let actual = row.len();
    let mut values = row.into_values().into_iter();
    match (values.next(), values.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(QueryKitError::IncorrectColumnCount {
            expected: 1,
            actual,
        }),
    }
}

#[async_trait]
impl QueryOperations for QueryTemplate {
    async fn query_for_value(&self, sql: &str, required_type: SqlType) -> Result<SqlValue> {
        self.single_value(sql, &[], None, required_type).await
    }

    async fn query_for_value_with_args(
        &self,
        sql: &str,
        args: &[SqlValue],
        required_type: SqlType,
    ) -> Result<SqlValue> {
        self.single_value(sql, args, None, required_type).await
    }

    async fn query_for_value_with_arg_types(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: &[ParamType],
        required_type: SqlType,
    ) -> Result<SqlValue> {
        self.single_value(sql, args, Some(arg_types), required_type)
            .await
    }

    async fn query_for_values(&self, sql: &str, required_type: SqlType) -> Result<Vec<SqlValue>> {
        self.value_list(sql, &[], None, required_type).await
    }

    async fn query_for_values_with_args(
        &self,
        sql: &str,
        args: &[SqlValue],
        required_type: SqlType,
    ) -> Result<Vec<SqlValue>> {
        self.value_list(sql, args, None, required_type).await
    }

    async fn query_for_values_with_arg_types(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: &[ParamType],
        required_type: SqlType,
    ) -> Result<Vec<SqlValue>> {
        self.value_list(sql, args, Some(arg_types), required_type)
            .await
    }

    async fn query_for_object_with_mapper<T: Send>(
        &self,
        sql: &str,
        row_mapper: &dyn RowMapper<T>,
        args: &[SqlValue],
    ) -> Result<T> {
        let row = self.fetch(sql, args, None).await?.single_row()?;
        row_mapper.map_row(&row, 0)
    }

    async fn query_with_mapper<T: Send>(
        &self,
        sql: &str,
        row_mapper: &dyn RowMapper<T>,
        args: &[SqlValue],
    ) -> Result<Vec<T>> {
        self.fetch(sql, args, None)
            .await?
            .rows_ref()
            .iter()
            .enumerate()
            .map(|(row_num, row)| row_mapper.map_row(row, row_num))
            .collect()
    }

    async fn query_with_extractor<T: Send>(
        &self,
        sql: &str,
        extractor: &dyn ResultSetExtractor<T>,
        args: &[SqlValue],
    ) -> Result<T> {
        let mut rs = self.fetch(sql, args, None).await?.into_result_set();
        extractor.extract_data(&mut rs)
    }

    async fn query_with_callback(
        &self,
        sql: &str,
        callback: &mut dyn RowCallbackHandler,
        args: &[SqlValue],
    ) -> Result<()> {
        for row in self.fetch(sql, args, None).await?.rows_ref() {
            callback.process_row(row)?;
        }
        Ok(())
    }
}
