use std::any::type_name;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::{QueryOperations, ResultSetExtractor, RowCallbackHandler, RowMapper};
use crate::types::{ParamType, SqlType, SqlValue};

/// Which [`QueryOperations`] method a call went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    Value,
    ValueWithArgs,
    ValueWithArgTypes,
    Values,
    ValuesWithArgs,
    ValuesWithArgTypes,
    ObjectWithMapper,
    ListWithMapper,
    Extractor,
    RowCallback,
}

/// A recorded client call for verification.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub shape: CallShape,
    pub sql: String,
    pub args: Vec<SqlValue>,
    pub arg_types: Option<Vec<ParamType>>,
    pub required_type: Option<SqlType>,
    /// Declared output type of the mapper or extractor, as given by
    /// [`std::any::type_name`].
    pub result_type: Option<&'static str>,
}

impl RecordedCall {
    fn new(shape: CallShape, sql: &str, args: &[SqlValue]) -> Self {
        Self {
            shape,
            sql: sql.to_string(),
            args: args.to_vec(),
            arg_types: None,
            required_type: None,
            result_type: None,
        }
    }

    fn arg_types(mut self, arg_types: &[ParamType]) -> Self {
        self.arg_types = Some(arg_types.to_vec());
        self
    }

    fn required_type(mut self, required_type: SqlType) -> Self {
        self.required_type = Some(required_type);
        self
    }

    fn result_type<T>(mut self) -> Self {
        self.result_type = Some(type_name::<T>());
        self
    }
}

/// A client wrapper that records every call before forwarding it.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use querykit::drivers::InMemoryTestDriver;
/// use querykit::recording::RecordingOperations;
/// use querykit::QueryTemplate;
///
/// let driver = Arc::new(InMemoryTestDriver::new());
/// let operations = RecordingOperations::new(QueryTemplate::new(driver));
/// assert!(operations.calls().is_empty());
/// ```
pub struct RecordingOperations<O> {
    inner: O,
    calls: Mutex<Vec<RecordedCall>>,
}

impl<O: QueryOperations> RecordingOperations<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The wrapped client.
    pub fn inner(&self) -> &O {
        &self.inner
    }

    /// Get all recorded calls in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the last recorded call, if any.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Assert that exactly one call was made and return it.
    pub fn assert_single_call(&self) -> RecordedCall {
        let calls = self.calls.lock().unwrap();
        assert_eq!(
            calls.len(),
            1,
            "Call count mismatch. Expected: 1, Actual: {}\nCalls: {:?}",
            calls.len(),
            *calls
        );
        calls[0].clone()
    }

    fn record(&self, call: RecordedCall) {
        tracing::trace!(shape = ?call.shape, sql = %call.sql, "recorded call");
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl<O: QueryOperations> QueryOperations for RecordingOperations<O> {
    async fn query_for_value(&self, sql: &str, required_type: SqlType) -> Result<SqlValue> {
        self.record(RecordedCall::new(CallShape::Value, sql, &[]).required_type(required_type));
        self.inner.query_for_value(sql, required_type).await
    }

    async fn query_for_value_with_args(
        &self,
        sql: &str,
        args: &[SqlValue],
        required_type: SqlType,
    ) -> Result<SqlValue> {
        self.record(
            RecordedCall::new(CallShape::ValueWithArgs, sql, args).required_type(required_type),
        );
        self.inner
            .query_for_value_with_args(sql, args, required_type)
            .await
    }

    async fn query_for_value_with_arg_types(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: &[ParamType],
        required_type: SqlType,
    ) -> Result<SqlValue> {
        self.record(
            RecordedCall::new(CallShape::ValueWithArgTypes, sql, args)
                .arg_types(arg_types)
                .required_type(required_type),
        );
        self.inner
            .query_for_value_with_arg_types(sql, args, arg_types, required_type)
            .await
    }

    async fn query_for_values(&self, sql: &str, required_type: SqlType) -> Result<Vec<SqlValue>> {
        self.record(RecordedCall::new(CallShape::Values, sql, &[]).required_type(required_type));
        self.inner.query_for_values(sql, required_type).await
    }

    async fn query_for_values_with_args(
        &self,
        sql: &str,
        args: &[SqlValue],
        required_type: SqlType,
    ) -> Result<Vec<SqlValue>> {
        self.record(
            RecordedCall::new(CallShape::ValuesWithArgs, sql, args).required_type(required_type),
        );
        self.inner
            .query_for_values_with_args(sql, args, required_type)
            .await
    }

    async fn query_for_values_with_arg_types(
        &self,
        sql: &str,
        args: &[SqlValue],
        arg_types: &[ParamType],
        required_type: SqlType,
    ) -> Result<Vec<SqlValue>> {
        self.record(
            RecordedCall::new(CallShape::ValuesWithArgTypes, sql, args)
                .arg_types(arg_types)
                .required_type(required_type),
        );
        self.inner
            .query_for_values_with_arg_types(sql, args, arg_types, required_type)
            .await
    }

    async fn query_for_object_with_mapper<T: Send>(
        &self,
        sql: &str,
        row_mapper: &dyn RowMapper<T>,
        args: &[SqlValue],
    ) -> Result<T> {
        self.record(RecordedCall::new(CallShape::ObjectWithMapper, sql, args).result_type::<T>());
        self.inner
            .query_for_object_with_mapper(sql, row_mapper, args)
            .await
    }

    async fn query_with_mapper<T: Send>(
        &self,
        sql: &str,
        row_mapper: &dyn RowMapper<T>,
        args: &[SqlValue],
    ) -> Result<Vec<T>> {
        self.record(RecordedCall::new(CallShape::ListWithMapper, sql, args).result_type::<T>());
        self.inner.query_with_mapper(sql, row_mapper, args).await
    }

    async fn query_with_extractor<T: Send>(
        &self,
        sql: &str,
        extractor: &dyn ResultSetExtractor<T>,
        args: &[SqlValue],
    ) -> Result<T> {
        self.record(RecordedCall::new(CallShape::Extractor, sql, args).result_type::<T>());
        self.inner.query_with_extractor(sql, extractor, args).await
    }

    async fn query_with_callback(
        &self,
        sql: &str,
        callback: &mut dyn RowCallbackHandler,
        args: &[SqlValue],
    ) -> Result<()> {
        self.record(RecordedCall::new(CallShape::RowCallback, sql, args));
        self.inner.query_with_callback(sql, callback, args).await
    }
}
