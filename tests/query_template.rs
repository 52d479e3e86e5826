use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use querykit::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
use querykit::error::{QueryKitError, Result};
use querykit::traits::{DatabaseDriver, QueryOperations};
use querykit::types::{ParamType, RawQueryResult, SqlType, SqlValue};
use querykit::{args, QueryKitClient, QueryOperationsExt, TemplateConfig};

fn customers() -> RawQueryResult {
    InMemoryTestResponseBuilder::new()
        .columns(&["id", "name", "age"])
        .row(args![1, "Alice", 22])
        .row(args![2, "Bob", None::<i32>])
        .row(args![3, "Carol", 41])
        .build()
}

fn client_with(driver: &Arc<InMemoryTestDriver>) -> QueryKitClient {
    QueryKitClient::with_driver(Arc::clone(driver) as Arc<dyn DatabaseDriver>)
}

#[tokio::test]
async fn test_query_for_value_coerces_to_required_type() {
    let driver = Arc::new(
        InMemoryTestDriver::new().with_default_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["total"])
                .row([SqlValue::Int64(42)])
                .build(),
        ),
    );
    let template = client_with(&driver).template();

    let as_int = template
        .query_for_value("select count(*) from customer", SqlType::Int32)
        .await
        .unwrap();
    let as_float = template
        .query_for_value("select count(*) from customer", SqlType::Float64)
        .await
        .unwrap();
    let as_text = template
        .query_for_value("select count(*) from customer", SqlType::Text)
        .await
        .unwrap();

    assert_eq!(as_int, SqlValue::Int32(42));
    assert_eq!(as_float, SqlValue::Float64(42.0));
    assert_eq!(as_text, SqlValue::Text("42".to_string()));
    driver.assert_query_count(3);
}

#[tokio::test]
async fn test_query_for_value_rejects_incompatible_type() {
    let driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["name"])
                .row(["Alice"])
                .build(),
        ),
    );
    let template = client_with(&driver).template();

    let err = template
        .query_for_object::<i32>("select name from customer where id = 1")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QueryKitError::TypeMismatch {
            expected: SqlType::Int32,
            ..
        }
    ));
}

#[tokio::test]
async fn test_query_for_value_requires_single_column() {
    let driver = Arc::new(InMemoryTestDriver::new().with_response(customers()));
    let template = client_with(&driver).template();

    let err = template
        .query_for_values("select * from customer", SqlType::Int32)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QueryKitError::IncorrectColumnCount {
            expected: 1,
            actual: 3
        }
    ));
}

#[tokio::test]
async fn test_query_mapped_by_column_name() {
    let driver = Arc::new(InMemoryTestDriver::new().with_response(customers()));
    let template = client_with(&driver).template();

    let people = template
        .query_mapped("select id, name, age from customer", &[], |row, _| {
            Ok((
                row.get_by_name::<String>("name")?,
                row.get_by_name::<Option<i32>>("age")?,
            ))
        })
        .await
        .unwrap();

    assert_eq!(
        people,
        vec![
            ("Alice".to_string(), Some(22)),
            ("Bob".to_string(), None),
            ("Carol".to_string(), Some(41)),
        ]
    );
    driver.assert_last_query("select id, name, age from customer", &[]);
}

#[tokio::test]
async fn test_extractor_walks_the_whole_result() {
    let driver = Arc::new(InMemoryTestDriver::new().with_response(customers()));
    let template = client_with(&driver).template();

    let oldest = template
        .query_extract("select id, name, age from customer", &[], |rs| {
            let mut oldest: Option<(i32, String)> = None;
            while rs.next() {
                if let Some(age) = rs.get::<Option<i32>>(2)? {
                    if oldest.as_ref().map_or(true, |(a, _)| age > *a) {
                        oldest = Some((age, rs.get::<String>(1)?));
                    }
                }
            }
            Ok(oldest.map(|(_, name)| name))
        })
        .await
        .unwrap();

    assert_eq!(oldest.as_deref(), Some("Carol"));
}

#[tokio::test]
async fn test_typed_queries_use_typed_execution() {
    let driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["name"])
                .row(["Bob"])
                .build(),
        ),
    );
    let template = client_with(&driver).template();

    let name = template
        .query_for_object_with_arg_types::<Option<String>>(
            "select name from customer where age is not distinct from $1",
            &args![None::<i32>],
            &[ParamType::Integer],
        )
        .await
        .unwrap();

    assert_eq!(name.as_deref(), Some("Bob"));
    driver.assert_last_query(
        "select name from customer where age is not distinct from $1",
        &[SqlValue::Null],
    );
    driver.assert_last_param_types(&[ParamType::Integer]);
}

#[tokio::test]
async fn test_max_rows_truncates_results() {
    let driver = Arc::new(InMemoryTestDriver::new().with_response(customers()));
    let template = client_with(&driver)
        .with_config(TemplateConfig::new().max_rows(2))
        .template();

    let ids = template
        .query_mapped("select id, name, age from customer", &[], |row, _| {
            row.get::<i32>(0)
        })
        .await
        .unwrap();

    assert_eq!(ids, vec![1, 2]);
    assert_eq!(template.config().get_max_rows(), Some(2));
}

struct SlowDriver {
    delay: Duration,
}

#[async_trait]
impl DatabaseDriver for SlowDriver {
    async fn execute(&self, _sql: &str, _params: &[SqlValue]) -> Result<RawQueryResult> {
        tokio::time::sleep(self.delay).await;
        Ok(RawQueryResult::empty())
    }

    async fn execute_typed(
        &self,
        sql: &str,
        params: &[SqlValue],
        _param_types: &[ParamType],
    ) -> Result<RawQueryResult> {
        self.execute(sql, params).await
    }
}

#[tokio::test]
async fn test_query_timeout() {
    let timeout = Duration::from_millis(20);
    let client = QueryKitClient::with_driver(Arc::new(SlowDriver {
        delay: Duration::from_secs(5),
    }))
    .with_config(TemplateConfig::new().query_timeout(timeout));
    let template = client.template();
    assert_eq!(template.config().get_query_timeout(), Some(timeout));

    let err = template
        .query_each("select 1", &[], |_| Ok(()))
        .await
        .unwrap_err();

    assert!(matches!(err, QueryKitError::Timeout(d) if d == timeout));
}

#[tokio::test]
async fn test_row_callback_stops_on_error() {
    let driver = Arc::new(InMemoryTestDriver::new().with_response(customers()));
    let template = client_with(&driver).template();
    let mut names = Vec::new();

    let err = template
        .query_each("select id, name, age from customer", &[], |row| {
            let age = row.get::<i32>(2)?;
            names.push((row.get::<String>(1)?, age));
            Ok(())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, QueryKitError::UnexpectedNull(SqlType::Int32)));
    assert_eq!(names, vec![("Alice".to_string(), 22)]);
}
