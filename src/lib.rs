//! querykit - Typed query shortcuts over a driver-agnostic database client
//!
//! # Example
//! ```ignore
//! use querykit::{args, ParamType, QueryKitClient, QueryOperationsExt};
//!
//! // Connect to database
//! let client = QueryKitClient::connect("postgres://localhost/mydb").await?;
//! let template = client.template();
//!
//! // Single value, typed by the declared result type
//! let age = template
//!     .query_for_object::<i32>("select age from customer where id = 3")
//!     .await?;
//!
//! // Explicit parameter types
//! let ages: Vec<i32> = template
//!     .query_for_list_with_arg_types(
//!         "select age from customer where id > $1",
//!         &args![3],
//!         &[ParamType::Integer],
//!     )
//!     .await?;
//!
//! // Row mapper
//! let names = template
//!     .query_mapped("select name from customer", &[], |row, _| row.get::<String>(0))
//!     .await?;
//! ```

pub mod drivers;
pub mod error;
pub mod recording;
pub mod traits;
pub mod types;

mod client;
mod ext;
mod template;

// Re-export main types for convenient access
pub use client::QueryKitClient;
pub use error::{QueryKitError, Result};
pub use ext::QueryOperationsExt;
pub use template::{QueryTemplate, TemplateConfig};
pub use traits::{DatabaseDriver, QueryOperations, ResultSetExtractor, RowCallbackHandler, RowMapper};
pub use types::{
    FromSql, ParamType, QueryResult, RawQueryResult, ResultSet, Row, SqlType, SqlValue,
};
