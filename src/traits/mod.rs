mod callbacks;
mod driver;
mod operations;

pub use callbacks::{ResultSetExtractor, RowCallbackHandler, RowMapper};
pub use driver::DatabaseDriver;
pub use operations::QueryOperations;
