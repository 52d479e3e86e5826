use crate::error::Result;
use crate::types::{ResultSet, Row};

/// Maps one result row, together with its 0-based index, to a value.
///
/// Implemented for every `Fn(&Row, usize) -> Result<T>` closure. `T` is
/// whatever the mapper declares, so a mapper producing `Option<i32>` is a
/// `RowMapper<Option<i32>>` and its `None` results are passed through as is.
pub trait RowMapper<T>: Send + Sync {
    fn map_row(&self, row: &Row, row_num: usize) -> Result<T>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&Row, usize) -> Result<T> + Send + Sync,
{
    fn map_row(&self, row: &Row, row_num: usize) -> Result<T> {
        self(row, row_num)
    }
}

/// Reduces a whole result set to a single value.
pub trait ResultSetExtractor<T>: Send + Sync {
    fn extract_data(&self, rs: &mut ResultSet) -> Result<T>;
}

impl<T, F> ResultSetExtractor<T> for F
where
    F: Fn(&mut ResultSet) -> Result<T> + Send + Sync,
{
    fn extract_data(&self, rs: &mut ResultSet) -> Result<T> {
        self(rs)
    }
}

/// Side-effecting per-row callback.
pub trait RowCallbackHandler: Send {
    fn process_row(&mut self, row: &Row) -> Result<()>;
}

impl<F> RowCallbackHandler for F
where
    F: FnMut(&Row) -> Result<()> + Send,
{
    fn process_row(&mut self, row: &Row) -> Result<()> {
        self(row)
    }
}
