use crate::error::{QueryKitError, Result};
use crate::types::{FromSql, SqlValue};

/// Driver-agnostic raw result from a database query.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQueryResult {
    /// Column names in order
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<SqlValue>>,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// A single row result from a query.
/// Values are kept in column order and addressed by 0-based index or by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates a new Row from column names and values.
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Gets the raw value at a 0-based column index.
    pub fn value(&self, index: usize) -> Result<&SqlValue> {
        self.values
            .get(index)
            .ok_or(QueryKitError::ColumnIndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    /// Reads the value at a 0-based column index as `T`.
    pub fn get<T: FromSql>(&self, index: usize) -> Result<T> {
        T::from_sql(self.value(index)?.clone())
    }

    /// Reads the value of the named column as `T`.
    pub fn get_by_name<T: FromSql>(&self, column: &str) -> Result<T> {
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| QueryKitError::ColumnNotFound(column.to_string()))?;
        self.get(index)
    }

    /// Returns all column names in this row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the values in column order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub(crate) fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    /// Returns the number of columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of a query execution, containing zero or more rows.
#[derive(Debug)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl QueryResult {
    /// Creates a QueryResult from a RawQueryResult.
    pub fn from_raw(raw: RawQueryResult) -> Self {
        let columns = raw.columns;
        let rows = raw
            .rows
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect();
        Self { columns, rows }
    }

    /// Extracts a single row from the result.
    /// Returns an error if the result contains zero or more than one row.
    pub fn single_row(self) -> Result<Row> {
        let actual = self.rows.len();
        let mut rows = self.rows.into_iter();
        match (rows.next(), rows.next()) {
            (Some(row), None) => Ok(row),
            _ => Err(QueryKitError::UnexpectedRowCount {
                expected: 1,
                actual,
            }),
        }
    }

    /// Keeps at most `max_rows` rows.
    pub fn truncate(&mut self, max_rows: usize) {
        self.rows.truncate(max_rows);
    }

    /// Returns all rows from the result.
    pub fn rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns a reference to the rows without consuming the result.
    pub fn rows_ref(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the column names from this result.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of rows in this result.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if this result contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Turns this result into a forward-only cursor.
    pub fn into_result_set(self) -> ResultSet {
        ResultSet {
            columns: self.columns,
            rows: self.rows,
            position: None,
        }
    }
}

/// Forward-only cursor over a query result, handed to result set extractors.
///
/// The cursor starts before the first row; call [`ResultSet::next`] to move
/// onto it.
#[derive(Debug)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Row>,
    position: Option<usize>,
}

impl ResultSet {
    /// Advances to the next row. Returns false once the rows are exhausted.
    pub fn next(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    /// The row the cursor is positioned on.
    pub fn row(&self) -> Result<&Row> {
        self.position
            .and_then(|p| self.rows.get(p))
            .ok_or(QueryKitError::NoCurrentRow)
    }

    /// Shorthand for reading a column of the current row.
    pub fn get<T: FromSql>(&self, index: usize) -> Result<T> {
        self.row()?.get(index)
    }

    /// 0-based index of the current row, if positioned on one.
    pub fn row_index(&self) -> Option<usize> {
        self.position.filter(|p| *p < self.rows.len())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Total number of rows, independent of the cursor position.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: Vec<Vec<SqlValue>>) -> RawQueryResult {
        RawQueryResult::new(vec!["id".to_string(), "name".to_string()], rows)
    }

    #[test]
    fn test_row_get() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let values = vec![SqlValue::Int32(1), SqlValue::from("John")];
        let row = Row::new(columns, values);

        assert_eq!(row.get::<i32>(0).unwrap(), 1);
        assert_eq!(row.get::<String>(1).unwrap(), "John");
        assert_eq!(row.get_by_name::<String>("name").unwrap(), "John");
        assert!(matches!(
            row.get_by_name::<i32>("missing"),
            Err(QueryKitError::ColumnNotFound(_))
        ));
        assert!(matches!(
            row.get::<i32>(2),
            Err(QueryKitError::ColumnIndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_query_result_single_row() {
        let result = QueryResult::from_raw(raw(vec![vec![
            SqlValue::Int32(1),
            SqlValue::from("a"),
        ]]));
        let row = result.single_row().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[test]
    fn test_query_result_single_row_error_on_empty() {
        let result = QueryResult::from_raw(raw(vec![]));
        let err = result.single_row().unwrap_err();
        match err {
            QueryKitError::UnexpectedRowCount { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 0);
            }
            _ => panic!("Expected UnexpectedRowCount error"),
        }
    }

    #[test]
    fn test_query_result_single_row_error_on_multiple() {
        let result = QueryResult::from_raw(raw(vec![
            vec![SqlValue::Int32(1), SqlValue::Null],
            vec![SqlValue::Int32(2), SqlValue::Null],
        ]));
        let err = result.single_row().unwrap_err();
        match err {
            QueryKitError::UnexpectedRowCount { expected, actual } => {
                assert_eq!(expected, 1);
                assert_eq!(actual, 2);
            }
            _ => panic!("Expected UnexpectedRowCount error"),
        }
    }

    #[test]
    fn test_result_set_cursor() {
        let mut rs = QueryResult::from_raw(raw(vec![
            vec![SqlValue::Int32(1), SqlValue::from("a")],
            vec![SqlValue::Int32(2), SqlValue::from("b")],
        ]))
        .into_result_set();

        assert!(matches!(rs.row(), Err(QueryKitError::NoCurrentRow)));
        assert!(rs.next());
        assert_eq!(rs.get::<i32>(0).unwrap(), 1);
        assert_eq!(rs.row_index(), Some(0));
        assert!(rs.next());
        assert_eq!(rs.get::<String>(1).unwrap(), "b");
        assert!(!rs.next());
        assert!(!rs.next());
        assert_eq!(rs.row_index(), None);
        assert!(rs.row().is_err());
        assert_eq!(rs.len(), 2);
    }
}
