//! Row filtering through the Polars SQL context
//!
//! A series `query` is a SQL `WHERE` predicate evaluated against the series table:
//!
//! ```rust,ignore
//! let df = df! { "x" => [1, 2, 3], "run" => ["a", "b", "a"] }?;
//! let only_a = filter_rows(df, "run = 'a' AND x > 1")?;
//! ```

use crate::{DataFrame, NicefigsError, Result};
use polars::prelude::*;
use polars::sql::SQLContext;

/// Name the table is registered under while the predicate runs
const TABLE_NAME: &str = "data";

/// Keep the rows of `table` for which `predicate` holds
pub fn filter_rows(table: DataFrame, predicate: &str) -> Result<DataFrame> {
    let predicate = predicate.trim();
    if predicate.is_empty() {
        return Ok(table);
    }
    // A predicate is a single expression, never a statement list
    if predicate.contains(';') {
        return Err(NicefigsError::Data(format!(
            "Query must be a single predicate, got `{}`",
            predicate
        )));
    }

    let mut ctx = SQLContext::new();
    ctx.register(TABLE_NAME, table.lazy());

    let sql = format!("SELECT * FROM {} WHERE {}", TABLE_NAME, predicate);
    let lazy_frame = ctx
        .execute(&sql)
        .map_err(|e| NicefigsError::Data(format!("Failed to apply query `{}`: {}", predicate, e)))?;

    lazy_frame
        .collect()
        .map_err(|e| NicefigsError::Data(format!("Failed to collect query result: {}", e)))
}
