//! DataFrame helpers shared by the report algorithms.

use polars::prelude::{
    BooleanChunked, Column, DataFrame, DataType, IdxCa, IdxSize, JoinArgs, JoinCoalesce,
    JoinType, NewChunkedArray, TimeUnit,
};

use crate::error::Result;

/// Header names of `df`.
pub fn headers(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Name a right-hand column ends up with after a join on `key`.
///
/// Columns that collide with a left-hand header get `suffix` appended.
pub fn joined_name(header: &str, left_headers: &[String], key: &str, suffix: &str) -> String {
    if header != key && left_headers.iter().any(|left| left == header) {
        format!("{header}{suffix}")
    } else {
        header.to_string()
    }
}

/// Join arguments with a collision suffix and coalesced key columns.
pub fn join_args(how: JoinType, suffix: &str) -> JoinArgs {
    JoinArgs::new(how)
        .with_suffix(Some(suffix.into()))
        .with_coalesce(JoinCoalesce::CoalesceColumns)
}

/// Keeps the rows of `df` where `keep` is true.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    Ok(df.filter(&mask)?)
}

/// Rows of `df` at `indices`, in that order.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let indices: Vec<IdxSize> = indices.iter().map(|idx| *idx as IdxSize).collect();
    Ok(df.take(&IdxCa::from_vec("idx".into(), indices))?)
}

/// Values of a datetime column as microseconds since the epoch.
pub fn datetime_micros(df: &DataFrame, header: &str) -> Result<Vec<Option<i64>>> {
    let column = df
        .column(header)?
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
        .cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

/// Moves `front` columns before the existing ones.
pub fn prepend_columns(df: &DataFrame, front: Vec<Column>) -> Result<DataFrame> {
    let mut columns = front;
    columns.extend(df.get_columns().iter().cloned());
    Ok(DataFrame::new(columns)?)
}
