//! Polars `DataFrame` as a record source: one record per row, columns as attributes.

use std::io::Cursor;

use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};

use crate::error::Result;
use crate::record::{EnumAttrValue, Record, RecordSource};
use crate::spec::EnumCellValue;

/// Borrowed view of one dataframe row.
pub struct DataFrameRecord<'a> {
    df: &'a DataFrame,
    n_row: usize,
}

impl Record for DataFrameRecord<'_> {
    fn get_attr(&self, name: &str) -> Option<EnumAttrValue<'_>> {
        let col = self
            .df
            .get_columns()
            .iter()
            .find(|col| col.name().as_str() == name)?;
        let value = col.get(self.n_row).ok()?;
        Some(EnumAttrValue::Scalar(derive_cell_value_from_any_value(value)))
    }
}

impl RecordSource for DataFrame {
    fn count(&self) -> Result<usize> {
        Ok(self.height())
    }

    fn visit_records(
        &self,
        visitor: &mut dyn FnMut(usize, &dyn Record) -> Result<()>,
    ) -> Result<()> {
        for n_row in 0..self.height() {
            visitor(n_row, &DataFrameRecord { df: self, n_row })?;
        }
        Ok(())
    }
}

/// Read a dataframe from Polars IPC bytes.
pub fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame> {
    Ok(IpcReader::new(Cursor::new(v_ipc_df)).finish()?)
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int128(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}
