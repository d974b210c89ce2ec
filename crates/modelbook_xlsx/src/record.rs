//! Record and record-source seams consumed by the table writer.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::Result;
use crate::spec::EnumCellValue;

/// Value found under one attribute of a record.
pub enum EnumAttrValue<'a> {
    /// Plain cell value.
    Scalar(EnumCellValue),
    /// Nested record, walked by the next path segment.
    Nested(&'a dyn Record),
    /// Zero-argument computed value.
    Callable(Box<dyn Fn() -> EnumCellValue + 'a>),
}

impl std::fmt::Debug for EnumAttrValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumAttrValue::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            EnumAttrValue::Nested(_) => f.write_str("Nested(..)"),
            EnumAttrValue::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// Attribute accessor over one opaque record.
pub trait Record {
    /// Look up `name`; `None` when the record has no such attribute.
    fn get_attr(&self, name: &str) -> Option<EnumAttrValue<'_>>;
}

/// Countable, re-iterable, ordered supply of records.
///
/// `count` and `visit_records` must agree for the duration of one export.
pub trait RecordSource {
    fn count(&self) -> Result<usize>;

    /// Call `visitor` with `(record_idx, record)` in source order.
    fn visit_records(
        &self,
        visitor: &mut dyn FnMut(usize, &dyn Record) -> Result<()>,
    ) -> Result<()>;
}

impl<R: Record> RecordSource for [R] {
    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }

    fn visit_records(
        &self,
        visitor: &mut dyn FnMut(usize, &dyn Record) -> Result<()>,
    ) -> Result<()> {
        for (idx, record) in self.iter().enumerate() {
            visitor(idx, record)?;
        }
        Ok(())
    }
}

impl<R: Record> RecordSource for Vec<R> {
    fn count(&self) -> Result<usize> {
        self.as_slice().count()
    }

    fn visit_records(
        &self,
        visitor: &mut dyn FnMut(usize, &dyn Record) -> Result<()>,
    ) -> Result<()> {
        self.as_slice().visit_records(visitor)
    }
}

impl Record for BTreeMap<String, EnumCellValue> {
    fn get_attr(&self, name: &str) -> Option<EnumAttrValue<'_>> {
        self.get(name)
            .map(|value| EnumAttrValue::Scalar(value.clone()))
    }
}

impl Record for Value {
    fn get_attr(&self, name: &str) -> Option<EnumAttrValue<'_>> {
        let Value::Object(dict) = self else {
            return None;
        };
        let value = dict.get(name)?;
        Some(match value {
            Value::Object(_) => EnumAttrValue::Nested(value),
            _ => EnumAttrValue::Scalar(derive_cell_value_from_json(value)),
        })
    }
}

/// Map a JSON leaf onto a cell value; arrays are written as their JSON text.
pub fn derive_cell_value_from_json(value: &Value) -> EnumCellValue {
    match value {
        Value::Null => EnumCellValue::None,
        Value::Bool(val) => EnumCellValue::Boolean(*val),
        Value::Number(val) => val
            .as_f64()
            .map(EnumCellValue::Number)
            .unwrap_or_else(|| EnumCellValue::String(val.to_string())),
        Value::String(val) => EnumCellValue::String(val.clone()),
        Value::Array(_) | Value::Object(_) => EnumCellValue::String(value.to_string()),
    }
}
