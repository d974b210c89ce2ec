//! Dotted field-path resolution against [`Record`] values.

use crate::error::{ModelbookError, Result};
use crate::record::{EnumAttrValue, Record};
use crate::spec::EnumCellValue;

/// One accessor step of a parsed lookup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumLookupStep {
    /// Read a named attribute of the current record.
    Attr(String),
    /// Call the current value if it is callable; no-op otherwise.
    Invoke,
}

/// Parsed lookup path: one `Attr` per segment, then a trailing `Invoke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFieldLookup {
    pub path: String,
    pub steps: Vec<EnumLookupStep>,
}

impl SpecFieldLookup {
    pub fn parse(path: &str) -> Self {
        let mut steps: Vec<EnumLookupStep> = path
            .split('.')
            .map(|segment| EnumLookupStep::Attr(segment.to_string()))
            .collect();
        steps.push(EnumLookupStep::Invoke);
        Self {
            path: path.to_string(),
            steps,
        }
    }
}

/// Failure of one lookup, before field/record context is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    pub segment: String,
    pub reason: String,
}

impl LookupFailure {
    /// Attach field and record context.
    pub fn into_error(self, field: &str, path: &str, record_idx: usize) -> ModelbookError {
        ModelbookError::AttributeResolution {
            field: field.to_string(),
            path: path.to_string(),
            segment: self.segment,
            record_idx,
            reason: self.reason,
        }
    }
}

/// Walk `lookup` over `record` and return the resulting scalar.
pub fn resolve_field(
    record: &dyn Record,
    lookup: &SpecFieldLookup,
) -> std::result::Result<EnumCellValue, LookupFailure> {
    let mut current = EnumAttrValue::Nested(record);
    let mut c_segment_last = String::new();

    for step in &lookup.steps {
        current = match step {
            EnumLookupStep::Attr(segment) => {
                c_segment_last = segment.clone();
                let EnumAttrValue::Nested(obj) = current else {
                    return Err(LookupFailure {
                        segment: segment.clone(),
                        reason: "value has no attributes".to_string(),
                    });
                };
                obj.get_attr(segment).ok_or_else(|| LookupFailure {
                    segment: segment.clone(),
                    reason: "attribute does not exist".to_string(),
                })?
            }
            EnumLookupStep::Invoke => match current {
                EnumAttrValue::Callable(func) => EnumAttrValue::Scalar(func()),
                other => other,
            },
        };
    }

    match current {
        EnumAttrValue::Scalar(value) => Ok(value),
        EnumAttrValue::Callable(func) => Ok(func()),
        EnumAttrValue::Nested(_) => Err(LookupFailure {
            segment: c_segment_last,
            reason: "path ends on a record, not a value".to_string(),
        }),
    }
}

/// Resolve one field for one record, as [`ModelbookError::AttributeResolution`] on failure.
pub fn resolve_record_field(
    record: &dyn Record,
    field_header: &str,
    lookup: &SpecFieldLookup,
    record_idx: usize,
) -> Result<EnumCellValue> {
    resolve_field(record, lookup)
        .map_err(|failure| failure.into_error(field_header, &lookup.path, record_idx))
}
