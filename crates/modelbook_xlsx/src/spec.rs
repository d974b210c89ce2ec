//! Shared table specification and sheet plan models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conf::{
    N_BORDER_STYLE_DEFAULT, derive_default_data_format, derive_default_header_format,
    derive_default_stripe_format,
};
use crate::error::Result;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell style as a shallow option map; unset options are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

/// Scalar cell value produced by field resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    String(String),
    Number(f64),
    Boolean(bool),
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        EnumCellValue::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        EnumCellValue::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        EnumCellValue::Number(value)
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        EnumCellValue::Number(value as f64)
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        EnumCellValue::Boolean(value)
    }
}

impl SpecCellFormat {
    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Border edges for one cell; `None` leaves the edge untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecCellBorder {
    pub top: Option<i64>,
    pub bottom: Option<i64>,
    pub left: Option<i64>,
    pub right: Option<i64>,
}

impl SpecCellBorder {
    /// Number of edges this border sets.
    pub fn count_edges(&self) -> usize {
        [self.top, self.bottom, self.left, self.right]
            .iter()
            .filter(|edge| edge.is_some())
            .count()
    }

    /// Express the set edges as a format patch.
    pub fn to_format_patch(&self) -> SpecCellFormat {
        SpecCellFormat {
            top: self.top,
            bottom: self.bottom,
            left: self.left,
            right: self.right,
            ..Default::default()
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableSpecification

/// One column of the table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecField {
    /// Header text.
    pub header: String,
    /// Dotted lookup path, e.g. `profile.name`.
    pub lookup: String,
    /// Per-field header format.
    pub fmt_header: SpecCellFormat,
    /// Per-field data format.
    pub fmt_data: SpecCellFormat,
}

impl SpecField {
    /// Column with no per-field formats.
    pub fn new(header: impl Into<String>, lookup: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            lookup: lookup.into(),
            ..Default::default()
        }
    }

    pub fn with_fmt_header(mut self, fmt: SpecCellFormat) -> Self {
        self.fmt_header = fmt;
        self
    }

    pub fn with_fmt_data(mut self, fmt: SpecCellFormat) -> Self {
        self.fmt_data = fmt;
        self
    }
}

/// Static table configuration shared by every sheet of one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecTable {
    /// Ordered columns.
    pub fields: Vec<SpecField>,
    /// `(first_row, first_col)` of the header row.
    pub offset: (usize, usize),
    /// Header defaults; these win over per-field header formats.
    pub fmt_header_default: SpecCellFormat,
    /// Data defaults; these win over per-field data formats.
    pub fmt_data_default: SpecCellFormat,
    /// Apply `fmt_stripe` to odd data rows.
    pub if_striped: bool,
    pub fmt_stripe: SpecCellFormat,
    /// Line style of the outer border.
    pub border_style: i64,
}

impl Default for SpecTable {
    fn default() -> Self {
        Self {
            fields: vec![],
            offset: (0, 0),
            fmt_header_default: derive_default_header_format(),
            fmt_data_default: derive_default_data_format(),
            if_striped: true,
            fmt_stripe: derive_default_stripe_format(),
            border_style: N_BORDER_STYLE_DEFAULT,
        }
    }
}

impl SpecTable {
    /// Table with default presets over `fields`.
    pub fn new(fields: Vec<SpecField>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// Load a table definition from JSON; missing keys take defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let spec: SpecTable = serde_json::from_str(text)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_offset(mut self, first_row: usize, first_col: usize) -> Self {
        self.offset = (first_row, first_col);
        self
    }

    pub fn with_striped(mut self, if_striped: bool) -> Self {
        self.if_striped = if_striped;
        self
    }

    /// Reject configurations that cannot produce a table.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(crate::error::ModelbookError::InvalidSpec(
                "fields must contain at least one column.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Setup applied to every created sheet before any cell is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecXlsxSheetOptions {
    pub hide_gridlines: bool,
    pub landscape: bool,
    /// Fit to one page wide, automatic height.
    pub fit_to_one_page_wide: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutSpecification

/// Inclusive table rectangle, header row included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecTableBounds {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

/// Data rectangle below the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecDataRegion {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    /// One column short of the table's last column; `None` when that falls before column 0.
    pub last_col: Option<usize>,
}

impl SpecTableBounds {
    /// Data rows only, excluding the table's last column.
    pub fn data_region(&self) -> SpecDataRegion {
        SpecDataRegion {
            first_row: self.first_row + 1,
            first_col: self.first_col,
            last_row: self.last_row,
            last_col: self.last_col.checked_sub(1),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.last_row - self.first_row + 1
    }

    pub fn n_cols(&self) -> usize {
        self.last_col - self.first_col + 1
    }
}

/// Final value and format of one planned cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecPlannedCell {
    pub value: EnumCellValue,
    pub fmt: SpecCellFormat,
}

/// Logical content of one rendered table sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetPlan {
    pub bounds: SpecTableBounds,
    /// Cells keyed by absolute `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecPlannedCell>,
}

impl SpecSheetPlan {
    pub fn cell(&self, row: usize, col: usize) -> Option<&SpecPlannedCell> {
        self.cells.get(&(row, col))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-export report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Actual sheet names in workbook order.
    pub sheet_names: Vec<String>,
    /// Data rows written per sheet.
    pub n_records: usize,
    pub bounds: Option<SpecTableBounds>,
    /// Serialized payload size in bytes.
    pub n_bytes: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
