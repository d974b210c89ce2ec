//! Stateless layout, format and border helpers used by the table writer.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::error::{ModelbookError, Result};
use crate::spec::{
    EnumCellValue, SpecCellBorder, SpecCellFormat, SpecField, SpecPlannedCell, SpecTable,
    SpecTableBounds,
};

////////////////////////////////////////////////////////////////////////////////
// #region TableLayout

/// Derive the table rectangle from its offset, record count and field count.
///
/// Zero records yields a header-only table (`last_row == first_row`). An
/// offset so large that the rectangle overflows `usize` is `TableTooLarge`.
pub fn calculate_table_bounds(
    offset: (usize, usize),
    n_records: usize,
    n_fields: usize,
) -> Result<SpecTableBounds> {
    debug_assert!(n_fields >= 1, "A table needs at least one field.");
    let (first_row, first_col) = offset;
    let last_row = first_row.checked_add(n_records);
    let last_col = first_col.checked_add(n_fields.saturating_sub(1));
    match (last_row, last_col) {
        (Some(last_row), Some(last_col)) => Ok(SpecTableBounds {
            first_row,
            first_col,
            last_row,
            last_col,
        }),
        _ => Err(ModelbookError::TableTooLarge {
            last_row: last_row.unwrap_or(usize::MAX),
            last_col: last_col.unwrap_or(usize::MAX),
        }),
    }
}

/// Reject tables that do not fit on one Excel worksheet.
pub fn validate_table_bounds(bounds: &SpecTableBounds) -> Result<()> {
    if bounds.last_row >= N_NROWS_EXCEL_MAX || bounds.last_col >= N_NCOLS_EXCEL_MAX {
        return Err(ModelbookError::TableTooLarge {
            last_row: bounds.last_row,
            last_col: bounds.last_col,
        });
    }
    Ok(())
}

pub fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| ModelbookError::InvalidSpec(format!("row index overflow: {value}")))
}

pub fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value)
        .map_err(|_| ModelbookError::InvalidSpec(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatMerge

/// Header format: field header format, then table header defaults on top.
pub fn derive_header_format(field: &SpecField, table: &SpecTable) -> SpecCellFormat {
    field.fmt_header.merge(&table.fmt_header_default)
}

/// Data format: field data format, table data defaults, then stripe on odd rows.
///
/// `n_row_offset` is zero-based within the data region.
pub fn derive_data_format(
    field: &SpecField,
    table: &SpecTable,
    n_row_offset: usize,
) -> SpecCellFormat {
    let fmt_data = field.fmt_data.merge(&table.fmt_data_default);
    if table.if_striped && n_row_offset % 2 == 1 {
        return fmt_data.merge(&table.fmt_stripe);
    }
    fmt_data
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OuterBorder

/// Plan the edge lines outlining `bounds`, keyed by absolute `(row, col)`.
///
/// Corner cells get both adjacent edges; a single row or column gets both
/// opposite edges.
pub fn plan_outer_border(
    bounds: &SpecTableBounds,
    border_style: i64,
) -> BTreeMap<(usize, usize), SpecCellBorder> {
    let mut dict_plan_border: BTreeMap<(usize, usize), SpecCellBorder> = BTreeMap::new();

    for col_idx in bounds.first_col..=bounds.last_col {
        dict_plan_border
            .entry((bounds.first_row, col_idx))
            .or_default()
            .top = Some(border_style);
        dict_plan_border
            .entry((bounds.last_row, col_idx))
            .or_default()
            .bottom = Some(border_style);
    }
    for row_idx in bounds.first_row..=bounds.last_row {
        dict_plan_border
            .entry((row_idx, bounds.first_col))
            .or_default()
            .left = Some(border_style);
        dict_plan_border
            .entry((row_idx, bounds.last_col))
            .or_default()
            .right = Some(border_style);
    }

    dict_plan_border
}

/// Merge planned edges into existing cells without touching their other options.
///
/// Cells absent from `cells` are added as blanks carrying only their edges.
pub fn apply_border_plan(
    cells: &mut BTreeMap<(usize, usize), SpecPlannedCell>,
    plan_border: &BTreeMap<(usize, usize), SpecCellBorder>,
) {
    for (pos, border) in plan_border {
        let cell = cells.entry(*pos).or_insert_with(|| SpecPlannedCell {
            value: EnumCellValue::None,
            fmt: SpecCellFormat::default(),
        });
        cell.fmt = cell.fmt.merge(&border.to_format_patch());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
///
/// Leading and trailing apostrophes are stripped; Excel rejects them.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    let mut c_name: String = c_name
        .trim()
        .trim_matches('\'')
        .trim()
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect();
    c_name = c_name.trim_end_matches('\'').trim_end().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }
    c_name
}

/// Return `name`, or `name__2`, `name__3`, ... if already taken; records the result.
///
/// Names are compared case-insensitively, as Excel does; `set_sheet_names_existing`
/// holds lowercased names.
pub fn derive_unique_sheet_name(
    name: &str,
    set_sheet_names_existing: &mut BTreeSet<String>,
) -> String {
    if set_sheet_names_existing.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();
        if set_sheet_names_existing.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
