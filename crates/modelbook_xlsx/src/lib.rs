//! `modelbook_xlsx` v1:
//! Renders a countable record source into a striped, bordered XLSX table.
//!
//! Module layout:
//! - `conf`   : constants and default presets
//! - `spec`   : table specs, formats, plans and reports
//! - `error`  : error taxonomy
//! - `record` : record / record-source seams
//! - `lookup` : dotted field-path resolution
//! - `frame`  : Polars `DataFrame` record source
//! - `util`   : pure layout, format and border helpers
//! - `writer` : workbook writer
pub mod conf;
pub mod error;
pub mod frame;
pub mod lookup;
pub mod record;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_DEFAULT, N_BORDER_STYLE_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX,
    N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use error::{ModelbookError, Result};
pub use frame::{DataFrameRecord, derive_dataframe_from_ipc_bytes};
pub use lookup::{EnumLookupStep, LookupFailure, SpecFieldLookup, resolve_field};
pub use record::{EnumAttrValue, Record, RecordSource};
pub use spec::{
    EnumCellValue, SpecCellBorder, SpecCellFormat, SpecDataRegion, SpecField, SpecPlannedCell,
    SpecSheetPlan, SpecTable, SpecTableBounds, SpecXlsxReport, SpecXlsxSheetOptions,
};
pub use util::{
    apply_border_plan, calculate_table_bounds, derive_data_format, derive_header_format,
    plan_outer_border, sanitize_sheet_name,
};
pub use writer::{
    EnumSourceBinding, SourceFactory, TableWorkbook, build_workbook, plan_table_sheet,
};
