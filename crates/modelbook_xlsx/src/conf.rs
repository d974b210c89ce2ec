//! XLSX constants and default preset factories.

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Sheet name used when a workbook declares no worksheets.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";
/// Thin line.
pub const N_BORDER_STYLE_DEFAULT: i64 = 1;

/// Header defaults: wrapped, bold, light blue fill, vertically centered.
pub fn derive_default_header_format() -> SpecCellFormat {
    SpecCellFormat {
        text_wrap: Some(true),
        bold: Some(true),
        bg_color: Some("#BDD7EE".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    }
}

/// Data defaults: vertically centered.
pub fn derive_default_data_format() -> SpecCellFormat {
    SpecCellFormat {
        valign: Some("vcenter".to_string()),
        ..Default::default()
    }
}

/// Stripe override: light gray fill.
pub fn derive_default_stripe_format() -> SpecCellFormat {
    SpecCellFormat {
        bg_color: Some("#D9D9D9".to_string()),
        ..Default::default()
    }
}
