//! Table workbook writer: plans each sheet, then emits it through `rust_xlsxwriter`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::{debug, info, warn};

use crate::conf::C_SHEET_NAME_DEFAULT;
use crate::error::{ModelbookError, Result};
use crate::lookup::{SpecFieldLookup, resolve_record_field};
use crate::record::RecordSource;
use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecPlannedCell, SpecSheetPlan, SpecTable,
    SpecXlsxReport, SpecXlsxSheetOptions,
};
use crate::util::{
    apply_border_plan, calculate_table_bounds, cast_col_num, cast_row_num, derive_data_format,
    derive_header_format, derive_unique_sheet_name, plan_outer_border, sanitize_sheet_name,
    validate_table_bounds,
};

/// Factory producing a record source on demand.
pub type SourceFactory<'a> = Box<dyn Fn() -> Result<Box<dyn RecordSource + 'a>> + 'a>;

/// Where an export gets its records from.
pub enum EnumSourceBinding<'a> {
    /// Caller-provided source.
    Borrowed(&'a dyn RecordSource),
    /// Source built at export time.
    Factory(SourceFactory<'a>),
}

/// Stateful table workbook.
///
/// Every [`Self::export`] builds a fresh in-memory workbook; sheets never
/// persist across exports or instances.
pub struct TableWorkbook<'a> {
    table: SpecTable,
    source: Option<EnumSourceBinding<'a>>,
    worksheets: Vec<String>,
    sheet_options: SpecXlsxSheetOptions,
    report: Option<SpecXlsxReport>,
}

impl<'a> TableWorkbook<'a> {
    pub fn new(table: SpecTable) -> Self {
        Self {
            table,
            source: None,
            worksheets: Vec::new(),
            sheet_options: SpecXlsxSheetOptions::default(),
            report: None,
        }
    }

    /// Bind an explicit record source.
    pub fn with_source(mut self, source: &'a dyn RecordSource) -> Self {
        self.source = Some(EnumSourceBinding::Borrowed(source));
        self
    }

    /// Bind a factory called once per export when no explicit source is given.
    pub fn with_source_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn RecordSource + 'a>> + 'a,
    {
        if !matches!(self.source, Some(EnumSourceBinding::Borrowed(_))) {
            self.source = Some(EnumSourceBinding::Factory(Box::new(factory)));
        }
        self
    }

    /// Declare a worksheet; each declared sheet renders the table.
    pub fn with_worksheet(mut self, name: impl Into<String>) -> Self {
        self.worksheets.push(name.into());
        self
    }

    pub fn with_sheet_options(mut self, sheet_options: SpecXlsxSheetOptions) -> Self {
        self.sheet_options = sheet_options;
        self
    }

    pub fn table(&self) -> &SpecTable {
        &self.table
    }

    /// Report of the last successful export.
    pub fn report(&self) -> Option<&SpecXlsxReport> {
        self.report.as_ref()
    }

    /// Build the workbook and return the serialized xlsx payload.
    pub fn export(&mut self) -> Result<Vec<u8>> {
        self.table.validate()?;

        let source_owned;
        let source: &dyn RecordSource = match &self.source {
            None => {
                return Err(ModelbookError::Configuration(
                    "TableWorkbook is missing a record source. Bind one with with_source() \
                     or with_source_factory()."
                        .to_string(),
                ));
            }
            Some(EnumSourceBinding::Borrowed(source)) => *source,
            Some(EnumSourceBinding::Factory(factory)) => {
                source_owned = factory()?;
                &*source_owned
            }
        };

        let plan = plan_table_sheet(&self.table, source)?;
        let n_records = plan.bounds.last_row - plan.bounds.first_row;

        let l_sheet_names = self.derive_sheet_names();
        info!(
            n_sheets = l_sheet_names.len(),
            n_records,
            bounds = ?plan.bounds,
            "exporting table workbook"
        );

        let mut workbook = Workbook::new();
        for sheet_name in &l_sheet_names {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(sheet_name)?;
            apply_sheet_options(worksheet, &self.sheet_options);
            write_sheet_plan(worksheet, &plan)?;
            debug!(sheet_name = %sheet_name, "sheet written");
        }

        let v_payload = workbook.save_to_buffer()?;
        info!(n_bytes = v_payload.len(), "workbook serialized");

        self.report = Some(SpecXlsxReport {
            sheet_names: l_sheet_names,
            n_records,
            bounds: Some(plan.bounds),
            n_bytes: v_payload.len(),
        });
        Ok(v_payload)
    }

    /// Export and write the payload to `path_file_out`.
    pub fn save(&mut self, path_file_out: impl AsRef<Path>) -> Result<()> {
        let v_payload = self.export()?;
        std::fs::write(path_file_out, v_payload)?;
        Ok(())
    }

    fn derive_sheet_names(&self) -> Vec<String> {
        let mut set_sheet_names_existing = BTreeSet::new();
        if self.worksheets.is_empty() {
            return vec![C_SHEET_NAME_DEFAULT.to_string()];
        }
        self.worksheets
            .iter()
            .map(|name| {
                derive_unique_sheet_name(
                    &sanitize_sheet_name(name, "_"),
                    &mut set_sheet_names_existing,
                )
            })
            .collect()
    }
}

/// One-shot export of `table` over `source` into a single sheet.
pub fn build_workbook(
    table: &SpecTable,
    source: &dyn RecordSource,
    sheet_options: &SpecXlsxSheetOptions,
) -> Result<Vec<u8>> {
    TableWorkbook::new(table.clone())
        .with_source(source)
        .with_sheet_options(*sheet_options)
        .export()
}

/// Plan the header row, data rows and outer border of one table sheet.
pub fn plan_table_sheet(table: &SpecTable, source: &dyn RecordSource) -> Result<SpecSheetPlan> {
    table.validate()?;

    let n_records = source.count()?;
    let bounds = calculate_table_bounds(table.offset, n_records, table.fields.len())?;
    validate_table_bounds(&bounds)?;

    let l_lookups: Vec<SpecFieldLookup> = table
        .fields
        .iter()
        .map(|field| SpecFieldLookup::parse(&field.lookup))
        .collect();

    let mut cells: BTreeMap<(usize, usize), SpecPlannedCell> = BTreeMap::new();
    for (n_idx_col, field) in table.fields.iter().enumerate() {
        cells.insert(
            (bounds.first_row, bounds.first_col + n_idx_col),
            SpecPlannedCell {
                value: EnumCellValue::String(field.header.clone()),
                fmt: derive_header_format(field, table),
            },
        );
    }

    let mut n_records_seen = 0usize;
    source
        .visit_records(&mut |record_idx, record| {
            let n_row = bounds.first_row + 1 + n_records_seen;
            for (n_idx_col, (field, lookup)) in table.fields.iter().zip(&l_lookups).enumerate() {
                let value = resolve_record_field(record, &field.header, lookup, record_idx)?;
                cells.insert(
                    (n_row, bounds.first_col + n_idx_col),
                    SpecPlannedCell {
                        value,
                        fmt: derive_data_format(field, table, n_records_seen),
                    },
                );
            }
            n_records_seen += 1;
            Ok(())
        })
        .inspect_err(|err| warn!(%err, "table export aborted"))?;

    if n_records_seen != n_records {
        return Err(ModelbookError::SourceCountMismatch {
            expected: n_records,
            actual: n_records_seen,
        });
    }

    apply_border_plan(&mut cells, &plan_outer_border(&bounds, table.border_style));

    Ok(SpecSheetPlan { bounds, cells })
}

fn apply_sheet_options(worksheet: &mut Worksheet, options: &SpecXlsxSheetOptions) {
    if options.hide_gridlines {
        worksheet.set_screen_gridlines(false);
    }
    if options.landscape {
        worksheet.set_landscape();
    }
    if options.fit_to_one_page_wide {
        worksheet.set_print_fit_to_pages(1, 0);
    }
}

fn write_sheet_plan(worksheet: &mut Worksheet, plan: &SpecSheetPlan) -> Result<()> {
    let mut dict_fmt_cache: HashMap<&SpecCellFormat, Format> = HashMap::new();
    for ((row_idx, col_idx), cell) in &plan.cells {
        let format = dict_fmt_cache
            .entry(&cell.fmt)
            .or_insert_with(|| derive_rust_xlsx_format(&cell.fmt));
        write_cell_with_format(worksheet, *row_idx, *col_idx, &cell.value, format)?;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<()> {
    let (row_num, col_num) = (cast_row_num(row_idx)?, cast_col_num(col_idx)?);
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(row_num, col_num, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(row_num, col_num, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(row_num, col_num, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(row_num, col_num, *val, format)?;
        }
    }
    Ok(())
}

/// Translate a planned format into a `rust_xlsxwriter` format.
pub fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        8 => FormatBorder::MediumDashed,
        9 => FormatBorder::DashDot,
        10 => FormatBorder::MediumDashDot,
        11 => FormatBorder::DashDotDot,
        12 => FormatBorder::MediumDashDotDot,
        13 => FormatBorder::SlantDashDot,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "center_across" => Some(FormatAlign::CenterAcross),
        "distributed" => Some(FormatAlign::Distributed),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        "vjustify" | "vertical_justify" => Some(FormatAlign::VerticalJustify),
        "vdistributed" | "vertical_distributed" => Some(FormatAlign::VerticalDistributed),
        _ => None,
    }
}
