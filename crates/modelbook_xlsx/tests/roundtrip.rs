use std::io::{Cursor, Read};

use calamine::{Data, Range, Reader, Xlsx};
use modelbook_xlsx::{
    EnumAttrValue, EnumCellValue, ModelbookError, Record, RecordSource, SpecField, SpecTable,
    SpecXlsxSheetOptions, TableWorkbook, build_workbook, plan_table_sheet,
};
use polars::prelude::df;
use serde_json::json;
use tempfile::tempdir;
use zip::ZipArchive;

struct Player {
    name: &'static str,
    score: i64,
}

impl Record for Player {
    fn get_attr(&self, name: &str) -> Option<EnumAttrValue<'_>> {
        match name {
            "name" => Some(EnumAttrValue::Scalar(EnumCellValue::from(self.name))),
            "get_score" => Some(EnumAttrValue::Callable(Box::new(move || {
                EnumCellValue::from(self.score * 2)
            }))),
            _ => None,
        }
    }
}

fn players() -> Vec<Player> {
    vec![
        Player {
            name: "Ada",
            score: 10,
        },
        Player {
            name: "Grace",
            score: 20,
        },
        Player {
            name: "Linus",
            score: 30,
        },
    ]
}

fn player_table() -> SpecTable {
    SpecTable::new(vec![
        SpecField::new("Name", "name"),
        SpecField::new("Score", "get_score"),
    ])
}

fn read_sheet(v_payload: &[u8], sheet_name: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(v_payload.to_vec())).unwrap();
    workbook.worksheet_range(sheet_name).unwrap()
}

fn read_sheet_xml(v_payload: &[u8], n_sheet: usize) -> String {
    let mut archive = ZipArchive::new(Cursor::new(v_payload.to_vec())).unwrap();
    let mut entry = archive
        .by_name(&format!("xl/worksheets/sheet{n_sheet}.xml"))
        .unwrap();
    let mut c_xml = String::new();
    entry.read_to_string(&mut c_xml).unwrap();
    c_xml
}

// ===== Round Trip Tests =====

#[test]
fn test_export_roundtrips_headers_and_values() {
    let v_payload = build_workbook(
        &player_table(),
        &players(),
        &SpecXlsxSheetOptions::default(),
    )
    .unwrap();

    let range = read_sheet(&v_payload, "Sheet1");
    assert_eq!(
        range.get_value((0, 0)),
        Some(&Data::String("Name".to_string()))
    );
    assert_eq!(
        range.get_value((0, 1)),
        Some(&Data::String("Score".to_string()))
    );
    assert_eq!(
        range.get_value((1, 0)),
        Some(&Data::String("Ada".to_string()))
    );
    assert_eq!(range.get_value((2, 1)), Some(&Data::Float(40.0)));
    assert_eq!(
        range.get_value((3, 0)),
        Some(&Data::String("Linus".to_string()))
    );
    assert_eq!(range.get_value((3, 1)), Some(&Data::Float(60.0)));
}

#[test]
fn test_stripes_alternate_from_second_data_row() {
    let plan = plan_table_sheet(&player_table(), &players()).unwrap();

    let l_bg_colors: Vec<Option<&str>> = (1..=3)
        .map(|row| plan.cell(row, 0).unwrap().fmt.bg_color.as_deref())
        .collect();
    assert_eq!(l_bg_colors, vec![None, Some("#D9D9D9"), None]);

    let plan_plain = plan_table_sheet(&player_table().with_striped(false), &players()).unwrap();
    assert!((1..=3).all(|row| plan_plain.cell(row, 1).unwrap().fmt.bg_color.is_none()));
}

#[test]
fn test_outer_border_follows_offset_table() {
    let plan = plan_table_sheet(&player_table().with_offset(2, 3), &players()).unwrap();

    assert_eq!(plan.bounds.first_row, 2);
    assert_eq!(plan.bounds.last_row, 5);
    assert_eq!(plan.bounds.last_col, 4);

    let top_left = &plan.cell(2, 3).unwrap().fmt;
    assert_eq!((top_left.top, top_left.left, top_left.right), (Some(1), Some(1), None));
    let middle_right = &plan.cell(3, 4).unwrap().fmt;
    assert_eq!(
        (middle_right.top, middle_right.bottom, middle_right.right),
        (None, None, Some(1))
    );
    let bottom_right = &plan.cell(5, 4).unwrap().fmt;
    assert_eq!((bottom_right.bottom, bottom_right.right), (Some(1), Some(1)));
    assert_eq!(bottom_right.bg_color, None);

    let region = plan.bounds.data_region();
    assert_eq!((region.first_row, region.last_row, region.last_col), (3, 5, Some(3)));
}

#[test]
fn test_header_only_export_for_empty_source() {
    let v_payload = build_workbook(
        &player_table(),
        &Vec::<Player>::new(),
        &SpecXlsxSheetOptions::default(),
    )
    .unwrap();

    let range = read_sheet(&v_payload, "Sheet1");
    assert_eq!(range.height(), 1);
    assert_eq!(
        range.get_value((0, 1)),
        Some(&Data::String("Score".to_string()))
    );
}

#[test]
fn test_repeated_builds_have_identical_content() {
    let plan_a = plan_table_sheet(&player_table(), &players()).unwrap();
    let plan_b = plan_table_sheet(&player_table(), &players()).unwrap();
    assert_eq!(plan_a, plan_b);

    let options = SpecXlsxSheetOptions::default();
    let v_payload_a = build_workbook(&player_table(), &players(), &options).unwrap();
    let v_payload_b = build_workbook(&player_table(), &players(), &options).unwrap();
    let range_a = read_sheet(&v_payload_a, "Sheet1");
    let range_b = read_sheet(&v_payload_b, "Sheet1");
    assert_eq!(
        range_a.rows().collect::<Vec<_>>(),
        range_b.rows().collect::<Vec<_>>()
    );
}

#[test]
fn test_sheet_options_reach_worksheet_xml() {
    let options = SpecXlsxSheetOptions {
        hide_gridlines: true,
        landscape: true,
        fit_to_one_page_wide: true,
    };
    let v_payload = build_workbook(&player_table(), &players(), &options).unwrap();
    let c_xml = read_sheet_xml(&v_payload, 1);
    assert!(c_xml.contains(r#"showGridLines="0""#));
    assert!(c_xml.contains(r#"orientation="landscape""#));
    assert!(c_xml.contains(r#"fitToPage="1""#));
    assert!(c_xml.contains(r#"fitToHeight="0""#));
    assert!(!c_xml.contains(r#"fitToWidth="0""#));

    let v_payload_plain = build_workbook(
        &player_table(),
        &players(),
        &SpecXlsxSheetOptions::default(),
    )
    .unwrap();
    let c_xml_plain = read_sheet_xml(&v_payload_plain, 1);
    assert!(!c_xml_plain.contains("showGridLines"));
    assert!(!c_xml_plain.contains("landscape"));
    assert!(!c_xml_plain.contains("fitToPage"));
    assert!(!c_xml_plain.contains("fitToHeight"));
}

// ===== Source Tests =====

#[test]
fn test_json_records_with_nested_paths() {
    let records = vec![
        json!({"id": 1, "profile": {"name": "Ada", "active": true}}),
        json!({"id": 2, "profile": {"name": "Grace", "active": false}}),
    ];
    let table = SpecTable::new(vec![
        SpecField::new("ID", "id"),
        SpecField::new("Name", "profile.name"),
        SpecField::new("Active", "profile.active"),
    ]);

    let v_payload = build_workbook(&table, &records, &SpecXlsxSheetOptions::default()).unwrap();
    let range = read_sheet(&v_payload, "Sheet1");

    assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
    assert_eq!(
        range.get_value((2, 1)),
        Some(&Data::String("Grace".to_string()))
    );
    assert_eq!(range.get_value((1, 2)), Some(&Data::Bool(true)));
}

#[test]
fn test_dataframe_source_export() {
    let df = df!(
        "name" => ["Ada", "Grace"],
        "score" => [1.5f64, 2.5],
    )
    .unwrap();
    let table = SpecTable::new(vec![
        SpecField::new("Name", "name"),
        SpecField::new("Score", "score"),
    ]);

    let v_payload = build_workbook(&table, &df, &SpecXlsxSheetOptions::default()).unwrap();
    let range = read_sheet(&v_payload, "Sheet1");
    assert_eq!(range.get_value((2, 1)), Some(&Data::Float(2.5)));
}

#[test]
fn test_factory_source_feeds_every_registered_sheet() {
    let mut workbook = TableWorkbook::new(player_table())
        .with_source_factory(|| Ok(Box::new(players()) as Box<dyn RecordSource>))
        .with_worksheet("Season")
        .with_worksheet("Archive");

    let v_payload = workbook.export().unwrap();
    for sheet_name in ["Season", "Archive"] {
        let range = read_sheet(&v_payload, sheet_name);
        assert_eq!(
            range.get_value((2, 0)),
            Some(&Data::String("Grace".to_string()))
        );
    }
}

#[test]
fn test_explicit_source_wins_over_factory() {
    let l_records = players();
    let mut workbook = TableWorkbook::new(player_table())
        .with_source(&l_records)
        .with_source_factory(|| Ok(Box::new(Vec::<Player>::new()) as Box<dyn RecordSource>));

    workbook.export().unwrap();
    assert_eq!(workbook.report().unwrap().n_records, 3);
}

// ===== Configuration Tests =====

#[test]
fn test_table_spec_loads_from_json() {
    let table = SpecTable::from_json_str(
        r##"{
            "fields": [
                {"header": "Name", "lookup": "name", "fmt_header": {"bold": false}},
                {"header": "Score", "lookup": "get_score", "fmt_data": {"num_format": "0"}}
            ],
            "offset": [1, 0],
            "fmt_stripe": {"bg_color": "#EEEEEE"}
        }"##,
    )
    .unwrap();

    assert_eq!(table.offset, (1, 0));
    assert!(table.if_striped);
    assert_eq!(table.fmt_header_default.bg_color.as_deref(), Some("#BDD7EE"));

    let plan = plan_table_sheet(&table, &players()).unwrap();
    assert_eq!(plan.cell(1, 0).unwrap().fmt.bold, Some(true));
    assert_eq!(plan.cell(3, 1).unwrap().fmt.bg_color.as_deref(), Some("#EEEEEE"));
    assert_eq!(plan.cell(3, 1).unwrap().fmt.num_format.as_deref(), Some("0"));
}

#[test]
fn test_json_table_without_fields_is_rejected() {
    assert!(matches!(
        SpecTable::from_json_str(r#"{"fields": []}"#),
        Err(ModelbookError::InvalidSpec(_))
    ));
    assert!(matches!(
        SpecTable::from_json_str("not json"),
        Err(ModelbookError::Json(_))
    ));
}

#[test]
fn test_json_table_with_unknown_style_key_is_rejected() {
    let err = SpecTable::from_json_str(
        r##"{"fields": [{"header": "Name", "lookup": "name", "fmt_data": {"bgcolor": "#FFF"}}]}"##,
    )
    .unwrap_err();
    assert!(matches!(err, ModelbookError::Json(_)));

    let err = SpecTable::from_json_str(
        r#"{"fields": [{"header": "Name", "lookup": "name"}], "fmt_stripe": {"underline": 1}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ModelbookError::Json(_)));
}

#[test]
fn test_json_offset_past_usize_range_is_too_large() {
    let table = SpecTable::from_json_str(
        r#"{"fields": [{"header": "Name", "lookup": "name"}], "offset": [18446744073709551615, 0]}"#,
    )
    .unwrap();
    assert!(matches!(
        plan_table_sheet(&table, &players()),
        Err(ModelbookError::TableTooLarge { .. })
    ));
}

#[test]
fn test_save_writes_payload_to_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("players.xlsx");
    let l_records = players();

    TableWorkbook::new(player_table())
        .with_source(&l_records)
        .with_sheet_options(SpecXlsxSheetOptions {
            hide_gridlines: true,
            landscape: true,
            fit_to_one_page_wide: true,
        })
        .save(&path)
        .unwrap();

    let v_payload = std::fs::read(&path).unwrap();
    let range = read_sheet(&v_payload, "Sheet1");
    assert_eq!(range.get_value((3, 1)), Some(&Data::Float(60.0)));
}
