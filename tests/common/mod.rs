//! Helpers shared by the integration specs.
#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A cell for [`workbook`]: A1 reference plus value.
pub enum Cell<'a> {
    Text(&'a str, &'a str),
    Number(&'a str, f64),
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn row_number(reference: &str) -> u32 {
    reference
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .expect("cell reference must end in a row number")
}

fn sheet_xml(cells: &[Cell<'_>]) -> String {
    let mut rows: std::collections::BTreeMap<u32, String> = Default::default();
    for cell in cells {
        let (reference, xml) = match cell {
            Cell::Text(r, value) => (
                *r,
                format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    r,
                    escape(value)
                ),
            ),
            Cell::Number(r, value) => (*r, format!(r#"<c r="{}"><v>{}</v></c>"#, r, value)),
        };
        rows.entry(row_number(reference)).or_default().push_str(&xml);
    }

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (row, cells) in rows {
        xml.push_str(&format!(r#"<row r="{}">{}</row>"#, row, cells));
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn zip_parts(parts: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file(*name, options).expect("start zip entry");
        writer.write_all(content.as_bytes()).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Scalar" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

/// Single-sheet xlsx workbook holding `cells`.
pub fn workbook(cells: &[Cell<'_>]) -> Vec<u8> {
    zip_parts(&[
        ("xl/workbook.xml", WORKBOOK.to_string()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(cells)),
    ])
}

/// Two-sheet workbook whose second sheet is the active tab.
pub fn workbook_with_active_second_sheet(first: &[Cell<'_>], second: &[Cell<'_>]) -> Vec<u8> {
    let workbook = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<bookViews><workbookView activeTab="1"/></bookViews>
<sheets><sheet name="Cover" sheetId="1" r:id="rId1"/><sheet name="Scalar" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;
    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Target="/xl/worksheets/scalar.xml"/>
</Relationships>"#;
    zip_parts(&[
        ("xl/workbook.xml", workbook.to_string()),
        ("xl/_rels/workbook.xml.rels", rels.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(first)),
        ("xl/worksheets/scalar.xml", sheet_xml(second)),
    ])
}

/// Workbook storing its text in the shared string table, as Excel does.
pub fn workbook_with_shared_strings(strings: &[&str], sheet: &str) -> Vec<u8> {
    let mut sst = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    for s in strings {
        sst.push_str(&format!("<si><t>{}</t></si>", escape(s)));
    }
    sst.push_str("</sst>");

    zip_parts(&[
        ("xl/workbook.xml", WORKBOOK.to_string()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/sharedStrings.xml", sst),
        ("xl/worksheets/sheet1.xml", sheet.to_string()),
    ])
}

/// Zip archive that is not a workbook.
pub fn zip_without_workbook() -> Vec<u8> {
    zip_parts(&[("readme.txt", "hello".to_string())])
}
