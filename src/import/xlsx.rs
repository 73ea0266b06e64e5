//! Minimal reader for the active worksheet of an `.xlsx` workbook.
//!
//! An xlsx file is a zip archive of XML parts. Only the parts needed to turn
//! the active sheet into a grid of strings are read: the workbook, its
//! relationships, the shared string table and the sheet itself.

use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use super::ImportError;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Largest decompressed size accepted for any single part.
pub const MAX_PART_BYTES: u64 = 32 * 1024 * 1024;

/// Cell values of one worksheet keyed by 1-indexed row, then column.
///
/// Only cells that carried a value are stored; anything outside is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl SheetGrid {
    pub fn set(&mut self, row: u32, column: u32, value: String) {
        self.rows.entry(row).or_default().insert(column, value);
    }

    /// Trimmed cell value, or `""` for a missing cell.
    pub fn cell(&self, row: u32, column: u32) -> &str {
        self.rows
            .get(&row)
            .and_then(|cells| cells.get(&column))
            .map(|value| value.trim())
            .unwrap_or("")
    }

    /// Populated row numbers at or after `first_row`, ascending.
    pub fn rows_from(&self, first_row: u32) -> impl Iterator<Item = u32> + '_ {
        self.rows.range(first_row..).map(|(row, _)| *row)
    }
}

/// Read the active worksheet of the workbook in `bytes`.
pub fn read_active_sheet(bytes: &[u8]) -> Result<SheetGrid, ImportError> {
    read_active_sheet_within(bytes, MAX_PART_BYTES)
}

/// [`read_active_sheet`] with every part capped at `max_part_bytes` once inflated.
fn read_active_sheet_within(bytes: &[u8], max_part_bytes: u64) -> Result<SheetGrid, ImportError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut part = |name: &str| read_part(&mut archive, name, max_part_bytes);

    let workbook = part(WORKBOOK_PART)?.ok_or(ImportError::MissingWorkbook)?;
    let (sheets, active_tab) = parse_workbook(&workbook)?;
    let (sheet_index, relationship_id) = sheets
        .get(active_tab)
        .or_else(|| sheets.first())
        .map(|(index, rid)| (*index, rid.clone()))
        .ok_or(ImportError::NoActiveSheet)?;

    let targets = match part(WORKBOOK_RELS_PART)? {
        Some(rels) => parse_relationships(&rels)?,
        None => HashMap::new(),
    };
    let sheet_path = relationship_id
        .and_then(|rid| targets.get(&rid).map(|target| resolve_target(target)))
        .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", sheet_index + 1));
    tracing::debug!("Reading worksheet part {}", sheet_path);

    let shared_strings = match part(SHARED_STRINGS_PART)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let sheet = part(&sheet_path)?
        .ok_or_else(|| ImportError::MissingPart(sheet_path.clone()))?;
    parse_sheet(&sheet, &shared_strings)
}

/// Inflate one part, refusing anything past `limit` bytes. The declared size is
/// checked first, and the read itself stops one byte past the limit.
fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    limit: u64,
) -> Result<Option<String>, ImportError> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if file.size() > limit {
        return Err(ImportError::PartTooLarge(name.to_string()));
    }

    let mut content = Vec::new();
    file.take(limit + 1).read_to_end(&mut content)?;
    if content.len() as u64 > limit {
        return Err(ImportError::PartTooLarge(name.to_string()));
    }
    let content = String::from_utf8(content)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(Some(content))
}

fn attribute(element: &BytesStart<'_>, local_name: &[u8]) -> Result<Option<String>, ImportError> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Sheets as `(position, relationship id)` in workbook order, plus the active tab.
fn parse_workbook(xml: &str) -> Result<(Vec<(usize, Option<String>)>, usize), ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();
    let mut active_tab = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sheet" => {
                    let rid = attribute(&e, b"id")?;
                    sheets.push((sheets.len(), rid));
                }
                b"workbookView" => {
                    if let Some(tab) = attribute(&e, b"activeTab")? {
                        active_tab = tab.parse().unwrap_or(0);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((sheets, active_tab))
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) =
                    (attribute(&e, b"Id")?, attribute(&e, b"Target")?)
                {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

/// Relationship targets are relative to `xl/` unless absolute within the package.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // Phonetic guides (<rPh>) repeat the reading of the text and are skipped.
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"rPh" => phonetic_depth += 1,
                b"t" if phonetic_depth == 0 => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => current.push_str(&t.unescape()?),
            Event::CData(t) if in_text => {
                current.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Cell being assembled while walking a `<c>` element.
#[derive(Default)]
struct PendingCell {
    row: u32,
    column: u32,
    kind: Option<String>,
    value: String,
}

/// Which child of `<c>` is currently open.
#[derive(PartialEq)]
enum CellChild {
    None,
    Value,
    InlineText,
}

fn parse_sheet(xml: &str, shared_strings: &[String]) -> Result<SheetGrid, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut grid = SheetGrid::default();
    let mut row = 0u32;
    let mut column = 0u32;
    let mut cell: Option<PendingCell> = None;
    let mut child = CellChild::None;
    // Same rule as the shared string table: phonetic runs are not cell text.
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = next_row(&e, row)?;
                    column = 0;
                }
                b"c" => {
                    let pending = start_cell(&e, row, column)?;
                    column = pending.column;
                    cell = Some(pending);
                }
                b"v" if cell.is_some() => child = CellChild::Value,
                b"rPh" if cell.is_some() => phonetic_depth += 1,
                b"t" if cell.is_some() && phonetic_depth == 0 => child = CellChild::InlineText,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = next_row(&e, row)?;
                    column = 0;
                }
                b"c" => column = start_cell(&e, row, column)?.column,
                _ => {}
            },
            Event::Text(t) if child != CellChild::None => {
                if let Some(pending) = cell.as_mut() {
                    pending.value.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => child = CellChild::None,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"c" => {
                    phonetic_depth = 0;
                    if let Some(pending) = cell.take() {
                        let value = cell_value(&pending, shared_strings);
                        if !value.is_empty() {
                            grid.set(pending.row, pending.column, value);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(grid)
}

fn next_row(element: &BytesStart<'_>, previous: u32) -> Result<u32, ImportError> {
    Ok(attribute(element, b"r")?
        .and_then(|r| r.parse().ok())
        .unwrap_or(previous + 1))
}

fn start_cell(element: &BytesStart<'_>, row: u32, column: u32) -> Result<PendingCell, ImportError> {
    let (row, column) = match attribute(element, b"r")?.and_then(|r| parse_cell_ref(&r)) {
        Some(position) => position,
        None => (row, column + 1),
    };
    Ok(PendingCell {
        row,
        column,
        kind: attribute(element, b"t")?,
        value: String::new(),
    })
}

fn cell_value(cell: &PendingCell, shared_strings: &[String]) -> String {
    match cell.kind.as_deref() {
        Some("s") => cell
            .value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|index| shared_strings.get(index))
            .cloned()
            .unwrap_or_default(),
        Some("b") => match cell.value.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        },
        Some("inlineStr") | Some("str") | Some("e") | Some("d") => cell.value.clone(),
        _ => format_number(&cell.value),
    }
}

/// Render a numeric cell the way a spreadsheet user would read it: integral values
/// without a fractional part, everything else in shortest float form.
fn format_number(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
            format!("{}", n as i64)
        }
        Ok(n) if n.is_finite() => n.to_string(),
        _ => raw.to_string(),
    }
}

/// Split an A1-style reference into 1-indexed `(row, column)`.
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut column = 0u32;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        column = column.checked_mul(26)?.checked_add(digit)?;
    }

    let row = digits.parse().ok()?;
    Some((row, column))
}
