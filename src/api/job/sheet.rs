use std::fmt;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use tracing::{debug, warn};

use super::models::SheetRow;

const ASIN_COLUMN: u32 = 0;
const MAP_COLUMN: u32 = 1;
const EMAILS_COLUMN: u32 = 2;

/// Outcome of reading one upload. Row errors are collected per call so that
/// the caller decides whether the batch is usable.
#[derive(Debug, Default)]
pub struct SheetParse {
    pub rows: Vec<SheetRow>,
    pub errors: Vec<RowParseError>,
}

impl SheetParse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A cell that could not be converted to its column's type
#[derive(Debug, Clone, PartialEq)]
pub struct RowParseError {
    /// 1-based row number as shown by spreadsheet applications
    pub row: u32,
    pub column: &'static str,
    pub reason: String,
}

impl fmt::Display for RowParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column {}: {}", self.row, self.column, self.reason)
    }
}

/// The upload is not a readable workbook
#[derive(Debug)]
pub struct WorkbookError(pub String);

impl fmt::Display for WorkbookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unreadable workbook: {}", self.0)
    }
}

impl std::error::Error for WorkbookError {}

/// Read the first worksheet of an `.xlsx` upload.
///
/// Row 1 is a header. Columns are A = ASIN, B = MAP, C = notification
/// emails. Fully empty rows are skipped.
pub fn parse_sheet(bytes: &[u8]) -> Result<SheetParse, WorkbookError> {
    let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes))
        .map_err(|e| WorkbookError(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| WorkbookError("workbook has no worksheets".to_string()))?
        .map_err(|e| WorkbookError(e.to_string()))?;

    let mut parse = SheetParse::default();

    let Some((end_row, _)) = range.end() else {
        debug!("Uploaded sheet is empty");
        return Ok(parse);
    };

    for row in 1..=end_row {
        let cell = |column: u32| range.get_value((row, column)).unwrap_or(&Data::Empty);
        let (asin, map, emails) = (cell(ASIN_COLUMN), cell(MAP_COLUMN), cell(EMAILS_COLUMN));

        if is_blank(asin) && is_blank(map) && is_blank(emails) {
            continue;
        }

        let mut row_errors = Vec::new();
        let mut record = |column: &'static str, reason: String| {
            row_errors.push(RowParseError {
                row: row + 1,
                column,
                reason,
            })
        };

        let asin = read_asin(asin).unwrap_or_else(|reason| {
            record("asin", reason);
            None
        });
        let map = read_map(map).unwrap_or_else(|reason| {
            record("map", reason);
            None
        });
        let target_emails = read_text(emails).unwrap_or_else(|reason| {
            record("target emails", reason);
            None
        });

        if row_errors.is_empty() {
            parse.rows.push(SheetRow {
                asin,
                map,
                target_emails,
            });
        } else {
            for err in &row_errors {
                warn!("Exception in parsing excel data: [{}]", err);
            }
            parse.errors.extend(row_errors);
        }
    }

    debug!(
        "Parsed sheet: {} rows, {} cell errors",
        parse.rows.len(),
        parse.errors.len()
    );
    Ok(parse)
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Text, or a whole number written without decimals
fn read_asin(cell: &Data) -> Result<Option<String>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::String(s) => Ok(Some(s.clone())),
        Data::Int(i) => Ok(Some(i.to_string())),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(Some(format!("{}", *f as i64))),
        other => Err(format!("expected text, found {:?}", other)),
    }
}

fn read_map(cell: &Data) -> Result<Option<f64>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s
            .trim()
            .trim_start_matches('$')
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("'{}' is not a number", s)),
        other => Err(format!("expected a number, found {:?}", other)),
    }
}

fn read_text(cell: &Data) -> Result<Option<String>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::String(s) => Ok(Some(s.clone())),
        other => Err(format!("expected text, found {:?}", other)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// Cell content for building fixture workbooks
    pub enum Cell<'a> {
        Text(&'a str),
        Number(f64),
        Bool(bool),
        Blank,
    }

    /// Build an `.xlsx` with a header row followed by `rows`
    pub fn workbook(rows: &[[Cell<'_>; 3]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "ASIN").unwrap();
        sheet.write_string(0, 1, "MAP").unwrap();
        sheet.write_string(0, 2, "Target Emails").unwrap();

        for (r, row) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (c, cell) in row.iter().enumerate() {
                let c = c as u16;
                match cell {
                    Cell::Text(s) => {
                        sheet.write_string(r, c, *s).unwrap();
                    }
                    Cell::Number(n) => {
                        sheet.write_number(r, c, *n).unwrap();
                    }
                    Cell::Bool(b) => {
                        sheet.write_boolean(r, c, *b).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_rows_after_header() {
        let bytes = workbook(&[
            [Cell::Text("B000000001"), Cell::Number(19.99), Cell::Text("a@x.com,b@x.com")],
            [Cell::Text("B000000002"), Cell::Blank, Cell::Blank],
        ]);

        let parse = parse_sheet(&bytes).unwrap();
        assert!(!parse.has_errors());
        assert_eq!(
            parse.rows,
            vec![
                SheetRow {
                    asin: Some("B000000001".to_string()),
                    map: Some(19.99),
                    target_emails: Some("a@x.com,b@x.com".to_string()),
                },
                SheetRow {
                    asin: Some("B000000002".to_string()),
                    map: None,
                    target_emails: None,
                },
            ]
        );
    }

    #[test]
    fn skips_fully_empty_rows() {
        let bytes = workbook(&[
            [Cell::Text("B000000001"), Cell::Blank, Cell::Blank],
            [Cell::Blank, Cell::Blank, Cell::Blank],
            [Cell::Text("B000000003"), Cell::Text("$12.50"), Cell::Blank],
        ]);

        let parse = parse_sheet(&bytes).unwrap();
        assert_eq!(parse.rows.len(), 2);
        assert_eq!(parse.rows[1].map, Some(12.5));
    }

    #[test]
    fn numeric_asin_is_rendered_without_decimals() {
        let bytes = workbook(&[[Cell::Number(1234567890.0), Cell::Blank, Cell::Blank]]);

        let parse = parse_sheet(&bytes).unwrap();
        assert_eq!(parse.rows[0].asin.as_deref(), Some("1234567890"));
    }

    #[test]
    fn bad_cells_are_reported_per_call() {
        let bytes = workbook(&[
            [Cell::Text("B000000001"), Cell::Text("cheap"), Cell::Blank],
            [Cell::Text("B000000002"), Cell::Number(5.0), Cell::Bool(true)],
            [Cell::Text("B000000003"), Cell::Number(5.0), Cell::Blank],
        ]);

        let parse = parse_sheet(&bytes).unwrap();
        assert!(parse.has_errors());
        assert_eq!(parse.errors.len(), 2);
        assert_eq!(parse.errors[0].row, 2);
        assert_eq!(parse.errors[0].column, "map");
        assert_eq!(parse.errors[1].row, 3);
        assert_eq!(parse.errors[1].column, "target emails");
        assert_eq!(parse.rows.len(), 1);

        // A second, clean upload starts from a clean slate
        let clean = workbook(&[[Cell::Text("B000000004"), Cell::Blank, Cell::Blank]]);
        assert!(!parse_sheet(&clean).unwrap().has_errors());
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let parse = parse_sheet(&workbook(&[])).unwrap();
        assert!(parse.rows.is_empty());
        assert!(!parse.has_errors());
    }

    #[test]
    fn non_workbook_bytes_are_rejected() {
        assert!(parse_sheet(b"ASIN,MAP\nB000000001,1").is_err());
    }
}
