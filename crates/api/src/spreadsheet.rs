// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reading uploaded spreadsheets into a plain table of text cells.
//!
//! CSV, XLSX and XLS are accepted; for workbooks only the first worksheet is
//! read. Headers are matched case-insensitively with spaces, underscores and
//! hyphens treated alike, so `Emp ID`, `emp_id` and `EMP-ID` are the same
//! column. Column order does not matter and unknown columns are ignored.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use calamine::{Data, Range, Reader, Xls, Xlsx};
use csv::StringRecord;
use num_traits::ToPrimitive;
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;

use crate::error::ApiError;

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Comma-separated text.
    Csv,
    /// Office Open XML workbook.
    Xlsx,
    /// Legacy binary workbook.
    Xls,
}

impl SpreadsheetFormat {
    /// Picks the format from a file name's extension.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidSpreadsheet` for any other extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, ApiError> {
        let extension: String = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            _ => Err(ApiError::InvalidSpreadsheet {
                reason: format!("'{file_name}' is not a .csv, .xlsx or .xls file"),
            }),
        }
    }
}

/// Normalizes a header for matching.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join("_")
        .to_lowercase()
}

/// A data row with its 1-based position among data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// Position among data rows, header excluded.
    pub row_number: usize,
    /// Cell text in file column order.
    pub cells: Vec<String>,
}

/// A spreadsheet as text: one header row plus data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    /// Header cells as written.
    pub headers: Vec<String>,
    /// Non-blank data rows.
    pub rows: Vec<SheetRow>,
}

impl SheetTable {
    fn from_grid(grid: Vec<Vec<String>>) -> Result<Self, ApiError> {
        let mut lines = grid.into_iter();
        let headers: Vec<String> = lines.next().ok_or_else(|| ApiError::InvalidSpreadsheet {
            reason: String::from("The file is empty"),
        })?;
        let rows: Vec<SheetRow> = lines
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(idx, cells)| SheetRow {
                row_number: idx + 1,
                cells,
            })
            .collect();
        Ok(Self { headers, rows })
    }

    /// Parses CSV text.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidSpreadsheet` if the text is not valid CSV.
    pub fn from_csv(text: &str) -> Result<Self, ApiError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

        let mut grid: Vec<Vec<String>> = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record: StringRecord = record.map_err(|e| ApiError::InvalidSpreadsheet {
                reason: format!("CSV line {}: {e}", idx + 1),
            })?;
            grid.push(record.iter().map(str::to_string).collect());
        }
        Self::from_grid(grid)
    }

    /// Reads the first worksheet of an XLSX or XLS workbook.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidSpreadsheet` if the workbook cannot be read
    /// or has no worksheet.
    pub fn from_workbook(bytes: Vec<u8>, format: SpreadsheetFormat) -> Result<Self, ApiError> {
        let cursor: Cursor<Vec<u8>> = Cursor::new(bytes);
        let range: Range<Data> = match format {
            SpreadsheetFormat::Xlsx => {
                first_sheet(Xlsx::new(cursor).map_err(|e| workbook_error(&e))?)?
            }
            SpreadsheetFormat::Xls => {
                first_sheet(Xls::new(cursor).map_err(|e| workbook_error(&e))?)?
            }
            SpreadsheetFormat::Csv => {
                return Err(ApiError::InvalidSpreadsheet {
                    reason: String::from("CSV is not a workbook format"),
                });
            }
        };
        let grid: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Self::from_grid(grid)
    }

    /// Decodes an upload: base64 file content, or CSV text as-is.
    ///
    /// # Arguments
    ///
    /// * `file_name` - Used to pick the format
    /// * `content_base64` - The file bytes, base64 encoded
    /// * `csv_text` - Raw CSV, used when no encoded content is given
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidSpreadsheet` if nothing was uploaded or the
    /// content cannot be decoded.
    pub fn from_upload(
        file_name: &str,
        content_base64: Option<&str>,
        csv_text: Option<&str>,
    ) -> Result<Self, ApiError> {
        let format: SpreadsheetFormat = SpreadsheetFormat::from_file_name(file_name)?;
        debug!(file_name, ?format, "Reading uploaded spreadsheet");

        if let Some(encoded) = content_base64 {
            let bytes: Vec<u8> =
                STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| ApiError::InvalidSpreadsheet {
                        reason: format!("File content is not valid base64: {e}"),
                    })?;
            return match format {
                SpreadsheetFormat::Csv => {
                    let text: String =
                        String::from_utf8(bytes).map_err(|e| ApiError::InvalidSpreadsheet {
                            reason: format!("CSV file is not valid UTF-8: {e}"),
                        })?;
                    Self::from_csv(&text)
                }
                SpreadsheetFormat::Xlsx | SpreadsheetFormat::Xls => {
                    Self::from_workbook(bytes, format)
                }
            };
        }

        match (format, csv_text) {
            (SpreadsheetFormat::Csv, Some(text)) => Self::from_csv(text),
            _ => Err(ApiError::InvalidSpreadsheet {
                reason: String::from("No file content was uploaded"),
            }),
        }
    }

    /// Maps the required and optional columns to their positions.
    ///
    /// `aliases` lists alternative normalized header names for a column.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidSpreadsheet` naming every missing required column.
    pub fn columns(
        &self,
        required: &[&'static str],
        optional: &[&'static str],
        aliases: &[(&str, &'static str)],
    ) -> Result<Columns, ApiError> {
        let mut positions: HashMap<&'static str, usize> = HashMap::new();
        for (idx, header) in self.headers.iter().enumerate() {
            let normalized: String = normalize_header(header);
            let canonical: Option<&'static str> = required
                .iter()
                .chain(optional.iter())
                .copied()
                .find(|name| *name == normalized)
                .or_else(|| {
                    aliases
                        .iter()
                        .find(|(alias, _)| *alias == normalized)
                        .map(|(_, name)| *name)
                });
            if let Some(name) = canonical {
                positions.entry(name).or_insert(idx);
            }
        }

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !positions.contains_key(name))
            .collect();
        if !missing.is_empty() {
            return Err(ApiError::InvalidSpreadsheet {
                reason: format!("Missing required columns: {}", missing.join(", ")),
            });
        }
        Ok(Columns { positions })
    }
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
pub struct Columns {
    positions: HashMap<&'static str, usize>,
}

impl Columns {
    /// Trimmed cell text for a column, or empty if the column or cell is absent.
    #[must_use]
    pub fn get<'a>(&self, row: &'a SheetRow, name: &str) -> &'a str {
        self.positions
            .get(name)
            .and_then(|&idx| row.cells.get(idx))
            .map_or("", |cell| cell.trim())
    }
}

fn workbook_error(err: &impl std::fmt::Display) -> ApiError {
    ApiError::InvalidSpreadsheet {
        reason: format!("Cannot read workbook: {err}"),
    }
}

fn first_sheet<R>(mut workbook: R) -> Result<Range<Data>, ApiError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ApiError::InvalidSpreadsheet {
            reason: String::from("The workbook has no worksheets"),
        })?
        .map_err(|e| workbook_error(&e))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => {
            // Employee IDs typed as numbers come back as 1042.0
            if value.fract().abs() < f64::EPSILON {
                value
                    .to_i64()
                    .map_or_else(|| value.to_string(), |whole| whole.to_string())
            } else {
                value.to_string()
            }
        }
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => value
            .as_datetime()
            .map(|dt| dt.date().to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(text) => text.chars().take(10).collect(),
        Data::DurationIso(text) => text.clone(),
    }
}
