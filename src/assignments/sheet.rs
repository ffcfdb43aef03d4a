//! Whole-table reads and rewrites of the first worksheet of an `.xlsx` file.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::{AppError, Result};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const DURATION_FORMAT: &str = "[h]:mm:ss";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date/time.
    DateTime(f64),
    /// Excel serial duration (fractional days).
    Duration(f64),
}

impl Cell {
    /// Cell content as trimmed text; whole numbers lose their `.0`.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) | Cell::DateTime(n) | Cell::Duration(n)
                if n.fract() == 0.0 && n.abs() < 1e15 =>
            {
                format!("{}", *n as i64)
            }
            Cell::Number(n) | Cell::DateTime(n) | Cell::Duration(n) => n.to_string(),
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
        }
    }

    /// Boolean `true`, the number `1`, or text reading `TRUE` in any case.
    pub fn is_truthy(&self) -> bool {
        match self {
            Cell::Bool(b) => *b,
            Cell::Number(n) => *n == 1.0,
            Cell::Text(s) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => Cell::Duration(dt.as_f64()),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// A header row plus data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// Zero-based (row, column) of the header row's first cell.
    pub origin: (u32, u32),
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn load(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| AppError::Spreadsheet(format!("{} has no worksheets", path.display())))?;
        let range = workbook.worksheet_range(&name)?;
        let origin = range.start().unwrap_or((0, 0));

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| row.iter().map(|c| Cell::from(c).text()).collect())
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();

        Ok(Self {
            name,
            origin,
            headers,
            rows,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let date = Format::new().set_num_format(DATE_FORMAT);
        let datetime = Format::new().set_num_format(DATETIME_FORMAT);
        let duration = Format::new().set_num_format(DURATION_FORMAT);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.name)?;

        let (top, left) = self.origin;
        let column = |c: usize| (left as usize + c) as u16;

        for (c, header) in self.headers.iter().enumerate() {
            worksheet.write_string(top, column(c), header)?;
        }

        for (r, row) in self.rows.iter().enumerate() {
            let xl_row = top + 1 + r as u32;
            for (c, cell) in row.iter().enumerate() {
                let xl_col = column(c);
                match cell {
                    Cell::Empty => {}
                    Cell::Text(s) => {
                        worksheet.write_string(xl_row, xl_col, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(xl_row, xl_col, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(xl_row, xl_col, *b)?;
                    }
                    Cell::DateTime(n) => {
                        let format = if n.fract() == 0.0 { &date } else { &datetime };
                        worksheet.write_number_with_format(xl_row, xl_col, *n, format)?;
                    }
                    Cell::Duration(n) => {
                        worksheet.write_number_with_format(xl_row, xl_col, *n, &duration)?;
                    }
                }
            }
        }

        workbook.save(path)?;
        Ok(())
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == header)
    }

    /// Index of `header`, appending an empty column when it is missing.
    pub fn ensure_column(&mut self, header: &str) -> usize {
        match self.column(header) {
            Some(idx) => idx,
            None => {
                self.headers.push(header.to_string());
                self.headers.len() - 1
            }
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: Cell) -> bool {
        let Some(cells) = self.rows.get_mut(row) else {
            return false;
        };
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = value;
        true
    }
}
