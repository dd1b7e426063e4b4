//! A small in-memory table of string cells.
//!
//! Both assets move data through [`Table`]: the NaPTAN CSV is parsed into
//! one, and Hacker News items (JSON objects) are flattened into one before
//! being written out as CSV. Cells are kept as the strings they arrived as;
//! the transforms parse what they need.

use crate::error::{IngestError, Result};
use itertools::Itertools;
use serde_json::{Map, Value};
use std::io;

/// Ordered columns plus rows whose length always equals the column count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view over one row, addressable by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell for `column`, or `None` when the table has no such column.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.cells[i].as_str())
    }
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, rejecting it if its width differs from the header.
    pub fn push_row(&mut self, cells: Vec<String>) -> Result<()> {
        if cells.len() != self.columns.len() {
            return Err(IngestError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                found: cells.len(),
            });
        }
        self.rows.push(cells);
        Ok(())
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// Rewrite every column name in place, keeping column order.
    pub fn rename_columns(&mut self, mut f: impl FnMut(&str) -> String) {
        for column in &mut self.columns {
            *column = f(column);
        }
    }

    /// Append a column.
    ///
    /// # Arguments
    ///
    /// * `name` - Header of the new column
    /// * `values` - Exactly one cell per row, in row order
    ///
    /// # Returns
    ///
    /// [`IngestError::RaggedRow`] if `values` does not match the row count;
    /// the table is left unchanged in that case.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(IngestError::RaggedRow {
                row: values.len().min(self.rows.len()),
                expected: self.rows.len(),
                found: values.len(),
            });
        }
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Parse CSV with a header row.
    ///
    /// # Arguments
    ///
    /// * `reader` - CSV source; the first record is the header
    ///
    /// # Returns
    ///
    /// A table with the header as columns, or [`IngestError::Csv`] for a
    /// malformed file (including rows of the wrong width).
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let columns = reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut table = Table::new(columns);

        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(str::to_string).collect())?;
        }
        Ok(table)
    }

    /// Flatten JSON objects into a table.
    ///
    /// Columns are the union of all keys in order of first appearance. A key
    /// missing from an object leaves an empty cell. Strings are written
    /// verbatim, `null` as empty, and numbers, booleans, arrays and objects as
    /// compact JSON.
    ///
    /// # Arguments
    ///
    /// * `items` - Objects to flatten, one row each
    ///
    /// # Returns
    ///
    /// The table; empty with no columns when `items` is empty.
    pub fn from_json_objects(items: &[Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for item in items {
            for key in item.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|c| item.get(c).map(render_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Write the table as CSV.
    ///
    /// With `index` set, a leading unnamed column holds the zero-based row
    /// number, the layout dataframe exports use by default.
    ///
    /// # Arguments
    ///
    /// * `writer` - Destination for the CSV bytes
    /// * `index` - Whether to prepend the unnamed row-number column
    ///
    /// # Returns
    ///
    /// `Ok(())` once every row is written and the writer flushed.
    ///
    /// # Errors
    ///
    /// [`IngestError::Csv`] if the underlying writer fails.
    pub fn write_csv<W: io::Write>(&self, writer: W, index: bool) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        if index {
            wtr.write_record(std::iter::once("").chain(self.columns.iter().map(String::as_str)))?;
            for (i, row) in self.rows.iter().enumerate() {
                let position = i.to_string();
                wtr.write_record(
                    std::iter::once(position.as_str()).chain(row.iter().map(String::as_str)),
                )?;
            }
        } else {
            wtr.write_record(&self.columns)?;
            for row in &self.rows {
                wtr.write_record(row)?;
            }
        }

        wtr.flush().map_err(|e| IngestError::Csv(e.into()))?;
        Ok(())
    }

    /// Render selected columns as a Markdown table with a row-number column.
    ///
    /// Requested columns the table does not have are rendered empty.
    pub fn to_markdown(&self, columns: &[&str]) -> String {
        let positions = columns
            .iter()
            .map(|c| self.columns.iter().position(|own| own == c))
            .collect::<Vec<_>>();

        let mut md = String::new();
        md.push_str(&format!("|    | {} |\n", columns.iter().join(" | ")));
        md.push_str(&format!(
            "|---:|{}|\n",
            columns.iter().map(|_| ":---").join("|")
        ));
        for (i, row) in self.rows.iter().enumerate() {
            let cells = positions
                .iter()
                .map(|p| p.map(|p| escape_markdown_cell(&row[p])).unwrap_or_default())
                .join(" | ");
            md.push_str(&format!("| {i} | {cells} |\n"));
        }
        md
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_markdown_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}
