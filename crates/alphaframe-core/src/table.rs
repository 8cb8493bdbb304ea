//! Typed, column-named tables produced by response normalization.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::io;

use rust_decimal::Decimal;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use crate::AlphaError;

pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
pub(crate) const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// One cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Date(Date),
    Timestamp(PrimitiveDateTime),
}

impl Value {
    const fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Integer(_) | Self::Float(_) | Self::Decimal(_) => 1,
            Self::Date(_) | Self::Timestamp(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order used for sorting: nulls first, then numbers, dates, text.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Decimal(a), Self::Decimal(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Integer(a), Self::Decimal(b)) => Decimal::from(*a).cmp(b),
            (Self::Decimal(a), Self::Integer(b)) => a.cmp(&Decimal::from(*b)),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Date(a), Self::Timestamp(b)) => a.midnight().cmp(b),
            (Self::Timestamp(a), Self::Date(b)) => a.cmp(&b.midnight()),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (a, b) if a.rank() != b.rank() => a.rank().cmp(&b.rank()),
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Date(value) => {
                f.write_str(&value.format(DATE_FORMAT).map_err(|_| std::fmt::Error)?)
            }
            Self::Timestamp(value) => {
                f.write_str(&value.format(TIMESTAMP_FORMAT).map_err(|_| std::fmt::Error)?)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            // Decimals stay strings so no precision is lost in JSON.
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

/// Ordered columns with row-major cells. Every row has one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, AlphaError> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), AlphaError> {
        if row.len() != self.columns.len() {
            return Err(AlphaError::parse(format!(
                "row {} has {} cells, expected {}",
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of cells, header excluded.
    pub fn cell_count(&self) -> usize {
        self.rows.len() * self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|cells| &cells[index])
    }

    /// Renames every column through `rename`.
    pub fn rename_columns<F>(&mut self, mut rename: F)
    where
        F: FnMut(&str) -> String,
    {
        for column in &mut self.columns {
            *column = rename(column);
        }
    }

    /// Inserts a column at `index` holding `value` in every row.
    pub fn insert_column(&mut self, index: usize, name: impl Into<String>, value: Value) {
        let index = index.min(self.columns.len());
        self.columns.insert(index, name.into());
        for row in &mut self.rows {
            row.insert(index, value.clone());
        }
    }

    /// Stacks tables in the given order. Columns are the union in order of
    /// first appearance; cells missing from a table become [`Value::Null`].
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = Table>,
    {
        let tables = tables.into_iter().collect::<Vec<_>>();
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(tables.iter().map(Table::row_count).sum());
        for table in tables {
            let positions = columns
                .iter()
                .map(|column| table.column_index(column))
                .collect::<Vec<_>>();
            for mut row in table.rows {
                let aligned = positions
                    .iter()
                    .map(|position| match position {
                        Some(index) => std::mem::replace(&mut row[*index], Value::Null),
                        None => Value::Null,
                    })
                    .collect();
                rows.push(aligned);
            }
        }

        Self { columns, rows }
    }

    /// Stable sort on one column.
    pub fn sort_by(&mut self, column: &str, descending: bool) -> Result<(), AlphaError> {
        let index = self
            .column_index(column)
            .ok_or_else(|| AlphaError::invalid_argument(format!("unknown column '{column}'")))?;
        self.rows.sort_by(|a, b| {
            let ordering = a[index].sort_cmp(&b[index]);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        Ok(())
    }

    /// Writes the table as CSV with a header row.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), AlphaError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        writer
            .flush()
            .map_err(|e| AlphaError::io(format!("failed to flush csv output: {e}")))?;
        Ok(())
    }
}

/// Serializes as an array of `{column: value}` records.
impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Record {
                columns: &self.columns,
                cells: row,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    columns: &'a [String],
    cells: &'a [Value],
}

impl Serialize for Record<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, cell) in self.columns.iter().zip(self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}
