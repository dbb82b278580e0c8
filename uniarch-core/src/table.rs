//! Decoded table and column model.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ArchError;

// =============================================================================
// Columns
// =============================================================================

/// Name and unit for one column, as supplied by an archive definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(default)]
    pub unit: String,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }
}

/// Positional metadata for one measurement field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Position within a decoded row (0-based)
    pub index: usize,
    pub name: String,
    pub unit: String,
}

impl Column {
    /// Column with the default `Value{n}` name and no unit
    pub fn with_default_name(index: usize) -> Self {
        Self {
            index,
            name: format!("Value{}", index + 1),
            unit: String::new(),
        }
    }

    /// `name`, or `name [unit]` when a unit is set
    pub fn display_name(&self) -> String {
        display_name(&self.name, &self.unit)
    }
}

/// Label for a column: the bare name when `unit` is blank.
pub fn display_name(name: &str, unit: &str) -> String {
    if unit.trim().is_empty() {
        name.to_string()
    } else {
        format!("{} [{}]", name, unit)
    }
}

/// Build one column per measurement field.
///
/// Definitions are applied by position up to the shorter of the two lengths;
/// positions without a definition keep their default name.
pub fn build_columns(count: usize, definitions: Option<&[ColumnDefinition]>) -> Vec<Column> {
    let definitions = definitions.unwrap_or_default();

    (0..count)
        .map(|index| match definitions.get(index) {
            Some(def) => Column {
                index,
                name: def.name.clone(),
                unit: def.unit.clone(),
            },
            None => Column::with_default_name(index),
        })
        .collect()
}

// =============================================================================
// Table
// =============================================================================

/// Timestamped rows decoded from one archive.
///
/// Every row has exactly one value per column and one timestamp. A table
/// cannot be modified once built.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<Column>,
    rows: Vec<Vec<f32>>,
}

impl Table {
    /// Assemble a table, checking that rows, timestamps and columns agree.
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        columns: Vec<Column>,
        rows: Vec<Vec<f32>>,
    ) -> Result<Self, ArchError> {
        if rows.len() != timestamps.len() {
            return Err(ArchError::InvalidInput(format!(
                "{} rows but {} timestamps",
                rows.len(),
                timestamps.len()
            )));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ArchError::InvalidInput(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self {
            timestamps,
            columns,
            rows,
        })
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// `(timestamp, value)` points for one column, in row order.
    ///
    /// Returns `None` for an out-of-range column.
    pub fn series(
        &self,
        column: usize,
    ) -> Option<impl Iterator<Item = (NaiveDateTime, f32)> + '_> {
        if column >= self.columns.len() {
            return None;
        }
        Some(
            self.timestamps
                .iter()
                .zip(&self.rows)
                .map(move |(ts, row)| (*ts, row[column])),
        )
    }

    /// Bitwise equality, so tables holding NaN compare equal to themselves.
    pub fn bit_eq(&self, other: &Table) -> bool {
        self.timestamps == other.timestamps
            && self.columns == other.columns
            && self.rows.len() == other.rows.len()
            && self.rows.iter().zip(&other.rows).all(|(a, b)| {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            })
    }
}
