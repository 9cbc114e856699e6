//! Location Distance Table
//!
//! Distances in meters between each item (row) and each location (column).

use hashbrown::HashMap;
use serde::Deserialize;

use crate::error::LoadError;

/// On-disk form of the table: row-major distances, `null` for absent cells
#[derive(Debug, Clone, Deserialize)]
pub struct TableFile {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub distances: Vec<Vec<Option<f64>>>,
}

/// Immutable distance table with column lookup by location name
#[derive(Debug, Clone)]
pub struct LocationDistanceTable {
    rows: Vec<String>,
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    /// Column-major storage: `by_column[c][r]`
    by_column: Vec<Vec<Option<f64>>>,
}

impl LocationDistanceTable {
    /// Build a table from row-major distances, validating shape and values
    pub fn new(
        rows: Vec<String>,
        columns: Vec<String>,
        distances: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, LoadError> {
        check_unique("row", &rows)?;
        let column_index = check_unique("column", &columns)?;

        if distances.len() != rows.len() {
            return Err(LoadError::shape(
                "location_distance rows",
                rows.len(),
                distances.len(),
            ));
        }

        let mut by_column = vec![Vec::with_capacity(rows.len()); columns.len()];
        for (r, row) in distances.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(LoadError::shape(
                    format!("location_distance row '{}'", rows[r]),
                    columns.len(),
                    row.len(),
                ));
            }
            for (c, cell) in row.into_iter().enumerate() {
                if let Some(value) = cell {
                    if value < 0.0 {
                        return Err(LoadError::NegativeDistance {
                            row: rows[r].clone(),
                            column: columns[c].clone(),
                            value,
                        });
                    }
                }
                by_column[c].push(cell);
            }
        }

        Ok(Self {
            rows,
            columns,
            column_index,
            by_column,
        })
    }

    pub fn from_file(file: TableFile) -> Result<Self, LoadError> {
        Self::new(file.rows, file.columns, file.distances)
    }

    /// Row labels in table order
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Column labels in table order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index.contains_key(name)
    }

    /// Iterate `(row label, distance)` for one column, in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = (&str, Option<f64>)> + '_> {
        let c = *self.column_index.get(name)?;
        Some(
            self.rows
                .iter()
                .map(String::as_str)
                .zip(self.by_column[c].iter().copied()),
        )
    }

    /// Location names sorted alphabetically
    pub fn sorted_columns(&self) -> Vec<String> {
        let mut out = self.columns.clone();
        out.sort();
        out
    }

    /// Item names sorted alphabetically
    pub fn sorted_rows(&self) -> Vec<String> {
        let mut out = self.rows.clone();
        out.sort();
        out
    }
}

fn check_unique(kind: &'static str, labels: &[String]) -> Result<HashMap<String, usize>, LoadError> {
    let mut index = HashMap::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), i).is_some() {
            return Err(LoadError::DuplicateLabel {
                kind,
                label: label.clone(),
            });
        }
    }
    Ok(index)
}
