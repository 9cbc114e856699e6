//! Similarity Matrices
//!
//! Square score matrices aligned with an ordered item index.

use hashbrown::HashMap;

use crate::error::LoadError;

/// Ordered item names with name -> offset lookup
#[derive(Debug, Clone)]
pub struct ItemIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ItemIndex {
    pub fn new(names: Vec<String>) -> Result<Self, LoadError> {
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if positions.insert(name.clone(), i).is_some() {
                return Err(LoadError::DuplicateLabel {
                    kind: "item",
                    label: name.clone(),
                });
            }
        }
        Ok(Self { names, positions })
    }

    /// Offset of an item, if known
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    #[inline]
    pub fn name(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Dense square matrix stored row-major. Absent cells are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build from nested rows; `None` cells become NaN
    pub fn from_rows(name: &str, rows: Vec<Vec<Option<f64>>>) -> Result<Self, LoadError> {
        let dim = rows.len();
        let mut values = Vec::with_capacity(dim * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(LoadError::shape(
                    format!("{} row {}", name, i),
                    dim,
                    row.len(),
                ));
            }
            values.extend(row.into_iter().map(|v| v.unwrap_or(f64::NAN)));
        }
        Ok(Self { dim, values })
    }

    /// Weighted elementwise sum of same-sized matrices
    pub fn weighted_sum(terms: &[(f64, &SimilarityMatrix)]) -> Result<Self, LoadError> {
        let dim = terms.first().map(|(_, m)| m.dim).unwrap_or(0);
        let mut values = vec![0.0; dim * dim];

        for (i, (weight, matrix)) in terms.iter().enumerate() {
            if matrix.dim != dim {
                return Err(LoadError::shape(
                    format!("similarity term {}", i),
                    format!("{0}x{0}", dim),
                    format!("{0}x{0}", matrix.dim),
                ));
            }
            for (acc, v) in values.iter_mut().zip(&matrix.values) {
                *acc += weight * v;
            }
        }

        Ok(Self { dim, values })
    }

    /// Number of rows (and columns)
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Borrow one row of scores
    #[inline]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i < self.dim {
            Some(&self.values[i * self.dim..(i + 1) * self.dim])
        } else {
            None
        }
    }
}
