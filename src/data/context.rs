//! Data Context
//!
//! The immutable bundle of tables every query reads from. Loaded once at
//! startup from a data directory and shared behind an `Arc`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use super::matrix::{ItemIndex, SimilarityMatrix};
use super::table::{LocationDistanceTable, TableFile};
use crate::error::LoadError;

/// Location distance table file name inside the data directory
pub const DISTANCE_FILE: &str = "location_distance.json";

/// Similarity matrix file names, in weight order
pub const SIMILARITY_FILES: [&str; 3] = ["cosine_sim1.json", "cosine_sim2.json", "cosine_sim3.json"];

/// Fixed weights applied to the three similarity matrices
pub const SIMILARITY_WEIGHTS: [f64; 3] = [0.5, 0.8, 1.0];

/// Loaded, validated backing data
#[derive(Debug)]
pub struct DataContext {
    table: LocationDistanceTable,
    items: ItemIndex,
    combined: SimilarityMatrix,
    loaded_at: DateTime<Utc>,
}

impl DataContext {
    /// Assemble a context from an already-parsed table and the three
    /// similarity matrices. The item index is the table's row order.
    pub fn new(
        table: LocationDistanceTable,
        matrices: [SimilarityMatrix; 3],
    ) -> Result<Self, LoadError> {
        let items = ItemIndex::new(table.rows().to_vec())?;

        for (file, matrix) in SIMILARITY_FILES.iter().zip(&matrices) {
            if matrix.dim() != items.len() {
                return Err(LoadError::shape(
                    *file,
                    format!("{0}x{0}", items.len()),
                    format!("{0}x{0}", matrix.dim()),
                ));
            }
        }

        let terms: Vec<(f64, &SimilarityMatrix)> =
            SIMILARITY_WEIGHTS.iter().copied().zip(matrices.iter()).collect();
        let combined = SimilarityMatrix::weighted_sum(&terms)?;

        Ok(Self {
            table,
            items,
            combined,
            loaded_at: Utc::now(),
        })
    }

    /// Load every backing file from `dir`
    pub fn load(dir: &Path) -> Result<Self, LoadError> {
        info!("Loading data from {}", dir.display());

        let table_file: TableFile = read_json(&dir.join(DISTANCE_FILE))?;
        let table = LocationDistanceTable::from_file(table_file)?;

        let mut matrices = Vec::with_capacity(SIMILARITY_FILES.len());
        for file in SIMILARITY_FILES {
            let rows: Vec<Vec<Option<f64>>> = read_json(&dir.join(file))?;
            matrices.push(SimilarityMatrix::from_rows(file, rows)?);
        }
        let matrices: [SimilarityMatrix; 3] = matrices
            .try_into()
            .map_err(|m: Vec<_>| LoadError::shape("similarity matrices", 3, m.len()))?;

        let ctx = Self::new(table, matrices)?;
        info!(
            rows = ctx.table.rows().len(),
            columns = ctx.table.columns().len(),
            items = ctx.items.len(),
            "Data loaded"
        );
        Ok(ctx)
    }

    pub fn table(&self) -> &LocationDistanceTable {
        &self.table
    }

    pub fn items(&self) -> &ItemIndex {
        &self.items
    }

    /// Weighted sum of the three similarity matrices
    pub fn combined(&self) -> &SimilarityMatrix {
        &self.combined
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
