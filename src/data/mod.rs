//! Backing Data
//!
//! Distance table, similarity matrices, and the context that bundles them.

mod context;
mod matrix;
mod table;

pub use context::{DataContext, DISTANCE_FILE, SIMILARITY_FILES, SIMILARITY_WEIGHTS};
pub use matrix::{ItemIndex, SimilarityMatrix};
pub use table::{LocationDistanceTable, TableFile};
