//! Similarity Recommender
//!
//! Top-N most similar items under the combined similarity matrix.

use serde::Serialize;

use crate::data::DataContext;
use crate::error::{Error, Result};

/// Default number of recommendations
pub const DEFAULT_TOP_N: usize = 5;

/// One recommended item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "PropertyName")]
    pub name: String,
    #[serde(rename = "SimilarityScore")]
    pub score: f64,
}

/// Recommender over the precombined similarity matrix
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRecommender<'a> {
    data: &'a DataContext,
}

impl<'a> SimilarityRecommender<'a> {
    pub fn new(data: &'a DataContext) -> Self {
        Self { data }
    }

    /// Recommendations for `item`, or `NotFound` if it is not indexed.
    ///
    /// Scores are sorted descending (stable, so ties keep index order).
    /// The first ranked entry is dropped, which is the item itself unless
    /// another item ties with it and sorts earlier. Non-finite scores
    /// count as 0.
    pub fn lookup(&self, item: &str, top_n: usize) -> Result<Vec<Recommendation>> {
        let items = self.data.items();
        let row = items
            .position(item)
            .and_then(|i| self.data.combined().row(i))
            .ok_or_else(|| Error::not_found(format!("item '{}'", item)))?;

        let mut scored: Vec<(usize, f64)> = row
            .iter()
            .map(|&s| if s.is_finite() { s } else { 0.0 })
            .enumerate()
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .skip(1)
            .take(top_n)
            .filter_map(|(i, score)| {
                items.name(i).map(|name| Recommendation {
                    name: name.to_string(),
                    score,
                })
            })
            .collect())
    }

    /// Like [`lookup`](Self::lookup), but an unknown item yields no
    /// recommendations instead of an error.
    pub fn recommend(&self, item: &str, top_n: usize) -> Vec<Recommendation> {
        self.lookup(item, top_n).unwrap_or_default()
    }
}
