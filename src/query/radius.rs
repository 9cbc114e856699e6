//! Radius Search
//!
//! Every item within a distance threshold of a location, nearest first.

use serde::{Deserialize, Serialize};

use crate::data::DataContext;
use crate::error::{Error, Result};

/// Rounding applied when converting meters to kilometers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Nearest whole kilometer
    Whole,
    /// Two decimal places
    #[default]
    Hundredths,
}

impl Precision {
    pub fn to_km(self, meters: f64) -> f64 {
        let km = meters / 1000.0;
        match self {
            // Halves round to the even neighbour: 2500m is 2 km, 3500m is 4 km
            Precision::Whole => km.round_ties_even(),
            Precision::Hundredths => (km * 100.0).round_ties_even() / 100.0,
        }
    }
}

/// One item inside the search radius
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub distance_km: f64,
    /// Unrounded distance
    #[serde(skip)]
    pub distance_m: f64,
}

/// Radius search over the distance table
#[derive(Debug, Clone, Copy)]
pub struct RadiusSearch<'a> {
    data: &'a DataContext,
}

impl<'a> RadiusSearch<'a> {
    pub fn new(data: &'a DataContext) -> Self {
        Self { data }
    }

    /// Items strictly closer than `radius_km` to `location`, ascending by
    /// distance. Ties keep table row order. The zero-distance self entry
    /// is included.
    pub fn search(&self, location: &str, radius_km: f64, precision: Precision) -> Result<Vec<SearchHit>> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(Error::invalid(format!(
                "radius must be a finite non-negative number, got {}",
                radius_km
            )));
        }

        let column = self
            .data
            .table()
            .column(location)
            .ok_or_else(|| Error::not_found(format!("location '{}'", location)))?;

        let limit_m = radius_km * 1000.0;
        let mut hits: Vec<SearchHit> = column
            .filter_map(|(name, distance)| match distance {
                Some(d) if d < limit_m => Some(SearchHit {
                    name: name.to_string(),
                    distance_km: precision.to_km(d),
                    distance_m: d,
                }),
                _ => None,
            })
            .collect();

        // Stable: equal distances keep row order
        hits.sort_by(|a, b| {
            a.distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(hits)
    }
}
