//! REALTY - Property Recommendation and Radius Search
//!
//! Serves two read-only queries over precomputed tables: every property
//! within a radius of a location, and the properties most similar to a
//! given one under a weighted blend of three similarity matrices.

pub mod cache;
pub mod data;
pub mod error;
pub mod metrics;
pub mod query;
pub mod server;

pub use cache::{CacheCleaner, ResponseCache};
pub use data::{DataContext, ItemIndex, LocationDistanceTable, SimilarityMatrix};
pub use error::{Error, LoadError, Result};
pub use metrics::Metrics;
pub use query::{Precision, RadiusSearch, Recommendation, SearchHit, SimilarityRecommender};
pub use server::{Config, Server};
