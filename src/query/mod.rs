//! Query Engines
//!
//! Read-only radius search and similarity recommendation over a
//! [`DataContext`](crate::data::DataContext).

mod radius;
mod recommend;

pub use radius::{Precision, RadiusSearch, SearchHit};
pub use recommend::{Recommendation, SimilarityRecommender, DEFAULT_TOP_N};
