//! Request Handlers
//!
//! Routes JSON requests to the query engines.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::response::{json_body, to_body};
use crate::cache::ResponseCache;
use crate::data::DataContext;
use crate::error::{Error, Result};
use crate::metrics::Metrics;
use crate::query::{Precision, RadiusSearch, SimilarityRecommender, DEFAULT_TOP_N};

pub const SEARCH_ROUTE: &str = "/search";
pub const RECOMMEND_ROUTE: &str = "/recommend";

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    data: Arc<DataContext>,
    cache: Option<ResponseCache>,
    metrics: Arc<Metrics>,
    options: Bytes,
    started: Instant,
}

impl AppState {
    pub fn new(data: Arc<DataContext>, cache: Option<ResponseCache>) -> Result<Self> {
        let options = to_body(&OptionsBody {
            locations: data.table().sorted_columns(),
            apartments: data.table().sorted_rows(),
        })?;

        Ok(Self {
            data,
            cache,
            metrics: Arc::new(Metrics::new()),
            options,
            started: Instant::now(),
        })
    }

    pub fn data(&self) -> &Arc<DataContext> {
        &self.data
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Serve `query` from the cache, or run it and cache the encoded result
    fn cached<Q, T, F>(&self, route: &str, query: &Q, run: F) -> Result<Bytes>
    where
        Q: Serialize,
        T: Serialize,
        F: FnOnce(&DataContext) -> Result<T>,
    {
        let key = self
            .cache
            .as_ref()
            .and_then(|_| ResponseCache::key(route, query));

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(body) = cache.get(key) {
                self.metrics.record_cache_hit();
                return Ok(body);
            }
        }

        let body = to_body(&run(self.data.as_ref())?)?;

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            if !cache.set(key, body.clone()) {
                debug!(route = route, "Response cache full, result not cached");
            }
        }
        Ok(body)
    }

    fn finish(&self, route: &str, start: Instant, result: Result<Bytes>) -> Response {
        let elapsed = start.elapsed();
        self.metrics.record_request(route, result.is_ok(), elapsed);

        match result {
            Ok(body) => {
                debug!(route = route, latency = ?elapsed, "Request served");
                json_body(body)
            }
            Err(e) => {
                warn!(route = route, latency = ?elapsed, error = %e, "Request rejected");
                e.into_response()
            }
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(SEARCH_ROUTE, post(search))
        .route(RECOMMEND_ROUTE, post(recommend))
        .route("/options", get(options))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    location: Option<String>,
    radius: Option<Value>,
    #[serde(default)]
    precision: Option<Precision>,
}

/// Validated search arguments, also the cache key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchQuery {
    pub location: String,
    pub radius: f64,
    pub precision: Precision,
}

impl SearchQuery {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let body: SearchBody = parse_body(body)?;
        let location = body
            .location
            .ok_or_else(|| Error::invalid("missing field 'location'"))?;
        let radius = match body.radius {
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| Error::invalid("radius is not representable"))?,
            // Form posts send the radius as text
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::invalid(format!("radius '{}' is not a number", s)))?,
            Some(_) => return Err(Error::invalid("radius must be a number")),
            None => return Err(Error::invalid("missing field 'radius'")),
        };

        Ok(Self {
            location,
            radius,
            precision: body.precision.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RecommendBody {
    apartment: Option<String>,
    top_n: Option<usize>,
}

/// Validated recommendation arguments, also the cache key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendQuery {
    pub apartment: String,
    pub top_n: usize,
}

impl RecommendQuery {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let body: RecommendBody = parse_body(body)?;
        let apartment = body
            .apartment
            .ok_or_else(|| Error::invalid("missing field 'apartment'"))?;

        Ok(Self {
            apartment,
            top_n: body.top_n.unwrap_or(DEFAULT_TOP_N),
        })
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::invalid(format!("malformed request body: {}", e)))
}

/// POST /search
pub async fn search(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();
    let result = SearchQuery::parse(&body).and_then(|q| {
        state.cached(SEARCH_ROUTE, &q, |data| {
            RadiusSearch::new(data).search(&q.location, q.radius, q.precision)
        })
    });
    state.finish(SEARCH_ROUTE, start, result)
}

/// POST /recommend
pub async fn recommend(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();
    let result = RecommendQuery::parse(&body).and_then(|q| {
        state.cached(RECOMMEND_ROUTE, &q, |data| {
            let recs = SimilarityRecommender::new(data).lookup(&q.apartment, q.top_n)?;
            if recs.is_empty() {
                return Err(Error::not_found(format!(
                    "no recommendations for '{}'",
                    q.apartment
                )));
            }
            Ok(recs)
        })
    });
    state.finish(RECOMMEND_ROUTE, start, result)
}

#[derive(Debug, Serialize)]
struct OptionsBody {
    locations: Vec<String>,
    apartments: Vec<String>,
}

/// GET /options
pub async fn options(State(state): State<AppState>) -> Response {
    json_body(state.options.clone())
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub loaded_at: DateTime<Utc>,
    pub items: usize,
    pub locations: usize,
    pub cached_responses: Option<usize>,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started.elapsed().as_secs(),
        loaded_at: state.data.loaded_at(),
        items: state.data.items().len(),
        locations: state.data.table().columns().len(),
        cached_responses: state.cache.as_ref().map(ResponseCache::len),
    })
}

/// GET /stats
pub async fn stats(State(state): State<AppState>) -> Response {
    Json(state.metrics.snapshot()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LocationDistanceTable, SimilarityMatrix};
    use axum::http::StatusCode;
    use std::time::Duration;

    fn state(cache: bool) -> AppState {
        let rows: Vec<String> = ["SectorA", "SectorB", "SectorC"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let columns = rows.clone();
        let distances = vec![
            vec![Some(0.0), Some(2000.0), Some(6000.0)],
            vec![Some(2000.0), Some(0.0), Some(4000.0)],
            vec![Some(6000.0), Some(4000.0), Some(0.0)],
        ];
        let table = LocationDistanceTable::new(rows, columns, distances).unwrap();
        let zeros = SimilarityMatrix::from_rows("zeros", vec![vec![Some(0.0); 3]; 3]).unwrap();
        let sim = SimilarityMatrix::from_rows(
            "sim",
            vec![
                vec![Some(1.0), Some(0.9), Some(0.3)],
                vec![Some(0.9), Some(1.0), Some(0.1)],
                vec![Some(0.3), Some(0.1), Some(1.0)],
            ],
        )
        .unwrap();
        let data = DataContext::new(table, [zeros.clone(), zeros, sim]).unwrap();
        let cache = cache.then(|| ResponseCache::new(Duration::from_secs(60)));
        AppState::new(Arc::new(data), cache).unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_search_ok() {
        let resp = search(
            State(state(false)),
            Bytes::from_static(br#"{"location":"SectorA","radius":5,"precision":"whole"}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!([
                {"name": "SectorA", "distance_km": 0.0},
                {"name": "SectorB", "distance_km": 2.0}
            ])
        );
    }

    #[tokio::test]
    async fn test_search_radius_as_text() {
        let resp = search(
            State(state(false)),
            Bytes::from_static(br#"{"location":"SectorC","radius":"4.5"}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[1]["distance_km"], 4.0);
    }

    #[tokio::test]
    async fn test_search_errors() {
        let st = state(false);
        let cases: [(&'static [u8], StatusCode); 6] = [
            (br#"{"radius":5}"#, StatusCode::BAD_REQUEST),
            (br#"{"location":"SectorA"}"#, StatusCode::BAD_REQUEST),
            (br#"{"location":"SectorA","radius":-1}"#, StatusCode::BAD_REQUEST),
            (br#"{"location":"SectorA","radius":"far"}"#, StatusCode::BAD_REQUEST),
            (b"not json", StatusCode::BAD_REQUEST),
            (br#"{"location":"Mars","radius":5}"#, StatusCode::NOT_FOUND),
        ];
        for (body, expected) in cases {
            let resp = search(State(st.clone()), Bytes::from_static(body)).await;
            assert_eq!(resp.status(), expected);
            assert!(body_json(resp).await["error"].is_string());
        }
        assert_eq!(st.metrics().failed_requests(), 6);
    }

    #[tokio::test]
    async fn test_recommend_ok() {
        let resp = recommend(
            State(state(false)),
            Bytes::from_static(br#"{"apartment":"SectorA","top_n":2}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!([
                {"PropertyName": "SectorB", "SimilarityScore": 0.9},
                {"PropertyName": "SectorC", "SimilarityScore": 0.3}
            ])
        );
    }

    #[tokio::test]
    async fn test_recommend_errors() {
        let st = state(false);

        let resp = recommend(State(st.clone()), Bytes::from_static(b"{}")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = recommend(
            State(st.clone()),
            Bytes::from_static(br#"{"apartment":"Unknown"}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = recommend(
            State(st),
            Bytes::from_static(br#"{"apartment":"SectorA","top_n":0}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cache_hit() {
        let st = state(true);
        let body = br#"{"apartment":"SectorB"}"#;

        let first = body_json(recommend(State(st.clone()), Bytes::from_static(body)).await).await;
        let second = body_json(recommend(State(st.clone()), Bytes::from_static(body)).await).await;

        assert_eq!(first, second);
        assert_eq!(st.metrics().cache_hits(), 1);
        assert_eq!(st.cache().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_not_cached() {
        let st = state(true);
        let body = br#"{"location":"Mars","radius":5}"#;
        search(State(st.clone()), Bytes::from_static(body)).await;
        search(State(st.clone()), Bytes::from_static(body)).await;

        assert_eq!(st.metrics().cache_hits(), 0);
        assert!(st.cache().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cache_bounded_across_radii() {
        let data = state(false).data().clone();
        let cache = ResponseCache::new(Duration::from_secs(60)).with_max_entries(4);
        let st = AppState::new(data, Some(cache)).unwrap();

        for i in 0..50 {
            let body = format!(r#"{{"location":"SectorA","radius":{}}}"#, 3.0 + i as f64 / 100.0);
            let resp = search(State(st.clone()), Bytes::from(body)).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert_eq!(st.cache().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_options_sorted() {
        let body = body_json(options(State(state(false))).await).await;
        assert_eq!(body["locations"], serde_json::json!(["SectorA", "SectorB", "SectorC"]));
        assert_eq!(body["apartments"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_health_and_stats() {
        let st = state(true);
        let Json(report) = health(State(st.clone())).await;
        assert_eq!(report.status, "ok");
        assert_eq!(report.items, 3);
        assert_eq!(report.cached_responses, Some(0));

        search(
            State(st.clone()),
            Bytes::from_static(br#"{"location":"SectorA","radius":1}"#),
        )
        .await;
        let body = body_json(stats(State(st)).await).await;
        assert_eq!(body["total_requests"], 1);
        assert_eq!(body["requests_by_route"]["/search"], 1);
    }

    #[test]
    fn test_query_defaults() {
        let q = SearchQuery::parse(br#"{"location":"A","radius":1.5}"#).unwrap();
        assert_eq!(q.precision, Precision::Hundredths);

        let q = RecommendQuery::parse(br#"{"apartment":"A"}"#).unwrap();
        assert_eq!(q.top_n, DEFAULT_TOP_N);
    }
}
