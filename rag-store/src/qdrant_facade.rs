//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding away the verbose builder pattern and keeping the rest of the
//! crate decoupled from `qdrant-client`. One client serves both the catalog
//! and the content collection, so every call names its collection.

use std::collections::HashMap;

use crate::config::{DistanceKind, RagConfig, VectorSpace};
use crate::errors::RagError;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, GetPointsBuilder, PointId,
    PointStruct, ScrollPointsBuilder, SearchParamsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
};
use tracing::{debug, info};

/// Page size used when scrolling a whole collection.
const SCROLL_PAGE: u32 = 256;

/// A facade over the Qdrant client to keep the rest of the code clean and stable.
pub struct QdrantFacade {
    client: Qdrant,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the builder-based API of `qdrant-client` and supports
    /// optional API key authentication.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            distance: cfg.distance,
        })
    }

    /// Ensures that the collection exists in Qdrant.
    ///
    /// - If the collection already exists → no-op.
    /// - If missing → creates it with the given vector space configuration.
    pub async fn ensure_collection(
        &self,
        collection: &str,
        space: &VectorSpace,
    ) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        if exists {
            debug!(collection, "collection already exists");
            return Ok(());
        }

        self.create_collection(collection, space).await
    }

    /// Drops the collection (if present) and creates it empty.
    pub async fn recreate_collection(
        &self,
        collection: &str,
        space: &VectorSpace,
    ) -> Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        if exists {
            self.client
                .delete_collection(collection)
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
            info!(collection, "collection dropped");
        }

        self.create_collection(collection, space).await
    }

    async fn create_collection(&self, collection: &str, space: &VectorSpace) -> Result<(), RagError> {
        let distance = match self.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(
            collection,
            size = space.size,
            distance = ?self.distance,
            "collection created"
        );
        Ok(())
    }

    /// Upserts (inserts or updates) a batch of points into the collection.
    ///
    /// Returns the number of points sent.
    pub async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<PointStruct>,
    ) -> Result<usize, RagError> {
        if points.is_empty() {
            debug!(collection, "no points provided for upsert");
            return Ok(0);
        }

        let n = points.len();
        let res = self
            .client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        debug!(collection, points = n, result = ?res.result, "upsert done");
        Ok(n)
    }

    /// Performs a similarity search in Qdrant.
    ///
    /// Returns `(score, payload)` tuples with results sorted by score.
    pub async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<Filter>,
        exact: bool,
    ) -> Result<Vec<(f32, serde_json::Value)>, RagError> {
        debug!(collection, top_k, filtered = filter.is_some(), exact, "search");

        let mut builder = SearchPointsBuilder::new(collection, vector, top_k).with_payload(true);

        if let Some(f) = filter {
            builder = builder.filter(f);
        }
        if exact {
            builder = builder.params(SearchParamsBuilder::default().exact(true));
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        let out: Vec<(f32, serde_json::Value)> = res
            .result
            .into_iter()
            .map(|r| (r.score, qpayload_to_json(r.payload)))
            .collect();

        debug!(collection, hits = out.len(), "search completed");
        Ok(out)
    }

    /// Fetches the payload of one point by id.
    pub async fn get_payload(
        &self,
        collection: &str,
        id: PointId,
    ) -> Result<Option<serde_json::Value>, RagError> {
        let res = self
            .client
            .get_points(GetPointsBuilder::new(collection, vec![id]).with_payload(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(res
            .result
            .into_iter()
            .next()
            .map(|p| qpayload_to_json(p.payload)))
    }

    /// Scrolls through the whole collection and returns every payload.
    pub async fn scroll_payloads(&self, collection: &str) -> Result<Vec<serde_json::Value>, RagError> {
        let mut out = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(collection)
                .limit(SCROLL_PAGE)
                .with_payload(true)
                .with_vectors(false);
            if let Some(o) = offset.take() {
                builder = builder.offset(o);
            }

            let res = self
                .client
                .scroll(builder)
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;

            out.extend(res.result.into_iter().map(|p| qpayload_to_json(p.payload)));

            match res.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(out)
    }

    /// Exact number of points in the collection.
    pub async fn count(&self, collection: &str) -> Result<u64, RagError> {
        let res = self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(res.result.map(|r| r.count).unwrap_or(0))
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
///
/// Unsupported nested objects/arrays are mapped to `Null`.
pub(crate) fn qpayload_to_json(mut p: HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::value::Kind;

    #[test]
    fn payload_scalars_convert_to_json() {
        let mut p = HashMap::new();
        p.insert(
            "course_title".to_string(),
            QValue {
                kind: Some(Kind::StringValue("MCP".into())),
            },
        );
        p.insert(
            "lesson_number".to_string(),
            QValue {
                kind: Some(Kind::IntegerValue(2)),
            },
        );
        p.insert("empty".to_string(), QValue { kind: None });

        let j = qpayload_to_json(p);
        assert_eq!(j["course_title"], "MCP");
        assert_eq!(j["lesson_number"], 2);
        assert!(j["empty"].is_null());
    }
}
