//! Repositorio de boundaries
//!
//! Trait del store de boundaries y su implementación en memoria. Los
//! boundaries se siembran una vez y se consultan por id, por place id
//! o por contención de un punto.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use geo::Contains;
use geo_types::Point;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::boundary::{Boundary, BoundaryType};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait BoundaryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Boundary>>;
    async fn find_by_place_id(&self, place_id: &str) -> AppResult<Option<Boundary>>;

    /// Boundaries cuya geometría contiene el punto [lng, lat], opcionalmente
    /// restringidos por tipo
    async fn find_containing(
        &self,
        latitude: f64,
        longitude: f64,
        boundary_type: Option<BoundaryType>,
    ) -> AppResult<Vec<Boundary>>;
}

/// Implementación en memoria del store de boundaries
pub struct MemoryBoundaryRepository {
    boundaries: Arc<RwLock<HashMap<Uuid, Boundary>>>,
}

impl MemoryBoundaryRepository {
    pub fn new() -> Self {
        Self {
            boundaries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn seed(&self, boundary: Boundary) {
        self.boundaries.write().await.insert(boundary.id, boundary);
    }
}

impl Default for MemoryBoundaryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BoundaryRepository for MemoryBoundaryRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Boundary>> {
        Ok(self.boundaries.read().await.get(&id).cloned())
    }

    async fn find_by_place_id(&self, place_id: &str) -> AppResult<Option<Boundary>> {
        let store = self.boundaries.read().await;
        Ok(store
            .values()
            .find(|b| b.place_id.as_deref() == Some(place_id))
            .cloned())
    }

    async fn find_containing(
        &self,
        latitude: f64,
        longitude: f64,
        boundary_type: Option<BoundaryType>,
    ) -> AppResult<Vec<Boundary>> {
        let point = Point::new(longitude, latitude);
        let store = self.boundaries.read().await;
        Ok(store
            .values()
            .filter(|b| boundary_type.map_or(true, |t| b.boundary_type == t))
            .filter(|b| b.geometry.contains(&point))
            .cloned()
            .collect())
    }
}
