//! DTOs de boundaries

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::boundary::{Boundary, BoundaryType};

/// Proyección de boundary para respuestas (sin la geometría completa)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundarySummary {
    pub id: Uuid,
    pub name: String,
    pub boundary_type: BoundaryType,
    pub place_id: Option<String>,
}

impl From<&Boundary> for BoundarySummary {
    fn from(boundary: &Boundary) -> Self {
        Self {
            id: boundary.id,
            name: boundary.name.clone(),
            boundary_type: boundary.boundary_type,
            place_id: boundary.place_id.clone(),
        }
    }
}
