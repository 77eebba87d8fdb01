//! Modelo de boundary geográfico
//!
//! Un boundary es un área con nombre (barrio, ciudad, código postal, etc.)
//! con geometría multi-polígono. Se cargan por seeding y son efectivamente
//! inmutables en operación normal.

use std::fmt;

use geo_types::MultiPolygon;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tipo de área geográfica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryType {
    Neighborhood,
    City,
    ZipCode,
    County,
    State,
    Country,
    SchoolDistrict,
    School,
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Neighborhood => "neighborhood",
            Self::City => "city",
            Self::ZipCode => "zip_code",
            Self::County => "county",
            Self::State => "state",
            Self::Country => "country",
            Self::SchoolDistrict => "school_district",
            Self::School => "school",
        };
        write!(f, "{}", s)
    }
}

/// Área geográfica con nombre y geometría multi-polígono
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    pub id: Uuid,
    pub name: String,
    pub boundary_type: BoundaryType,
    /// Multi-polígono [lng, lat] en grados
    pub geometry: MultiPolygon<f64>,
    /// Identificador externo del geocoder para correlacionar resultados
    pub place_id: Option<String>,
}
