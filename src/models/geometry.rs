//! Tipos geográficos compartidos
//!
//! Todas las coordenadas del sistema son pares [longitud, latitud] en grados,
//! sin proyección ni reproyección.

use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::utils::errors::{AppError, AppResult};

/// Rectángulo de viewport de un mapa (norte/este/sur/oeste)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub east: f64,
    pub south: f64,
    pub west: f64,
}

impl Bounds {
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> AppResult<Self> {
        if !(-90.0..=90.0).contains(&north) || !(-90.0..=90.0).contains(&south) {
            return Err(AppError::Validation(format!(
                "latitude out of range: north={}, south={}",
                north, south
            )));
        }
        if !(-180.0..=180.0).contains(&east) || !(-180.0..=180.0).contains(&west) {
            return Err(AppError::Validation(format!(
                "longitude out of range: east={}, west={}",
                east, west
            )));
        }
        if north <= south {
            return Err(AppError::Validation(format!(
                "north ({}) must be greater than south ({})",
                north, south
            )));
        }
        if east <= west {
            return Err(AppError::Validation(format!(
                "east ({}) must be greater than west ({})",
                east, west
            )));
        }

        Ok(Self {
            north,
            east,
            south,
            west,
        })
    }

    /// Construye bounds desde parámetros opcionales.
    /// Los cuatro valores son todo-o-nada: un subconjunto parcial es un
    /// error de validación, no un viewport implícito.
    pub fn from_partial(
        north: Option<f64>,
        east: Option<f64>,
        south: Option<f64>,
        west: Option<f64>,
    ) -> AppResult<Option<Self>> {
        match (north, east, south, west) {
            (None, None, None, None) => Ok(None),
            (Some(n), Some(e), Some(s), Some(w)) => Self::new(n, e, s, w).map(Some),
            _ => Err(AppError::Validation(
                "bounds require all of north, east, south and west".to_string(),
            )),
        }
    }

    /// Convierte el rectángulo en un anillo cerrado, en orden antihorario
    /// partiendo de la esquina suroeste. Coordenadas [lng, lat].
    pub fn to_polygon(&self) -> Polygon<f64> {
        let ring = LineString::from(vec![
            Coord {
                x: self.west,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.north,
            },
            Coord {
                x: self.west,
                y: self.north,
            },
            Coord {
                x: self.west,
                y: self.south,
            },
        ]);
        Polygon::new(ring, vec![])
    }

    pub fn to_geometry(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![self.to_polygon()])
    }

    /// Chequeo rápido de pertenencia, sin pasar por geometría booleana
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        latitude <= self.north
            && latitude >= self.south
            && longitude <= self.east
            && longitude >= self.west
    }
}
