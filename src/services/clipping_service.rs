//! Recorte de boundaries contra el viewport
//!
//! Intersección geométrica pura entre la geometría de un boundary y el
//! rectángulo visible del mapa. Sin proyección: todo en grados [lng, lat].

use geo::BooleanOps;
use geo_types::MultiPolygon;

use crate::models::geometry::Bounds;

/// Recorta `geometry` al rectángulo `bounds`.
///
/// - Sin bounds devuelve la geometría sin tocar.
/// - Si las formas no se superponen devuelve `None`: el caller debe tratarlo
///   como "restringir a nada", nunca como "sin restricción".
pub fn clip(geometry: &MultiPolygon<f64>, bounds: Option<&Bounds>) -> Option<MultiPolygon<f64>> {
    let Some(bounds) = bounds else {
        return Some(geometry.clone());
    };

    let window = bounds.to_geometry();
    let clipped = geometry.intersection(&window);

    if clipped.0.is_empty() {
        None
    } else {
        Some(clipped)
    }
}
