//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! geográficos y de paginación.

use validator::ValidationError;

/// Validar una latitud en grados
pub fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    if !(-90.0..=90.0).contains(&value) {
        let mut error = ValidationError::new("latitude");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar una longitud en grados
pub fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    if !(-180.0..=180.0).contains(&value) {
        let mut error = ValidationError::new("longitude");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}
