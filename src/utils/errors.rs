//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema.
//! La capa HTTP (externa a este crate) es responsable de mapearlos
//! a respuestas apropiadas.

use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Parámetros malformados o contradictorios (ej: bounds parciales).
    /// Error del cliente, nunca se reintenta.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Recurso inexistente (boundary, listing) o geocoding sin resultados.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Fallo o timeout del servicio de geocoding.
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// El store rechazó un slug por violación de unicidad.
    /// Es la única variante que la creación de listings reintenta.
    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    /// Se agotaron los reintentos de creación por colisiones consecutivas.
    #[error("Slug '{slug}' exhausted after {attempts} attempts")]
    SlugExhausted { slug: String, attempts: u32 },

    /// Cualquier otro fallo de persistencia; se propaga sin modificar.
    #[error("Store error: {0}")]
    Store(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Upstream(format!("geocoding request timed out: {}", e))
        } else {
            AppError::Upstream(e.to_string())
        }
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de persistencia
pub fn store_error(message: &str) -> AppError {
    AppError::Store(message.to_string())
}
