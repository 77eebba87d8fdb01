//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno del crate. Todas las
//! variables tienen defaults razonables salvo la API key del geocoder.

use std::env;

use crate::services::geocoding_service::GeocodingClient;
use crate::utils::errors::{AppError, AppResult};

const DEFAULT_GEOCODING_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub geocoding_base_url: String,
    pub geocoding_api_key: Option<String>,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub slug_max_attempts: u32,
}

impl EnvironmentConfig {
    /// Carga la configuración desde el entorno (y `.env` si existe)
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self {
            geocoding_base_url: env::var("GEOCODING_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_BASE_URL.to_string()),
            geocoding_api_key: env::var("GEOCODING_API_KEY").ok(),
            default_page_size: parse_var("DEFAULT_PAGE_SIZE", 20),
            max_page_size: parse_var("MAX_PAGE_SIZE", 200),
            slug_max_attempts: parse_var("SLUG_MAX_ATTEMPTS", 5),
        }
    }

    /// Construye el cliente de geocoding; requiere la API key configurada
    pub fn geocoding_client(&self) -> AppResult<GeocodingClient> {
        let api_key = self.geocoding_api_key.clone().ok_or_else(|| {
            AppError::Validation("GEOCODING_API_KEY is not configured".to_string())
        })?;
        Ok(GeocodingClient::new(
            self.geocoding_base_url.clone(),
            api_key,
        ))
    }
}

fn parse_var(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
