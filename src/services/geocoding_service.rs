//! Servicio de geocoding
//!
//! Trait `Geocoder` (seam para inyección de dependencias) y el cliente HTTP
//! concreto contra la API de geocoding. Los errores del proveedor se
//! propagan como `AppError::Upstream`; nunca se tratan como "sin resultados".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::geometry::Bounds;
use crate::utils::errors::{AppError, AppResult};

/// Request de geocoding: dirección libre o place id (al menos uno).
/// Cuando ambos están presentes el place id tiene precedencia por ser
/// más específico.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodeRequest {
    pub address: Option<String>,
    pub place_id: Option<String>,
}

impl GeocodeRequest {
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            place_id: None,
        }
    }

    pub fn from_place_id(place_id: impl Into<String>) -> Self {
        Self {
            address: None,
            place_id: Some(place_id.into()),
        }
    }
}

/// Componente de dirección de un resultado geocodificado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    pub types: Vec<String>,
}

/// Resultado de geocoding normalizado
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub place_id: String,
    pub address_components: Vec<AddressComponent>,
    /// Viewport sugerido por el geocoder para encuadrar el lugar
    pub viewport: Bounds,
    /// Tags de tipo del lugar (street_address, neighborhood, locality, ...)
    pub types: Vec<String>,
}

impl GeocodeResult {
    /// Primer componente que incluya el tipo dado
    pub fn component(&self, component_type: &str) -> Option<&AddressComponent> {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| t == component_type))
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocodifica una dirección o place id. Un resultado vacío es una
    /// respuesta válida del proveedor; es el caller quien decide si eso
    /// es un error.
    async fn geocode(&self, request: &GeocodeRequest) -> AppResult<Vec<GeocodeResult>>;

    async fn reverse_geocode(&self, latitude: f64, longitude: f64)
        -> AppResult<Vec<GeocodeResult>>;
}

// ---------------------------------------------------------------------------
// Cliente HTTP concreto
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    status: String,
    #[serde(default)]
    results: Vec<ProviderResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderResult {
    place_id: String,
    #[serde(default)]
    address_components: Vec<ProviderComponent>,
    geometry: ProviderGeometry,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderComponent {
    long_name: String,
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderGeometry {
    viewport: ProviderViewport,
}

#[derive(Debug, Deserialize)]
struct ProviderViewport {
    northeast: ProviderLatLng,
    southwest: ProviderLatLng,
}

#[derive(Debug, Deserialize)]
struct ProviderLatLng {
    lat: f64,
    lng: f64,
}

/// Cliente contra la API de geocoding estilo Google
pub struct GeocodingClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeocodingClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    async fn request(&self, query: &str) -> AppResult<Vec<GeocodeResult>> {
        let url = format!("{}/json?{}&key={}", self.base_url, query, self.api_key);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "PropertySearch/1.0")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("❌ Geocoding failed with status {}: {}", status, body);
            return Err(AppError::Upstream(format!(
                "geocoding responded with status {}",
                status
            )));
        }

        let parsed: ProviderResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to parse geocoding response: {}", e)))?;

        match parsed.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(Vec::new()),
            other => {
                return Err(AppError::Upstream(format!(
                    "geocoding status {}: {}",
                    other,
                    parsed.error_message.unwrap_or_default()
                )))
            }
        }

        parsed.results.into_iter().map(convert_result).collect()
    }

    /// Geocodifica direcciones en lotes de a 10, con pausa entre lotes
    /// para respetar rate limits del proveedor
    pub async fn batch_geocode(
        &self,
        addresses: Vec<String>,
    ) -> Vec<AppResult<Vec<GeocodeResult>>> {
        info!("🗺️ Batch geocoding {} addresses", addresses.len());
        let mut results = Vec::with_capacity(addresses.len());

        for chunk in addresses.chunks(10) {
            let futures: Vec<_> = chunk
                .iter()
                .map(|address| self.geocode_owned(address.clone()))
                .collect();
            results.extend(futures::future::join_all(futures).await);
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }

        results
    }

    async fn geocode_owned(&self, address: String) -> AppResult<Vec<GeocodeResult>> {
        self.geocode(&GeocodeRequest::from_address(address)).await
    }
}

fn convert_result(result: ProviderResult) -> AppResult<GeocodeResult> {
    let viewport = Bounds::new(
        result.geometry.viewport.northeast.lat,
        result.geometry.viewport.northeast.lng,
        result.geometry.viewport.southwest.lat,
        result.geometry.viewport.southwest.lng,
    )
    .map_err(|_| AppError::Upstream("geocoder returned an invalid viewport".to_string()))?;

    Ok(GeocodeResult {
        place_id: result.place_id,
        address_components: result
            .address_components
            .into_iter()
            .map(|c| AddressComponent {
                long_name: c.long_name,
                short_name: c.short_name,
                types: c.types,
            })
            .collect(),
        viewport,
        types: result.types,
    })
}

#[async_trait]
impl Geocoder for GeocodingClient {
    async fn geocode(&self, request: &GeocodeRequest) -> AppResult<Vec<GeocodeResult>> {
        // El place id tiene precedencia: es más específico y evita ambigüedad
        let query = if let Some(place_id) = &request.place_id {
            format!("place_id={}", urlencoding::encode(place_id))
        } else if let Some(address) = &request.address {
            info!("🗺️ Geocoding address: {}", address);
            format!("address={}", urlencoding::encode(address))
        } else {
            return Err(AppError::Validation(
                "geocode request needs an address or a place id".to_string(),
            ));
        };

        self.request(&query).await
    }

    async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<Vec<GeocodeResult>> {
        self.request(&format!("latlng={},{}", latitude, longitude))
            .await
    }
}
