//! Resolución de intención geográfica
//!
//! Convierte la entrada del usuario (dirección libre, place id o tipos de
//! componente ya conocidos) en una de tres salidas: búsqueda dentro de un
//! boundary, detalle de un listing puntual, o el viewport geocodificado
//! como fallback cuando hay lugar pero no hay datos locales.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::boundary_dto::BoundarySummary;
use crate::dto::listing_dto::{ListingDetail, SearchResultPage};
use crate::dto::search_dto::SearchQueryParams;
use crate::models::boundary::Boundary;
use crate::models::geometry::Bounds;
use crate::repositories::{AddressQuery, BoundaryRepository, ListingRepository};
use crate::services::geocoding_service::{GeocodeRequest, GeocodeResult, Geocoder};
use crate::services::search_service::SearchService;
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Clasificación cerrada de un lugar geocodificado según sus tags de tipo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceKind {
    /// Una dirección puntual (calle y número, predio, unidad)
    StreetAddress,
    /// Un área con nombre: barrio, ciudad, código postal, etc.
    BoundaryLike,
}

const STREET_ADDRESS_TYPES: &[&str] = &["street_address", "premise", "subpremise"];

/// Función pura de clasificación sobre los tags de tipo del geocoder
pub fn classify_place(types: &[String]) -> PlaceKind {
    if types
        .iter()
        .any(|t| STREET_ADDRESS_TYPES.contains(&t.as_str()))
    {
        PlaceKind::StreetAddress
    } else {
        PlaceKind::BoundaryLike
    }
}

/// Request de resolución de ubicación
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    pub address: Option<String>,
    pub place_id: Option<String>,
    /// Tipos de componente ya conocidos por el caller (ej: autocomplete);
    /// habilitan el fast path sin geocodificar
    pub address_types: Option<Vec<String>>,
    pub params: SearchQueryParams,
}

/// Las tres formas de respuesta de la resolución
#[derive(Debug)]
pub enum LocationSearchOutcome {
    /// El target es un área con datos locales: boundary + página de resultados
    Boundary {
        boundary: BoundarySummary,
        page: SearchResultPage,
    },
    /// El target es una dirección puntual con listing conocido
    ListingDetail { listing: ListingDetail },
    /// Hay lugar geocodificado pero sin datos locales: viewport pelado
    Viewport { viewport: Bounds },
}

pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    boundaries: Arc<dyn BoundaryRepository>,
    listings: Arc<dyn ListingRepository>,
    search: SearchService,
}

impl LocationResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        boundaries: Arc<dyn BoundaryRepository>,
        listings: Arc<dyn ListingRepository>,
    ) -> Self {
        let search = SearchService::new(listings.clone());
        Self {
            geocoder,
            boundaries,
            listings,
            search,
        }
    }

    /// Entrada principal: resuelve la intención y ejecuta la búsqueda
    /// que corresponda.
    pub async fn resolve(&self, request: &ResolveRequest) -> AppResult<LocationSearchOutcome> {
        request.params.check()?;

        if request.address.is_none() && request.place_id.is_none() {
            return Err(AppError::Validation(
                "location resolution needs an address or a place id".to_string(),
            ));
        }

        // Fast path: place id + tipos de componente que indican área.
        // Evita la llamada al geocoder cuando el boundary ya es conocido.
        if let (Some(place_id), Some(types)) = (&request.place_id, &request.address_types) {
            if classify_place(types) == PlaceKind::BoundaryLike {
                if let Some(boundary) = self.boundaries.find_by_place_id(place_id).await? {
                    info!("🎯 Fast path hit for boundary '{}'", boundary.name);
                    return self.boundary_outcome(&boundary, &request.params).await;
                }
                debug!(
                    "Fast path miss for place id {}; falling back to geocoding",
                    place_id
                );
            }
        }

        // Geocoding completo. Un set de resultados vacío es un error visible
        // para el caller, nunca "cero resultados de búsqueda".
        let geocode_request = GeocodeRequest {
            address: request.address.clone(),
            place_id: request.place_id.clone(),
        };
        let results = self.geocoder.geocode(&geocode_request).await?;
        let Some(first) = results.first() else {
            return Err(AppError::NotFound(
                "geocoding returned no results for the requested location".to_string(),
            ));
        };

        match classify_place(&first.types) {
            PlaceKind::StreetAddress => self.street_address_outcome(first).await,
            PlaceKind::BoundaryLike => {
                match self.boundaries.find_by_place_id(&first.place_id).await? {
                    Some(boundary) => self.boundary_outcome(&boundary, &request.params).await,
                    // Lugar encontrado, sin datos locales: fallback al viewport
                    None => Ok(LocationSearchOutcome::Viewport {
                        viewport: first.viewport,
                    }),
                }
            }
        }
    }

    /// Entrada directa por id de boundary (sin geocoding)
    pub async fn search_boundary_id(
        &self,
        boundary_id: Uuid,
        params: &SearchQueryParams,
    ) -> AppResult<LocationSearchOutcome> {
        let boundary = self
            .boundaries
            .find_by_id(boundary_id)
            .await?
            .ok_or_else(|| not_found_error("boundary", &boundary_id.to_string()))?;
        self.boundary_outcome(&boundary, params).await
    }

    async fn boundary_outcome(
        &self,
        boundary: &Boundary,
        params: &SearchQueryParams,
    ) -> AppResult<LocationSearchOutcome> {
        let page = self.search.search_boundary(boundary, params).await?;
        Ok(LocationSearchOutcome::Boundary {
            boundary: BoundarySummary::from(boundary),
            page,
        })
    }

    async fn street_address_outcome(
        &self,
        geocoded: &GeocodeResult,
    ) -> AppResult<LocationSearchOutcome> {
        // El fallback por dirección requiere la dirección completa; una
        // dirección incompleta del geocoder se saltea sin error.
        let address = address_query_from(geocoded);
        if address.is_none() {
            debug!(
                "Geocoded address for {} is incomplete; skipping address match",
                geocoded.place_id
            );
        }

        let listing = self
            .listings
            .find_by_place_id_or_address(Some(&geocoded.place_id), address.as_ref())
            .await?;

        match listing {
            Some(listing) => Ok(LocationSearchOutcome::ListingDetail {
                listing: ListingDetail::from(&listing),
            }),
            None => Ok(LocationSearchOutcome::Viewport {
                viewport: geocoded.viewport,
            }),
        }
    }
}

/// Arma la query de dirección desde los componentes geocodificados.
/// Devuelve `None` si falta cualquier campo requerido.
fn address_query_from(geocoded: &GeocodeResult) -> Option<AddressQuery> {
    let street_number = geocoded.component("street_number")?;
    let route = geocoded.component("route")?;
    let city = geocoded.component("locality")?;
    let state = geocoded.component("administrative_area_level_1")?;
    let zip = geocoded.component("postal_code")?;

    Some(AddressQuery {
        line1: format!("{} {}", street_number.long_name, route.long_name),
        city: city.long_name.clone(),
        state: state.short_name.clone(),
        zip: zip.long_name.clone(),
    })
}
