//! Services module
//!
//! Este módulo contiene la lógica de negocio de la pipeline de búsqueda:
//! resolve → clip → filter → execute → paginate, más la creación de
//! listings con reintentos.

pub mod clipping_service;
pub mod filter_service;
pub mod geocoding_service;
pub mod listing_creation_service;
pub mod resolver_service;
pub mod search_service;

pub use clipping_service::clip;
pub use filter_service::{build_filter_predicates, FilterPredicate};
pub use geocoding_service::{
    AddressComponent, GeocodeRequest, GeocodeResult, Geocoder, GeocodingClient,
};
pub use listing_creation_service::{ListingCreationService, DEFAULT_MAX_ATTEMPTS};
pub use resolver_service::{
    classify_place, LocationResolver, LocationSearchOutcome, PlaceKind, ResolveRequest,
};
pub use search_service::SearchService;
