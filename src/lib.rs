//! property_search
//!
//! Pipeline de búsqueda geográfica de listings inmobiliarios:
//! resolve → clip → filter → execute → paginate, más creación de listings
//! con reintentos de slug. La capa HTTP, el store documental concreto y el
//! proveedor de geocoding quedan afuera; este crate expone los servicios
//! como funciones con dependencias inyectadas.

pub mod config;
pub mod dto;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use config::EnvironmentConfig;
pub use dto::boundary_dto::BoundarySummary;
pub use dto::listing_dto::{
    ListingDetail, ListingSummary, NewListingRequest, PaginationMeta, SearchResultPage,
};
pub use dto::search_dto::{SearchQueryParams, SortField, SortOrder};
pub use models::boundary::{Boundary, BoundaryType};
pub use models::geometry::Bounds;
pub use models::listing::{
    Amenities, Listing, ListingAddress, ListingStatus, NewListing, OpenHouse, PropertyType,
};
pub use repositories::{
    AddressQuery, BoundaryRepository, BoundedQueryResult, ListingQuery, ListingRepository,
    MemoryBoundaryRepository, MemoryListingRepository, SortSpec,
};
pub use services::{
    build_filter_predicates, classify_place, clip, AddressComponent, FilterPredicate,
    GeocodeRequest, GeocodeResult, Geocoder, GeocodingClient, ListingCreationService,
    LocationResolver, LocationSearchOutcome, PlaceKind, ResolveRequest, SearchService,
    DEFAULT_MAX_ATTEMPTS,
};
pub use utils::errors::{AppError, AppResult};
