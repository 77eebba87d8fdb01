//! Tests de integración de la pipeline de búsqueda:
//! resolución de ubicación, recorte de viewport, filtrado y paginación,
//! todo contra stores en memoria y un geocoder scripteado.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use geo_types::{polygon, MultiPolygon, Point};
use uuid::Uuid;

use property_search::{
    build_filter_predicates, AddressComponent, AppError, AppResult, Boundary, BoundaryType, Bounds,
    GeocodeRequest, GeocodeResult, Geocoder, Listing, ListingRepository, ListingStatus,
    LocationResolver, LocationSearchOutcome, MemoryBoundaryRepository, MemoryListingRepository,
    PropertyType, ResolveRequest, SearchQueryParams, SearchService, SortField, SortOrder,
};
use property_search::{Amenities, ListingAddress};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Geocoder scripteado: devuelve siempre la misma respuesta y cuenta llamadas
struct FakeGeocoder {
    script: Script,
    calls: AtomicU64,
}

enum Script {
    Results(Vec<GeocodeResult>),
    Fail(String),
}

impl FakeGeocoder {
    fn returning(results: Vec<GeocodeResult>) -> Self {
        Self {
            script: Script::Results(results),
            calls: AtomicU64::new(0),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            script: Script::Fail(message.to_string()),
            calls: AtomicU64::new(0),
        }
    }

    fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, _request: &GeocodeRequest) -> AppResult<Vec<GeocodeResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Results(results) => Ok(results.clone()),
            Script::Fail(message) => Err(AppError::Upstream(message.clone())),
        }
    }

    async fn reverse_geocode(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> AppResult<Vec<GeocodeResult>> {
        self.geocode(&GeocodeRequest::default()).await
    }
}

fn component(long_name: &str, short_name: &str, types: &[&str]) -> AddressComponent {
    AddressComponent {
        long_name: long_name.to_string(),
        short_name: short_name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
    }
}

fn viewport() -> Bounds {
    Bounds::new(47.660, -122.347, 47.656, -122.351).unwrap()
}

fn listing_at(longitude: f64, latitude: f64, slug: &str) -> Listing {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Listing {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        status: ListingStatus::Active,
        property_type: PropertyType::House,
        address: ListingAddress {
            line1: format!("1 {} St", slug),
            line2: None,
            city: "Seattle".to_string(),
            state: "WA".to_string(),
            zip: "98103".to_string(),
        },
        location: Point::new(longitude, latitude),
        price: 750_000.0,
        beds: Some(3.0),
        baths: Some(2.0),
        square_feet: Some(1800.0),
        lot_size: None,
        year_built: Some(1962),
        amenities: Amenities::default(),
        rental: None,
        sold_price: None,
        sold_date: None,
        place_id: None,
        open_houses: Vec::new(),
        listed_date: now - Duration::days(10),
        created_at: now,
        updated_at: now,
    }
}

/// Polígono aproximado de Fremont (Seattle)
fn fremont_geometry() -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: -122.381, y: 47.640),
        (x: -122.334, y: 47.640),
        (x: -122.334, y: 47.670),
        (x: -122.381, y: 47.670),
        (x: -122.381, y: 47.640),
    ]])
}

fn fremont_boundary() -> Boundary {
    Boundary {
        id: Uuid::new_v4(),
        name: "Fremont".to_string(),
        boundary_type: BoundaryType::Neighborhood,
        geometry: fremont_geometry(),
        place_id: Some("place-fremont".to_string()),
    }
}

fn fremont_bounds() -> Bounds {
    // Viewport del escenario de referencia
    Bounds::new(47.690, -122.328, 47.624, -122.381).unwrap()
}

// ---------------------------------------------------------------------------
// Ejecución paginada sobre bounds crudos
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_bounds_search_includes_only_points_inside() {
    let listings = Arc::new(MemoryListingRepository::new());
    listings
        .seed(listing_at(-122.349, 47.658, "inside-fremont"))
        .await;
    // Wallingford: al este del viewport
    listings
        .seed(listing_at(-122.326, 47.669, "wallingford"))
        .await;

    let service = SearchService::new(listings.clone());
    let page = service
        .search_bounds(&fremont_bounds(), &SearchQueryParams::default())
        .await
        .unwrap();

    assert_eq!(page.pagination.number_available, 1);
    assert_eq!(page.listings.len(), 1);
    assert_eq!(page.listings[0].slug, "inside-fremont");
    assert_eq!(page.listings[0].longitude, -122.349);
    assert_eq!(page.listings[0].latitude, 47.658);
}

#[tokio::test]
async fn test_number_available_invariant_under_pagination() {
    let listings = Arc::new(MemoryListingRepository::new());
    for i in 0..25 {
        listings
            .seed(listing_at(-122.349, 47.650 + f64::from(i) * 0.0005, &format!("l-{}", i)))
            .await;
    }

    let service = SearchService::new(listings.clone());

    for page_index in 0..3 {
        let params = SearchQueryParams {
            page_index,
            page_size: 10,
            ..Default::default()
        };
        let page = service.search_bounds(&fremont_bounds(), &params).await.unwrap();
        assert_eq!(page.pagination.number_available, 25);
        assert_eq!(page.pagination.number_of_pages, 3);
        let expected = if page_index == 2 { 5 } else { 10 };
        assert_eq!(page.pagination.number_returned, expected);
    }

    // Página fuera de rango: vacía, sin error, total intacto
    let params = SearchQueryParams {
        page_index: 9,
        page_size: 10,
        ..Default::default()
    };
    let page = service.search_bounds(&fremont_bounds(), &params).await.unwrap();
    assert!(page.listings.is_empty());
    assert_eq!(page.pagination.number_available, 25);
}

#[tokio::test]
async fn test_default_status_and_rental_filters() {
    let listings = Arc::new(MemoryListingRepository::new());
    listings.seed(listing_at(-122.349, 47.658, "active")).await;

    let mut pending = listing_at(-122.350, 47.658, "pending");
    pending.status = ListingStatus::Pending;
    listings.seed(pending).await;

    let mut rental = listing_at(-122.351, 47.658, "rental");
    rental.rental = Some(true);
    listings.seed(rental).await;

    let service = SearchService::new(listings.clone());
    let page = service
        .search_bounds(&fremont_bounds(), &SearchQueryParams::default())
        .await
        .unwrap();

    // Sin filtros: solo active y sin alquileres
    assert_eq!(page.pagination.number_available, 1);
    assert_eq!(page.listings[0].slug, "active");

    // rental = true da vuelta la exclusión
    let params = SearchQueryParams {
        rental: Some(true),
        ..Default::default()
    };
    let page = service.search_bounds(&fremont_bounds(), &params).await.unwrap();
    assert_eq!(page.pagination.number_available, 1);
    assert_eq!(page.listings[0].slug, "rental");
}

#[tokio::test]
async fn test_filter_round_trip_against_predicates() {
    let listings = Arc::new(MemoryListingRepository::new());
    for i in 0..10 {
        let mut l = listing_at(-122.349, 47.650 + f64::from(i) * 0.001, &format!("rt-{}", i));
        l.price = 400_000.0 + f64::from(i) * 100_000.0;
        l.beds = Some(f64::from(i % 5));
        l.amenities.garage = i % 2 == 0;
        listings.seed(l).await;
    }

    let params = SearchQueryParams {
        min_price: Some(500_000.0),
        max_price: Some(1_000_000.0),
        min_beds: Some(2.0),
        garage: Some(true),
        page_size: 50,
        ..Default::default()
    };
    let service = SearchService::new(listings.clone());
    let page = service.search_bounds(&fremont_bounds(), &params).await.unwrap();

    // Cada resultado satisface individualmente todos los predicados
    let predicates = build_filter_predicates(&params);
    assert!(!page.listings.is_empty());
    for summary in &page.listings {
        let stored = listings.find_by_id(summary.id).await.unwrap().unwrap();
        assert!(predicates.iter().all(|p| p.matches(&stored)));
        assert!(fremont_bounds().contains(summary.longitude, summary.latitude));
    }
    assert_eq!(page.pagination.number_available, page.listings.len() as u64);
}

#[tokio::test]
async fn test_sort_by_price_ascending() {
    let listings = Arc::new(MemoryListingRepository::new());
    for (i, price) in [900_000.0, 500_000.0, 700_000.0].iter().enumerate() {
        let mut l = listing_at(-122.349, 47.650 + i as f64 * 0.001, &format!("s-{}", i));
        l.price = *price;
        listings.seed(l).await;
    }

    let params = SearchQueryParams {
        sort_by: Some(SortField::Price),
        sort_order: Some(SortOrder::Asc),
        ..Default::default()
    };
    let service = SearchService::new(listings);
    let page = service.search_bounds(&fremont_bounds(), &params).await.unwrap();

    let prices: Vec<f64> = page.listings.iter().map(|l| l.price).collect();
    assert_eq!(prices, vec![500_000.0, 700_000.0, 900_000.0]);
}

// ---------------------------------------------------------------------------
// Orquestación de boundary + clipper
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_disjoint_viewport_short_circuits_without_store_query() {
    init_tracing();
    let listings = Arc::new(MemoryListingRepository::new());
    listings.seed(listing_at(-122.349, 47.658, "fremont")).await;

    let service = SearchService::new(listings.clone());
    // Viewport en Portland: cero superposición con Fremont
    let params = SearchQueryParams {
        bounds: Some(Bounds::new(45.60, -122.50, 45.40, -122.80).unwrap()),
        ..Default::default()
    };
    let page = service
        .search_boundary(&fremont_boundary(), &params)
        .await
        .unwrap();

    assert!(page.listings.is_empty());
    assert_eq!(page.pagination.number_available, 0);
    assert_eq!(listings.find_within_calls(), 0);
}

#[tokio::test]
async fn test_boundary_search_clips_to_viewport() {
    let listings = Arc::new(MemoryListingRepository::new());
    listings.seed(listing_at(-122.349, 47.658, "in-view")).await;
    // Dentro del boundary pero fuera del viewport
    listings
        .seed(listing_at(-122.370, 47.645, "out-of-view"))
        .await;

    let service = SearchService::new(listings.clone());
    let params = SearchQueryParams {
        bounds: Some(viewport()),
        ..Default::default()
    };
    let page = service
        .search_boundary(&fremont_boundary(), &params)
        .await
        .unwrap();

    assert_eq!(page.pagination.number_available, 1);
    assert_eq!(page.listings[0].slug, "in-view");
    assert_eq!(listings.find_within_calls(), 1);
}

// ---------------------------------------------------------------------------
// Resolución de ubicación
// ---------------------------------------------------------------------------

fn resolver(
    geocoder: Arc<FakeGeocoder>,
    boundaries: Arc<MemoryBoundaryRepository>,
    listings: Arc<MemoryListingRepository>,
) -> LocationResolver {
    LocationResolver::new(geocoder, boundaries, listings)
}

#[tokio::test]
async fn test_fast_path_skips_geocoding() {
    init_tracing();
    let geocoder = Arc::new(FakeGeocoder::failing("should not be called"));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());
    boundaries.seed(fremont_boundary()).await;
    let listings = Arc::new(MemoryListingRepository::new());
    listings.seed(listing_at(-122.349, 47.658, "fremont-1")).await;

    let resolver = resolver(geocoder.clone(), boundaries, listings);
    let request = ResolveRequest {
        place_id: Some("place-fremont".to_string()),
        address_types: Some(vec!["neighborhood".to_string(), "political".to_string()]),
        ..Default::default()
    };

    let outcome = resolver.resolve(&request).await.unwrap();
    match outcome {
        LocationSearchOutcome::Boundary { boundary, page } => {
            assert_eq!(boundary.name, "Fremont");
            assert_eq!(page.pagination.number_available, 1);
        }
        other => panic!("expected boundary outcome, got {:?}", other),
    }
    assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn test_fast_path_miss_falls_back_to_geocoding() {
    // El place id no está en el repo; el geocoder lo clasifica como barrio
    // sin datos locales → viewport
    let geocoded = GeocodeResult {
        place_id: "place-unknown".to_string(),
        address_components: vec![component("Ballard", "Ballard", &["neighborhood", "political"])],
        viewport: viewport(),
        types: vec!["neighborhood".to_string(), "political".to_string()],
    };
    let geocoder = Arc::new(FakeGeocoder::returning(vec![geocoded]));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());
    let listings = Arc::new(MemoryListingRepository::new());

    let resolver = resolver(geocoder.clone(), boundaries, listings);
    let request = ResolveRequest {
        place_id: Some("place-unknown".to_string()),
        address_types: Some(vec!["neighborhood".to_string()]),
        ..Default::default()
    };

    let outcome = resolver.resolve(&request).await.unwrap();
    assert!(matches!(outcome, LocationSearchOutcome::Viewport { .. }));
    assert_eq!(geocoder.calls(), 1);
}

#[tokio::test]
async fn test_street_address_resolves_to_listing_detail_by_address() {
    // Listing sin place id: el match tiene que salir por dirección
    let mut listing = listing_at(-122.349, 47.658, "detail-target");
    listing.address.line1 = "742 N 34th St".to_string();
    let listings = Arc::new(MemoryListingRepository::new());
    listings.seed(listing).await;

    let geocoded = GeocodeResult {
        place_id: "place-742".to_string(),
        address_components: vec![
            component("742", "742", &["street_number"]),
            component("N 34th St", "N 34th St", &["route"]),
            component("Seattle", "Seattle", &["locality", "political"]),
            component("Washington", "WA", &["administrative_area_level_1", "political"]),
            component("98103", "98103", &["postal_code"]),
        ],
        viewport: viewport(),
        types: vec!["street_address".to_string()],
    };
    let geocoder = Arc::new(FakeGeocoder::returning(vec![geocoded]));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());

    let resolver = resolver(geocoder, boundaries, listings);
    let request = ResolveRequest {
        address: Some("742 N 34th St, Seattle WA".to_string()),
        ..Default::default()
    };

    match resolver.resolve(&request).await.unwrap() {
        LocationSearchOutcome::ListingDetail { listing } => {
            assert_eq!(listing.summary.slug, "detail-target");
        }
        other => panic!("expected listing detail, got {:?}", other),
    }
}

#[tokio::test]
async fn test_incomplete_geocoded_address_skips_address_match() {
    // Falta locality: el fallback por dirección se saltea sin error y,
    // al no haber match por place id, cae al viewport
    let mut listing = listing_at(-122.349, 47.658, "unmatched");
    listing.address.line1 = "742 N 34th St".to_string();
    let listings = Arc::new(MemoryListingRepository::new());
    listings.seed(listing).await;

    let geocoded = GeocodeResult {
        place_id: "place-742".to_string(),
        address_components: vec![
            component("742", "742", &["street_number"]),
            component("N 34th St", "N 34th St", &["route"]),
            component("Washington", "WA", &["administrative_area_level_1", "political"]),
            component("98103", "98103", &["postal_code"]),
        ],
        viewport: viewport(),
        types: vec!["street_address".to_string()],
    };
    let geocoder = Arc::new(FakeGeocoder::returning(vec![geocoded]));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());

    let resolver = resolver(geocoder, boundaries, listings);
    let request = ResolveRequest {
        address: Some("742 N 34th St".to_string()),
        ..Default::default()
    };

    let outcome = resolver.resolve(&request).await.unwrap();
    assert!(matches!(outcome, LocationSearchOutcome::Viewport { .. }));
}

#[tokio::test]
async fn test_street_address_match_by_place_id() {
    let mut listing = listing_at(-122.349, 47.658, "by-place-id");
    listing.place_id = Some("place-742".to_string());
    let listings = Arc::new(MemoryListingRepository::new());
    listings.seed(listing).await;

    // Dirección incompleta a propósito: el place id alcanza
    let geocoded = GeocodeResult {
        place_id: "place-742".to_string(),
        address_components: vec![component("742", "742", &["street_number"])],
        viewport: viewport(),
        types: vec!["premise".to_string()],
    };
    let geocoder = Arc::new(FakeGeocoder::returning(vec![geocoded]));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());

    let resolver = resolver(geocoder, boundaries, listings);
    let request = ResolveRequest {
        place_id: Some("place-742".to_string()),
        ..Default::default()
    };

    match resolver.resolve(&request).await.unwrap() {
        LocationSearchOutcome::ListingDetail { listing } => {
            assert_eq!(listing.summary.slug, "by-place-id");
        }
        other => panic!("expected listing detail, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_geocode_result_is_an_error() {
    let geocoder = Arc::new(FakeGeocoder::returning(Vec::new()));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());
    let listings = Arc::new(MemoryListingRepository::new());

    let resolver = resolver(geocoder, boundaries, listings);
    let request = ResolveRequest {
        address: Some("nowhere at all".to_string()),
        ..Default::default()
    };

    let err = resolver.resolve(&request).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_geocoder_failure_propagates_as_upstream_error() {
    let geocoder = Arc::new(FakeGeocoder::failing("provider exploded"));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());
    let listings = Arc::new(MemoryListingRepository::new());

    let resolver = resolver(geocoder, boundaries, listings);
    let request = ResolveRequest {
        address: Some("742 N 34th St".to_string()),
        ..Default::default()
    };

    let err = resolver.resolve(&request).await.unwrap_err();
    assert!(matches!(err, AppError::Upstream(_)));
}

#[tokio::test]
async fn test_resolve_without_location_input_is_validation_error() {
    let geocoder = Arc::new(FakeGeocoder::returning(Vec::new()));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());
    let listings = Arc::new(MemoryListingRepository::new());

    let resolver = resolver(geocoder, boundaries, listings);
    let err = resolver.resolve(&ResolveRequest::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_search_boundary_id_not_found() {
    let geocoder = Arc::new(FakeGeocoder::returning(Vec::new()));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());
    let listings = Arc::new(MemoryListingRepository::new());

    let resolver = resolver(geocoder, boundaries, listings);
    let err = resolver
        .search_boundary_id(Uuid::new_v4(), &SearchQueryParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_search_boundary_id_runs_full_pipeline() {
    let geocoder = Arc::new(FakeGeocoder::failing("not used"));
    let boundaries = Arc::new(MemoryBoundaryRepository::new());
    let boundary = fremont_boundary();
    let boundary_id = boundary.id;
    boundaries.seed(boundary).await;

    let listings = Arc::new(MemoryListingRepository::new());
    listings.seed(listing_at(-122.349, 47.658, "inside")).await;
    listings.seed(listing_at(-122.326, 47.669, "outside")).await;

    let resolver = resolver(geocoder, boundaries, listings);
    match resolver
        .search_boundary_id(boundary_id, &SearchQueryParams::default())
        .await
        .unwrap()
    {
        LocationSearchOutcome::Boundary { page, .. } => {
            assert_eq!(page.pagination.number_available, 1);
            assert_eq!(page.listings[0].slug, "inside");
        }
        other => panic!("expected boundary outcome, got {:?}", other),
    }
}
