//! Tests de creación de listings: derivación de slug, reintentos acotados
//! ante colisiones de unicidad y propagación de errores del store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use geo_types::MultiPolygon;
use uuid::Uuid;

use property_search::{
    AddressQuery, AppError, AppResult, BoundedQueryResult, Listing, ListingCreationService,
    ListingQuery, ListingRepository, MemoryListingRepository, NewListing, NewListingRequest,
    PropertyType,
};
use property_search::{Amenities, ListingStatus};

fn request(line1: &str) -> NewListingRequest {
    NewListingRequest {
        line1: line1.to_string(),
        line2: None,
        city: "Seattle".to_string(),
        state: "WA".to_string(),
        zip: "98103".to_string(),
        longitude: -122.349,
        latitude: 47.658,
        price: 750_000.0,
        status: None,
        property_type: PropertyType::House,
        beds: Some(3.0),
        baths: Some(2.0),
        square_feet: Some(1800.0),
        lot_size: None,
        year_built: Some(1962),
        amenities: Amenities::default(),
        rental: None,
        place_id: None,
        open_houses: Vec::new(),
        listed_date: None,
    }
}

#[tokio::test]
async fn test_create_assigns_derived_slug_and_defaults() {
    let listings = Arc::new(MemoryListingRepository::new());
    let service = ListingCreationService::new(listings.clone());

    let created = service.create_listing(request("742 N 34th St")).await.unwrap();
    assert_eq!(created.slug, "742-n-34th-st-seattle-wa-98103");
    assert_eq!(created.status, ListingStatus::Active);
    assert_eq!(listings.len().await, 1);
}

#[tokio::test]
async fn test_sequential_collisions_get_suffixed_slugs() {
    let listings = Arc::new(MemoryListingRepository::new());
    let service = ListingCreationService::new(listings.clone());

    let first = service.create_listing(request("742 N 34th St")).await.unwrap();
    let second = service.create_listing(request("742 N 34th St")).await.unwrap();
    let third = service.create_listing(request("742 N 34th St")).await.unwrap();

    assert_eq!(first.slug, "742-n-34th-st-seattle-wa-98103");
    assert_eq!(second.slug, "742-n-34th-st-seattle-wa-98103-1");
    assert_eq!(third.slug, "742-n-34th-st-seattle-wa-98103-2");
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[tokio::test]
async fn test_concurrent_duplicate_addresses_never_fail() {
    init_tracing();
    let listings = Arc::new(MemoryListingRepository::new());
    let service = Arc::new(ListingCreationService::new(listings.clone()));

    let (a, b) = tokio::join!(
        service.create_listing(request("742 N 34th St")),
        service.create_listing(request("742 N 34th St")),
    );

    let a = a.unwrap();
    let b = b.unwrap();
    let mut slugs = vec![a.slug, b.slug];
    slugs.sort();
    assert_eq!(
        slugs,
        vec![
            "742-n-34th-st-seattle-wa-98103".to_string(),
            "742-n-34th-st-seattle-wa-98103-1".to_string(),
        ]
    );
    assert_eq!(listings.len().await, 2);
}

#[tokio::test]
async fn test_zero_attempts_fails_fast_on_collision() {
    let listings = Arc::new(MemoryListingRepository::new());
    let service = ListingCreationService::new(listings.clone());

    service.create_listing(request("742 N 34th St")).await.unwrap();

    let err = service
        .create_listing_with_attempts(request("742 N 34th St"), 0)
        .await
        .unwrap_err();
    match err {
        AppError::SlugExhausted { attempts, .. } => assert_eq!(attempts, 1),
        other => panic!("expected SlugExhausted, got {:?}", other),
    }
    assert_eq!(listings.len().await, 1);
}

#[tokio::test]
async fn test_exhaustion_after_max_attempts() {
    let listings = Arc::new(MemoryListingRepository::new());
    let service = ListingCreationService::new(listings.clone());

    // Ocupa el slug base y sus cuatro variantes siguientes
    for _ in 0..5 {
        service.create_listing(request("742 N 34th St")).await.unwrap();
    }

    let err = service
        .create_listing_with_attempts(request("742 N 34th St"), 5)
        .await
        .unwrap_err();
    match err {
        AppError::SlugExhausted { slug, attempts } => {
            assert_eq!(slug, "742-n-34th-st-seattle-wa-98103");
            assert_eq!(attempts, 5);
        }
        other => panic!("expected SlugExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_validation_rejects_empty_address() {
    let listings = Arc::new(MemoryListingRepository::new());
    let service = ListingCreationService::new(listings);

    let mut bad = request("742 N 34th St");
    bad.line1 = String::new();
    let err = service.create_listing(bad).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Propagación de errores del store distintos a la colisión de slug
// ---------------------------------------------------------------------------

/// Store que falla todas las creaciones con un error genérico
struct BrokenStore {
    create_calls: AtomicU64,
}

#[async_trait]
impl ListingRepository for BrokenStore {
    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<Listing>> {
        Ok(None)
    }

    async fn find_by_ids(&self, _ids: &[Uuid]) -> AppResult<Vec<Listing>> {
        Ok(Vec::new())
    }

    async fn find_by_place_id(&self, _place_id: &str) -> AppResult<Option<Listing>> {
        Ok(None)
    }

    async fn find_by_place_id_or_address(
        &self,
        _place_id: Option<&str>,
        _address: Option<&AddressQuery>,
    ) -> AppResult<Option<Listing>> {
        Ok(None)
    }

    async fn find_within(
        &self,
        _geometry: &MultiPolygon<f64>,
        _query: &ListingQuery,
    ) -> AppResult<BoundedQueryResult> {
        Ok(BoundedQueryResult {
            listings: Vec::new(),
            total_count: 0,
        })
    }

    async fn create(&self, _data: NewListing) -> AppResult<Listing> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::Store("connection reset".to_string()))
    }
}

#[tokio::test]
async fn test_store_errors_propagate_without_retry() {
    let store = Arc::new(BrokenStore {
        create_calls: AtomicU64::new(0),
    });
    let service = ListingCreationService::new(store.clone());

    let err = service.create_listing(request("742 N 34th St")).await.unwrap_err();
    assert!(matches!(err, AppError::Store(_)));
    // Un solo intento: los errores que no son DuplicateSlug no se reintentan
    assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
}
