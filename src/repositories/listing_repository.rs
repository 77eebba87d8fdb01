//! Repositorio de listings
//!
//! El store documental real es un colaborador externo; acá vive el trait
//! que define su interfaz y una implementación en memoria usada por tests
//! y seeding. El store es quien calcula el total antes de paginar.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use geo::Intersects;
use geo_types::MultiPolygon;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dto::search_dto::{SortField, SortOrder};
use crate::models::listing::{Listing, NewListing};
use crate::services::filter_service::FilterPredicate;
use crate::utils::errors::{AppError, AppResult};

/// Ordenamiento pedido al store
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

/// Query compuesta contra el store de listings
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub predicates: Vec<FilterPredicate>,
    pub sort: SortSpec,
    pub skip: u64,
    pub limit: u64,
}

impl ListingQuery {
    /// Documento de query en el boundary del store: predicados en AND
    pub fn to_query_document(&self) -> Value {
        let fragments: Vec<Value> = self
            .predicates
            .iter()
            .map(FilterPredicate::to_query_fragment)
            .collect();
        json!({ "$and": fragments })
    }
}

/// Matching de listing por campos de dirección
#[derive(Debug, Clone)]
pub struct AddressQuery {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Resultado de una query acotada: página + total sin paginar
#[derive(Debug)]
pub struct BoundedQueryResult {
    pub listings: Vec<Listing>,
    pub total_count: u64,
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Listing>>;
    async fn find_by_place_id(&self, place_id: &str) -> AppResult<Option<Listing>>;

    /// Busca por place id y, si no hay match, por dirección (cuando se da)
    async fn find_by_place_id_or_address(
        &self,
        place_id: Option<&str>,
        address: Option<&AddressQuery>,
    ) -> AppResult<Option<Listing>>;

    /// Listings cuyo punto cae dentro de `geometry`, filtrados por la query.
    /// `total_count` se calcula antes de aplicar skip/limit.
    async fn find_within(
        &self,
        geometry: &MultiPolygon<f64>,
        query: &ListingQuery,
    ) -> AppResult<BoundedQueryResult>;

    /// Crea el listing; slug duplicado se reporta como `DuplicateSlug`
    async fn create(&self, data: NewListing) -> AppResult<Listing>;
}

/// Implementación en memoria del store de listings
pub struct MemoryListingRepository {
    listings: Arc<RwLock<HashMap<Uuid, Listing>>>,
    find_within_calls: AtomicU64,
}

impl MemoryListingRepository {
    pub fn new() -> Self {
        Self {
            listings: Arc::new(RwLock::new(HashMap::new())),
            find_within_calls: AtomicU64::new(0),
        }
    }

    /// Cantidad de queries geográficas ejecutadas (instrumentación de tests)
    pub fn find_within_calls(&self) -> u64 {
        self.find_within_calls.load(AtomicOrdering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listings.read().await.is_empty()
    }

    /// Siembra un listing ya construido, sin pasar por el flujo de creación
    pub async fn seed(&self, listing: Listing) {
        self.listings.write().await.insert(listing.id, listing);
    }
}

impl Default for MemoryListingRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_value(listing: &Listing, field: SortField) -> Option<f64> {
    match field {
        SortField::Price => Some(listing.price),
        SortField::Beds => listing.beds,
        SortField::Baths => listing.baths,
        SortField::SquareFeet => listing.square_feet,
        SortField::YearBuilt => listing.year_built.map(f64::from),
        // listed_date se compara aparte, no como f64
        SortField::ListedDate => None,
    }
}

fn compare(a: &Listing, b: &Listing, spec: SortSpec) -> Ordering {
    let ordering = match spec.field {
        SortField::ListedDate => a.listed_date.cmp(&b.listed_date),
        field => {
            let av = sort_value(a, field);
            let bv = sort_value(b, field);
            match (av, bv) {
                (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                // Listings sin el campo van al final en cualquier dirección
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }
    };
    match spec.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Listing>> {
        Ok(self.listings.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Listing>> {
        let store = self.listings.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn find_by_place_id(&self, place_id: &str) -> AppResult<Option<Listing>> {
        let store = self.listings.read().await;
        Ok(store
            .values()
            .find(|l| l.place_id.as_deref() == Some(place_id))
            .cloned())
    }

    async fn find_by_place_id_or_address(
        &self,
        place_id: Option<&str>,
        address: Option<&AddressQuery>,
    ) -> AppResult<Option<Listing>> {
        if let Some(place_id) = place_id {
            if let Some(found) = self.find_by_place_id(place_id).await? {
                return Ok(Some(found));
            }
        }

        if let Some(addr) = address {
            let store = self.listings.read().await;
            return Ok(store
                .values()
                .find(|l| l.matches_address(&addr.line1, &addr.city, &addr.state, &addr.zip))
                .cloned());
        }

        Ok(None)
    }

    async fn find_within(
        &self,
        geometry: &MultiPolygon<f64>,
        query: &ListingQuery,
    ) -> AppResult<BoundedQueryResult> {
        self.find_within_calls.fetch_add(1, AtomicOrdering::SeqCst);

        let store = self.listings.read().await;
        let mut matched: Vec<Listing> = store
            .values()
            .filter(|l| geometry.intersects(&l.location))
            .filter(|l| query.predicates.iter().all(|p| p.matches(l)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| compare(a, b, query.sort));

        // El total se fija antes de paginar
        let total_count = matched.len() as u64;
        let listings: Vec<Listing> = matched
            .into_iter()
            .skip(query.skip as usize)
            .take(query.limit as usize)
            .collect();

        Ok(BoundedQueryResult {
            listings,
            total_count,
        })
    }

    async fn create(&self, data: NewListing) -> AppResult<Listing> {
        let mut store = self.listings.write().await;

        // El store es quien hace cumplir la unicidad del slug
        if store.values().any(|l| l.slug == data.slug) {
            return Err(AppError::DuplicateSlug(data.slug));
        }

        let listing = data.into_listing(Uuid::new_v4(), Utc::now());
        store.insert(listing.id, listing.clone());
        Ok(listing)
    }
}
