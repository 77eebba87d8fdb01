//! Creación de listings con reintentos acotados
//!
//! La unicidad del slug la hace cumplir el store, no un lock de aplicación.
//! Ante una colisión reportada por el store se reintenta el alta completa
//! con una variante sufijada del slug, hasta un máximo acotado de intentos.

use std::sync::Arc;

use tracing::{info, warn};

use crate::dto::listing_dto::NewListingRequest;
use crate::models::listing::Listing;
use crate::repositories::ListingRepository;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::slug::{slug_for_attempt, slug_from_address};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

pub struct ListingCreationService {
    listings: Arc<dyn ListingRepository>,
}

impl ListingCreationService {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn create_listing(&self, request: NewListingRequest) -> AppResult<Listing> {
        self.create_listing_with_attempts(request, DEFAULT_MAX_ATTEMPTS)
            .await
    }

    /// Crea un listing reintentando colisiones de slug hasta `max_attempts`
    /// intentos. `max_attempts = 0` deshabilita el reintento: una colisión
    /// es falla inmediata (fail-fast, usado por seeding controlado).
    ///
    /// Solo `DuplicateSlug` se reintenta; cualquier otro error del store
    /// se propaga sin tocar.
    pub async fn create_listing_with_attempts(
        &self,
        request: NewListingRequest,
        max_attempts: u32,
    ) -> AppResult<Listing> {
        request.check()?;

        let base = slug_from_address(&request.address());
        if base.is_empty() {
            return Err(AppError::Validation(
                "listing address produces an empty slug".to_string(),
            ));
        }

        let tries = max_attempts.max(1);
        let mut data = request.into_new_listing(base.clone());

        for attempt in 0..tries {
            data.slug = slug_for_attempt(&base, attempt);
            match self.listings.create(data.clone()).await {
                Ok(listing) => {
                    info!("✅ Listing created with slug '{}'", listing.slug);
                    return Ok(listing);
                }
                Err(AppError::DuplicateSlug(slug)) => {
                    warn!(
                        "⚠️ Slug collision on '{}' (attempt {}/{})",
                        slug,
                        attempt + 1,
                        tries
                    );
                }
                Err(other) => return Err(other),
            }
        }

        Err(AppError::SlugExhausted {
            slug: base,
            attempts: tries,
        })
    }
}
