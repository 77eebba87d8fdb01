//! DTOs de listings
//!
//! Proyecciones de respuesta (nunca el registro completo del store) y el
//! request de creación. El punto geométrico se aplana en longitude/latitude.

use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::listing::{
    Amenities, Listing, ListingAddress, ListingStatus, NewListing, OpenHouse, PropertyType,
};
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{validate_latitude, validate_longitude};

/// Proyección de listing para páginas de resultados
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: Uuid,
    pub slug: String,
    pub status: ListingStatus,
    pub property_type: PropertyType,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub longitude: f64,
    pub latitude: f64,
    pub price: f64,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub square_feet: Option<f64>,
    pub listed_date: DateTime<Utc>,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            slug: listing.slug.clone(),
            status: listing.status,
            property_type: listing.property_type,
            line1: listing.address.line1.clone(),
            line2: listing.address.line2.clone(),
            city: listing.address.city.clone(),
            state: listing.address.state.clone(),
            zip: listing.address.zip.clone(),
            longitude: listing.longitude(),
            latitude: listing.latitude(),
            price: listing.price,
            beds: listing.beds,
            baths: listing.baths,
            square_feet: listing.square_feet,
            listed_date: listing.listed_date,
        }
    }
}

/// Proyección de detalle para resultados de un único listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDetail {
    #[serde(flatten)]
    pub summary: ListingSummary,
    pub lot_size: Option<f64>,
    pub year_built: Option<i32>,
    pub amenities: Amenities,
    pub rental: Option<bool>,
    pub sold_price: Option<f64>,
    pub sold_date: Option<DateTime<Utc>>,
    pub place_id: Option<String>,
    pub open_houses: Vec<OpenHouse>,
}

impl From<&Listing> for ListingDetail {
    fn from(listing: &Listing) -> Self {
        Self {
            summary: ListingSummary::from(listing),
            lot_size: listing.lot_size,
            year_built: listing.year_built,
            amenities: listing.amenities,
            rental: listing.rental,
            sold_price: listing.sold_price,
            sold_date: listing.sold_date,
            place_id: listing.place_id.clone(),
            open_houses: listing.open_houses.clone(),
        }
    }
}

/// Metadata de paginación de una página de resultados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page_index: u32,
    pub page_size: u32,
    /// Cantidad de listings en esta página
    pub number_returned: u32,
    /// Total de matches, independiente de la paginación
    pub number_available: u64,
    pub number_of_pages: u64,
}

impl PaginationMeta {
    pub fn new(page_index: u32, page_size: u32, number_returned: u32, number_available: u64) -> Self {
        let number_of_pages = if page_size == 0 {
            0
        } else {
            number_available.div_ceil(u64::from(page_size))
        };
        Self {
            page_index,
            page_size,
            number_returned,
            number_available,
            number_of_pages,
        }
    }
}

/// Página de resultados de búsqueda
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultPage {
    pub listings: Vec<ListingSummary>,
    pub pagination: PaginationMeta,
}

impl SearchResultPage {
    /// Página vacía con metadata consistente (number_available = 0)
    pub fn empty(page_index: u32, page_size: u32) -> Self {
        Self {
            listings: Vec::new(),
            pagination: PaginationMeta::new(page_index, page_size, 0, 0),
        }
    }
}

/// Request de creación de un listing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewListingRequest {
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    #[validate(length(max = 200))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 50))]
    pub state: String,
    #[validate(length(min = 1, max = 20))]
    pub zip: String,

    pub longitude: f64,
    pub latitude: f64,

    #[validate(range(min = 0.0))]
    pub price: f64,
    pub status: Option<ListingStatus>,
    pub property_type: PropertyType,

    #[validate(range(min = 0.0))]
    pub beds: Option<f64>,
    #[validate(range(min = 0.0))]
    pub baths: Option<f64>,
    #[validate(range(min = 0.0))]
    pub square_feet: Option<f64>,
    #[validate(range(min = 0.0))]
    pub lot_size: Option<f64>,
    #[validate(range(min = 1000, max = 3000))]
    pub year_built: Option<i32>,

    #[serde(default)]
    pub amenities: Amenities,
    pub rental: Option<bool>,
    pub place_id: Option<String>,
    #[serde(default)]
    pub open_houses: Vec<OpenHouse>,
    pub listed_date: Option<DateTime<Utc>>,
}

impl NewListingRequest {
    pub fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_longitude(self.longitude)
            .map_err(|_| AppError::Validation(format!("invalid longitude {}", self.longitude)))?;
        validate_latitude(self.latitude)
            .map_err(|_| AppError::Validation(format!("invalid latitude {}", self.latitude)))?;
        Ok(())
    }

    pub fn address(&self) -> ListingAddress {
        ListingAddress {
            line1: self.line1.clone(),
            line2: self.line2.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip: self.zip.clone(),
        }
    }

    /// Materializa los datos de creación con el slug ya derivado
    pub fn into_new_listing(self, slug: String) -> NewListing {
        let location = Point::new(self.longitude, self.latitude);
        let listed_date = self.listed_date.unwrap_or_else(Utc::now);
        NewListing {
            slug,
            status: self.status.unwrap_or(ListingStatus::Active),
            property_type: self.property_type,
            address: ListingAddress {
                line1: self.line1,
                line2: self.line2,
                city: self.city,
                state: self.state,
                zip: self.zip,
            },
            location,
            price: self.price,
            beds: self.beds,
            baths: self.baths,
            square_feet: self.square_feet,
            lot_size: self.lot_size,
            year_built: self.year_built,
            amenities: self.amenities,
            rental: self.rental,
            place_id: self.place_id,
            open_houses: self.open_houses,
            listed_date,
        }
    }
}
