//! Modelo de listing inmobiliario
//!
//! El slug es único a nivel de store, se asigna en la creación y es
//! inmutable después. La ubicación es un punto [lng, lat].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use geo_types::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Estado de publicación de un listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Active,
    Pending,
    Sold,
    Rented,
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Sold => "sold",
            Self::Rented => "rented",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ListingStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "sold" => Ok(Self::Sold),
            "rented" => Ok(Self::Rented),
            other => Err(AppError::Validation(format!(
                "unrecognized listing status '{}'",
                other
            ))),
        }
    }
}

/// Tipo de propiedad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    House,
    Condo,
    Townhouse,
    MultiFamily,
    Land,
    Other,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::House => "house",
            Self::Condo => "condo",
            Self::Townhouse => "townhouse",
            Self::MultiFamily => "multi_family",
            Self::Land => "land",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Dirección postal de un listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Ventana de open house
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenHouse {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Flags de amenities del listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    pub waterfront: bool,
    pub view: bool,
    pub fireplace: bool,
    pub basement: bool,
    pub garage: bool,
    pub new_construction: bool,
    pub pool: bool,
    pub air_conditioning: bool,
}

/// Registro de propiedad persistido
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub slug: String,
    pub status: ListingStatus,
    pub property_type: PropertyType,
    pub address: ListingAddress,
    /// Punto [lng, lat] en grados
    pub location: Point<f64>,
    pub price: f64,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub square_feet: Option<f64>,
    pub lot_size: Option<f64>,
    pub year_built: Option<i32>,
    pub amenities: Amenities,
    /// Tri-estado: None = no es un alquiler conocido
    pub rental: Option<bool>,
    pub sold_price: Option<f64>,
    pub sold_date: Option<DateTime<Utc>>,
    /// Identificador externo del geocoder, si se conoce
    pub place_id: Option<String>,
    pub open_houses: Vec<OpenHouse>,
    pub listed_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn longitude(&self) -> f64 {
        self.location.x()
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn is_rental(&self) -> bool {
        self.rental.unwrap_or(false)
    }

    /// Matching por campos de dirección (line1/city/state/zip),
    /// case-insensitive
    pub fn matches_address(&self, line1: &str, city: &str, state: &str, zip: &str) -> bool {
        self.address.line1.eq_ignore_ascii_case(line1.trim())
            && self.address.city.eq_ignore_ascii_case(city.trim())
            && self.address.state.eq_ignore_ascii_case(state.trim())
            && self.address.zip.trim() == zip.trim()
    }
}

/// Datos de creación de un listing, con el slug ya derivado.
/// El store asigna id y timestamps.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub slug: String,
    pub status: ListingStatus,
    pub property_type: PropertyType,
    pub address: ListingAddress,
    pub location: Point<f64>,
    pub price: f64,
    pub beds: Option<f64>,
    pub baths: Option<f64>,
    pub square_feet: Option<f64>,
    pub lot_size: Option<f64>,
    pub year_built: Option<i32>,
    pub amenities: Amenities,
    pub rental: Option<bool>,
    pub place_id: Option<String>,
    pub open_houses: Vec<OpenHouse>,
    pub listed_date: DateTime<Utc>,
}

impl NewListing {
    pub fn into_listing(self, id: Uuid, now: DateTime<Utc>) -> Listing {
        Listing {
            id,
            slug: self.slug,
            status: self.status,
            property_type: self.property_type,
            address: self.address,
            location: self.location,
            price: self.price,
            beds: self.beds,
            baths: self.baths,
            square_feet: self.square_feet,
            lot_size: self.lot_size,
            year_built: self.year_built,
            amenities: self.amenities,
            rental: self.rental,
            sold_price: None,
            sold_date: None,
            place_id: self.place_id,
            open_houses: self.open_houses,
            listed_date: self.listed_date,
            created_at: now,
            updated_at: now,
        }
    }
}
