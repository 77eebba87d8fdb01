//! DTOs de búsqueda
//!
//! Parámetros validados de búsqueda de listings. Los filtros booleanos son
//! tri-estado (`Option<bool>`): `None` significa "sin restricción" y
//! `Some(false)` significa "debe ser false". Nunca se colapsan.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::geometry::Bounds;
use crate::models::listing::{ListingStatus, PropertyType};
use crate::utils::errors::{AppError, AppResult};

/// Campo de ordenamiento de resultados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    ListedDate,
    Price,
    Beds,
    Baths,
    SquareFeet,
    YearBuilt,
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listed_date" => Ok(Self::ListedDate),
            "price" => Ok(Self::Price),
            "beds" => Ok(Self::Beds),
            "baths" => Ok(Self::Baths),
            "square_feet" => Ok(Self::SquareFeet),
            "year_built" => Ok(Self::YearBuilt),
            other => Err(AppError::Validation(format!(
                "unrecognized sort field '{}'",
                other
            ))),
        }
    }
}

/// Dirección de ordenamiento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Parámetros de búsqueda validados
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchQueryParams {
    /// Viewport visible del mapa; todo-o-nada (ver `Bounds::from_partial`)
    pub bounds: Option<Bounds>,

    /// Sin filtro explícito el default es `{active}`
    pub status: Option<Vec<ListingStatus>>,
    pub property_types: Option<Vec<PropertyType>>,

    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_beds: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_beds: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_baths: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_baths: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_square_feet: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_square_feet: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_lot_size: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_lot_size: Option<f64>,
    #[validate(range(min = 1000, max = 3000))]
    pub min_year_built: Option<i32>,
    #[validate(range(min = 1000, max = 3000))]
    pub max_year_built: Option<i32>,

    /// Listings vendidos en los últimos N días
    #[validate(range(min = 1))]
    pub sold_in_last_days: Option<i64>,

    pub open_house_after: Option<DateTime<Utc>>,
    pub open_house_before: Option<DateTime<Utc>>,

    /// Tri-estado: `None` excluye alquileres por default (decisión deliberada,
    /// no es equivalente a "sin restricción")
    pub rental: Option<bool>,

    // Amenities tri-estado
    pub waterfront: Option<bool>,
    pub view: Option<bool>,
    pub fireplace: Option<bool>,
    pub basement: Option<bool>,
    pub garage: Option<bool>,
    pub new_construction: Option<bool>,
    pub pool: Option<bool>,
    pub air_conditioning: Option<bool>,

    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,

    /// Página basada en cero
    pub page_index: u32,
    #[validate(range(min = 1, max = 200))]
    pub page_size: u32,
}

impl Default for SearchQueryParams {
    fn default() -> Self {
        Self {
            bounds: None,
            status: None,
            property_types: None,
            min_price: None,
            max_price: None,
            min_beds: None,
            max_beds: None,
            min_baths: None,
            max_baths: None,
            min_square_feet: None,
            max_square_feet: None,
            min_lot_size: None,
            max_lot_size: None,
            min_year_built: None,
            max_year_built: None,
            sold_in_last_days: None,
            open_house_after: None,
            open_house_before: None,
            rental: None,
            waterfront: None,
            view: None,
            fireplace: None,
            basement: None,
            garage: None,
            new_construction: None,
            pool: None,
            air_conditioning: None,
            sort_by: None,
            sort_order: None,
            page_index: 0,
            page_size: 20,
        }
    }
}

impl SearchQueryParams {
    /// Valida campos individuales y contradicciones entre min/max
    pub fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        check_pair("price", self.min_price, self.max_price)?;
        check_pair("beds", self.min_beds, self.max_beds)?;
        check_pair("baths", self.min_baths, self.max_baths)?;
        check_pair("square_feet", self.min_square_feet, self.max_square_feet)?;
        check_pair("lot_size", self.min_lot_size, self.max_lot_size)?;
        check_pair(
            "year_built",
            self.min_year_built.map(f64::from),
            self.max_year_built.map(f64::from),
        )?;

        if let (Some(after), Some(before)) = (self.open_house_after, self.open_house_before) {
            if after > before {
                return Err(AppError::Validation(
                    "open_house_after must not be later than open_house_before".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_by.unwrap_or(SortField::ListedDate)
    }

    pub fn sort_direction(&self) -> SortOrder {
        // Default: listings más recientes primero
        self.sort_order.unwrap_or(SortOrder::Desc)
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }
}

fn check_pair(field: &str, min: Option<f64>, max: Option<f64>) -> AppResult<()> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(AppError::Validation(format!(
                "min_{field} ({lo}) is greater than max_{field} ({hi})"
            )));
        }
    }
    Ok(())
}
