//! Construcción de predicados de filtrado
//!
//! Función pura: parámetros de búsqueda → lista de predicados independientes.
//! Cada predicado sabe evaluarse contra un `Listing` y expresarse como
//! fragmento de query de document store. El store los combina con AND;
//! este módulo nunca toca almacenamiento.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use crate::dto::search_dto::SearchQueryParams;
use crate::models::listing::{Listing, ListingStatus, PropertyType};

/// Campos numéricos filtrables por rango min/max
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    Price,
    Beds,
    Baths,
    SquareFeet,
    LotSize,
    YearBuilt,
}

impl NumericField {
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Beds => "beds",
            Self::Baths => "baths",
            Self::SquareFeet => "square_feet",
            Self::LotSize => "lot_size",
            Self::YearBuilt => "year_built",
        }
    }

    fn value_of(self, listing: &Listing) -> Option<f64> {
        match self {
            Self::Price => Some(listing.price),
            Self::Beds => listing.beds,
            Self::Baths => listing.baths,
            Self::SquareFeet => listing.square_feet,
            Self::LotSize => listing.lot_size,
            Self::YearBuilt => listing.year_built.map(f64::from),
        }
    }
}

/// Flags de amenities filtrables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmenityField {
    Waterfront,
    View,
    Fireplace,
    Basement,
    Garage,
    NewConstruction,
    Pool,
    AirConditioning,
}

impl AmenityField {
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Waterfront => "amenities.waterfront",
            Self::View => "amenities.view",
            Self::Fireplace => "amenities.fireplace",
            Self::Basement => "amenities.basement",
            Self::Garage => "amenities.garage",
            Self::NewConstruction => "amenities.new_construction",
            Self::Pool => "amenities.pool",
            Self::AirConditioning => "amenities.air_conditioning",
        }
    }

    fn value_of(self, listing: &Listing) -> bool {
        let a = &listing.amenities;
        match self {
            Self::Waterfront => a.waterfront,
            Self::View => a.view,
            Self::Fireplace => a.fireplace,
            Self::Basement => a.basement,
            Self::Garage => a.garage,
            Self::NewConstruction => a.new_construction,
            Self::Pool => a.pool,
            Self::AirConditioning => a.air_conditioning,
        }
    }
}

/// Predicado independiente sobre campos de listing
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    StatusIn(Vec<ListingStatus>),
    /// `Rental(true)` exige flag de alquiler; `Rental(false)` lo excluye
    /// explícitamente (ausente o false, nunca "sin restricción")
    Rental(bool),
    PropertyTypeIn(Vec<PropertyType>),
    SoldSince(DateTime<Utc>),
    /// Al menos un open house cuyo inicio caiga en `[after, before]`
    OpenHouseWindow {
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    },
    /// Rango inclusivo; cada extremo es independiente
    NumericRange {
        field: NumericField,
        min: Option<f64>,
        max: Option<f64>,
    },
    Amenity {
        field: AmenityField,
        value: bool,
    },
}

impl FilterPredicate {
    /// Evalúa el predicado contra un listing concreto
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::StatusIn(statuses) => statuses.contains(&listing.status),
            Self::Rental(true) => listing.rental == Some(true),
            Self::Rental(false) => listing.rental != Some(true),
            Self::PropertyTypeIn(types) => types.contains(&listing.property_type),
            Self::SoldSince(cutoff) => listing.sold_date.map_or(false, |d| d >= *cutoff),
            Self::OpenHouseWindow { after, before } => listing.open_houses.iter().any(|oh| {
                after.map_or(true, |a| oh.starts_at >= a)
                    && before.map_or(true, |b| oh.starts_at <= b)
            }),
            Self::NumericRange { field, min, max } => match field.value_of(listing) {
                Some(value) => {
                    min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi)
                }
                // Un listing sin el campo no satisface un filtro de rango
                None => false,
            },
            Self::Amenity { field, value } => field.value_of(listing) == *value,
        }
    }

    /// Fragmento de query estilo document store para el boundary del store
    pub fn to_query_fragment(&self) -> Value {
        match self {
            Self::StatusIn(statuses) => {
                let values: Vec<String> = statuses.iter().map(ToString::to_string).collect();
                json!({ "status": { "$in": values } })
            }
            Self::Rental(true) => json!({ "rental": true }),
            Self::Rental(false) => json!({ "rental": { "$ne": true } }),
            Self::PropertyTypeIn(types) => {
                let values: Vec<String> = types.iter().map(ToString::to_string).collect();
                json!({ "property_type": { "$in": values } })
            }
            Self::SoldSince(cutoff) => {
                json!({ "sold_date": { "$gte": cutoff.to_rfc3339() } })
            }
            Self::OpenHouseWindow { after, before } => {
                let mut range = serde_json::Map::new();
                if let Some(a) = after {
                    range.insert("$gte".to_string(), json!(a.to_rfc3339()));
                }
                if let Some(b) = before {
                    range.insert("$lte".to_string(), json!(b.to_rfc3339()));
                }
                json!({ "open_houses": { "$elemMatch": { "starts_at": range } } })
            }
            Self::NumericRange { field, min, max } => {
                let mut range = serde_json::Map::new();
                if let Some(lo) = min {
                    range.insert("$gte".to_string(), json!(lo));
                }
                if let Some(hi) = max {
                    range.insert("$lte".to_string(), json!(hi));
                }
                let mut fragment = serde_json::Map::new();
                fragment.insert(field.field_name().to_string(), Value::Object(range));
                Value::Object(fragment)
            }
            Self::Amenity { field, value } => {
                let mut fragment = serde_json::Map::new();
                fragment.insert(field.field_name().to_string(), json!(value));
                Value::Object(fragment)
            }
        }
    }
}

/// Construye los predicados derivables de los parámetros de búsqueda.
/// Los defaults de status y rental se aplican acá, de forma explícita.
pub fn build_filter_predicates(params: &SearchQueryParams) -> Vec<FilterPredicate> {
    build_filter_predicates_at(params, Utc::now())
}

/// Variante determinística para tests: `now` se inyecta
pub fn build_filter_predicates_at(
    params: &SearchQueryParams,
    now: DateTime<Utc>,
) -> Vec<FilterPredicate> {
    let mut predicates = Vec::new();

    // Status: default {active} cuando no hay filtro explícito
    let statuses = match &params.status {
        Some(set) if !set.is_empty() => set.clone(),
        _ => vec![ListingStatus::Active],
    };
    predicates.push(FilterPredicate::StatusIn(statuses));

    // Rental: "sin especificar" excluye alquileres, igual que `Some(false)`.
    // La distinción tri-estado se preserva en el parámetro, no acá.
    predicates.push(FilterPredicate::Rental(params.rental == Some(true)));

    if let Some(types) = &params.property_types {
        if !types.is_empty() {
            predicates.push(FilterPredicate::PropertyTypeIn(types.clone()));
        }
    }

    if let Some(days) = params.sold_in_last_days {
        predicates.push(FilterPredicate::SoldSince(now - Duration::days(days)));
    }

    if params.open_house_after.is_some() || params.open_house_before.is_some() {
        predicates.push(FilterPredicate::OpenHouseWindow {
            after: params.open_house_after,
            before: params.open_house_before,
        });
    }

    let ranges = [
        (NumericField::Price, params.min_price, params.max_price),
        (NumericField::Beds, params.min_beds, params.max_beds),
        (NumericField::Baths, params.min_baths, params.max_baths),
        (
            NumericField::SquareFeet,
            params.min_square_feet,
            params.max_square_feet,
        ),
        (
            NumericField::LotSize,
            params.min_lot_size,
            params.max_lot_size,
        ),
        (
            NumericField::YearBuilt,
            params.min_year_built.map(f64::from),
            params.max_year_built.map(f64::from),
        ),
    ];
    for (field, min, max) in ranges {
        if min.is_some() || max.is_some() {
            predicates.push(FilterPredicate::NumericRange { field, min, max });
        }
    }

    // Amenities: emitidos solo con boolean explícito (tri-estado)
    let amenities = [
        (AmenityField::Waterfront, params.waterfront),
        (AmenityField::View, params.view),
        (AmenityField::Fireplace, params.fireplace),
        (AmenityField::Basement, params.basement),
        (AmenityField::Garage, params.garage),
        (AmenityField::NewConstruction, params.new_construction),
        (AmenityField::Pool, params.pool),
        (AmenityField::AirConditioning, params.air_conditioning),
    ];
    for (field, flag) in amenities {
        if let Some(value) = flag {
            predicates.push(FilterPredicate::Amenity { field, value });
        }
    }

    predicates
}
