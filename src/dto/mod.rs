//! DTOs de request y response del crate

pub mod boundary_dto;
pub mod listing_dto;
pub mod search_dto;
