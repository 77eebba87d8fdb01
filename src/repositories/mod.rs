//! Repositorios: traits de los stores externos e implementaciones en memoria

pub mod boundary_repository;
pub mod listing_repository;

pub use boundary_repository::{BoundaryRepository, MemoryBoundaryRepository};
pub use listing_repository::{
    AddressQuery, BoundedQueryResult, ListingQuery, ListingRepository, MemoryListingRepository,
    SortSpec,
};
