//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos del dominio: listings,
//! boundaries y tipos geográficos compartidos.

pub mod boundary;
pub mod geometry;
pub mod listing;
