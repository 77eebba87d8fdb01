//! Utilidades compartidas del sistema

pub mod errors;
pub mod slug;
pub mod validation;
