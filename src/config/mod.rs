//! Configuración del crate

pub mod environment;

pub use environment::EnvironmentConfig;
