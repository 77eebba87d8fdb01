//! Derivación de slugs únicos para listings
//!
//! El slug se deriva de forma determinística de la dirección del listing:
//! concatenación de los campos no vacíos, en minúsculas y URL-safe.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::listing::ListingAddress;

lazy_static! {
    // Todo lo que no sea alfanumérico se colapsa a un solo guión
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Normaliza un texto arbitrario a formato slug (minúsculas, `[a-z0-9-]`)
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let dashed = NON_ALNUM.replace_all(&lowered, "-");
    dashed.trim_matches('-').to_string()
}

/// Deriva el slug base de una dirección: campos no vacíos concatenados
pub fn slug_from_address(address: &ListingAddress) -> String {
    let parts: Vec<&str> = [
        Some(address.line1.as_str()),
        address.line2.as_deref(),
        Some(address.city.as_str()),
        Some(address.state.as_str()),
        Some(address.zip.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect();

    slugify(&parts.join(" "))
}

/// Variante del slug para el intento `attempt` del loop de creación.
/// El intento 0 usa el slug base; los siguientes agregan `-1`, `-2`, ...
pub fn slug_for_attempt(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}
