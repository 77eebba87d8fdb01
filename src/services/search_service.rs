//! Ejecución de búsquedas paginadas
//!
//! Dada una geometría final y los parámetros de filtrado, compone la query,
//! la ejecuta contra el store de listings y arma la página de resultados
//! con el total calculado antes de paginar.

use std::sync::Arc;

use geo_types::MultiPolygon;
use tracing::{debug, info};

use crate::dto::listing_dto::{ListingSummary, PaginationMeta, SearchResultPage};
use crate::dto::search_dto::SearchQueryParams;
use crate::models::boundary::Boundary;
use crate::models::geometry::Bounds;
use crate::repositories::{ListingQuery, ListingRepository, SortSpec};
use crate::services::clipping_service::clip;
use crate::services::filter_service::build_filter_predicates;
use crate::utils::errors::AppResult;

pub struct SearchService {
    listings: Arc<dyn ListingRepository>,
}

impl SearchService {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    /// Busca listings contenidos en `geometry`, filtrados y paginados.
    /// Un page_index fuera de rango produce una página vacía, no un error.
    pub async fn search_within(
        &self,
        geometry: &MultiPolygon<f64>,
        params: &SearchQueryParams,
    ) -> AppResult<SearchResultPage> {
        params.check()?;

        let query = ListingQuery {
            predicates: build_filter_predicates(params),
            sort: SortSpec {
                field: params.sort_field(),
                order: params.sort_direction(),
            },
            skip: params.skip(),
            limit: u64::from(params.page_size),
        };
        debug!(
            "🔍 Executing listing search: {} predicates, skip {}, limit {}",
            query.predicates.len(),
            query.skip,
            query.limit
        );

        let result = self.listings.find_within(geometry, &query).await?;

        let listings: Vec<ListingSummary> =
            result.listings.iter().map(ListingSummary::from).collect();
        let pagination = PaginationMeta::new(
            params.page_index,
            params.page_size,
            listings.len() as u32,
            result.total_count,
        );

        Ok(SearchResultPage {
            listings,
            pagination,
        })
    }

    /// Flujo de bounds crudos: el rectángulo del viewport es la geometría
    pub async fn search_bounds(
        &self,
        bounds: &Bounds,
        params: &SearchQueryParams,
    ) -> AppResult<SearchResultPage> {
        self.search_within(&bounds.to_geometry(), params).await
    }

    /// Búsqueda dentro de un boundary, recortado al viewport si hay bounds.
    /// Si el recorte no deja nada, corta en seco sin consultar el store.
    pub async fn search_boundary(
        &self,
        boundary: &Boundary,
        params: &SearchQueryParams,
    ) -> AppResult<SearchResultPage> {
        params.check()?;

        match clip(&boundary.geometry, params.bounds.as_ref()) {
            None => {
                info!(
                    "🗺️ Viewport does not overlap boundary '{}'; returning empty page",
                    boundary.name
                );
                Ok(SearchResultPage::empty(params.page_index, params.page_size))
            }
            Some(geometry) => self.search_within(&geometry, params).await,
        }
    }
}
