use std::sync::Arc;

use uuid::Uuid;

use crate::domain::page::{clamp_params, Page};
use crate::domain::ports::ProductApi;
use crate::domain::product::{Product, ProductPatch};
use crate::errors::ApiError;

/// Admin catalogue operations. Deletion is destructive and gated on the
/// same explicit confirmation pattern as order cancellation.
pub struct ProductAdminWorkflow<G> {
    gateway: Arc<G>,
}

impl<G: ProductApi> ProductAdminWorkflow<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        ProductAdminWorkflow { gateway }
    }

    pub async fn list(&self, page: i64, limit: i64) -> Result<Page<Product>, ApiError> {
        let (page, limit) = clamp_params(page, limit);
        self.gateway.list_products(page, limit).await
    }

    /// Partial update; the common case is toggling `active`.
    pub async fn set_active(&self, product_id: Uuid, active: bool) -> Result<(), ApiError> {
        self.gateway
            .update_product(product_id, &ProductPatch::set_active(active))
            .await
    }

    pub async fn update(&self, product_id: Uuid, patch: &ProductPatch) -> Result<(), ApiError> {
        self.gateway.update_product(product_id, patch).await
    }

    /// Returns true if the delete request was sent (i.e. confirmed).
    pub async fn delete(&self, product_id: Uuid, confirmed: bool) -> Result<bool, ApiError> {
        if !confirmed {
            return Ok(false);
        }
        self.gateway.delete_product(product_id).await?;
        Ok(true)
    }
}
