use std::sync::Arc;

use crate::domain::page::{clamp_params, Page};
use crate::domain::points::PointsEntry;
use crate::domain::ports::PointsApi;
use crate::errors::ApiError;

/// Points balance and paginated ledger history for the points screen.
pub struct PointsWorkflow<G> {
    gateway: Arc<G>,
}

impl<G: PointsApi> PointsWorkflow<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        PointsWorkflow { gateway }
    }

    pub async fn balance(&self) -> Result<i64, ApiError> {
        self.gateway.points_balance().await
    }

    pub async fn history(&self, page: i64, limit: i64) -> Result<Page<PointsEntry>, ApiError> {
        let (page, limit) = clamp_params(page, limit);
        self.gateway.points_history(page, limit).await
    }
}
