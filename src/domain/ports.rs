//! Ports to the external collaborators this layer consumes as opaque
//! request/response contracts: the remote API gateway, the persisted
//! session, the download sink and the platform document viewer.

use std::path::Path;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ApiError;

use super::cart::Cart;
use super::order::{Order, OrderStatus};
use super::page::Page;
use super::points::PointsEntry;
use super::product::{Product, ProductPatch};
use super::report::{GeneratedReport, ReportFormat};
use super::session::{Credentials, PasswordReset, Registration, Session};

#[async_trait]
pub trait CartApi: Send + Sync + 'static {
    async fn fetch_cart(&self) -> Result<Cart, ApiError>;
    async fn update_cart_item(&self, item_id: Uuid, quantity: i32) -> Result<(), ApiError>;
    async fn remove_cart_item(&self, item_id: Uuid) -> Result<(), ApiError>;
    async fn clear_cart(&self) -> Result<(), ApiError>;
}

#[async_trait]
pub trait OrderApi: Send + Sync + 'static {
    async fn list_orders(&self, page: i64, limit: i64) -> Result<Page<Order>, ApiError>;
    async fn fetch_order(&self, order_id: Uuid) -> Result<Order, ApiError>;
    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), ApiError>;
}

#[async_trait]
pub trait ProductApi: Send + Sync + 'static {
    async fn list_products(&self, page: i64, limit: i64) -> Result<Page<Product>, ApiError>;
    async fn update_product(&self, product_id: Uuid, patch: &ProductPatch)
        -> Result<(), ApiError>;
    async fn delete_product(&self, product_id: Uuid) -> Result<(), ApiError>;
}

#[async_trait]
pub trait PointsApi: Send + Sync + 'static {
    async fn points_balance(&self) -> Result<i64, ApiError>;
    async fn points_history(&self, page: i64, limit: i64) -> Result<Page<PointsEntry>, ApiError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync + 'static {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError>;
    async fn register(&self, registration: &Registration) -> Result<Session, ApiError>;
    async fn forgot_password(&self, email: &str) -> Result<(), ApiError>;
    async fn reset_password(&self, reset: &PasswordReset) -> Result<(), ApiError>;
}

#[async_trait]
pub trait ReportApi: Send + Sync + 'static {
    /// Ask the backend to produce a report for `subject_id`; the response
    /// carries the URL and file name to download.
    async fn generate_report(
        &self,
        subject_id: Uuid,
        kind: &str,
        format: ReportFormat,
    ) -> Result<GeneratedReport, ApiError>;
}

#[async_trait]
pub trait MediaApi: Send + Sync + 'static {
    async fn upload_video(&self, subject_id: Uuid, title: &str, path: &Path)
        -> Result<(), ApiError>;
}

/// Persisted session storage (token, user id, serialized profile). Written
/// at login/registration, cleared at logout, read by everything else.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn save(&self, session: &Session) -> Result<(), ApiError>;
    async fn load(&self) -> Result<Option<Session>, ApiError>;
    async fn clear(&self) -> Result<(), ApiError>;
}

/// Streams a report body to local storage, reporting whole-percent progress.
#[async_trait]
pub trait ReportSink: Send + Sync + 'static {
    /// Download `url` into `dest`. `on_progress` receives 0..=100, derived
    /// from bytes written over content length when the latter is known.
    /// Returns the number of bytes written.
    async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(u8) + Send),
    ) -> Result<u64, ApiError>;

    /// Remove a file that failed verification.
    async fn discard(&self, dest: &Path) -> Result<(), ApiError>;
}

/// Hands a verified file to the platform's document viewer.
#[async_trait]
pub trait DocumentViewer: Send + Sync + 'static {
    async fn open(&self, path: &Path) -> Result<(), ApiError>;
}
