use std::path::Path;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::page::Page;
use crate::domain::points::PointsEntry;
use crate::domain::ports::{
    AuthApi, CartApi, MediaApi, OrderApi, PointsApi, ProductApi, ReportApi,
};
use crate::domain::product::{Product, ProductPatch};
use crate::domain::report::{GeneratedReport, ReportFormat};
use crate::domain::session::{Credentials, PasswordReset, Registration, Session};
use crate::errors::ApiError;

use super::dto::{
    malformed, BalanceDto, CartDto, Envelope, GeneratedReportDto, OrderDto, PageDto,
    PointsEntryDto, ProductDto, SessionDto,
};

// Transport-level failures only; everything the server actually said goes
// through the envelope instead.
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// reqwest-backed adapter for every gateway port, speaking the
/// `{ success, message, data, errors }` envelope with bearer-token auth.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpGateway {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Install the bearer token after login; cleared at logout.
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self
            .token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send, parse the envelope and unpack `data`.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        Self::parse::<T>(self.authorized(builder).send().await?)
            .await?
            .into_result()
    }

    /// Send for operations whose success carries no payload.
    async fn send_ack(&self, builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        Self::parse::<serde_json::Value>(self.authorized(builder).send().await?)
            .await?
            .into_ack()
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Envelope<T>, ApiError> {
        let status = response.status();
        let body = response.bytes().await?;
        match serde_json::from_slice::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            // Non-JSON error pages (proxies, crashes) still map into the
            // taxonomy instead of leaking serde noise to the user.
            Err(e) if status.is_success() => Err(malformed(e)),
            Err(_) => Err(ApiError::Server(format!(
                "Request failed with status {status}"
            ))),
        }
    }
}

#[async_trait]
impl CartApi for HttpGateway {
    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.send::<CartDto>(self.http.get(self.url("/cart")))
            .await?
            .into_domain()
    }

    async fn update_cart_item(&self, item_id: Uuid, quantity: i32) -> Result<(), ApiError> {
        self.send_ack(
            self.http
                .put(self.url(&format!("/cart/items/{item_id}")))
                .json(&json!({ "quantity": quantity })),
        )
        .await
    }

    async fn remove_cart_item(&self, item_id: Uuid) -> Result<(), ApiError> {
        self.send_ack(self.http.delete(self.url(&format!("/cart/items/{item_id}"))))
            .await
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.send_ack(self.http.delete(self.url("/cart"))).await
    }
}

#[async_trait]
impl OrderApi for HttpGateway {
    async fn list_orders(&self, page: i64, limit: i64) -> Result<Page<Order>, ApiError> {
        self.send::<PageDto<OrderDto>>(
            self.http
                .get(self.url("/orders"))
                .query(&[("page", page), ("limit", limit)]),
        )
        .await?
        .into_domain(OrderDto::into_domain)
    }

    async fn fetch_order(&self, order_id: Uuid) -> Result<Order, ApiError> {
        self.send::<OrderDto>(self.http.get(self.url(&format!("/orders/{order_id}"))))
            .await?
            .into_domain()
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        self.send_ack(
            self.http
                .put(self.url(&format!("/orders/{order_id}/status")))
                .json(&json!({ "status": status.as_str() })),
        )
        .await
    }
}

#[async_trait]
impl ProductApi for HttpGateway {
    async fn list_products(&self, page: i64, limit: i64) -> Result<Page<Product>, ApiError> {
        self.send::<PageDto<ProductDto>>(
            self.http
                .get(self.url("/products"))
                .query(&[("page", page), ("limit", limit)]),
        )
        .await?
        .into_domain(ProductDto::into_domain)
    }

    async fn update_product(
        &self,
        product_id: Uuid,
        patch: &ProductPatch,
    ) -> Result<(), ApiError> {
        self.send_ack(
            self.http
                .patch(self.url(&format!("/products/{product_id}")))
                .json(patch),
        )
        .await
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<(), ApiError> {
        self.send_ack(self.http.delete(self.url(&format!("/products/{product_id}"))))
            .await
    }
}

#[async_trait]
impl PointsApi for HttpGateway {
    async fn points_balance(&self) -> Result<i64, ApiError> {
        Ok(self
            .send::<BalanceDto>(self.http.get(self.url("/points/balance")))
            .await?
            .balance)
    }

    async fn points_history(&self, page: i64, limit: i64) -> Result<Page<PointsEntry>, ApiError> {
        self.send::<PageDto<PointsEntryDto>>(
            self.http
                .get(self.url("/points/history"))
                .query(&[("page", page), ("limit", limit)]),
        )
        .await?
        .into_domain(PointsEntryDto::into_domain)
    }
}

#[async_trait]
impl AuthApi for HttpGateway {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let session = self
            .send::<SessionDto>(self.http.post(self.url("/auth/login")).json(credentials))
            .await?
            .into_domain();
        self.set_token(Some(session.token.clone()));
        Ok(session)
    }

    async fn register(&self, registration: &Registration) -> Result<Session, ApiError> {
        let session = self
            .send::<SessionDto>(
                self.http
                    .post(self.url("/auth/register"))
                    .json(registration),
            )
            .await?
            .into_domain();
        self.set_token(Some(session.token.clone()));
        Ok(session)
    }

    async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        self.send_ack(
            self.http
                .post(self.url("/auth/forgot-password"))
                .json(&json!({ "email": email })),
        )
        .await
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<(), ApiError> {
        self.send_ack(self.http.post(self.url("/auth/reset-password")).json(reset))
            .await
    }
}

#[async_trait]
impl ReportApi for HttpGateway {
    async fn generate_report(
        &self,
        subject_id: Uuid,
        kind: &str,
        format: ReportFormat,
    ) -> Result<GeneratedReport, ApiError> {
        Ok(self
            .send::<GeneratedReportDto>(self.http.post(self.url("/reports/generate")).json(
                &json!({
                    "subject_id": subject_id,
                    "type": kind,
                    "format": format.as_str(),
                }),
            ))
            .await?
            .into_domain())
    }
}

#[async_trait]
impl MediaApi for HttpGateway {
    async fn upload_video(
        &self,
        subject_id: Uuid,
        title: &str,
        path: &Path,
    ) -> Result<(), ApiError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "capture.mp4".to_string());
        // Captured videos can run to hundreds of MB; stream the body
        // instead of buffering it.
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let form = multipart::Form::new()
            .text("subject_id", subject_id.to_string())
            .text("title", title.to_string())
            .part(
                "video",
                multipart::Part::stream_with_length(body, length)
                    .file_name(file_name)
                    .mime_str("video/mp4")?,
            );
        self.send_ack(self.http.post(self.url("/media/videos")).multipart(form))
            .await
    }
}
