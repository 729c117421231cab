//! Wire DTOs for the API gateway. Decimal amounts travel as strings to
//! avoid floating-point issues, and are parsed into `BigDecimal` at the
//! edge; everything past this module is domain types.

use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem, ProductRef};
use crate::domain::order::{CustomerRef, Order, OrderItem, OrderStatus};
use crate::domain::page::Page;
use crate::domain::points::{PointsEntry, PointsReason};
use crate::domain::product::Product;
use crate::domain::report::{GeneratedReport, ReportFormat};
use crate::domain::session::{Session, UserProfile};
use crate::errors::{ApiError, FieldError};

/// Standard response envelope: `{ success, message, data, errors }`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl<T> Envelope<T> {
    /// Map the envelope into the error taxonomy: field errors beat the
    /// generic message, and a missing `success` counts as failure.
    pub fn into_result(self) -> Result<T, ApiError> {
        self.check()?;
        self.data
            .ok_or_else(|| malformed("response envelope has no data"))
    }

    /// For operations whose success carries no payload.
    pub fn into_ack(self) -> Result<(), ApiError> {
        self.check()
    }

    fn check(&self) -> Result<(), ApiError> {
        if let Some(errors) = self.errors.as_ref().filter(|e| !e.is_empty()) {
            let fields = errors
                .iter()
                .flat_map(|(field, messages)| {
                    messages.iter().map(move |message| FieldError {
                        field: field.clone(),
                        message: message.clone(),
                    })
                })
                .collect();
            return Err(ApiError::Validation {
                message: self
                    .message
                    .clone()
                    .unwrap_or_else(|| "The given data was invalid.".to_string()),
                fields,
            });
        }
        if !self.success {
            return Err(ApiError::Server(
                self.message
                    .clone()
                    .unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        Ok(())
    }
}

pub fn malformed(detail: impl std::fmt::Display) -> ApiError {
    ApiError::Transport(format!("Malformed response: {detail}"))
}

fn decimal(field: &str, raw: &str) -> Result<BigDecimal, ApiError> {
    BigDecimal::from_str(raw).map_err(|e| malformed(format!("invalid {field} '{raw}': {e}")))
}

// ── Cart ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProductRefDto {
    pub id: Uuid,
    pub name: String,
    pub price: String,
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductRefDto {
    fn into_domain(self) -> Result<ProductRef, ApiError> {
        Ok(ProductRef {
            id: self.id,
            name: self.name,
            price: decimal("price", &self.price)?,
            stock: self.stock,
            image_url: self.image_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CartItemDto {
    pub id: Uuid,
    pub product: ProductRefDto,
    pub unit_price: String,
    pub quantity: i32,
    pub line_total: String,
    #[serde(default)]
    pub points_used: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CartDto {
    pub items: Vec<CartItemDto>,
    pub subtotal: String,
    pub tax_amount: String,
    pub shipping_amount: String,
    pub total_amount: String,
    pub total_items: i64,
    pub total_points_used: i64,
}

impl CartDto {
    pub fn into_domain(self) -> Result<Cart, ApiError> {
        let items = self
            .items
            .into_iter()
            .map(|i| {
                Ok(CartItem {
                    id: i.id,
                    unit_price: decimal("unit_price", &i.unit_price)?,
                    quantity: i.quantity,
                    line_total: decimal("line_total", &i.line_total)?,
                    points_used: i.points_used,
                    product: i.product.into_domain()?,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(Cart {
            items,
            subtotal: decimal("subtotal", &self.subtotal)?,
            tax_amount: decimal("tax_amount", &self.tax_amount)?,
            shipping_amount: decimal("shipping_amount", &self.shipping_amount)?,
            total_amount: decimal("total_amount", &self.total_amount)?,
            total_items: self.total_items,
            total_points_used: self.total_points_used,
        })
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OrderItemDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderDto {
    pub id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItemDto>,
    pub total_amount: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub customer: Option<CustomerDto>,
}

impl OrderDto {
    pub fn into_domain(self) -> Result<Order, ApiError> {
        let items = self
            .items
            .into_iter()
            .map(|i| {
                Ok(OrderItem {
                    id: i.id,
                    product_id: i.product_id,
                    name: i.name,
                    quantity: i.quantity,
                    unit_price: decimal("unit_price", &i.unit_price)?,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            status: self.status,
            items,
            total_amount: decimal("total_amount", &self.total_amount)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            customer: self.customer.map(|c| CustomerRef {
                id: c.id,
                name: c.name,
                email: c.email,
            }),
        })
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> PageDto<T> {
    pub fn into_domain<U>(
        self,
        convert: impl Fn(T) -> Result<U, ApiError>,
    ) -> Result<Page<U>, ApiError> {
        Ok(Page {
            items: self
                .items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, ApiError>>()?,
            total: self.total,
            page: self.page,
            limit: self.limit,
        })
    }
}

// ── Products / points / auth / reports ───────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub price: String,
    pub stock: i32,
    pub active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductDto {
    pub fn into_domain(self) -> Result<Product, ApiError> {
        Ok(Product {
            id: self.id,
            name: self.name,
            price: decimal("price", &self.price)?,
            stock: self.stock,
            active: self.active,
            image_url: self.image_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BalanceDto {
    pub balance: i64,
}

#[derive(Debug, Deserialize)]
pub struct PointsEntryDto {
    pub id: Uuid,
    pub reason: PointsReason,
    pub points_change: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl PointsEntryDto {
    pub fn into_domain(self) -> Result<PointsEntry, ApiError> {
        Ok(PointsEntry {
            id: self.id,
            reason: self.reason,
            points_change: self.points_change,
            description: self.description,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionDto {
    pub token: String,
    pub user: UserProfileDto,
}

#[derive(Debug, Deserialize)]
pub struct UserProfileDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl SessionDto {
    pub fn into_domain(self) -> Session {
        Session {
            token: self.token,
            user: UserProfile {
                id: self.user.id,
                name: self.user.name,
                email: self.user.email,
                is_admin: self.user.is_admin,
                created_at: self.user.created_at,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneratedReportDto {
    pub format: ReportFormat,
    pub download_url: String,
    pub file_name: String,
}

impl GeneratedReportDto {
    pub fn into_domain(self) -> GeneratedReport {
        GeneratedReport {
            format: self.format,
            download_url: self.download_url,
            file_name: self.file_name,
        }
    }
}
