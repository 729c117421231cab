//! Client-side workflow layer for a consumer shopping application: cart
//! mutations with optimistic patching and stamped reconciliation, the
//! order-status lifecycle, report generation/download/verify/open,
//! auth/session handling, points history and admin catalogue operations.
//!
//! The remote API, the persisted session and the platform document viewer
//! are consumed through ports in [`domain::ports`]; reqwest-backed
//! adapters live in [`infrastructure`].

pub mod application;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infrastructure;

pub use config::Config;
pub use errors::{ApiError, CartError, FieldError, OrderError};
