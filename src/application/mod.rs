pub mod auth;
pub mod cart;
pub mod media;
pub mod orders;
pub mod points;
pub mod products;
pub mod reports;
