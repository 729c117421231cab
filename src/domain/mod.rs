pub mod cart;
pub mod order;
pub mod page;
pub mod points;
pub mod ports;
pub mod product;
pub mod report;
pub mod session;
