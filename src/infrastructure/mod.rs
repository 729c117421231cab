pub mod download;
pub mod dto;
pub mod http_gateway;
pub mod session_file;
