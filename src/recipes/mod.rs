mod dto;
pub mod handlers;

pub use handlers::{read_routes, write_routes};
