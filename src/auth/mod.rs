pub mod jwt;

pub use jwt::{decode_token, generate_token};
