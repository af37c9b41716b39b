//! Request authentication for Journey Builder calls

pub mod jwt;

pub use jwt::{JWT_HEADER, JwtVerifier, extract_payload};
