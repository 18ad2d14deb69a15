//! Session token primitives shared by the identity and gateway crates.

pub mod jwt;

pub use jwt::{Claims, JwtConfig, TokenError, TokenRejection, TokenService};
