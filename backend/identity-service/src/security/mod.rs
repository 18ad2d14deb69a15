/// Security primitives for the identity service
pub mod password;

pub use password::{hash_password, verify_password};
