/// Database access layer for identity-service
pub mod users;
