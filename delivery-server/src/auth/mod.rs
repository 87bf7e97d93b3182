//! Request identity: signed tokens issued at login, verified per request

pub mod identity;

pub use identity::{Identity, auth_middleware, create_token, verify_token};
