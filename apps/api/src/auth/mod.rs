//! Credential service: accounts, password hashes, session tokens, and the
//! extractors that turn a bearer token into an authenticated caller.

pub mod extract;
pub mod handlers;
pub mod password;
pub mod service;
pub mod store;
pub mod token;
