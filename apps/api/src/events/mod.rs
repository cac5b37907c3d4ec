pub mod handlers;
pub mod registration;
pub mod service;
pub mod store;
