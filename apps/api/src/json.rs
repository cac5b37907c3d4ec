use axum::extract::FromRequest;

use crate::errors::AppError;

/// `axum::Json` whose rejections (bad syntax, wrong field types, missing
/// content type) surface as `AppError::Validation` bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
