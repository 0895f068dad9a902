//! Body extractors whose rejections go through [`ApiError`], so malformed
//! input comes back as 400 `{"detail": ...}` like every other error.

use axum::extract::FromRequest;

use crate::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct AppForm<T>(pub T);
