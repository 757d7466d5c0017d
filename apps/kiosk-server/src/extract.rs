//! # Request Extractors
//!
//! `ApiJson<T>` reads a JSON body like `axum::Json<T>`, but a body that
//! cannot be parsed is answered with the usual `ApiError` shape:
//!
//! ```json
//! {
//!   "code": "VALIDATION_ERROR",
//!   "message": "The request could not be read.",
//!   "errors": [{ "field": "body", "message": "Failed to deserialize ..." }]
//! }
//! ```

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON body extractor rejecting with [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
