//! Centralized error handling for f1tv-dl
//!
//! Every stage of the resolution chain (URL classification, catalog lookup,
//! playback resolution, manifest parsing and rendition selection) fails fast
//! with one of the variants of [`AppError`]. Nothing in the library retries;
//! the binary decides how to report a failure.
//!
//! # Error Categories
//!
//! - **InvalidUrl**: malformed or off-domain video page URL
//! - **Auth**: missing entitlement token
//! - **Upstream**: network or non-2xx failures from the catalog/playback APIs
//! - **NotFound**: empty catalog result or unknown channel
//! - **RenditionNotFound**: no video/audio rendition matches the request
//! - **Parse**: manifest body does not match its family's grammar
//!
//! # Usage
//!
//! ```rust
//! use f1tv_dl::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::auth("no token"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;
