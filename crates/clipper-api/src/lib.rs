//! Clipper API Library
//!
//! HTTP handlers, error rendering and application setup for the clip extraction service.

mod handlers;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError, ValidatedJson};
pub use state::AppState;
