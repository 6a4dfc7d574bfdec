//! HTTP middleware.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. CORS (permissive)
//! 3. `TraceLayer` (`http_request` span)
//! 4. Request ID (recorded on the span)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
