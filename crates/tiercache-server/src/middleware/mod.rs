//! Middleware stack para el servidor HTTP.
//!
//! Este modulo contiene los middleware de Tower que se aplican a todas las requests:
//! - `RequestIdLayer`: Genera/propaga X-Request-Id
//! - `trace_layer`: Logging estructurado de requests con tower-http

mod logging;
mod request_id;

pub use logging::{make_request_span, trace_layer};
pub use request_id::{REQUEST_ID_HEADER, RequestIdLayer, RequestIdMiddleware};
