//! Extractors de parametros HTTP.

mod query;

pub use query::UserIdQuery;
