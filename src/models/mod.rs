//! Core data models for the survey-data validation and audit pipeline.
//!
//! These types are the wire contracts of the service: the queue message
//! emitted after validation and the audit certificate issued after
//! deletion. They serialize as camelCase JSON via `serde` and the
//! certificate maps to its database table via `sqlx::FromRow`.

pub mod certificate;
pub mod validation;
