//! # FarmHub Reporting Service Library
//!
//! Read-only aggregation service over the FarmHub schema. It shares the
//! database with the API server but none of its model layer: every answer
//! comes from raw SQL in the `queries` module.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `dates`: Two-format date parsing for query parameters
//! - `queries`: Raw SQL aggregation queries
//! - `routes`: HTTP handlers

pub mod app;
pub mod config;
pub mod dates;
pub mod error;
pub mod queries;
pub mod routes;
