//! Data Transfer Objects for REST request/response serialization.
//!
//! Request bodies and query strings are parsed by explicit functions
//! that collect every field violation before anything reaches the
//! service layer.

mod fields;

pub mod entry_dto;
pub mod query_dto;

pub use entry_dto::*;
pub use query_dto::*;
