//! Data Transfer Objects for REST request/response serialization.
//!
//! Prices are serialized as decimal strings (`"50.00"`) so clients never
//! round them through floating point.

pub mod reservation_dto;

pub use reservation_dto::*;
