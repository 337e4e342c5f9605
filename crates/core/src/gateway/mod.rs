//! Taproot Assets REST gateway client.
//!
//! This module provides a `Gateway` trait covering every gateway endpoint the
//! dashboard consumes, plus the reqwest-backed `RestGateway`.

mod rest;
mod types;

pub use rest::RestGateway;
pub use types::*;
