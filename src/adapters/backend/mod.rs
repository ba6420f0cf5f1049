//! Backend adapters. Implement AdoptionRequestsPort and AuthApiPort.
//!
//! Provides the reqwest REST client and an in-memory mock for tests/offline runs.

pub mod mock_backend;
pub mod rest_client;

pub use mock_backend::{MockBackend, MockFailure};
pub use rest_client::{DEFAULT_API_BASE_URL, RestBackend};
