//! Infrastructure adapters. Implement outbound ports (and the inbound UI).
//!
//! Backend REST API, client-local storage, terminal UI. Map errors to DomainError.

pub mod backend;
pub mod persistence;
pub mod ui;
