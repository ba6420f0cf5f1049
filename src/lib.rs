//! petgate: client-side session, route guard and eligibility layer for the
//! pet adoption front-end, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
