//! ATC API server library.
//!
//! Exposes the building blocks (config, state, error handling, analysis
//! service, routes) so integration tests and the binary entrypoint can both
//! access them.

pub mod analysis;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod store;
