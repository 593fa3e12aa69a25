//! geomatrix - persistent travel matrices over a rate-limited routing service
//!
//! Resolves location identifiers to coordinates and maintains an on-disk,
//! append-only cache of pairwise duration and distance matrices. Only pairs
//! involving never-seen coordinates cost a routing call; every call passes
//! through a rolling-window quota.

pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod matrix;
pub mod planner;
pub mod quota;
pub mod routing;
pub mod service;
pub mod ui;

pub use error::{GeoMatrixError, GeoMatrixResult};
