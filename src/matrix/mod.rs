//! Persistent, incrementally expanded travel matrices
//!
//! | Piece | Role |
//! |-------|------|
//! | [`CostMatrix`] | square matrix of tri-state [`Cost`] cells |
//! | [`CacheSnapshot`] | location index list plus both matrices |
//! | [`MatrixStore`] | compressed on-disk snapshot, unreadable = absent |
//! | [`MatrixBuilder`] | routes only the missing pairs, then gathers |

pub mod builder;
pub mod cost;
pub mod snapshot;
pub mod store;

pub use builder::{BuildOptions, BuildReport, MatrixBuilder};
pub use cost::{Cost, CostMatrix};
pub use snapshot::{CacheSnapshot, MatrixKind, TravelMatrices};
pub use store::MatrixStore;
