//! Finance module containing reconciliation, settlement, and reporting

pub mod core;
pub mod export;
pub mod occupancy;
pub mod reconcile;
pub mod settlement;

pub use self::core::*;
pub use occupancy::*;
pub use reconcile::*;
pub use settlement::*;
