//! Pure pricing, fee and share accounting logic of the pool.

pub mod auction;
pub mod error;
pub mod fee;
pub mod liquidity;
pub mod state;
pub mod swap;
pub mod utilization;
pub mod valuation;

pub use {
    error::Error,
    fee::TargetUtilization,
    liquidity::{ShareLedger, ShareMetadata},
    state::{Parameters, Snapshot, State},
};
